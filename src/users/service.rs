use time::{macros::format_description, Date, OffsetDateTime};

/// One 365-day year in milliseconds. Age is the floor of elapsed time over
/// this constant — a calendar approximation that drifts on leap years, kept
/// for compatibility with existing stored ages.
const MS_PER_YEAR: i128 = 31_536_000_000;

/// Age at `now` for an account born on `birthdate`, midnight UTC.
pub fn age_at(birthdate: Date, now: OffsetDateTime) -> i32 {
    let birth = birthdate.midnight().assume_utc();
    let elapsed_ms = (now - birth).whole_milliseconds();
    elapsed_ms.div_euclid(MS_PER_YEAR) as i32
}

pub fn parse_birthdate(s: &str) -> Option<Date> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(s, format).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;
    use time::Duration;

    fn noon(d: Date) -> OffsetDateTime {
        d.midnight().assume_utc() + Duration::hours(12)
    }

    #[test]
    fn exactly_eighteen_365_day_years_is_18() {
        let now = date!(2026 - 08 - 01).midnight().assume_utc();
        let birthdate = now.date() - Duration::days(18 * 365);
        assert_eq!(age_at(birthdate, now), 18);
    }

    #[test]
    fn one_day_short_of_eighteen_years_is_17() {
        let now = date!(2026 - 08 - 01).midnight().assume_utc();
        let birthdate = now.date() - Duration::days(18 * 365 - 1);
        assert_eq!(age_at(birthdate, now), 17);
    }

    #[test]
    fn born_today_is_0() {
        let today = date!(2026 - 08 - 01);
        assert_eq!(age_at(today, noon(today)), 0);
    }

    #[test]
    fn leap_years_drift_the_approximation() {
        // Someone born 2000-01-01 has lived through 7 leap days by 2026, so
        // the 365-day division makes them 27 on 2026-12-25 — a week before
        // the calendar birthday.
        let birthdate = date!(2000 - 01 - 01);
        assert_eq!(age_at(birthdate, date!(2026 - 12 - 24).midnight().assume_utc()), 26);
        assert_eq!(age_at(birthdate, date!(2026 - 12 - 25).midnight().assume_utc()), 27);
    }

    #[test]
    fn parse_birthdate_accepts_iso_dates() {
        assert_eq!(parse_birthdate("1995-06-01"), Some(date!(1995 - 06 - 01)));
        assert_eq!(parse_birthdate("2000-02-29"), Some(date!(2000 - 02 - 29)));
        assert!(parse_birthdate("01/06/1995").is_none());
        assert!(parse_birthdate("1995-13-01").is_none());
        assert!(parse_birthdate("").is_none());
    }
}
