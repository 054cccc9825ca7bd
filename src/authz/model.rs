use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Independent permission bits for one resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub read: bool,
    pub create: bool,
    pub update: bool,
    pub delete: bool,
}

impl Permission {
    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::Read => self.read,
            Action::Create => self.create,
            Action::Update => self.update,
            Action::Delete => self.delete,
        }
    }
}

/// One (resource, permission) pair inside a role. Resource names are matched
/// case-insensitively against requested resource names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGrant {
    pub resource: String,
    pub permission: Permission,
}

/// Named permission bundle. The grant list is ordered; duplicate resources
/// are not expected, and lookups take the first match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub resources: Vec<ResourceGrant>,
}

/// Action requested against a resource. Wire strings that name no known
/// action do not parse, and the gate denies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "read" => Some(Action::Read),
            "create" => Some(Action::Create),
            "update" => Some(Action::Update),
            "delete" => Some(Action::Delete),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_parse_is_exact() {
        assert_eq!(Action::parse("read"), Some(Action::Read));
        assert_eq!(Action::parse("delete"), Some(Action::Delete));
        assert_eq!(Action::parse("Read"), None);
        assert_eq!(Action::parse("write"), None);
        assert_eq!(Action::parse(""), None);
    }

    #[test]
    fn permission_bits_are_independent() {
        let p = Permission {
            read: true,
            create: false,
            update: true,
            delete: false,
        };
        assert!(p.allows(Action::Read));
        assert!(!p.allows(Action::Create));
        assert!(p.allows(Action::Update));
        assert!(!p.allows(Action::Delete));
    }

    #[test]
    fn grant_list_deserializes_from_stored_json() {
        // Same shape the seed migration writes into roles.resources
        let raw = r#"[
            {"resource": "users", "permission": {"read": true, "create": false, "update": false, "delete": false}}
        ]"#;
        let grants: Vec<ResourceGrant> = serde_json::from_str(raw).expect("grant list parses");
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].resource, "users");
        assert!(grants[0].permission.read);
        assert!(!grants[0].permission.delete);
    }
}
