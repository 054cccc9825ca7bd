pub mod extractor;
pub mod gate;
pub mod model;
pub mod principal;

pub use extractor::SessionUser;
pub use gate::{authorize, require};
pub use model::{Action, Permission, ResourceGrant, Role};
pub use principal::Principal;
