mod guard;

pub use guard::{PageAccess, check_access};
