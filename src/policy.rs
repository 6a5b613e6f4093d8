//! Ownership-based access control.
//!
//! Reads are open to any authenticated caller. Every write on an owned
//! resource goes through [`can_mutate`].

use crate::error::{AppError, AppResult};

/// The authenticated caller of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i32,
    pub username: String,
}

/// A resource that belongs to a single user
pub trait Owned {
    fn owner_id(&self) -> i32;
}

/// Whether `identity` may update or delete `resource`
pub fn can_mutate<R: Owned + ?Sized>(identity: &Identity, resource: &R) -> bool {
    identity.user_id == resource.owner_id()
}

/// [`can_mutate`] as a request guard
pub fn ensure_can_mutate<R: Owned + ?Sized>(identity: &Identity, resource: &R) -> AppResult<()> {
    if can_mutate(identity, resource) {
        Ok(())
    } else {
        Err(AppError::Authorization(
            "Only the owner may modify this resource".to_string(),
        ))
    }
}
