//! Authorization decisions for owned resources.
//!
//! Every mutating operation resolves the resource it targets, then asks an
//! [`AccessPolicy`] whether the authenticated user may act on it. Updates
//! don't carry an owner themselves; callers authorize against the parent
//! campaign instead.

use tracing::debug;

use crate::error::Error;
use crate::user::{User, UserId};

pub trait Owned {
    fn owner_id(&self) -> UserId;
}

pub trait AccessPolicy {
    fn has_access(&self, owner_id: UserId, user_id: UserId) -> bool;
}

/// Grants access only to the user that owns the resource.
#[derive(Copy, Clone, Debug, Default)]
pub struct OwnerOnly;

impl AccessPolicy for OwnerOnly {
    fn has_access(&self, owner_id: UserId, user_id: UserId) -> bool {
        owner_id == user_id
    }
}

pub fn authorize(resource: &dyn Owned, user: &User) -> Result<(), Error> {
    authorize_with(&OwnerOnly, resource, user)
}

pub fn authorize_with(
    policy: &dyn AccessPolicy,
    resource: &dyn Owned,
    user: &User,
) -> Result<(), Error> {
    let owner_id = resource.owner_id();
    if !policy.has_access(owner_id, user.id) {
        debug!("user {} denied access to resource owned by {}", user.id, owner_id);
        return Err(Error::AccessDenied { user_id: user.id });
    }

    Ok(())
}
