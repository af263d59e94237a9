//! Role gating and the ownership-or-override predicate.
//!
//! Nothing here knows about HTTP; handlers build an [`Actor`] from the decoded
//! credential and ask these functions.

use model::entities::user::Role;
use tracing::warn;
use uuid::Uuid;

use crate::error::{DomainError, Result};

pub const ADMIN: &[Role] = &[Role::Admin];
pub const OWNER_OR_ADMIN: &[Role] = &[Role::Owner, Role::Admin];
/// Roles allowed to mutate a hostel's operational data.
pub const MANAGEMENT: &[Role] = &[Role::Owner, Role::Admin, Role::Caretaker];
pub const AUTHENTICATED: &[Role] = &[Role::Student, Role::Owner, Role::Admin, Role::Caretaker];

/// The caller of an operation, as carried by its credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Kinds of resource whose writes are gated by [`can_manage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagedResource {
    Hostel,
    Room,
    MediaWrite,
    MediaDelete,
    Booking,
    Review,
}

/// Roles that may manage a resource without owning it. Admin is implied.
pub fn management_roles(resource: ManagedResource) -> &'static [Role] {
    match resource {
        ManagedResource::Room | ManagedResource::MediaWrite | ManagedResource::Booking => {
            &[Role::Caretaker]
        }
        ManagedResource::Hostel | ManagedResource::MediaDelete | ManagedResource::Review => &[],
    }
}

pub fn has_role(actor_role: Role, required_roles: &[Role]) -> bool {
    required_roles.contains(&actor_role)
}

pub fn require_role(actor: &Actor, required_roles: &[Role]) -> Result<()> {
    if has_role(actor.role, required_roles) {
        Ok(())
    } else {
        warn!(actor = %actor.id, role = ?actor.role, "Role not permitted");
        Err(DomainError::Forbidden(
            "Your role does not have permission to perform this action".to_string(),
        ))
    }
}

/// Admin, the resource owner, or a role listed in [`management_roles`].
pub fn can_manage(actor: &Actor, resource_owner_id: Uuid, resource: ManagedResource) -> bool {
    actor.is_admin()
        || actor.id == resource_owner_id
        || management_roles(resource).contains(&actor.role)
}

pub fn require_manage(actor: &Actor, resource_owner_id: Uuid, resource: ManagedResource) -> Result<()> {
    if can_manage(actor, resource_owner_id, resource) {
        Ok(())
    } else {
        warn!(actor = %actor.id, ?resource, "Not the owner of the resource");
        Err(DomainError::Forbidden(
            "You do not have permission to manage this resource".to_string(),
        ))
    }
}
