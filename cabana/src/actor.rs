//! Actor identity and roles.
//!
//! Identity and session management live outside this core; the surrounding
//! service resolves authentication and hands transitions a trusted actor id
//! and role. Authorization guards that depend on *which* actor performs an
//! event are enforced inside the state machine itself.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The role an actor holds when invoking a lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// A requesting user who owns their reservations.
    Guest,
    /// A venue administrator.
    Admin,
    /// A system administrator.
    SystemAdmin,
}

impl Role {
    /// Returns `true` for roles with administrative authority.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin | Self::SystemAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guest => write!(f, "guest"),
            Self::Admin => write!(f, "admin"),
            Self::SystemAdmin => write!(f, "system admin"),
        }
    }
}

/// A trusted, already-authenticated actor.
///
/// # Examples
///
/// ```
/// use cabana::{Actor, Role};
///
/// let admin = Actor::new(1, Role::Admin);
/// assert!(admin.role.is_admin());
///
/// let guest = Actor::new(42, Role::Guest);
/// assert!(!guest.role.is_admin());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The actor's user id.
    pub id: i64,
    /// The actor's resolved role.
    pub role: Role,
}

impl Actor {
    /// Creates a new actor.
    #[must_use]
    pub const fn new(id: i64, role: Role) -> Self {
        Self { id, role }
    }
}
