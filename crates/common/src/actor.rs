//! Authenticated actors.
//!
//! Authentication itself is an external collaborator; by the time a request
//! reaches this engine it carries a verified identity and role. The
//! [`Actor`] pair is produced once per request by the API layer's
//! authorization gate and consumed by every component.

use serde::{Deserialize, Serialize};

use crate::ActorId;

/// The role an authenticated actor holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Places orders and receives deliveries.
    Buyer,
    /// Owns products and prepares orders for pickup.
    Seller,
    /// Claims prepared orders and delivers them.
    Rider,
}

impl Role {
    /// Returns the role as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
            Role::Rider => "rider",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown role string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError(pub String);

impl std::fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for ParseRoleError {}

impl std::str::FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(Role::Buyer),
            "seller" => Ok(Role::Seller),
            "rider" => Ok(Role::Rider),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

/// An authenticated party invoking an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub role: Role,
}

impl Actor {
    /// Creates an actor from an id and role.
    pub fn new(id: ActorId, role: Role) -> Self {
        Self { id, role }
    }

    /// Returns true if the actor holds the given role.
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }
}
