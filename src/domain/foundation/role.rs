//! Caller roles, ordered by privilege.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a connected caller within one tournament.
///
/// Roles are strictly ordered: spectator < player < organizer < admin.
/// Authorization checks compare by rank, never by identity, so a role
/// always grants everything the roles below it grant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Spectator,
    Player,
    Organizer,
    Admin,
}

impl Role {
    /// Returns true if this role grants at least the required privilege.
    pub fn at_least(&self, required: Role) -> bool {
        *self >= required
    }

    /// Returns the wire representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Spectator => "spectator",
            Role::Player => "player",
            Role::Organizer => "organizer",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_are_strictly_ordered() {
        assert!(Role::Spectator < Role::Player);
        assert!(Role::Player < Role::Organizer);
        assert!(Role::Organizer < Role::Admin);
    }

    #[test]
    fn higher_roles_satisfy_lower_requirements() {
        assert!(Role::Admin.at_least(Role::Spectator));
        assert!(Role::Organizer.at_least(Role::Player));
        assert!(!Role::Player.at_least(Role::Organizer));
    }

    #[test]
    fn role_round_trips_through_serde() {
        let json = serde_json::to_string(&Role::Organizer).unwrap();
        assert_eq!(json, r#""organizer""#);
        let role: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(role, Role::Organizer);
    }
}
