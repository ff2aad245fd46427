/// Shared types used across the codebase

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Portal roles. Every role owns a home page at `/{role}/dashboard`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Seafarer,
    #[serde(alias = "ship_owner", alias = "ship-owner")]
    ShipOwner,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Seafarer, Role::ShipOwner];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Seafarer => "seafarer",
            Role::ShipOwner => "shipowner",
        }
    }

    /// Landing page for a signed-in user of this role
    pub fn home_path(&self) -> String {
        format!("/{}/dashboard", self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "seafarer" => Ok(Role::Seafarer),
            "shipowner" | "ship_owner" | "ship-owner" => Ok(Role::ShipOwner),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Client-side projection of the signed-in user.
///
/// Built from the login response and carried in a cookie; nothing here is
/// signature-checked, the crew service decides validity on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(alias = "full_name", default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

// The crew service hands out numeric ids; older sessions stored strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_home_paths() {
        assert_eq!(Role::Admin.home_path(), "/admin/dashboard");
        assert_eq!(Role::Seafarer.home_path(), "/seafarer/dashboard");
        assert_eq!(Role::ShipOwner.home_path(), "/shipowner/dashboard");
    }

    #[test]
    fn role_accepts_legacy_spellings() {
        assert_eq!("ship_owner".parse::<Role>().unwrap(), Role::ShipOwner);
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("captain".parse::<Role>().is_err());

        let role: Role = serde_json::from_value(json!("ship_owner")).unwrap();
        assert_eq!(role, Role::ShipOwner);
    }

    #[test]
    fn identity_from_login_payload() {
        let user: UserIdentity = serde_json::from_value(json!({
            "id": 42,
            "full_name": "Ana Reyes",
            "email": "ana@example.com",
            "role": "seafarer"
        }))
        .unwrap();

        assert_eq!(user.id, "42");
        assert_eq!(user.name, "Ana Reyes");
        assert_eq!(user.role, Role::Seafarer);
        assert!(user.token.is_none());
    }
}
