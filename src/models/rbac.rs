// src/models/rbac.rs

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Conjunto fixo de cargos, do mais alto para o mais baixo:
// superAdmin > admin > manager > {salesman, tailor, embroideryMan, stoneMan} > user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    SuperAdmin,
    Admin,
    Manager,
    Salesman,
    Tailor,
    EmbroideryMan,
    StoneMan,
    User,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::SuperAdmin,
        Role::Admin,
        Role::Manager,
        Role::Salesman,
        Role::Tailor,
        Role::EmbroideryMan,
        Role::StoneMan,
        Role::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "superAdmin",
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Salesman => "salesman",
            Role::Tailor => "tailor",
            Role::EmbroideryMan => "embroideryMan",
            Role::StoneMan => "stoneMan",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Active,
    Inactive,
}

// Opção de cargo para o frontend montar o seletor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RoleOption {
    #[schema(example = "manager")]
    pub value: Role,

    #[schema(example = "Gerente")]
    pub label: String,

    #[schema(example = "blue")]
    pub color: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_match_as_str() {
        for role in Role::ALL {
            let json = serde_json::to_value(role).unwrap();
            assert_eq!(json, serde_json::Value::String(role.as_str().to_string()));
        }
    }

    #[test]
    fn status_is_lowercase_on_the_wire() {
        assert_eq!(serde_json::to_value(AssignmentStatus::Inactive).unwrap(), "inactive");
    }
}
