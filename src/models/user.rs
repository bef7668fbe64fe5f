use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Driver,
    Admin,
    SuperAdmin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: Role,
    #[serde(default, rename = "isActive")]
    pub status: Option<AccountStatus>,
}

impl User {
    pub fn is_blocked(&self) -> bool {
        self.status == Some(AccountStatus::Blocked)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub relation: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn user_decodes_backend_shape() {
        let user: User = serde_json::from_value(json!({
            "_id": "u1",
            "name": "Asha Rahman",
            "email": "asha@example.com",
            "role": "SUPER_ADMIN",
            "isActive": "ACTIVE"
        }))
        .unwrap();

        assert_eq!(user.id, "u1");
        assert_eq!(user.role, Role::SuperAdmin);
        assert!(!user.is_blocked());
    }

    #[test]
    fn missing_optional_fields_decode_as_none() {
        let user: User = serde_json::from_value(json!({
            "_id": "u2",
            "name": "Rafi",
            "email": "rafi@example.com",
            "role": "USER"
        }))
        .unwrap();

        assert!(user.phone.is_none());
        assert!(user.status.is_none());
    }
}
