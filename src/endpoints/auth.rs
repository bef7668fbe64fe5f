use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::endpoints::MutationDef;
use crate::error::ApiError;

/// Validation runs before the request is built; a rejected payload never
/// produces network traffic.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    #[validate(length(min = 2, message = "name is too short"))]
    pub name: String,
    #[validate(email(message = "enter a valid email address"))]
    pub email: String,
    #[validate(
        length(min = 8, message = "password must be at least 8 characters"),
        custom(function = "password_strength")
    )]
    pub password: String,
    #[validate(must_match(other = "password", message = "passwords do not match"))]
    #[serde(skip_serializing)]
    pub confirm_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

fn password_strength(password: &str) -> Result<(), ValidationError> {
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_ascii_alphanumeric());

    if has_upper && has_lower && has_digit && has_special {
        Ok(())
    } else {
        Err(ValidationError::new("password_strength")
            .with_message("password needs upper, lower, digit and special characters".into()))
    }
}

pub fn register(payload: &RegisterPayload) -> Result<MutationDef, ApiError> {
    payload.validate()?;
    let body = serde_json::to_value(payload)
        .map_err(|err| ApiError::Internal(format!("failed to encode payload: {err}")))?;
    Ok(MutationDef::post("/auth/register").body(body))
}

pub fn login(payload: &LoginPayload) -> Result<MutationDef, ApiError> {
    payload.validate()?;
    let body = serde_json::to_value(payload)
        .map_err(|err| ApiError::Internal(format!("failed to encode payload: {err}")))?;
    Ok(MutationDef::post("/auth/login").body(body))
}

pub fn logout() -> MutationDef {
    MutationDef::post("/auth/logout")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(password: &str, confirm: &str) -> RegisterPayload {
        RegisterPayload {
            name: "Asha Rahman".to_string(),
            email: "asha@example.com".to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[test]
    fn strong_matching_password_passes() {
        assert!(register(&payload("Abcd123!", "Abcd123!")).is_ok());
    }

    #[test]
    fn mismatched_confirmation_is_rejected_before_any_request() {
        let err = register(&payload("Abcd123!", "Abcd124!")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn weak_password_is_rejected() {
        assert!(register(&payload("abcdefgh", "abcdefgh")).is_err());
        assert!(register(&payload("Abc1!", "Abc1!")).is_err());
    }

    #[test]
    fn confirmation_is_not_serialized_to_the_wire() {
        let def = register(&payload("Abcd123!", "Abcd123!")).unwrap();
        let body = def.body.unwrap();
        assert!(body.get("confirmPassword").is_none());
        assert_eq!(body["email"], "asha@example.com");
    }
}
