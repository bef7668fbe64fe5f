use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::cache::tags::Tag;
use crate::endpoints::{MutationDef, QueryDef};
use crate::error::ApiError;
use crate::models::user::{AccountStatus, Role};

#[derive(Debug, Clone, Default)]
pub struct UserListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub role: Option<Role>,
    pub status: Option<AccountStatus>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    #[validate(length(min = 1, message = "current password is required"))]
    pub old_password: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct EmergencyContactPayload {
    #[validate(length(min = 2, message = "name is too short"))]
    pub name: String,
    #[validate(length(min = 6, message = "enter a valid phone number"))]
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
}

pub fn me() -> QueryDef {
    QueryDef::get("/user/me", [Tag::User])
}

pub fn update_me(payload: &UpdateProfilePayload) -> Result<MutationDef, ApiError> {
    let body = serde_json::to_value(payload)
        .map_err(|err| ApiError::Internal(format!("failed to encode payload: {err}")))?;
    Ok(MutationDef::patch("/user/me")
        .body(body)
        .invalidates([Tag::User]))
}

pub fn change_password(payload: &ChangePasswordPayload) -> Result<MutationDef, ApiError> {
    payload.validate()?;
    let body = serde_json::to_value(payload)
        .map_err(|err| ApiError::Internal(format!("failed to encode payload: {err}")))?;
    Ok(MutationDef::patch("/user/change-password").body(body))
}

pub fn all_users(params: &UserListParams) -> QueryDef {
    QueryDef::get("/user/all-users", [Tag::User])
        .param("page", params.page)
        .param("limit", params.limit)
        .param("search", params.search.clone())
        .param(
            "role",
            params.role.map(|r| match r {
                Role::User => "USER",
                Role::Driver => "DRIVER",
                Role::Admin => "ADMIN",
                Role::SuperAdmin => "SUPER_ADMIN",
            }),
        )
        .param(
            "status",
            params.status.map(|s| match s {
                AccountStatus::Active => "ACTIVE",
                AccountStatus::Blocked => "BLOCKED",
            }),
        )
}

pub fn block(id: &str) -> MutationDef {
    MutationDef::patch(format!("/user/{id}/block")).invalidates([Tag::User])
}

pub fn unblock(id: &str) -> MutationDef {
    MutationDef::patch(format!("/user/{id}/unblock")).invalidates([Tag::User])
}

pub fn set_role(id: &str, role: Role) -> MutationDef {
    MutationDef::patch(format!("/user/{id}/role"))
        .body(json!({ "role": role }))
        .invalidates([Tag::User])
}

pub fn emergency_contacts() -> QueryDef {
    QueryDef::get("/user/emergency-contacts", [Tag::User])
}

pub fn create_emergency_contact(payload: &EmergencyContactPayload) -> Result<MutationDef, ApiError> {
    payload.validate()?;
    let body = serde_json::to_value(payload)
        .map_err(|err| ApiError::Internal(format!("failed to encode payload: {err}")))?;
    Ok(MutationDef::post("/user/emergency-contacts")
        .body(body)
        .invalidates([Tag::User]))
}

pub fn update_emergency_contact(
    id: &str,
    payload: &EmergencyContactPayload,
) -> Result<MutationDef, ApiError> {
    payload.validate()?;
    let body = serde_json::to_value(payload)
        .map_err(|err| ApiError::Internal(format!("failed to encode payload: {err}")))?;
    Ok(MutationDef::patch(format!("/user/emergency-contacts/{id}"))
        .body(body)
        .invalidates([Tag::User]))
}

pub fn delete_emergency_contact(id: &str) -> MutationDef {
    MutationDef::delete(format!("/user/emergency-contacts/{id}")).invalidates([Tag::User])
}
