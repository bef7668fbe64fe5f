use serde::Serialize;
use validator::Validate;

use crate::cache::tags::Tag;
use crate::endpoints::{MutationDef, QueryDef};
use crate::error::ApiError;
use crate::models::driver::ApprovalStatus;

#[derive(Debug, Clone, Default)]
pub struct DriverListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub status: Option<ApprovalStatus>,
}

/// Driver application submitted from the rider-facing "become a driver" form.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DriverApplicationPayload {
    #[validate(length(min = 2, message = "vehicle type is required"))]
    pub vehicle_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[validate(length(min = 2, message = "plate number is required"))]
    pub plate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDriverProfilePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_online: Option<bool>,
}

fn status_str(status: ApprovalStatus) -> &'static str {
    match status {
        ApprovalStatus::Pending => "pending",
        ApprovalStatus::Approved => "approved",
        ApprovalStatus::Rejected => "rejected",
        ApprovalStatus::Suspended => "suspended",
    }
}

pub fn profile() -> QueryDef {
    QueryDef::get("/driver/profile", [Tag::Driver])
}

pub fn update_profile(payload: &UpdateDriverProfilePayload) -> Result<MutationDef, ApiError> {
    let body = serde_json::to_value(payload)
        .map_err(|err| ApiError::Internal(format!("failed to encode payload: {err}")))?;
    Ok(MutationDef::patch("/driver/profile")
        .body(body)
        .invalidates([Tag::Driver]))
}

pub fn apply(payload: &DriverApplicationPayload) -> Result<MutationDef, ApiError> {
    payload.validate()?;
    let body = serde_json::to_value(payload)
        .map_err(|err| ApiError::Internal(format!("failed to encode payload: {err}")))?;
    Ok(MutationDef::post("/driver/create-driver")
        .body(body)
        .invalidates([Tag::Driver]))
}

pub fn all_drivers(params: &DriverListParams) -> QueryDef {
    QueryDef::get("/driver/all-drivers", [Tag::Driver])
        .param("page", params.page)
        .param("limit", params.limit)
        .param("search", params.search.clone())
        .param("status", params.status.map(status_str))
}

pub fn by_id(id: &str) -> QueryDef {
    QueryDef::get(format!("/driver/{id}"), [Tag::Driver])
}

pub fn approve(id: &str) -> MutationDef {
    MutationDef::patch(format!("/driver/{id}/approve")).invalidates([Tag::Driver])
}

pub fn suspend(id: &str) -> MutationDef {
    MutationDef::patch(format!("/driver/{id}/suspend")).invalidates([Tag::Driver])
}

pub fn reject(id: &str) -> MutationDef {
    MutationDef::patch(format!("/driver/{id}/reject")).invalidates([Tag::Driver])
}
