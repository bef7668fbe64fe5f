use serde::Serialize;
use validator::Validate;

use crate::cache::tags::Tag;
use crate::endpoints::{MutationDef, QueryDef};
use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RideTypePayload {
    #[validate(length(min = 2, message = "vehicle category is required"))]
    pub vehicle_category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_type: Option<String>,
    #[validate(range(min = 1, max = 64, message = "guest capacity must be between 1 and 64"))]
    pub guest_capacity: u32,
}

pub fn all() -> QueryDef {
    QueryDef::get("/ride-type/all", [Tag::RideType])
}

pub fn create(payload: &RideTypePayload) -> Result<MutationDef, ApiError> {
    payload.validate()?;
    let body = serde_json::to_value(payload)
        .map_err(|err| ApiError::Internal(format!("failed to encode payload: {err}")))?;
    Ok(MutationDef::post("/ride-type/create")
        .body(body)
        .invalidates([Tag::RideType]))
}

pub fn update(id: &str, payload: &RideTypePayload) -> Result<MutationDef, ApiError> {
    payload.validate()?;
    let body = serde_json::to_value(payload)
        .map_err(|err| ApiError::Internal(format!("failed to encode payload: {err}")))?;
    Ok(MutationDef::patch(format!("/ride-type/{id}"))
        .body(body)
        .invalidates([Tag::RideType]))
}

pub fn delete(id: &str) -> MutationDef {
    MutationDef::delete(format!("/ride-type/{id}")).invalidates([Tag::RideType])
}

#[cfg(test)]
mod tests {
    use crate::transport::Method;

    use super::*;

    fn payload() -> RideTypePayload {
        RideTypePayload {
            vehicle_category: "Premium Sedan".to_string(),
            place_type: None,
            guest_capacity: 4,
        }
    }

    #[test]
    fn create_invalidates_the_ride_type_tag() {
        let def = create(&payload()).unwrap();
        assert_eq!(def.method, Method::Post);
        assert_eq!(def.path, "/ride-type/create");
        assert_eq!(def.invalidates, vec![Tag::RideType]);
    }

    #[test]
    fn zero_guest_capacity_is_rejected_before_any_request() {
        let invalid = RideTypePayload {
            guest_capacity: 0,
            ..payload()
        };
        assert!(create(&invalid).is_err());
        assert!(update("rt-1", &invalid).is_err());
    }

    #[test]
    fn blank_vehicle_category_is_rejected() {
        let invalid = RideTypePayload {
            vehicle_category: "x".to_string(),
            ..payload()
        };
        assert!(create(&invalid).is_err());
    }
}
