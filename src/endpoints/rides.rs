use serde::Serialize;
use serde_json::json;
use validator::Validate;

use crate::cache::tags::Tag;
use crate::endpoints::{MutationDef, QueryDef};
use crate::error::ApiError;
use crate::models::geo::Location;
use crate::models::ride::RideStatus;

#[derive(Debug, Clone, Default)]
pub struct RideListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub status: Option<RideStatus>,
}

/// Booking form payload.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RideRequestPayload {
    pub pickup_location: Location,
    pub dropoff_location: Location,
    #[validate(length(min = 1, message = "choose a ride type"))]
    pub ride_type: String,
    #[validate(range(min = 1, max = 16, message = "guest count must be between 1 and 16"))]
    pub guest_count: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub amenities: Vec<String>,
}

pub fn request(payload: &RideRequestPayload) -> Result<MutationDef, ApiError> {
    payload.validate()?;
    let body = serde_json::to_value(payload)
        .map_err(|err| ApiError::Internal(format!("failed to encode payload: {err}")))?;
    Ok(MutationDef::post("/ride/request")
        .body(body)
        .invalidates([Tag::Ride]))
}

pub fn my_rides(params: &RideListParams) -> QueryDef {
    QueryDef::get("/ride/my-rides", [Tag::Ride])
        .param("page", params.page)
        .param("limit", params.limit)
        .param("status", params.status.map(|s| s.as_str()))
}

pub fn by_id(id: &str) -> QueryDef {
    QueryDef::get(format!("/ride/{id}"), [Tag::Ride])
}

pub fn all_rides(params: &RideListParams) -> QueryDef {
    QueryDef::get("/ride/all-rides", [Tag::Ride])
        .param("page", params.page)
        .param("limit", params.limit)
        .param("search", params.search.clone())
        .param("status", params.status.map(|s| s.as_str()))
}

/// Declares a row patch so an open dialog reflects the new status ahead of
/// the tag refetch.
pub fn update_status(id: &str, status: RideStatus) -> MutationDef {
    MutationDef::patch(format!("/ride/{id}/status"))
        .body(json!({ "status": status }))
        .invalidates([Tag::Ride])
        .patches_row(Tag::Ride, id)
}

pub fn assign_driver(id: &str, driver_id: &str) -> MutationDef {
    MutationDef::patch(format!("/ride/{id}/assign-driver"))
        .body(json!({ "driver": driver_id }))
        .invalidates([Tag::Ride, Tag::Driver])
        .patches_row(Tag::Ride, id)
}

pub fn cancel(id: &str) -> MutationDef {
    MutationDef::patch(format!("/ride/{id}/cancel")).invalidates([Tag::Ride])
}

pub fn delete(id: &str) -> MutationDef {
    MutationDef::delete(format!("/ride/{id}")).invalidates([Tag::Ride])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_page_two_search_carries_no_other_filters() {
        let def = all_rides(&RideListParams {
            page: Some(2),
            status: Some(RideStatus::Cancelled),
            ..Default::default()
        });

        assert_eq!(
            def.query,
            vec![("page", "2".to_string()), ("status", "cancelled".to_string())]
        );
        assert!(!def.query.iter().any(|(k, _)| *k == "search"));
    }

    #[test]
    fn assign_driver_declares_patch_and_both_tags() {
        let def = assign_driver("r1", "drv-1");

        assert_eq!(def.invalidates, vec![Tag::Ride, Tag::Driver]);
        let patch = def.patch.expect("assignment must patch the cached row");
        assert_eq!(patch.tag, Tag::Ride);
        assert_eq!(patch.id, "r1");
    }

    #[test]
    fn zero_guests_is_rejected_client_side() {
        let payload = RideRequestPayload {
            pickup_location: Location {
                address: "Banani 11".to_string(),
                lat: 23.79,
                lng: 90.40,
            },
            dropoff_location: Location {
                address: "Gulshan 2".to_string(),
                lat: 23.80,
                lng: 90.41,
            },
            ride_type: "sedan".to_string(),
            guest_count: 0,
            amenities: Vec::new(),
        };

        assert!(matches!(
            request(&payload),
            Err(ApiError::Validation(_))
        ));
    }
}
