use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::driver::DriverRef;
use crate::models::geo::Location;

/// Lifecycle states. Aliases absorb the informal casings ("PENDING",
/// "Active") the backend occasionally leaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    #[serde(alias = "PENDING", alias = "Pending")]
    Requested,
    Accepted,
    PickedUp,
    #[serde(alias = "Active", alias = "IN_TRANSIT")]
    InTransit,
    Completed,
    Cancelled,
}

impl RideStatus {
    /// Transition legality is backend-enforced.
    pub const ALL: [RideStatus; 6] = [
        RideStatus::Requested,
        RideStatus::Accepted,
        RideStatus::PickedUp,
        RideStatus::InTransit,
        RideStatus::Completed,
        RideStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RideStatus::Requested => "requested",
            RideStatus::Accepted => "accepted",
            RideStatus::PickedUp => "picked_up",
            RideStatus::InTransit => "in_transit",
            RideStatus::Completed => "completed",
            RideStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    #[serde(rename = "_id")]
    pub id: String,
    /// Requester reference; populated or bare id depending on the endpoint.
    pub rider: serde_json::Value,
    pub pickup_location: Location,
    pub dropoff_location: Location,
    #[serde(default)]
    pub requested_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub picked_up_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cost: Option<f64>,
    pub status: RideStatus,
    #[serde(default)]
    pub driver: Option<DriverRef>,
    #[serde(default)]
    pub ride_type: Option<String>,
    #[serde(default)]
    pub seats: Option<u32>,
    #[serde(default)]
    pub guest_count: Option<u32>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::driver::DriverRef;

    fn base_ride(extra: serde_json::Value) -> serde_json::Value {
        let mut ride = json!({
            "_id": "r1",
            "rider": "usr-7",
            "pickupLocation": {"address": "Banani 11", "lat": 23.79, "lng": 90.40},
            "dropoffLocation": {"address": "Gulshan 2", "lat": 23.80, "lng": 90.41},
            "status": "requested"
        });
        ride.as_object_mut()
            .unwrap()
            .extend(extra.as_object().cloned().unwrap_or_default());
        ride
    }

    #[test]
    fn decodes_minimal_ride() {
        let ride: Ride = serde_json::from_value(base_ride(json!({}))).unwrap();
        assert_eq!(ride.status, RideStatus::Requested);
        assert!(ride.driver.is_none());
        assert!(ride.amenities.is_empty());
    }

    #[test]
    fn informal_status_casings_are_absorbed() {
        let active: Ride =
            serde_json::from_value(base_ride(json!({"status": "Active"}))).unwrap();
        assert_eq!(active.status, RideStatus::InTransit);

        let pending: Ride =
            serde_json::from_value(base_ride(json!({"status": "PENDING"}))).unwrap();
        assert_eq!(pending.status, RideStatus::Requested);
    }

    #[test]
    fn driver_field_decodes_as_bare_id() {
        let ride: Ride =
            serde_json::from_value(base_ride(json!({"driver": "drv-1"}))).unwrap();
        assert_eq!(ride.driver, Some(DriverRef::Id("drv-1".to_string())));
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(RideStatus::PickedUp).unwrap(),
            json!("picked_up")
        );
    }
}
