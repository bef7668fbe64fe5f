use serde::{Deserialize, Serialize};

/// Admin-managed lookup entity describing a bookable vehicle category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideType {
    #[serde(rename = "_id")]
    pub id: String,
    pub vehicle_category: String,
    #[serde(default)]
    pub place_type: Option<String>,
    pub guest_capacity: u32,
}
