use serde::{Deserialize, Serialize};

/// Pickup/dropoff location as the backend sends it: a display address plus
/// coordinates from the mapping provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

/// Top level of the two-level geographic hierarchy scoping rides and drivers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Division {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct District {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub division: String,
}
