pub mod driver;
pub mod geo;
pub mod payment;
pub mod ride;
pub mod ride_type;
pub mod user;

use serde::Deserialize;

/// Paginated list payload: `{ "data": [...], "meta": {...} }` after envelope
/// unwrapping.
#[derive(Debug, Clone, Deserialize)]
pub struct Paged<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: Option<Meta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Meta {
    pub total: Option<u64>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(alias = "totalPage", alias = "totalPages")]
    pub total_pages: Option<u32>,
}
