//! Admin dashboard stat queries, issued independently and concurrently.

use crate::cache::tags::Tag;
use crate::endpoints::QueryDef;

pub fn user_stats() -> QueryDef {
    QueryDef::get("/admin/stats/users", [Tag::User])
}

pub fn driver_stats() -> QueryDef {
    QueryDef::get("/admin/stats/drivers", [Tag::Driver])
}

pub fn ride_stats() -> QueryDef {
    QueryDef::get("/admin/stats/rides", [Tag::Ride])
}

pub fn payment_stats() -> QueryDef {
    QueryDef::get("/admin/stats/payments", [Tag::Payment])
}
