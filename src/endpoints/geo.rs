//! Division and district endpoints, shared by rider and admin screens.

use serde_json::json;

use crate::cache::tags::Tag;
use crate::endpoints::{MutationDef, QueryDef};

pub fn all_divisions() -> QueryDef {
    QueryDef::get("/division/all", [Tag::Division])
}

pub fn create_division(name: &str) -> MutationDef {
    MutationDef::post("/division/create")
        .body(json!({ "name": name }))
        .invalidates([Tag::Division])
}

pub fn delete_division(id: &str) -> MutationDef {
    // Districts hang off their division; dropping one invalidates both.
    MutationDef::delete(format!("/division/{id}")).invalidates([Tag::Division, Tag::District])
}

pub fn all_districts(division_id: Option<&str>) -> QueryDef {
    QueryDef::get("/district/all", [Tag::District]).param("division", division_id)
}

pub fn create_district(name: &str, division_id: &str) -> MutationDef {
    MutationDef::post("/district/create")
        .body(json!({ "name": name, "division": division_id }))
        .invalidates([Tag::District])
}

pub fn delete_district(id: &str) -> MutationDef {
    MutationDef::delete(format!("/district/{id}")).invalidates([Tag::District])
}
