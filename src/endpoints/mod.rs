pub mod auth;
pub mod drivers;
pub mod geo;
pub mod payments;
pub mod ride_types;
pub mod rides;
pub mod stats;
pub mod users;

use serde_json::Value;

use crate::cache::tags::{QueryKey, Tag};
use crate::transport::Method;

#[derive(Debug, Clone)]
pub struct QueryDef {
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    pub provides: Vec<Tag>,
}

impl QueryDef {
    pub fn get(path: impl Into<String>, provides: impl Into<Vec<Tag>>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
            provides: provides.into(),
        }
    }

    /// Append a query-string parameter, omitted entirely when absent. The
    /// backend treats an empty string as a literal filter value.
    pub fn param<V: ToString>(mut self, key: &'static str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.query.push((key, value.to_string()));
        }
        self
    }

    pub fn key(&self) -> QueryKey {
        QueryKey::new(&self.path, &self.query)
    }
}

/// Replace the row addressed by `(tag, id)` with the mutation's response in
/// every cached list holding it.
#[derive(Debug, Clone)]
pub struct RowPatch {
    pub tag: Tag,
    pub id: String,
}

#[derive(Debug, Clone)]
pub struct MutationDef {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub invalidates: Vec<Tag>,
    pub patch: Option<RowPatch>,
}

impl MutationDef {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            invalidates: Vec::new(),
            patch: None,
        }
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn invalidates(mut self, tags: impl Into<Vec<Tag>>) -> Self {
        self.invalidates = tags.into();
        self
    }

    pub fn patches_row(mut self, tag: Tag, id: impl Into<String>) -> Self {
        self.patch = Some(RowPatch { tag, id: id.into() });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_params_never_reach_the_descriptor() {
        let def = QueryDef::get("/ride/all-rides", [Tag::Ride])
            .param("status", Some("cancelled"))
            .param("page", Some(2))
            .param("search", None::<String>)
            .param("limit", None::<u32>);

        assert_eq!(
            def.query,
            vec![("status", "cancelled".to_string()), ("page", "2".to_string())]
        );
    }
}
