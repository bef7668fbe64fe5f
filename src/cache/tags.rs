use serde::{Deserialize, Serialize};

/// Closed vocabulary of cache tags, one per entity family. Queries provide
/// tags, mutations invalidate them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Ride,
    User,
    Driver,
    Payment,
    RideType,
    Division,
    District,
}

impl Tag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Ride => "ride",
            Tag::User => "user",
            Tag::Driver => "driver",
            Tag::Payment => "payment",
            Tag::RideType => "ride-type",
            Tag::Division => "division",
            Tag::District => "district",
        }
    }
}

/// One cache entry per distinct (path, parameter set). Parameters are sorted
/// by key so call sites building the same filter in a different order share
/// an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(String);

impl QueryKey {
    pub fn new(path: &str, query: &[(&'static str, String)]) -> Self {
        if query.is_empty() {
            return QueryKey(path.to_string());
        }

        let mut pairs: Vec<_> = query.to_vec();
        pairs.sort_by_key(|(k, _)| *k);

        let encoded = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        QueryKey(format!("{path}?{encoded}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_parameter_order_insensitive() {
        let a = QueryKey::new(
            "/ride/all-rides",
            &[("status", "cancelled".into()), ("page", "2".into())],
        );
        let b = QueryKey::new(
            "/ride/all-rides",
            &[("page", "2".into()), ("status", "cancelled".into())],
        );

        assert_eq!(a, b);
    }

    #[test]
    fn key_without_params_is_bare_path() {
        let key = QueryKey::new("/user/me", &[]);
        assert_eq!(key.as_str(), "/user/me");
    }

    #[test]
    fn different_parameter_sets_get_distinct_keys() {
        let page1 = QueryKey::new("/driver/all-drivers", &[("page", "1".into())]);
        let page2 = QueryKey::new("/driver/all-drivers", &[("page", "2".into())]);

        assert_ne!(page1, page2);
    }
}
