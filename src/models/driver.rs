use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
    Suspended,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInfo {
    pub vehicle_type: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub plate: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    #[serde(rename = "_id")]
    pub id: String,
    pub user: UserRef,
    #[serde(default)]
    pub vehicle: Option<VehicleInfo>,
    pub status: ApprovalStatus,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Id(String),
    Populated(User),
}

impl UserRef {
    pub fn id(&self) -> &str {
        match self {
            UserRef::Id(id) => id,
            UserRef::Populated(user) => &user.id,
        }
    }
}

// A ride's `driver` field arrives as a bare id, a driver document, or a
// document that only carries a populated `user`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DriverRef {
    Id(String),
    Doc(DriverRefDoc),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DriverRefDoc {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub user: Option<UserSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// `Degraded` means a driver is assigned but their identity could not be
/// resolved, which is distinct from an unassigned ride.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignedDriver {
    Unassigned,
    Resolved {
        id: String,
        name: String,
        email: Option<String>,
    },
    Degraded {
        id: Option<String>,
    },
}

impl AssignedDriver {
    pub fn display_name(&self) -> String {
        match self {
            AssignedDriver::Unassigned => "Not Assigned".to_string(),
            AssignedDriver::Resolved { name, .. } => name.clone(),
            AssignedDriver::Degraded { .. } => "Driver details unavailable".to_string(),
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            AssignedDriver::Resolved { email, .. } => email.as_deref(),
            _ => None,
        }
    }
}

/// Identity lookup keyed by driver id and by the wrapped user id, built from
/// an already-fetched driver list.
#[derive(Debug, Default)]
pub struct DriverDirectory {
    by_id: HashMap<String, (String, Option<String>)>,
}

impl DriverDirectory {
    pub fn from_drivers<'a>(drivers: impl IntoIterator<Item = &'a Driver>) -> Self {
        let mut by_id = HashMap::new();

        for driver in drivers {
            if let UserRef::Populated(user) = &driver.user {
                let identity = (user.name.clone(), Some(user.email.clone()));
                by_id.insert(driver.id.clone(), identity.clone());
                by_id.insert(user.id.clone(), identity);
            }
        }

        Self { by_id }
    }

    fn lookup(&self, id: &str) -> Option<(String, Option<String>)> {
        self.by_id.get(id).cloned()
    }
}

/// Absorb the wire-shape drift once; consumers only see [`AssignedDriver`].
pub fn normalize_driver(
    ride_id: &str,
    driver: Option<&DriverRef>,
    directory: &DriverDirectory,
) -> AssignedDriver {
    match driver {
        None => AssignedDriver::Unassigned,

        Some(DriverRef::Id(id)) => match directory.lookup(id) {
            Some((name, email)) => AssignedDriver::Resolved {
                id: id.clone(),
                name,
                email,
            },
            None => {
                warn!(ride_id, driver_id = %id, "driver reference did not resolve");
                AssignedDriver::Degraded { id: Some(id.clone()) }
            }
        },

        Some(DriverRef::Doc(doc)) => {
            // inline identity, then the nested user, then the directory
            if let (Some(id), Some(name)) = (&doc.id, &doc.name) {
                return AssignedDriver::Resolved {
                    id: id.clone(),
                    name: name.clone(),
                    email: doc.email.clone(),
                };
            }

            if let Some(user) = &doc.user {
                if let (Some(id), Some(name)) = (&user.id, &user.name) {
                    return AssignedDriver::Resolved {
                        id: id.clone(),
                        name: name.clone(),
                        email: user.email.clone(),
                    };
                }
            }

            if let Some(id) = &doc.id {
                if let Some((name, email)) = directory.lookup(id) {
                    return AssignedDriver::Resolved {
                        id: id.clone(),
                        name,
                        email,
                    };
                }
            }

            warn!(ride_id, "driver object carried no resolvable identity");
            AssignedDriver::Degraded { id: doc.id.clone() }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::user::Role;

    fn directory() -> DriverDirectory {
        let driver: Driver = serde_json::from_value(json!({
            "_id": "drv-1",
            "user": {
                "_id": "usr-1",
                "name": "Karim Uddin",
                "email": "karim@example.com",
                "role": "DRIVER"
            },
            "status": "approved",
            "isOnline": true,
            "rating": 4.8
        }))
        .unwrap();

        DriverDirectory::from_drivers([&driver])
    }

    fn resolved(assigned: &AssignedDriver) -> (String, Option<String>) {
        match assigned {
            AssignedDriver::Resolved { name, email, .. } => (name.clone(), email.clone()),
            other => panic!("expected resolved driver, got {other:?}"),
        }
    }

    #[test]
    fn absent_driver_is_unassigned() {
        let assigned = normalize_driver("r1", None, &directory());
        assert_eq!(assigned, AssignedDriver::Unassigned);
        assert_eq!(assigned.display_name(), "Not Assigned");
    }

    #[test]
    fn all_wire_shapes_resolve_to_the_same_identity() {
        let dir = directory();

        let bare_id: DriverRef = serde_json::from_value(json!("drv-1")).unwrap();
        let with_id: DriverRef = serde_json::from_value(json!({
            "_id": "drv-1",
            "name": "Karim Uddin",
            "email": "karim@example.com"
        }))
        .unwrap();
        let user_ref: DriverRef = serde_json::from_value(json!({
            "user": {
                "_id": "usr-1",
                "name": "Karim Uddin",
                "email": "karim@example.com"
            }
        }))
        .unwrap();

        let expected = ("Karim Uddin".to_string(), Some("karim@example.com".to_string()));
        for shape in [&bare_id, &with_id, &user_ref] {
            let assigned = normalize_driver("r1", Some(shape), &dir);
            assert_eq!(resolved(&assigned), expected);
        }
    }

    #[test]
    fn bare_user_id_resolves_through_the_directory() {
        let by_user_id: DriverRef = serde_json::from_value(json!("usr-1")).unwrap();
        let assigned = normalize_driver("r1", Some(&by_user_id), &directory());
        assert_eq!(resolved(&assigned).0, "Karim Uddin");
    }

    #[test]
    fn unresolvable_reference_degrades_instead_of_pretending_empty() {
        let unknown: DriverRef = serde_json::from_value(json!("drv-ghost")).unwrap();
        let assigned = normalize_driver("r1", Some(&unknown), &DriverDirectory::default());

        assert_eq!(
            assigned,
            AssignedDriver::Degraded {
                id: Some("drv-ghost".to_string())
            }
        );
        assert_ne!(assigned.display_name(), "Not Assigned");
    }

    #[test]
    fn doc_without_identity_degrades() {
        let empty_doc: DriverRef = serde_json::from_value(json!({})).unwrap();
        let assigned = normalize_driver("r1", Some(&empty_doc), &DriverDirectory::default());
        assert_eq!(assigned, AssignedDriver::Degraded { id: None });
    }

    #[test]
    fn driver_user_ref_decodes_both_shapes() {
        let bare: UserRef = serde_json::from_value(json!("usr-9")).unwrap();
        assert_eq!(bare.id(), "usr-9");

        let populated: UserRef = serde_json::from_value(json!({
            "_id": "usr-1",
            "name": "Karim Uddin",
            "email": "karim@example.com",
            "role": "DRIVER"
        }))
        .unwrap();
        assert_eq!(populated.id(), "usr-1");
        match populated {
            UserRef::Populated(user) => assert_eq!(user.role, Role::Driver),
            UserRef::Id(_) => panic!("expected populated user"),
        }
    }
}
