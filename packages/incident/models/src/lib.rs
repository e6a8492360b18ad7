#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident records and the two-level category/type taxonomy.
//!
//! These types mirror the documents exported from the incident store:
//! a snapshot holds `Categories`, `Types` and `Incidents` keyed by opaque
//! string ids. Field names follow the stored JSON so snapshots can be read
//! and republished without a translation layer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Separator used when joining location names into composite keys.
pub const LOCATION_SEPARATOR: &str = " - ";

/// A point on the map in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
}

/// One or many type ids attached to an incident.
///
/// Older documents store a bare string; newer ones store an ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeIds {
    /// A single type id.
    One(String),
    /// An ordered, non-empty list of type ids.
    Many(Vec<String>),
}

impl TypeIds {
    /// Iterates over every type id in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::One(id) => std::slice::from_ref(id),
            Self::Many(ids) => ids,
        };
        slice.iter().map(String::as_str)
    }

    /// Returns `true` for the list form, even when it holds a single id.
    #[must_use]
    pub const fn is_many(&self) -> bool {
        matches!(self, Self::Many(_))
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

/// A single recorded incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Free-text narrative.
    #[serde(default)]
    pub description: String,
    /// Canonical `YYYY-MM-DD` date.
    #[serde(rename = "dateString")]
    pub date_string: String,
    /// Type id(s), each resolving in the `Types` lookup.
    #[serde(rename = "typeID")]
    pub type_id: TypeIds,
    /// Optional map location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinates>,
    /// Country name.
    #[serde(default)]
    pub country: String,
    /// Department (province/state) name.
    #[serde(default)]
    pub department: String,
    /// Municipality name.
    #[serde(default)]
    pub municipality: String,
    /// Soft-delete marker set by the admin screens.
    #[serde(default, skip_serializing_if = "is_false")]
    pub deleted: bool,
}

impl Incident {
    /// Composite `"<country> - <department>"` key.
    #[must_use]
    pub fn department_key(&self) -> String {
        department_key(&self.country, &self.department)
    }

    /// Composite `"<country> - <department> - <municipality>"` key.
    #[must_use]
    pub fn municipality_key(&self) -> String {
        municipality_key(&self.country, &self.department, &self.municipality)
    }
}

/// Top-level incident category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Display name.
    pub name: String,
    /// Marker color (CSS color string).
    #[serde(default)]
    pub color: String,
    /// Soft-delete marker.
    #[serde(default, skip_serializing_if = "is_false")]
    pub deleted: bool,
}

/// Incident type; belongs to exactly one [`Category`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentType {
    /// Display name.
    pub name: String,
    /// Id of the owning category.
    #[serde(rename = "categoryID")]
    pub category_id: String,
    /// Soft-delete marker.
    #[serde(default, skip_serializing_if = "is_false")]
    pub deleted: bool,
}

/// Snapshot of the incident store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncidentDb {
    /// Category id -> category.
    #[serde(rename = "Categories", default)]
    pub categories: BTreeMap<String, Category>,
    /// Type id -> type.
    #[serde(rename = "Types", default)]
    pub types: BTreeMap<String, IncidentType>,
    /// Incident id -> incident.
    #[serde(rename = "Incidents", default)]
    pub incidents: BTreeMap<String, Incident>,
    /// ISO 8601 timestamp of when the snapshot was read from the store.
    #[serde(rename = "readAt", default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<String>,
}

impl IncidentDb {
    /// Returns a copy with every soft-deleted document removed.
    #[must_use]
    pub fn without_deleted(&self) -> Self {
        Self {
            categories: self
                .categories
                .iter()
                .filter(|(_, c)| !c.deleted)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            types: self
                .types
                .iter()
                .filter(|(_, t)| !t.deleted)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            incidents: self
                .incidents
                .iter()
                .filter(|(_, i)| !i.deleted)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            read_at: self.read_at.clone(),
        }
    }

    /// Ids of soft-deleted documents as `(collection, id)` pairs.
    #[must_use]
    pub fn deleted_ids(&self) -> Vec<(&'static str, String)> {
        let categories = self
            .categories
            .iter()
            .filter(|(_, c)| c.deleted)
            .map(|(id, _)| ("Categories", id.clone()));
        let types = self
            .types
            .iter()
            .filter(|(_, t)| t.deleted)
            .map(|(id, _)| ("Types", id.clone()));
        let incidents = self
            .incidents
            .iter()
            .filter(|(_, i)| i.deleted)
            .map(|(id, _)| ("Incidents", id.clone()));

        categories.chain(types).chain(incidents).collect()
    }

    /// Category id owning `type_id`, if the type is known.
    #[must_use]
    pub fn category_of(&self, type_id: &str) -> Option<&str> {
        self.types.get(type_id).map(|t| t.category_id.as_str())
    }
}

/// Builds the `"<country> - <department>"` composite key.
#[must_use]
pub fn department_key(country: &str, department: &str) -> String {
    format!("{country}{LOCATION_SEPARATOR}{department}")
}

/// Builds the `"<country> - <department> - <municipality>"` composite key.
///
/// Empty segments are kept so the key always has three parts.
#[must_use]
pub fn municipality_key(country: &str, department: &str, municipality: &str) -> String {
    format!("{country}{LOCATION_SEPARATOR}{department}{LOCATION_SEPARATOR}{municipality}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_single_and_multiple_type_ids() {
        let single: Incident = serde_json::from_value(json!({
            "description": "x",
            "dateString": "2020-01-01",
            "typeID": "t1",
            "country": "X",
            "department": "D",
            "municipality": "M",
        }))
        .unwrap();
        assert_eq!(single.type_id, TypeIds::One("t1".to_string()));
        assert!(single.location.is_none());

        let many: Incident = serde_json::from_value(json!({
            "description": "x",
            "dateString": "2020-01-01",
            "typeID": ["t1", "t2"],
            "location": {"lat": 1.0, "lng": 2.0},
        }))
        .unwrap();
        assert_eq!(many.type_id.iter().collect::<Vec<_>>(), vec!["t1", "t2"]);
        assert!(many.type_id.is_many());
        assert_eq!(many.location, Some(Coordinates { lat: 1.0, lng: 2.0 }));
    }

    #[test]
    fn ignores_unknown_document_fields() {
        let cat: Category = serde_json::from_value(json!({
            "name": "Violence",
            "color": "#f00",
            "updatedAt": {"seconds": 1},
        }))
        .unwrap();
        assert_eq!(cat.name, "Violence");
        assert!(!cat.deleted);
    }

    #[test]
    fn composite_keys_keep_empty_segments() {
        assert_eq!(department_key("X", ""), "X - ");
        assert_eq!(municipality_key("X", "", ""), "X -  - ");
        assert_eq!(municipality_key("X", "D", "M"), "X - D - M");
    }

    #[test]
    fn without_deleted_drops_soft_deleted_documents() {
        let db: IncidentDb = serde_json::from_value(json!({
            "Categories": {
                "c1": {"name": "A", "color": "red"},
                "c2": {"name": "B", "color": "blue", "deleted": true},
            },
            "Types": {
                "t1": {"name": "T", "categoryID": "c1"},
            },
            "Incidents": {
                "i1": {"dateString": "2020-01-01", "typeID": "t1"},
                "i2": {"dateString": "2020-01-02", "typeID": "t1", "deleted": true},
            },
        }))
        .unwrap();

        let clean = db.without_deleted();
        assert_eq!(clean.categories.len(), 1);
        assert_eq!(clean.incidents.len(), 1);
        assert!(clean.incidents.contains_key("i1"));
        assert_eq!(
            db.deleted_ids(),
            vec![
                ("Categories", "c2".to_string()),
                ("Incidents", "i2".to_string())
            ]
        );
    }

    #[test]
    fn category_lookup_through_type() {
        let mut db = IncidentDb::default();
        db.types.insert(
            "t1".to_string(),
            IncidentType {
                name: "T".to_string(),
                category_id: "c1".to_string(),
                deleted: false,
            },
        );
        assert_eq!(db.category_of("t1"), Some("c1"));
        assert_eq!(db.category_of("missing"), None);
    }
}
