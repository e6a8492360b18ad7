//! Compile-time registry of named filter views.
//!
//! Each view (the statistics dashboard, the publish screen) keeps its own
//! filter tree in its own slot. The list is embedded from `views.toml`;
//! adding a view means adding an entry there.

use serde::Deserialize;

use crate::StorageError;

/// Number of registered views. Enforced by a test.
#[cfg(test)]
const EXPECTED_VIEW_COUNT: usize = 2;

/// Embedded view definitions.
const VIEWS_TOML: &str = include_str!("../views.toml");

/// A named view and the slot key its filter tree is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ViewDefinition {
    /// Short name used on the command line (e.g. `stats`).
    pub name: String,
    /// Storage slot key (e.g. `filterState`).
    pub key: String,
    /// Human-readable description.
    pub description: String,
}

#[derive(Deserialize)]
struct ViewsFile {
    views: Vec<ViewDefinition>,
}

/// Returns all registered views.
///
/// # Panics
///
/// Panics if the embedded TOML fails to parse. Since it is a compile-time
/// constant, a parse failure is a development error caught by the tests.
#[must_use]
pub fn all_views() -> Vec<ViewDefinition> {
    toml::de::from_str::<ViewsFile>(VIEWS_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse views.toml: {e}"))
        .views
}

/// Looks up a view by name.
///
/// # Errors
///
/// Returns [`StorageError::UnknownView`] if no view has this name.
pub fn view(name: &str) -> Result<ViewDefinition, StorageError> {
    let views = all_views();
    let known = views
        .iter()
        .map(|v| v.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    views
        .iter()
        .find(|v| v.name == name)
        .cloned()
        .ok_or_else(|| StorageError::UnknownView {
            name: name.to_string(),
            known,
        })
}
