#![forbid(unsafe_code)]

//! Controller configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Field used for display text, equality checks, and default search.
pub const DEFAULT_PROPERTY: &str = "name";

/// Settings for the default search and for display.
///
/// With the `serde` feature this deserializes from camelCase keys
/// (`propertiesToSearch`, `descriptorProperty`, `searchResultsLimit`); missing
/// keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct AutocompleteConfig {
    /// Fields the default search scans, in order.
    pub properties_to_search: Vec<String>,
    /// Field used for display text and equality checks.
    pub descriptor_property: String,
    /// Maximum results from the default search. `None` or `Some(0)` is
    /// unlimited.
    pub search_results_limit: Option<usize>,
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            properties_to_search: vec![DEFAULT_PROPERTY.to_string()],
            descriptor_property: DEFAULT_PROPERTY.to_string(),
            search_results_limit: None,
        }
    }
}

impl AutocompleteConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the searched fields (builder).
    #[must_use]
    pub fn with_properties_to_search<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties_to_search = properties.into_iter().map(Into::into).collect();
        self
    }

    /// Set the descriptor field (builder).
    #[must_use]
    pub fn with_descriptor_property(mut self, property: impl Into<String>) -> Self {
        self.descriptor_property = property.into();
        self
    }

    /// Cap the default search's result count (builder).
    #[must_use]
    pub fn with_search_results_limit(mut self, limit: usize) -> Self {
        self.search_results_limit = Some(limit);
        self
    }

    /// The effective limit, with zero meaning unlimited.
    #[must_use]
    pub fn effective_limit(&self) -> Option<usize> {
        self.search_results_limit.filter(|&n| n > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_name() {
        let config = AutocompleteConfig::default();
        assert_eq!(config.properties_to_search, ["name"]);
        assert_eq!(config.descriptor_property, "name");
        assert_eq!(config.effective_limit(), None);
    }

    #[test]
    fn builders() {
        let config = AutocompleteConfig::new()
            .with_properties_to_search(["name", "color"])
            .with_descriptor_property("label")
            .with_search_results_limit(5);
        assert_eq!(config.properties_to_search, ["name", "color"]);
        assert_eq!(config.descriptor_property, "label");
        assert_eq!(config.effective_limit(), Some(5));
        assert_eq!(
            AutocompleteConfig::new()
                .with_search_results_limit(0)
                .effective_limit(),
            None
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_camel_case_with_defaults() {
        let config: AutocompleteConfig =
            serde_json::from_str(r#"{"searchResultsLimit": 2}"#).expect("valid config");
        assert_eq!(config.search_results_limit, Some(2));
        assert_eq!(config.descriptor_property, "name");

        let config: AutocompleteConfig = serde_json::from_str(
            r#"{"propertiesToSearch": ["title"], "descriptorProperty": "title"}"#,
        )
        .expect("valid config");
        assert_eq!(config.properties_to_search, ["title"]);
        assert_eq!(config.search_results_limit, None);
    }
}
