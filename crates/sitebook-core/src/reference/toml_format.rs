//! TOML format types for reference-table files.
//!
//! Phase names are kept as strings here and checked by the parser so that a
//! misspelled phase produces a targeted error instead of a generic TOML one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level structure of a reference-table file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReferenceToml {
    /// Phase name -> qualifying days. Missing phases use the built-in default.
    #[serde(default)]
    pub durations: BTreeMap<String, u32>,
    #[serde(default)]
    pub communities: Vec<CommunityToml>,
}

/// A single `[[communities]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommunityToml {
    pub name: String,
    /// Crew used for any phase without an explicit override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_subcontractor: Option<String>,
    /// Phase name -> crew.
    #[serde(default)]
    pub subcontractors: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_minimal_community() {
        let toml_str = r#"
[[communities]]
name = "Galloway"
"#;
        let table: ReferenceToml = toml::from_str(toml_str).expect("should parse");
        assert!(table.durations.is_empty());
        assert_eq!(table.communities.len(), 1);
        assert_eq!(table.communities[0].default_subcontractor, None);
        assert!(table.communities[0].subcontractors.is_empty());
    }

    #[test]
    fn deserialize_overrides() {
        let toml_str = r#"
[durations]
Tape = 3

[[communities]]
name = "Claremont"
default_subcontractor = "Juan Trejo"

[communities.subcontractors]
Hang = "Ricardo"
"#;
        let table: ReferenceToml = toml::from_str(toml_str).expect("should parse");
        assert_eq!(table.durations.get("Tape"), Some(&3));
        let claremont = &table.communities[0];
        assert_eq!(claremont.default_subcontractor.as_deref(), Some("Juan Trejo"));
        assert_eq!(
            claremont.subcontractors.get("Hang").map(String::as_str),
            Some("Ricardo")
        );
    }

    #[test]
    fn embedded_table_parses() {
        let table: ReferenceToml =
            toml::from_str(include_str!("communities.toml")).expect("embedded table should parse");
        assert_eq!(table.communities.len(), 8);
        assert_eq!(table.durations.len(), 6);
    }
}
