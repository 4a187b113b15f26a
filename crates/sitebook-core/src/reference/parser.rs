//! Reference-table parser with validation.
//!
//! Parses a reference TOML string into [`ReferenceData`] and validates:
//! - At least one community is defined.
//! - Community names are non-empty and unique, ignoring case.
//! - Every phase key (in `durations` and `subcontractors`) names a real phase,
//!   at most once per table. Phase keys are case-insensitive, so `Skim` and
//!   `skim` in the same table collide.
//! - Every duration is at least one day.

use std::collections::{BTreeMap, HashSet};

use thiserror::Error;

use super::toml_format::ReferenceToml;
use super::{Community, ReferenceData};
use crate::schedule::Phase;

/// Errors that can occur during reference-table parsing and validation.
#[derive(Debug, Error)]
pub enum ReferenceParseError {
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("reference table must contain at least one community")]
    NoCommunities,

    #[error("community name must not be empty")]
    EmptyCommunityName,

    #[error("duplicate community name: {0:?}")]
    DuplicateCommunity(String),

    #[error("unknown phase {phase:?} in {context}")]
    UnknownPhase { context: String, phase: String },

    #[error("phase {phase} given more than once in {context}")]
    DuplicatePhase { context: String, phase: Phase },

    #[error("duration for {0} must be at least one day")]
    ZeroDuration(Phase),
}

/// Parse and validate a reference-table TOML string.
pub fn parse_reference_toml(content: &str) -> Result<ReferenceData, ReferenceParseError> {
    let table: ReferenceToml = toml::from_str(content)?;
    build(table)
}

/// Validate the deserialized table and convert it into lookup form.
fn build(table: ReferenceToml) -> Result<ReferenceData, ReferenceParseError> {
    if table.communities.is_empty() {
        return Err(ReferenceParseError::NoCommunities);
    }

    let mut durations: BTreeMap<Phase, u32> =
        Phase::ALL.iter().map(|p| (*p, p.default_duration())).collect();
    let mut overridden = HashSet::new();
    for (key, days) in &table.durations {
        let phase = parse_phase(key, "durations")?;
        if !overridden.insert(phase) {
            return Err(duplicate_phase(phase, "durations"));
        }
        if *days == 0 {
            return Err(ReferenceParseError::ZeroDuration(phase));
        }
        durations.insert(phase, *days);
    }

    let mut seen = HashSet::new();
    let mut communities = Vec::with_capacity(table.communities.len());
    for entry in table.communities {
        let name = entry.name.trim().to_owned();
        if name.is_empty() {
            return Err(ReferenceParseError::EmptyCommunityName);
        }
        if !seen.insert(name.to_lowercase()) {
            return Err(ReferenceParseError::DuplicateCommunity(name));
        }

        let context = format!("community {name:?}");
        let mut subcontractors = BTreeMap::new();
        for (key, crew) in entry.subcontractors {
            let phase = parse_phase(&key, &context)?;
            if subcontractors.insert(phase, crew).is_some() {
                return Err(duplicate_phase(phase, &context));
            }
        }

        communities.push(Community {
            name,
            default_subcontractor: entry.default_subcontractor,
            subcontractors,
        });
    }

    Ok(ReferenceData {
        communities,
        durations,
    })
}

fn duplicate_phase(phase: Phase, context: &str) -> ReferenceParseError {
    ReferenceParseError::DuplicatePhase {
        context: context.to_owned(),
        phase,
    }
}

fn parse_phase(key: &str, context: &str) -> Result<Phase, ReferenceParseError> {
    key.parse().map_err(|_| ReferenceParseError::UnknownPhase {
        context: context.to_owned(),
        phase: key.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_table() {
        let data = parse_reference_toml(
            r#"
[[communities]]
name = "Galloway"
default_subcontractor = "America Drywall"
"#,
        )
        .expect("should parse");
        assert_eq!(data.community_names(), vec!["Galloway"]);
        assert_eq!(data.duration(Phase::Tape), 2);
    }

    #[test]
    fn durations_override_defaults() {
        let data = parse_reference_toml(
            r#"
[durations]
skim = 3

[[communities]]
name = "Galloway"
"#,
        )
        .expect("should parse");
        assert_eq!(data.duration(Phase::Skim), 3);
        assert_eq!(data.duration(Phase::Hang), 1);
    }

    #[test]
    fn rejects_empty_table() {
        let err = parse_reference_toml("").unwrap_err();
        assert!(matches!(err, ReferenceParseError::NoCommunities));
    }

    #[test]
    fn rejects_duplicate_community() {
        let err = parse_reference_toml(
            r#"
[[communities]]
name = "Camden"

[[communities]]
name = " Camden "
"#,
        )
        .unwrap_err();
        assert!(
            matches!(err, ReferenceParseError::DuplicateCommunity(ref n) if n == "Camden"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn rejects_community_differing_only_in_case() {
        let err = parse_reference_toml(
            r#"
[[communities]]
name = "Camden"

[[communities]]
name = "camden"
"#,
        )
        .unwrap_err();
        assert!(
            matches!(err, ReferenceParseError::DuplicateCommunity(ref n) if n == "camden"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn rejects_duration_given_twice_in_different_case() {
        let err = parse_reference_toml(
            r#"
[durations]
Skim = 2
skim = 5

[[communities]]
name = "Camden"
"#,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "phase Skim given more than once in durations"
        );
    }

    #[test]
    fn rejects_crew_given_twice_for_one_phase() {
        let err = parse_reference_toml(
            r#"
[[communities]]
name = "Camden"

[communities.subcontractors]
Hang = "Ricardo"
HANG = "Someone Else"
"#,
        )
        .unwrap_err();
        assert!(
            matches!(
                err,
                ReferenceParseError::DuplicatePhase { phase: Phase::Hang, ref context }
                    if context == "community \"Camden\""
            ),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn rejects_blank_community_name() {
        let err = parse_reference_toml(
            r#"
[[communities]]
name = "  "
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ReferenceParseError::EmptyCommunityName));
    }

    #[test]
    fn rejects_unknown_phase_in_subcontractors() {
        let err = parse_reference_toml(
            r#"
[[communities]]
name = "Camden"

[communities.subcontractors]
Prime = "Someone"
"#,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown phase \"Prime\" in community \"Camden\""
        );
    }

    #[test]
    fn rejects_zero_duration() {
        let err = parse_reference_toml(
            r#"
[durations]
Bed = 0

[[communities]]
name = "Camden"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ReferenceParseError::ZeroDuration(Phase::Bed)));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = parse_reference_toml("[[communities]\nname = 1").unwrap_err();
        assert!(matches!(err, ReferenceParseError::TomlError(_)));
    }
}
