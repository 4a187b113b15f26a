//! Community reference data: which subcontractor runs each phase, and how
//! many qualifying days each phase takes.
//!
//! A built-in table is embedded in the binary from `communities.toml`. A
//! replacement file with the same format can be loaded at runtime.

pub mod parser;
pub mod toml_format;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::schedule::Phase;

pub use parser::{ReferenceParseError, parse_reference_toml};
pub use toml_format::{CommunityToml, ReferenceToml};

/// Placeholder crew name used when a community or phase has no assignment.
pub const UNASSIGNED: &str = "—";

/// The embedded reference table.
static BUILTIN_TOML: &str = include_str!("communities.toml");

/// A community and its crew assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Community {
    pub name: String,
    pub default_subcontractor: Option<String>,
    pub subcontractors: BTreeMap<Phase, String>,
}

impl Community {
    /// Crew for `phase`: explicit override, then the community default.
    pub fn subcontractor(&self, phase: Phase) -> Option<&str> {
        self.subcontractors
            .get(&phase)
            .or(self.default_subcontractor.as_ref())
            .map(String::as_str)
    }
}

/// Validated, immutable reference data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceData {
    pub(crate) communities: Vec<Community>,
    pub(crate) durations: BTreeMap<Phase, u32>,
}

impl ReferenceData {
    /// The reference table compiled into the binary.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is invalid. The unit tests parse it, so a
    /// passing build guarantees it is well-formed.
    pub fn builtin() -> Self {
        parse_reference_toml(BUILTIN_TOML).expect("embedded communities.toml is invalid")
    }

    /// Load and validate a reference table from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read reference table at {}", path.display()))?;
        let data = parse_reference_toml(&contents)
            .with_context(|| format!("invalid reference table at {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            communities = data.communities.len(),
            "reference table loaded"
        );
        Ok(data)
    }

    pub fn communities(&self) -> &[Community] {
        &self.communities
    }

    /// Community names in table order.
    pub fn community_names(&self) -> Vec<&str> {
        self.communities.iter().map(|c| c.name.as_str()).collect()
    }

    /// Exact-match lookup by name.
    pub fn community(&self, name: &str) -> Option<&Community> {
        self.communities.iter().find(|c| c.name == name)
    }

    /// Crew for (community, phase), or [`UNASSIGNED`] when either key is
    /// missing.
    pub fn subcontractor(&self, community: &str, phase: Phase) -> &str {
        self.community(community)
            .and_then(|c| c.subcontractor(phase))
            .unwrap_or(UNASSIGNED)
    }

    /// Qualifying days for `phase`. Always at least one.
    pub fn duration(&self, phase: Phase) -> u32 {
        self.durations
            .get(&phase)
            .copied()
            .unwrap_or_else(|| phase.default_duration())
    }
}

impl Default for ReferenceData {
    fn default() -> Self {
        Self::builtin()
    }
}
