//! Local rule-based classifier.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use sitebook_store::models::NoteCategory;

use super::trait_def::NoteClassifier;
use super::types::{Classification, SiteNote};

/// The embedded default rule set.
static BUILTIN_RULES_TOML: &str = include_str!("keywords.toml");

/// One ordered rule: any keyword present selects `category`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeywordRule {
    pub category: NoteCategory,
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    rules: Vec<KeywordRule>,
}

#[derive(Debug, Error)]
pub enum KeywordRulesError {
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("rule for {0} has no keywords")]
    EmptyRule(NoteCategory),

    #[error("blank keyword in rule for {0}")]
    BlankKeyword(NoteCategory),
}

/// Matches note text against ordered keyword rules.
///
/// A keyword hits when it occurs (case-insensitively) at the start of a word,
/// so "crack" matches "cracks" but "epo" does not match "depot". The first
/// rule with a hit wins; a note with no hits is [`NoteCategory::General`].
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    rules: Vec<KeywordRule>,
}

impl KeywordClassifier {
    pub const NAME: &str = "keywords";

    /// Build from explicit rules. Keywords are lowercased here once.
    pub fn new(rules: Vec<KeywordRule>) -> Result<Self, KeywordRulesError> {
        let mut normalized = Vec::with_capacity(rules.len());
        for rule in rules {
            if rule.keywords.is_empty() {
                return Err(KeywordRulesError::EmptyRule(rule.category));
            }
            let mut keywords = Vec::with_capacity(rule.keywords.len());
            for keyword in &rule.keywords {
                let keyword = keyword.trim().to_lowercase();
                if keyword.is_empty() {
                    return Err(KeywordRulesError::BlankKeyword(rule.category));
                }
                keywords.push(keyword);
            }
            normalized.push(KeywordRule {
                category: rule.category,
                keywords,
            });
        }
        Ok(Self { rules: normalized })
    }

    /// Parse a `[[rules]]` TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, KeywordRulesError> {
        let file: RuleFile = toml::from_str(content)?;
        Self::new(file.rules)
    }

    /// The rule set compiled into the binary.
    ///
    /// # Panics
    ///
    /// Panics if the embedded `keywords.toml` is invalid; the unit tests parse
    /// it on every build.
    pub fn builtin() -> Self {
        Self::from_toml_str(BUILTIN_RULES_TOML).expect("embedded keywords.toml is invalid")
    }

    /// Load a rule file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read keyword rules at {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid keyword rules at {}", path.display()))
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    /// Synchronous core of [`NoteClassifier::classify`].
    pub fn categorize(&self, text: &str) -> NoteCategory {
        let haystack = text.to_lowercase();
        for rule in &self.rules {
            if let Some(hit) = rule.keywords.iter().find(|k| starts_word(&haystack, k)) {
                debug!(category = %rule.category, keyword = %hit, "keyword rule matched");
                return rule.category;
            }
        }
        NoteCategory::General
    }
}

/// Whether `needle` occurs in `haystack` with no letter or digit before it.
fn starts_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(at, _)| {
        haystack[..at]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric())
    })
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::builtin()
    }
}

#[async_trait]
impl NoteClassifier for KeywordClassifier {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn classify(&self, note: &SiteNote) -> Result<Classification> {
        let category = self.categorize(&note.text);
        Ok(Classification::with_default_action(category, Self::NAME))
    }
}
