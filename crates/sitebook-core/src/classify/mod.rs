//! Site-note triage.
//!
//! This module defines the [`NoteClassifier`] trait, its two implementations
//! ([`KeywordClassifier`] and [`RemoteClassifier`]), the
//! [`ClassifierRegistry`] used to pick one by name, and [`record_note`], which
//! classifies a note and appends it to the store.
//!
//! # Architecture
//!
//! ```text
//! ClassifierSettings --build_registry--> ClassifierRegistry
//!                                            |
//!                                  select("keywords" | "remote")
//!                                            v
//! SiteNote ----------------------> Arc<dyn NoteClassifier>
//!                                            |
//!                                     classify(note)
//!                                            v
//!                              Classification --record_note--> StateStore
//! ```

pub mod keywords;
pub mod registry;
pub mod remote;
pub mod trait_def;
pub mod types;

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use tracing::info;

use sitebook_store::StateStore;
use sitebook_store::models::NoteRecord;
use sitebook_store::queries::notes::{self as note_db, NewNote};

pub use keywords::{KeywordClassifier, KeywordRule, KeywordRulesError};
pub use registry::ClassifierRegistry;
pub use remote::{RemoteClassifier, RemoteConfig};
pub use trait_def::NoteClassifier;
pub use types::{Classification, SiteNote};

/// Everything needed to construct the available classifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierSettings {
    /// Name of the classifier to use (`keywords` or `remote`).
    pub backend: String,
    /// Replacement keyword rules; the embedded rules when `None`.
    pub rules_path: Option<PathBuf>,
    pub remote: RemoteConfig,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            backend: KeywordClassifier::NAME.to_string(),
            rules_path: None,
            remote: RemoteConfig::default(),
        }
    }
}

/// Register every classifier described by `settings`.
///
/// Building the remote classifier does not contact the server.
pub fn build_registry(settings: &ClassifierSettings) -> Result<ClassifierRegistry> {
    let keywords = match &settings.rules_path {
        Some(path) => KeywordClassifier::load(path)?,
        None => KeywordClassifier::builtin(),
    };

    let mut registry = ClassifierRegistry::new();
    registry.register(keywords);
    registry.register(RemoteClassifier::new(settings.remote.clone())?);
    Ok(registry)
}

/// Classify `note` and append the result to the note log.
pub async fn record_note(
    store: &mut StateStore,
    classifier: &dyn NoteClassifier,
    note: &SiteNote,
) -> Result<(usize, NoteRecord)> {
    let classification = classifier.classify(note).await?;
    store_classified(store, note, &classification)
}

/// Append an already classified note.
///
/// Split from [`record_note`] so callers holding the store behind a lock can
/// classify first and lock only for the write.
pub fn store_classified(
    store: &mut StateStore,
    note: &SiteNote,
    classification: &Classification,
) -> Result<(usize, NoteRecord)> {
    let new = NewNote {
        lot: &note.lot,
        community: &note.community,
        text: &note.text,
        category: classification.category,
        action: &classification.action,
        classifier: &classification.classifier,
    };
    let (index, record) = note_db::insert_note(store, &new, Utc::now())?;
    info!(
        index,
        lot = %record.lot,
        category = %record.category,
        classifier = %record.classifier,
        "note recorded"
    );
    Ok((index, record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitebook_store::models::NoteCategory;
    use sitebook_test_utils::open_temp_store;

    #[test]
    fn default_registry_has_both_backends() {
        let registry = build_registry(&ClassifierSettings::default()).unwrap();
        let mut names = registry.list();
        names.sort();
        assert_eq!(names, vec!["keywords", "remote"]);
    }

    #[test]
    fn registry_uses_rules_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("rules.toml");
        std::fs::write(
            &path,
            "[[rules]]\ncategory = \"inspection\"\nkeywords = [\"frame walk\"]\n",
        )
        .unwrap();

        let settings = ClassifierSettings {
            rules_path: Some(path),
            ..ClassifierSettings::default()
        };
        let registry = build_registry(&settings).unwrap();
        assert!(registry.get("keywords").is_some());
    }

    #[test]
    fn registry_reports_bad_rules_file() {
        let settings = ClassifierSettings {
            rules_path: Some(PathBuf::from("/nonexistent/rules.toml")),
            ..ClassifierSettings::default()
        };
        assert!(build_registry(&settings).is_err());
    }

    #[tokio::test]
    async fn record_note_classifies_and_persists() {
        let (_dir, mut store) = open_temp_store();
        let classifier = KeywordClassifier::builtin();
        let note = SiteNote::new("31", "Camden", "Out of mud on lot 31");

        let (index, record) = record_note(&mut store, &classifier, &note).await.unwrap();
        assert_eq!(index, 0);
        assert_eq!(record.category, NoteCategory::OrderMaterial);
        assert_eq!(record.action, "Order materials");
        assert_eq!(record.classifier, "keywords");

        let reloaded =
            StateStore::open(&sitebook_store::config::StoreConfig::new(store.path())).unwrap();
        assert_eq!(note_db::list_notes(&reloaded), vec![record]);
    }
}
