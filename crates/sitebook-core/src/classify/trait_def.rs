//! The `NoteClassifier` trait -- the strategy interface for note triage.
//!
//! The keyword and remote classifiers both implement it. The trait is
//! object-safe so the active classifier can be held as
//! `Arc<dyn NoteClassifier>` and swapped by configuration.

use anyhow::Result;
use async_trait::async_trait;

use super::types::{Classification, SiteNote};

/// Turns a site note into a [`Classification`].
#[async_trait]
pub trait NoteClassifier: Send + Sync {
    /// Name used in configuration and stored alongside each note
    /// (e.g. "keywords", "remote").
    fn name(&self) -> &str;

    /// Classify one note.
    async fn classify(&self, note: &SiteNote) -> Result<Classification>;
}

// Compile-time assertion: NoteClassifier must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn NoteClassifier) {}
};

#[cfg(test)]
mod tests {
    use super::*;
    use sitebook_store::models::NoteCategory;

    /// Always answers `general`.
    struct FixedClassifier;

    #[async_trait]
    impl NoteClassifier for FixedClassifier {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn classify(&self, _note: &SiteNote) -> Result<Classification> {
            Ok(Classification::with_default_action(
                NoteCategory::General,
                self.name(),
            ))
        }
    }

    #[tokio::test]
    async fn classifier_is_usable_as_trait_object() {
        let classifier: Box<dyn NoteClassifier> = Box::new(FixedClassifier);
        let note = SiteNote::new("12", "Galloway", "all good");

        let result = classifier.classify(&note).await.unwrap();
        assert_eq!(result.category, NoteCategory::General);
        assert_eq!(result.action, "No action");
        assert_eq!(result.classifier, "fixed");
    }
}
