//! Classifier registry -- the named set of available note classifiers.
//!
//! Configuration names the active backend (e.g. `classifier.backend =
//! "remote"`); callers resolve it here and hold only `Arc<dyn NoteClassifier>`.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Result, anyhow};

use super::trait_def::NoteClassifier;

/// A collection of registered [`NoteClassifier`] implementations, keyed by
/// name.
#[derive(Default)]
pub struct ClassifierRegistry {
    classifiers: HashMap<String, Arc<dyn NoteClassifier>>,
}

impl ClassifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a classifier under [`NoteClassifier::name`], returning any
    /// classifier it replaced.
    pub fn register(
        &mut self,
        classifier: impl NoteClassifier + 'static,
    ) -> Option<Arc<dyn NoteClassifier>> {
        let name = classifier.name().to_string();
        self.classifiers.insert(name, Arc::new(classifier))
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn NoteClassifier>> {
        self.classifiers.get(name).cloned()
    }

    /// Look up `name`, listing the registered names in the error.
    pub fn select(&self, name: &str) -> Result<Arc<dyn NoteClassifier>> {
        self.get(name).ok_or_else(|| {
            let mut known = self.list();
            known.sort_unstable();
            anyhow!(
                "unknown classifier {name:?} (available: {})",
                known.join(", ")
            )
        })
    }

    /// Registered names. Order is not guaranteed.
    pub fn list(&self) -> Vec<&str> {
        self.classifiers.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.classifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classifiers.is_empty()
    }
}

impl std::fmt::Debug for ClassifierRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierRegistry")
            .field("classifiers", &self.classifiers.keys().collect::<Vec<_>>())
            .finish()
    }
}
