//! Input and output types shared by every classifier.

use serde::{Deserialize, Serialize};

use sitebook_store::models::NoteCategory;

/// A free-text note taken on site for a lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteNote {
    pub lot: String,
    pub community: String,
    pub text: String,
}

impl SiteNote {
    pub fn new(
        lot: impl Into<String>,
        community: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            lot: lot.into(),
            community: community.into(),
            text: text.into(),
        }
    }
}

/// The category and follow-up action assigned to a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: NoteCategory,
    pub action: String,
    /// Name of the classifier that produced this result.
    pub classifier: String,
}

impl Classification {
    /// A classification using the category's default action phrase.
    pub fn with_default_action(category: NoteCategory, classifier: impl Into<String>) -> Self {
        Self {
            category,
            action: category.default_action().to_owned(),
            classifier: classifier.into(),
        }
    }
}
