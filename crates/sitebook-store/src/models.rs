use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Tracker status of an EPO, derived from its `replied` and `follow_up` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpoStatus {
    Pending,
    FollowUpSent,
    Replied,
}

impl fmt::Display for EpoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::FollowUpSent => "follow_up_sent",
            Self::Replied => "replied",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------

/// Action category assigned to a site note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteCategory {
    OrderMaterial,
    ExtraWork,
    Reschedule,
    Repair,
    Inspection,
    General,
}

impl NoteCategory {
    /// Every category, in the order they are presented to classifiers.
    pub const ALL: [NoteCategory; 6] = [
        Self::OrderMaterial,
        Self::ExtraWork,
        Self::Reschedule,
        Self::Repair,
        Self::Inspection,
        Self::General,
    ];

    /// The follow-up action a crew lead takes for this category.
    pub fn default_action(&self) -> &'static str {
        match self {
            Self::OrderMaterial => "Order materials",
            Self::ExtraWork => "Send EPO",
            Self::Reschedule => "Update schedule",
            Self::Repair => "Schedule repair",
            Self::Inspection => "Schedule inspection",
            Self::General => "No action",
        }
    }
}

impl fmt::Display for NoteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::OrderMaterial => "order_material",
            Self::ExtraWork => "extra_work",
            Self::Reschedule => "reschedule",
            Self::Repair => "repair",
            Self::Inspection => "inspection",
            Self::General => "general",
        };
        f.write_str(s)
    }
}

impl FromStr for NoteCategory {
    type Err = NoteCategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order_material" => Ok(Self::OrderMaterial),
            "extra_work" => Ok(Self::ExtraWork),
            "reschedule" => Ok(Self::Reschedule),
            "repair" => Ok(Self::Repair),
            "inspection" => Ok(Self::Inspection),
            "general" => Ok(Self::General),
            other => Err(NoteCategoryParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`NoteCategory`] string.
#[derive(Debug, Clone)]
pub struct NoteCategoryParseError(pub String);

impl fmt::Display for NoteCategoryParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid note category: {:?}", self.0)
    }
}

impl std::error::Error for NoteCategoryParseError {}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One extra-work approval request in the EPO log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpoRecord {
    pub lot: String,
    pub community: String,
    /// Builder e-mail address the EPO was sent to.
    pub recipient: String,
    /// Amount as entered by the user (free text, e.g. `"$450"`).
    pub amount: String,
    /// File names of photos attached to the request.
    #[serde(default)]
    pub attachments: Vec<String>,
    pub sent_at: DateTime<Utc>,
    #[serde(default)]
    pub replied: bool,
    #[serde(default)]
    pub follow_up: bool,
}

impl EpoRecord {
    /// Derived tracker status. A reply always wins over a follow-up.
    pub fn status(&self) -> EpoStatus {
        if self.replied {
            EpoStatus::Replied
        } else if self.follow_up {
            EpoStatus::FollowUpSent
        } else {
            EpoStatus::Pending
        }
    }
}

/// A classified site note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub lot: String,
    pub community: String,
    pub text: String,
    pub category: NoteCategory,
    pub action: String,
    /// Name of the classifier that produced `category`.
    pub classifier: String,
    pub recorded_at: DateTime<Utc>,
}

/// The persisted JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteState {
    #[serde(default)]
    pub epo_log: Vec<EpoRecord>,
    #[serde(default)]
    pub notes: Vec<NoteRecord>,
}
