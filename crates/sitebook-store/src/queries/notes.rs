//! Append and list operations on the site-note log.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::file::StateStore;
use crate::models::{NoteCategory, NoteRecord};

/// A classified note ready to be stored.
#[derive(Debug, Clone)]
pub struct NewNote<'a> {
    pub lot: &'a str,
    pub community: &'a str,
    pub text: &'a str,
    pub category: NoteCategory,
    pub action: &'a str,
    pub classifier: &'a str,
}

/// Append a note. Returns its index and the stored record.
pub fn insert_note(
    store: &mut StateStore,
    new: &NewNote<'_>,
    recorded_at: DateTime<Utc>,
) -> Result<(usize, NoteRecord)> {
    let record = NoteRecord {
        lot: new.lot.to_owned(),
        community: new.community.to_owned(),
        text: new.text.to_owned(),
        category: new.category,
        action: new.action.to_owned(),
        classifier: new.classifier.to_owned(),
        recorded_at,
    };

    store.mutate(|state| {
        state.notes.push(record.clone());
        Ok((state.notes.len() - 1, record))
    })
}

/// All notes in the order they were recorded.
pub fn list_notes(store: &StateStore) -> Vec<NoteRecord> {
    store.state().notes.clone()
}

/// Notes filed against one lot, in recording order.
pub fn list_notes_for_lot(store: &StateStore, lot: &str) -> Vec<NoteRecord> {
    store
        .state()
        .notes
        .iter()
        .filter(|n| n.lot == lot)
        .cloned()
        .collect()
}
