//! Append and update-by-index operations on the EPO log.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::file::{StateStore, StoreError};
use crate::models::EpoRecord;

/// Fields supplied by the caller when recording a new EPO.
#[derive(Debug, Clone)]
pub struct NewEpo<'a> {
    pub lot: &'a str,
    pub community: &'a str,
    pub recipient: &'a str,
    pub amount: &'a str,
    pub attachments: &'a [String],
}

/// Append a new EPO with both status flags cleared. Returns its index and the
/// stored record.
pub fn insert_epo(
    store: &mut StateStore,
    new: &NewEpo<'_>,
    sent_at: DateTime<Utc>,
) -> Result<(usize, EpoRecord)> {
    let record = EpoRecord {
        lot: new.lot.to_owned(),
        community: new.community.to_owned(),
        recipient: new.recipient.to_owned(),
        amount: new.amount.to_owned(),
        attachments: new.attachments.to_vec(),
        sent_at,
        replied: false,
        follow_up: false,
    };

    store.mutate(|state| {
        state.epo_log.push(record.clone());
        Ok((state.epo_log.len() - 1, record))
    })
}

/// Fetch the EPO at `index`.
pub fn get_epo(store: &StateStore, index: usize) -> Result<EpoRecord> {
    let log = &store.state().epo_log;
    log.get(index).cloned().ok_or_else(|| {
        StoreError::IndexOutOfRange {
            kind: "EPO",
            index,
            len: log.len(),
        }
        .into()
    })
}

/// All EPOs in the order they were recorded.
pub fn list_epos(store: &StateStore) -> Vec<EpoRecord> {
    store.state().epo_log.clone()
}

/// Set the `replied` flag on the EPO at `index`.
pub fn set_epo_replied(store: &mut StateStore, index: usize) -> Result<EpoRecord> {
    update_epo(store, index, |epo| epo.replied = true)
}

/// Set the `follow_up` flag on the EPO at `index`.
pub fn set_epo_follow_up(store: &mut StateStore, index: usize) -> Result<EpoRecord> {
    update_epo(store, index, |epo| epo.follow_up = true)
}

fn update_epo(
    store: &mut StateStore,
    index: usize,
    apply: impl FnOnce(&mut EpoRecord),
) -> Result<EpoRecord> {
    store.mutate(|state| {
        let len = state.epo_log.len();
        let epo = state
            .epo_log
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange {
                kind: "EPO",
                index,
                len,
            })?;
        apply(epo);
        Ok(epo.clone())
    })
}
