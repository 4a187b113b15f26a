//! EPO tracker: recording extra-work approval requests and moving them
//! through their reply/follow-up states.

use anyhow::Result;
use chrono::Utc;
use thiserror::Error;
use tracing::info;

use sitebook_store::StateStore;
use sitebook_store::models::{EpoRecord, EpoStatus};
use sitebook_store::queries::epos::{self as epo_db, NewEpo};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EpoError {
    #[error("EPO {index} cannot move from {from} to {to}")]
    InvalidTransition {
        index: usize,
        from: EpoStatus,
        to: EpoStatus,
    },
}

/// The EPO status machine.
///
/// ```text
/// pending        -> replied
/// pending        -> follow_up_sent
/// follow_up_sent -> replied
/// ```
pub struct EpoStateMachine;

impl EpoStateMachine {
    pub fn is_valid_transition(from: EpoStatus, to: EpoStatus) -> bool {
        matches!(
            (from, to),
            (EpoStatus::Pending, EpoStatus::Replied)
                | (EpoStatus::Pending, EpoStatus::FollowUpSent)
                | (EpoStatus::FollowUpSent, EpoStatus::Replied)
        )
    }

    fn check(index: usize, from: EpoStatus, to: EpoStatus) -> Result<(), EpoError> {
        if Self::is_valid_transition(from, to) {
            Ok(())
        } else {
            Err(EpoError::InvalidTransition { index, from, to })
        }
    }
}

/// Record a newly sent EPO, stamped with the current time.
pub fn record_epo(store: &mut StateStore, new: &NewEpo<'_>) -> Result<(usize, EpoRecord)> {
    let (index, record) = epo_db::insert_epo(store, new, Utc::now())?;
    info!(
        index,
        lot = %record.lot,
        community = %record.community,
        recipient = %record.recipient,
        "EPO recorded"
    );
    Ok((index, record))
}

/// Mark the EPO at `index` as replied.
pub fn mark_replied(store: &mut StateStore, index: usize) -> Result<EpoRecord> {
    let current = epo_db::get_epo(store, index)?;
    EpoStateMachine::check(index, current.status(), EpoStatus::Replied)?;

    let updated = epo_db::set_epo_replied(store, index)?;
    info!(index, lot = %updated.lot, "EPO marked replied");
    Ok(updated)
}

/// Record that a follow-up was sent for the EPO at `index`.
pub fn send_follow_up(store: &mut StateStore, index: usize) -> Result<EpoRecord> {
    let current = epo_db::get_epo(store, index)?;
    EpoStateMachine::check(index, current.status(), EpoStatus::FollowUpSent)?;

    let updated = epo_db::set_epo_follow_up(store, index)?;
    info!(index, lot = %updated.lot, "EPO follow-up queued");
    Ok(updated)
}

/// All EPOs paired with their index, in recording order.
pub fn list_epos(store: &StateStore) -> Vec<(usize, EpoRecord)> {
    epo_db::list_epos(store).into_iter().enumerate().collect()
}
