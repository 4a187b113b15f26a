use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::calendar::{DISPLAY_FORMAT, advance_qualifying_days};
use super::phase::Phase;
use crate::reference::ReferenceData;

/// One row of a generated schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleEntry {
    pub phase: Phase,
    pub subcontractor: String,
    pub completion_date: NaiveDate,
}

impl ScheduleEntry {
    /// Completion date as `MM/DD/YYYY`.
    pub fn display_date(&self) -> String {
        self.completion_date.format(DISPLAY_FORMAT).to_string()
    }
}

/// The six-phase schedule for one community and start date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schedule {
    pub community: String,
    pub start_date: NaiveDate,
    /// Exactly one entry per [`Phase`], in [`Phase::ALL`] order.
    pub entries: Vec<ScheduleEntry>,
}

impl Schedule {
    pub fn entry(&self, phase: Phase) -> &ScheduleEntry {
        // `entries` is built from Phase::ALL, so the index always exists.
        &self.entries[phase as usize]
    }

    /// Completion date of the last phase.
    pub fn finish_date(&self) -> NaiveDate {
        self.entry(Phase::Sand).completion_date
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("{phase} starting {from} runs past the last representable date")]
    CalendarOverflow { phase: Phase, from: NaiveDate },
}

/// Build the drywall schedule for `community` starting at `start_date`.
///
/// Each phase counts qualifying days from the previous phase's completion
/// date. An unknown community is not an error: every phase is assigned
/// [`crate::reference::UNASSIGNED`].
pub fn build_schedule(
    reference: &ReferenceData,
    community: &str,
    start_date: NaiveDate,
) -> Result<Schedule, ScheduleError> {
    if reference.community(community).is_none() {
        warn!(community, "unknown community, crews will be unassigned");
    }

    let mut cursor = start_date;
    let mut entries = Vec::with_capacity(Phase::ALL.len());
    for phase in Phase::ALL {
        let days = reference.duration(phase);
        let completion = advance_qualifying_days(cursor, days, phase.skip_rule())
            .ok_or(ScheduleError::CalendarOverflow {
                phase,
                from: cursor,
            })?;

        entries.push(ScheduleEntry {
            phase,
            subcontractor: reference.subcontractor(community, phase).to_owned(),
            completion_date: completion,
        });
        cursor = completion;
    }

    debug!(community, %start_date, finish = %cursor, "schedule built");
    Ok(Schedule {
        community: community.to_owned(),
        start_date,
        entries,
    })
}

/// A mud delivery pinned to the Scrap date of a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MudOrder {
    pub lot: String,
    pub community: String,
    pub scrap_date: NaiveDate,
    /// Scrap crew that receives the delivery.
    pub subcontractor: String,
}

impl MudOrder {
    /// Confirmation line shown to the user.
    pub fn summary(&self) -> String {
        format!(
            "Mud order queued for {} (lot {}, {})",
            self.scrap_date.format(DISPLAY_FORMAT),
            self.lot,
            self.community
        )
    }
}

/// Derive the mud order for `lot` from a generated schedule.
pub fn order_mud(schedule: &Schedule, lot: &str) -> MudOrder {
    let scrap = schedule.entry(Phase::Scrap);
    MudOrder {
        lot: lot.to_owned(),
        community: schedule.community.clone(),
        scrap_date: scrap.completion_date,
        subcontractor: scrap.subcontractor.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{UNASSIGNED, parse_reference_toml};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dates(schedule: &Schedule) -> Vec<String> {
        schedule.entries.iter().map(|e| e.display_date()).collect()
    }

    #[test]
    fn monday_start() {
        let reference = ReferenceData::builtin();
        let schedule = build_schedule(&reference, "Galloway", date(2024, 6, 3)).unwrap();
        assert_eq!(
            dates(&schedule),
            vec![
                "06/04/2024", // Hang, Tue
                "06/05/2024", // Scrap, Wed
                "06/07/2024", // Tape, Thu + Fri
                "06/10/2024", // Bed, Sat + (Sun skipped) Mon
                "06/12/2024", // Skim, Tue + Wed
                "06/13/2024", // Sand, Thu
            ]
        );
        assert!(
            schedule
                .entries
                .iter()
                .all(|e| e.subcontractor == "America Drywall")
        );
    }

    #[test]
    fn scrap_after_friday_hang_waits_for_monday() {
        let reference = ReferenceData::builtin();
        // Thursday start: Hang completes Friday, Scrap skips the weekend.
        let schedule = build_schedule(&reference, "Galloway", date(2024, 6, 6)).unwrap();
        assert_eq!(
            dates(&schedule),
            vec![
                "06/07/2024",
                "06/10/2024",
                "06/12/2024",
                "06/14/2024",
                "06/17/2024",
                "06/18/2024",
            ]
        );
    }

    #[test]
    fn sunday_start_is_not_counted() {
        let reference = ReferenceData::builtin();
        let schedule = build_schedule(&reference, "Galloway", date(2024, 6, 9)).unwrap();
        assert_eq!(schedule.entry(Phase::Hang).completion_date, date(2024, 6, 10));
        assert_eq!(schedule.finish_date(), date(2024, 6, 19));
    }

    #[test]
    fn split_crews_follow_reference_table() {
        let reference = ReferenceData::builtin();
        let schedule = build_schedule(&reference, "Claremont", date(2024, 6, 3)).unwrap();
        let crews: Vec<&str> = schedule
            .entries
            .iter()
            .map(|e| e.subcontractor.as_str())
            .collect();
        assert_eq!(
            crews,
            vec![
                "Ricardo",
                "Scrap Brothers",
                "Juan Trejo",
                "Juan Trejo",
                "Juan Trejo",
                "Juan Trejo",
            ]
        );
    }

    #[test]
    fn unknown_community_is_unassigned() {
        let reference = ReferenceData::builtin();
        let schedule = build_schedule(&reference, "Atlantis", date(2024, 6, 3)).unwrap();
        assert_eq!(schedule.entries.len(), 6);
        assert!(schedule.entries.iter().all(|e| e.subcontractor == UNASSIGNED));
        // Dates do not depend on the community.
        assert_eq!(schedule.finish_date(), date(2024, 6, 13));
    }

    #[test]
    fn custom_durations_are_used() {
        let reference = parse_reference_toml(
            r#"
[durations]
Hang = 3

[[communities]]
name = "Camden"
"#,
        )
        .unwrap();
        // Friday start: Sat, (Sun skipped), Mon, Tue.
        let schedule = build_schedule(&reference, "Camden", date(2024, 6, 7)).unwrap();
        assert_eq!(schedule.entry(Phase::Hang).completion_date, date(2024, 6, 11));
    }

    #[test]
    fn overflow_is_reported() {
        let reference = ReferenceData::builtin();
        let err = build_schedule(&reference, "Galloway", NaiveDate::MAX).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::CalendarOverflow {
                phase: Phase::Hang,
                from: NaiveDate::MAX
            }
        );
    }

    #[test]
    fn mud_order_uses_scrap_entry() {
        let reference = ReferenceData::builtin();
        let schedule = build_schedule(&reference, "Claremont", date(2024, 6, 3)).unwrap();
        let order = order_mud(&schedule, "27");
        assert_eq!(order.scrap_date, date(2024, 6, 5));
        assert_eq!(order.subcontractor, "Scrap Brothers");
        assert_eq!(
            order.summary(),
            "Mud order queued for 06/05/2024 (lot 27, Claremont)"
        );
    }
}
