//! `sitebook communities`, `sitebook schedule`, and `sitebook order-mud`.

use std::fmt::Write as _;

use anyhow::{Context, Result};

use sitebook_core::reference::ReferenceData;
use sitebook_core::schedule::{
    DISPLAY_FORMAT, MudOrder, Phase, Schedule, build_schedule, order_mud, parse_date,
};

// -----------------------------------------------------------------------
// sitebook communities
// -----------------------------------------------------------------------

pub fn run_communities(reference: &ReferenceData) -> Result<()> {
    print!("{}", render_communities(reference));
    Ok(())
}

/// One row per community, one column per phase.
pub fn render_communities(reference: &ReferenceData) -> String {
    let name_w = reference
        .community_names()
        .iter()
        .map(|n| n.chars().count())
        .max()
        .unwrap_or(9)
        .max(9);
    let crew_w = reference
        .communities()
        .iter()
        .flat_map(|c| {
            Phase::ALL
                .iter()
                .map(|p| reference.subcontractor(&c.name, *p).chars().count())
        })
        .max()
        .unwrap_or(5)
        .max(5);

    let mut out = String::new();
    let _ = write!(out, "{:<name_w$}", "COMMUNITY");
    for phase in Phase::ALL {
        let _ = write!(out, "  {:<crew_w$}", phase.as_str().to_uppercase());
    }
    out.push('\n');

    for community in reference.communities() {
        let _ = write!(out, "{:<name_w$}", community.name);
        for phase in Phase::ALL {
            let _ = write!(out, "  {:<crew_w$}", reference.subcontractor(&community.name, phase));
        }
        out.push('\n');
    }
    out
}

// -----------------------------------------------------------------------
// sitebook schedule <community> <start>
// -----------------------------------------------------------------------

pub fn run_schedule(
    reference: &ReferenceData,
    community: &str,
    start: &str,
    lot: Option<&str>,
) -> Result<()> {
    let schedule = compute(reference, community, start)?;
    print!("{}", render_schedule(&schedule, lot));
    Ok(())
}

fn compute(reference: &ReferenceData, community: &str, start: &str) -> Result<Schedule> {
    let start_date = parse_date(start)?;
    build_schedule(reference, community, start_date)
        .with_context(|| format!("cannot schedule {community} from {start}"))
}

/// Header line followed by a PHASE / SUBCONTRACTOR / COMPLETE table.
pub fn render_schedule(schedule: &Schedule, lot: Option<&str>) -> String {
    let crew_w = schedule
        .entries
        .iter()
        .map(|e| e.subcontractor.chars().count())
        .max()
        .unwrap_or(13)
        .max(13);

    let mut out = String::new();
    let _ = write!(out, "Schedule for {}", schedule.community);
    if let Some(lot) = lot {
        let _ = write!(out, ", lot {lot}");
    }
    let _ = writeln!(
        out,
        " (start {})",
        schedule.start_date.format(DISPLAY_FORMAT)
    );
    out.push('\n');

    let _ = writeln!(out, "{:<6}  {:<crew_w$}  COMPLETE", "PHASE", "SUBCONTRACTOR");
    for entry in &schedule.entries {
        let _ = writeln!(
            out,
            "{:<6}  {:<crew_w$}  {}",
            entry.phase.as_str(),
            entry.subcontractor,
            entry.display_date()
        );
    }
    out
}

// -----------------------------------------------------------------------
// sitebook order-mud <community> <start> --lot <lot>
// -----------------------------------------------------------------------

/// Compute the mud order for `lot` and log it. Nothing is sent.
pub fn place_mud_order(
    reference: &ReferenceData,
    community: &str,
    start: &str,
    lot: &str,
) -> Result<MudOrder> {
    let schedule = compute(reference, community, start)?;
    let order = order_mud(&schedule, lot);
    tracing::info!(
        lot = %order.lot,
        community = %order.community,
        scrap_date = %order.scrap_date,
        subcontractor = %order.subcontractor,
        "mud order queued"
    );
    Ok(order)
}

pub fn run_order_mud(
    reference: &ReferenceData,
    community: &str,
    start: &str,
    lot: &str,
) -> Result<()> {
    let order = place_mud_order(reference, community, start, lot)?;
    println!("{}", order.summary());
    println!("  Scrap crew: {}", order.subcontractor);
    Ok(())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
