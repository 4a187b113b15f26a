//! CLI handlers for `sitebook epo` subcommands.
//!
//! Implements:
//! - `sitebook epo send ...`          -- record an EPO request
//! - `sitebook epo list`              -- tracker table with status
//! - `sitebook epo replied <index>`   -- mark a reply received
//! - `sitebook epo follow-up <index>` -- record a follow-up

use std::fmt::Write as _;

use anyhow::Result;

use sitebook_core::epo;
use sitebook_store::StateStore;
use sitebook_store::models::EpoRecord;
use sitebook_store::queries::epos::NewEpo;

use crate::EpoCommands;

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

/// Dispatch an `EpoCommands` variant to the appropriate handler.
pub fn run_epo_command(command: EpoCommands, store: &mut StateStore) -> Result<()> {
    match command {
        EpoCommands::Send {
            lot,
            community,
            to,
            amount,
            attach,
        } => {
            let new = NewEpo {
                lot: &lot,
                community: &community,
                recipient: &to,
                amount: &amount,
                attachments: &attach,
            };
            let (index, record) = epo::record_epo(store, &new)?;
            println!(
                "EPO {index} recorded: lot {} ({}), {} to {}",
                record.lot, record.community, record.amount, record.recipient
            );
            if !record.attachments.is_empty() {
                println!("  Attachments: {}", record.attachments.join(", "));
            }
            Ok(())
        }
        EpoCommands::List => {
            let epos = epo::list_epos(store);
            if epos.is_empty() {
                println!("No EPOs recorded. Use `sitebook epo send` to record one.");
            } else {
                print!("{}", render_epo_table(&epos));
            }
            Ok(())
        }
        EpoCommands::Replied { index } => {
            let record = epo::mark_replied(store, index)?;
            println!("EPO {index} (lot {}) marked replied.", record.lot);
            Ok(())
        }
        EpoCommands::FollowUp { index } => {
            let record = epo::send_follow_up(store, index)?;
            println!(
                "Follow-up recorded for EPO {index} (lot {}, {}).",
                record.lot, record.recipient
            );
            Ok(())
        }
    }
}

/// The EPO tracker as a fixed-width table.
pub fn render_epo_table(epos: &[(usize, EpoRecord)]) -> String {
    let width = |f: fn(&EpoRecord) -> &str, header: &str| {
        epos.iter()
            .map(|(_, e)| f(e).chars().count())
            .max()
            .unwrap_or(0)
            .max(header.len())
    };
    let lot_w = width(|e| &e.lot, "LOT");
    let community_w = width(|e| &e.community, "COMMUNITY");
    let to_w = width(|e| &e.recipient, "TO");
    let amount_w = width(|e| &e.amount, "AMOUNT");

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5}  {:<lot_w$}  {:<community_w$}  {:<to_w$}  {:<amount_w$}  {:<16}  STATUS",
        "INDEX", "LOT", "COMMUNITY", "TO", "AMOUNT", "SENT",
    );
    for (index, epo) in epos {
        let _ = writeln!(
            out,
            "{:>5}  {:<lot_w$}  {:<community_w$}  {:<to_w$}  {:<amount_w$}  {:<16}  {}",
            index,
            epo.lot,
            epo.community,
            epo.recipient,
            epo.amount,
            epo.sent_at.format("%Y-%m-%d %H:%M"),
            epo.status(),
        );
    }
    out
}
