//! CLI handlers for `sitebook note` subcommands.

use std::fmt::Write as _;

use anyhow::Result;

use sitebook_core::classify::{self, NoteClassifier, SiteNote};
use sitebook_store::StateStore;
use sitebook_store::models::NoteRecord;
use sitebook_store::queries::notes as note_db;

use crate::NoteCommands;
use crate::config::SitebookConfig;

/// Dispatch a `NoteCommands` variant to the appropriate handler.
///
/// The classifier is only built for commands that classify, and the state
/// file is only opened for commands that read or write it.
pub async fn run_note_command(command: NoteCommands, config: &SitebookConfig) -> Result<()> {
    match command {
        NoteCommands::Add {
            lot,
            community,
            text,
        } => {
            let classifier = config.note_classifier()?;
            let mut store = StateStore::open(&config.store_config)?;
            let note = SiteNote::new(lot, community, text.join(" "));
            let (index, record) =
                classify::record_note(&mut store, classifier.as_ref(), &note).await?;
            println!(
                "Note {index} filed as {} ({}): {}",
                record.category, record.classifier, record.action
            );
            Ok(())
        }
        NoteCommands::Classify { text } => {
            let classifier = config.note_classifier()?;
            print!("{}", classify_text(classifier.as_ref(), &text.join(" ")).await?);
            Ok(())
        }
        NoteCommands::List { lot } => {
            let store = StateStore::open(&config.store_config)?;
            let notes = match lot.as_deref() {
                Some(lot) => note_db::list_notes_for_lot(&store, lot),
                None => note_db::list_notes(&store),
            };
            if notes.is_empty() {
                println!("No notes recorded. Use `sitebook note add` to record one.");
            } else {
                print!("{}", render_notes(&notes));
            }
            Ok(())
        }
    }
}

/// Classify free text without storing it.
pub async fn classify_text(classifier: &dyn NoteClassifier, text: &str) -> Result<String> {
    let result = classifier.classify(&SiteNote::new("", "", text)).await?;
    Ok(format!(
        "Category:   {}\nAction:     {}\nClassifier: {}\n",
        result.category, result.action, result.classifier
    ))
}

pub fn render_notes(notes: &[NoteRecord]) -> String {
    let mut out = String::new();
    for (index, note) in notes.iter().enumerate() {
        let _ = writeln!(
            out,
            "[{index}] {} lot {} ({}) -- {}",
            note.recorded_at.format("%Y-%m-%d %H:%M"),
            note.lot,
            note.community,
            note.category,
        );
        let _ = writeln!(out, "    {}", note.text);
        let _ = writeln!(out, "    -> {}", note.action);
    }
    out
}
