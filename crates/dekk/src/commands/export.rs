use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use dekk::exporter::{self, ExportRequest};
use dekk::{DeckSource, FsDeckSource};

pub fn run(dir: &Path, deck: &str, output_dir: &Path, drafts_dir: Option<PathBuf>) -> Result<()> {
    let source = FsDeckSource::open(dir, drafts_dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?;
    let markdown = source
        .load_deck(deck)
        .ok_or_else(|| dekk::Error::DeckNotFound(deck.to_string()))?;

    let request = ExportRequest {
        title: dekk::parse(&markdown).title().map(str::to_string),
        markdown,
        deck_id: Some(deck.to_string()),
    };

    match exporter::export_markdown(output_dir, &request)? {
        Some(path) => {
            let from = if source.has_draft(deck) { "draft" } else { "deck" };
            println!("{} {from} {deck} to {}", "Exported".green(), path.display());
        }
        None => println!("{}", format!("Deck {deck} is empty, nothing exported.").yellow()),
    }
    Ok(())
}
