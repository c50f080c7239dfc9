use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use dekk::{DeckSource, FsDeckSource};

pub fn run(dir: &Path, drafts_dir: Option<PathBuf>) -> Result<()> {
    let source = FsDeckSource::open(dir, drafts_dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?;
    let registry = source.registry();

    if registry.is_empty() {
        println!(
            "{}",
            format!("No decks found in {} (expected <deck>/slides.md).", dir.display()).yellow()
        );
        return Ok(());
    }

    println!(
        "{} {}",
        format!("{} deck(s) in", registry.len()).bold(),
        dir.display()
    );
    println!();

    let id_width = registry
        .entries()
        .iter()
        .map(|e| e.id.chars().count())
        .max()
        .unwrap_or(0);

    for entry in registry.entries() {
        let slides = if entry.slide_count == 1 {
            "1 slide".to_string()
        } else {
            format!("{} slides", entry.slide_count)
        };
        print!(
            "  {:<width$}  {}  {}",
            entry.id.cyan(),
            entry.title.bold(),
            slides.dimmed(),
            width = id_width
        );
        if let Some(author) = &entry.author {
            print!("  {}", format!("by {author}").dimmed());
        }
        if source.has_draft(&entry.id) {
            print!("  {}", "(draft)".yellow());
        }
        println!();
    }
    Ok(())
}
