use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use dekk::parser::slide_heading;

pub fn run(file: &Path, json: bool) -> Result<()> {
    let markdown = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let result = dekk::parse(&markdown);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let title = result.title().unwrap_or("(untitled)");
    println!("{} {}", "Deck:".bold(), title);
    for (key, value) in result.deck_metadata.iter() {
        if key != "title" {
            println!("  {} {value}", format!("{key}:").dimmed());
        }
    }
    println!();

    if result.slides.is_empty() {
        println!("{}", "No slides.".yellow());
        return Ok(());
    }

    for (i, slide) in result.slides.iter().enumerate() {
        let heading = slide_heading(slide)
            .map(str::to_string)
            .unwrap_or_else(|| first_line(&slide.raw_content));
        println!("{} {}", format!("{:>3}.", i + 1).cyan(), heading);
        for (key, value) in slide.metadata.iter() {
            println!("       {} {value}", format!("{key}:").dimmed());
        }
    }
    Ok(())
}

fn first_line(content: &str) -> String {
    let line = content.lines().next().unwrap_or_default();
    if line.chars().count() > 60 {
        let truncated: String = line.chars().take(57).collect();
        format!("{truncated}...")
    } else {
        line.to_string()
    }
}
