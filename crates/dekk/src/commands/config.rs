use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load_or_default();

    println!("{} {}", "Config:".bold(), path.display());
    println!();
    let yaml = serde_yaml::to_string(&config)?;
    if yaml.trim() == "{}" {
        println!("  {}", "(empty, using defaults)".dimmed());
    } else {
        for line in yaml.lines() {
            println!("  {line}");
        }
    }
    println!();
    println!("{}", "Effective:".bold());
    println!("  theme:       {}", config.theme());
    println!(
        "  start view:  {}",
        config
            .defaults
            .as_ref()
            .and_then(|d| d.start_view.as_deref())
            .unwrap_or("picker")
    );
    println!("  autosave:    {} ms", config.autosave_delay().as_millis());
    match config.drafts_dir() {
        Some(dir) => println!("  drafts:      {}", dir.display()),
        None => println!("  drafts:      {}", "(written in place)".dimmed()),
    }
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    println!("{} {key} = {value}", "Set".green());
    println!("  {}", path.display().to_string().dimmed());
    Ok(())
}
