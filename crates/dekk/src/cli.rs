use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::app::StartOptions;
use crate::config::Config;

#[derive(Parser)]
#[command(name = "dekk")]
#[command(author, version, about)]
#[command(long_about = "Markdown slide decks with hash routing.\n\n\
    Keep each deck in <dir>/<deck>/slides.md and present, browse and edit them.\n\n\
    Examples:\n  \
    dekk presentations                     Open the deck picker\n  \
    dekk presentations --deck intro        Present one deck (fullscreen)\n  \
    dekk talk.md --windowed                Present a single file in a window\n  \
    dekk list presentations                List decks\n  \
    dekk route '#deck/intro/3'             Show how a fragment is routed")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Presentations directory, or a single markdown file to present
    pub path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Open this deck instead of the picker
    #[arg(long, global = false)]
    pub deck: Option<String>,

    /// Start on a specific slide (1-indexed)
    #[arg(long, global = false)]
    pub slide: Option<usize>,

    /// Start in overview mode
    #[arg(long, global = false, conflicts_with = "editor")]
    pub overview: bool,

    /// Start in the editor
    #[arg(long, global = false)]
    pub editor: bool,

    /// Launch in a window instead of fullscreen
    #[arg(long, global = false)]
    pub windowed: bool,

    /// Directory for saved drafts (default: the user data directory)
    #[arg(long, global = true)]
    pub drafts_dir: Option<PathBuf>,

    /// Increase output verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the decks in a presentations directory
    List {
        /// Presentations directory (default: from config)
        dir: Option<PathBuf>,
    },

    /// Parse a markdown file and print its slides
    Parse {
        /// Markdown file to parse
        file: PathBuf,

        /// Print the parse result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the route a location fragment resolves to
    Route {
        /// Fragment such as '#deck/intro/3'
        fragment: String,
    },

    /// Write a deck's markdown (draft if one exists) to a file
    Export {
        /// Presentations directory
        dir: PathBuf,

        /// Deck to export
        #[arg(long)]
        deck: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. defaults.theme, defaults.start_view, editor.autosave_ms)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    /// Log filter implied by `-q` / `-v`.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    pub fn run(self) -> anyhow::Result<()> {
        let config = Config::load_or_default();
        let drafts_dir = self.drafts_dir.clone().or_else(|| config.drafts_dir());

        match self.command {
            Some(Commands::List { dir }) => {
                let dir = resolve_dir(dir, &config)?;
                crate::commands::list::run(&dir, drafts_dir)
            }
            Some(Commands::Parse { file, json }) => {
                if !file.exists() {
                    anyhow::bail!("File not found: {}", file.display());
                }
                crate::commands::parse::run(&file, json)
            }
            Some(Commands::Route { fragment }) => {
                crate::commands::route::run(&fragment);
                Ok(())
            }
            Some(Commands::Export {
                dir,
                deck,
                output_dir,
            }) => crate::commands::export::run(&dir, &deck, &output_dir, drafts_dir),
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                println!("dekk {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            None => {
                let path = match self.path.or_else(|| config.presentations_dir().map(PathBuf::from)) {
                    Some(path) => path,
                    None => {
                        use clap::CommandFactory;
                        let mut cmd = Self::command();
                        cmd.print_help()?;
                        println!();
                        return Ok(());
                    }
                };
                if !path.exists() {
                    anyhow::bail!("Not found: {}", path.display());
                }
                let start = StartOptions {
                    deck: self.deck,
                    slide: self.slide,
                    overview: self.overview,
                    editor: self.editor,
                };
                crate::app::run(path, drafts_dir, start, self.windowed, &config)
            }
        }
    }
}

fn resolve_dir(dir: Option<PathBuf>, config: &Config) -> anyhow::Result<PathBuf> {
    let dir = dir
        .or_else(|| config.presentations_dir().map(PathBuf::from))
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No presentations directory given. Pass one or run `dekk config set defaults.presentations_dir <DIR>`."
            )
        })?;
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_log_filter() {
        let cli = Cli::parse_from(["dekk", "-vv", "list"]);
        assert_eq!(cli.log_filter(), "debug");
        let cli = Cli::parse_from(["dekk", "-q", "-vvv", "list"]);
        assert_eq!(cli.log_filter(), "error");
        let cli = Cli::parse_from(["dekk"]);
        assert_eq!(cli.log_filter(), "warn");
    }

    #[test]
    fn test_viewer_flags() {
        let cli = Cli::parse_from(["dekk", "decks", "--deck", "intro", "--slide", "3", "--windowed"]);
        assert_eq!(cli.path, Some(PathBuf::from("decks")));
        assert_eq!(cli.deck.as_deref(), Some("intro"));
        assert_eq!(cli.slide, Some(3));
        assert!(cli.windowed);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_overview_conflicts_with_editor() {
        assert!(Cli::try_parse_from(["dekk", "decks", "--overview", "--editor"]).is_err());
    }
}
