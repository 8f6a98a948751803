//! CLI definitions: argument parsing, subcommands, and help text.

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

use crate::core::config::{SemanticKind, StrategyKind};

pub use clap_complete::generate;

const AFTER_HELP: &str = "\
EXAMPLES:
  equalspeak                                   Interactive session (same as `watch`)
  equalspeak analyze \"The chairman spoke\"      Analyze text and list suggestions
  echo \"Ask the fireman\" | equalspeak analyze  Read text from stdin
  equalspeak analyze --json -                  Machine-readable assessment
  equalspeak apply -p 2 -r firefighter \"Call the fireman now\"
  equalspeak --semantic embedding analyze \"he said\"
  equalspeak --strategy model analyze \"...\"    Ask the chat model for replacements
  equalspeak terms --query man                 List matching table entries
  equalspeak set-key < key.txt                 Store the chat model API key
";

/// Command-line arguments for the application.
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Flags gendered language and suggests neutral replacements",
    after_help = AFTER_HELP
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Suggestion strategy (overrides EQUALSPEAK_STRATEGY)
    #[arg(long, value_enum, global = true)]
    pub strategy: Option<StrategyKind>,

    /// Semantic bias estimator (overrides EQUALSPEAK_SEMANTIC)
    #[arg(long, value_enum, global = true)]
    pub semantic: Option<SemanticKind>,

    /// Chat model ID (overrides EQUALSPEAK_MODEL)
    #[arg(short = 'm', long, global = true)]
    pub model: Option<String>,

    /// Increase log verbosity (use multiple times for debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce log output (errors only)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze text for gendered language
    Analyze {
        /// Text to analyze ('-' or omitted reads stdin)
        text: Option<String>,
        /// Print the assessment as JSON
        #[arg(long)]
        json: bool,
    },
    /// Apply one suggestion to text and print the result
    Apply {
        /// Text to rewrite ('-' or omitted reads stdin)
        text: Option<String>,
        /// Token position of the word to replace (zero-based)
        #[arg(short, long)]
        position: usize,
        /// Replacement word
        #[arg(short, long)]
        replacement: String,
        /// Word expected at the position; the apply fails if it differs
        #[arg(short, long)]
        original: Option<String>,
    },
    /// Interactive session: each input line replaces the text, `:apply N` applies a suggestion
    Watch,
    /// List the gendered term table
    Terms {
        /// Filter by term or replacement
        #[arg(long)]
        query: Option<String>,
    },
    /// Store the chat model API key (read from stdin) in the config directory
    SetKey,
    /// Show config paths, model, strategy, and API key status
    Config,
    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        #[arg(value_parser = clap::value_parser!(Shell))]
        shell: Shell,
    },
}

impl Args {
    /// Log level based on -v/-q flags: error, warn, info, or debug.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose >= 2 {
            "debug"
        } else if self.verbose >= 1 {
            "info"
        } else {
            "warn"
        }
    }

    /// True when running the interactive session (explicitly or by default).
    pub fn is_interactive(&self) -> bool {
        matches!(self.command, None | Some(Commands::Watch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_analyze_with_globals() {
        let args = Args::try_parse_from([
            "equalspeak",
            "analyze",
            "--json",
            "hi",
            "--semantic",
            "embedding",
        ])
        .unwrap();
        assert_eq!(args.semantic, Some(SemanticKind::Embedding));
        assert!(matches!(
            args.command,
            Some(Commands::Analyze { json: true, ref text }) if text.as_deref() == Some("hi")
        ));
    }

    #[test]
    fn parses_apply() {
        let args = Args::try_parse_from([
            "equalspeak",
            "apply",
            "-p",
            "2",
            "-r",
            "firefighter",
            "Call the fireman now",
        ])
        .unwrap();
        match args.command {
            Some(Commands::Apply {
                position,
                replacement,
                original,
                ..
            }) => {
                assert_eq!(position, 2);
                assert_eq!(replacement, "firefighter");
                assert!(original.is_none());
            }
            _ => panic!("expected apply"),
        }
    }

    #[test]
    fn log_level_flags() {
        let args = Args::try_parse_from(["equalspeak", "-vv"]).unwrap();
        assert_eq!(args.log_level(), "debug");
        assert!(args.is_interactive());
        let args = Args::try_parse_from(["equalspeak", "-q", "terms"]).unwrap();
        assert_eq!(args.log_level(), "error");
        assert!(!args.is_interactive());
    }

    #[test]
    fn rejects_unknown_strategy() {
        assert!(Args::try_parse_from(["equalspeak", "--strategy", "llm", "terms"]).is_err());
    }
}
