//! CLI command definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Storyreel - turn a prompt or a story into a narrated video
#[derive(Parser, Debug)]
#[command(name = "storyreel")]
#[command(about = "Turn a prompt or a story into a narrated video", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file layered over the defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a video
    Generate(GenerateArgs),

    /// Print the resolved configuration as JSON
    Config,
}

/// Arguments of `storyreel generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Prompt or story text
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub prompt: Option<String>,

    /// Read the prompt or story from a file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Treat the input as a finished story instead of a prompt
    #[arg(long)]
    pub story: bool,

    /// Run id used to name working files and the output
    #[arg(long)]
    pub run_id: Option<String>,

    /// Owner recorded with the run
    #[arg(long)]
    pub owner: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_requires_some_input() {
        assert!(Cli::try_parse_from(["storyreel", "generate"]).is_err());
    }

    #[test]
    fn prompt_and_file_conflict() {
        let parsed =
            Cli::try_parse_from(["storyreel", "generate", "--prompt", "x", "--file", "story.txt"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn story_flag_and_global_options_parse() {
        let cli = Cli::try_parse_from([
            "storyreel", "-v", "generate", "--file", "story.txt", "--story", "--run-id", "abc",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Generate(args) => {
                assert!(args.story);
                assert_eq!(args.run_id.as_deref(), Some("abc"));
                assert_eq!(args.file, Some(PathBuf::from("story.txt")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
