//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use eyre::Result;

#[derive(Debug, Parser)]
#[command(name = "speval")]
#[command(about = "Score speech-system outputs against references with external scoring tools")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Word error rate for ASR output via Kaldi compute-wer
    Asr(crate::asr::Args),

    /// Detection cost for speech activity detection via the NIST SAD scorer
    Sad(crate::sad::Args),

    /// Diarization error rate via the dscore toolkit
    Sd(crate::sd::Args),

    /// Top-N speaker identification accuracy
    Sid(crate::sid::Args),
}

/// Execute CLI command - separated for testing.
pub fn run_cli(cli: Cli) -> Result<()> {
    tracing::debug!(?cli, "parsed arguments");

    match cli.command {
        Commands::Asr(args) => crate::asr::execute(args.try_into()?),
        Commands::Sad(args) => crate::sad::execute(args.try_into()?),
        Commands::Sd(args) => crate::sd::execute(args.try_into()?),
        Commands::Sid(args) => crate::sid::execute(args.try_into()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sid_command() {
        let cli = Cli::parse_from([
            "speval", "sid", "--ref", "ref.txt", "--hyp", "hyp.txt", "--top-n", "3",
        ]);

        match &cli.command {
            Commands::Sid(crate::sid::Args {
                reference,
                hypothesis,
                top_n: 3,
                out: None,
                ..
            }) if reference.to_str() == Some("ref.txt")
                && hypothesis.to_str() == Some("hyp.txt") => {}
            _ => panic!("unexpected command: {:?}", cli.command),
        }
    }

    #[test]
    fn sid_top_n_defaults_to_five() {
        let cli = Cli::parse_from(["speval", "sid", "--ref", "r", "--hyp", "h"]);

        match &cli.command {
            Commands::Sid(args) => assert_eq!(args.top_n, 5),
            _ => panic!("unexpected command: {:?}", cli.command),
        }
    }

    #[test]
    fn parses_sd_command_with_collar() {
        let cli = Cli::parse_from([
            "speval", "sd", "--ref", "ref/", "--hyp", "hyp/", "--scorer", "dscore/", "--collar",
            "0.5",
        ]);

        match &cli.command {
            Commands::Sd(args) => {
                assert_eq!(args.collar, 0.5);
                assert_eq!(args.python, "python");
            }
            _ => panic!("unexpected command: {:?}", cli.command),
        }
    }

    #[test]
    fn sad_collar_defaults_to_half_second() {
        let cli = Cli::parse_from([
            "speval", "sad", "--ref", "ref/", "--hyp", "hyp/", "--scorer", "scoreFile_SAD.pl",
        ]);

        match &cli.command {
            Commands::Sad(args) => assert_eq!(args.collar, 0.5),
            _ => panic!("unexpected command: {:?}", cli.command),
        }
    }

    #[test]
    fn parses_asr_command() {
        let cli = Cli::parse_from([
            "speval", "asr", "--ref", "ref/", "--hyp", "hyp/", "--kaldi", "/opt/kaldi", "--track",
            "2", "--no-clobber",
        ]);

        match &cli.command {
            Commands::Asr(args) => {
                assert_eq!(args.track, "2");
                assert!(args.no_clobber);
                assert_eq!(args.kaldi.to_str(), Some("/opt/kaldi"));
            }
            _ => panic!("unexpected command: {:?}", cli.command),
        }
    }
}
