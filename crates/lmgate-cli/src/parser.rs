//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the chat gateway.
#[derive(Debug, Parser)]
#[command(name = "lmgate")]
#[command(about = "Expose chat models over a local HTTP/SSE API")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use lmgate_core::{DEFAULT_BASE_PORT, DEFAULT_HOST, DEFAULT_SYSTEM_PROMPT};

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_args() {
        let cli = Cli::parse_from([
            "lmgate",
            "serve",
            "--auto-start",
            "--port",
            "4000",
            "--port-attempts",
            "3",
            "--upstream-url",
            "http://localhost:9000",
            "--vendor",
            "local",
            "-v",
        ]);
        assert!(cli.verbose);

        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        let settings = args.settings();
        assert!(settings.auto_start);
        assert_eq!(settings.base_port, 4000);
        assert_eq!(settings.max_port_attempts, 3);
        assert_eq!(settings.host, DEFAULT_HOST);
        assert_eq!(settings.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(args.upstream.upstream_url, "http://localhost:9000");
        assert_eq!(args.upstream.vendor, "local");
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::parse_from(["lmgate", "serve"]);
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.port, DEFAULT_BASE_PORT);
        assert!(!args.auto_start);
        assert!(args.upstream.api_key.is_none());
    }

    #[test]
    fn test_models_command() {
        let cli = Cli::parse_from(["lmgate", "models", "--api-key", "k"]);
        assert!(matches!(
            cli.command,
            Commands::Models(ref args) if args.api_key.as_deref() == Some("k")
        ));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["lmgate"]).is_err());
    }
}
