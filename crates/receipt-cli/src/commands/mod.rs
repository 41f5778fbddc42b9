//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod analyze;
pub mod serve;

/// Receipt - analyze receipt photos with a hosted vision model
#[derive(Parser)]
#[command(name = "receipt")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server and messaging webhook
    Serve(serve::ServeArgs),

    /// Analyze a single receipt image from a file or URL
    Analyze(analyze::AnalyzeArgs),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Serve(args) => serve::execute(args).await,
            Commands::Analyze(args) => analyze::execute(args).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from(["receipt", "analyze", "receipt.jpg", "--model", "gpt-4o"])
            .unwrap();
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.image, "receipt.jpg");
                assert_eq!(args.model.model, "gpt-4o");
            }
            _ => panic!("expected analyze command"),
        }
    }

    #[test]
    fn test_parse_serve_port() {
        let cli = Cli::try_parse_from(["receipt", "serve", "--port", "8088"]).unwrap();
        match cli.command {
            Commands::Serve(args) => assert_eq!(args.port, 8088),
            _ => panic!("expected serve command"),
        }
    }

    #[test]
    fn test_parse_serve_ipv6_host() {
        let cli = Cli::try_parse_from(["receipt", "serve", "--host", "::1", "--port", "8088"])
            .unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.host, std::net::Ipv6Addr::LOCALHOST);
                assert_eq!(args.listen_addr().to_string(), "[::1]:8088");
            }
            _ => panic!("expected serve command"),
        }
    }

    #[test]
    fn test_parse_serve_rejects_hostname() {
        assert!(Cli::try_parse_from(["receipt", "serve", "--host", "localhost:80"]).is_err());
    }
}
