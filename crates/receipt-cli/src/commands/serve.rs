//! Web server command.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use receipt_web::AppState;

use crate::config::{MessagingArgs, ModelArgs};

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, env = "RECEIPT_PORT", default_value = "3030")]
    pub port: u16,

    /// Host to bind to (IPv4 or IPv6)
    #[arg(long, env = "RECEIPT_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub messaging: MessagingArgs,
}

impl ServeArgs {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

pub async fn execute(args: ServeArgs) -> Result<()> {
    let addr = args.listen_addr();

    let analyzer = args.model.build_analyzer()?;
    let messenger = args.messaging.build_client()?;

    let mut state = AppState::new(analyzer);
    let messaging_enabled = messenger.is_some();
    if let Some(client) = messenger {
        tracing::info!(from = %client.from_number(), "Messaging webhook enabled");
        state = state.with_messenger(Arc::new(client));
    }

    println!();
    println!("  {} {}", "Receipt".cyan().bold(), "Analyzer".bold());
    println!();
    println!("  {}      http://{}", "Upload".green(), addr);
    println!("  {}         http://{}/analyze-receipt", "API".green(), addr);
    if messaging_enabled {
        println!("  {}     http://{}/api/twilio/webhook", "Webhook".green(), addr);
    } else {
        println!("  {}     {}", "Webhook".yellow(), "disabled (no messaging credentials)".dimmed());
    }
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    receipt_web::run_server(state, addr).await?;

    Ok(())
}
