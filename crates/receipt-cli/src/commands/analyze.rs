//! One-shot analysis of a local file or remote image.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use receipt_core::image::{encode_data_url, media_type_from_path};
use receipt_core::AnalysisRequest;

use crate::config::ModelArgs;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to an image file, or an http(s)/data URL
    pub image: String,

    #[command(flatten)]
    pub model: ModelArgs,
}

pub async fn execute(args: AnalyzeArgs) -> Result<()> {
    let analyzer = args.model.build_analyzer()?;
    let image_ref = resolve_image_ref(&args.image).await?;

    eprintln!("{} Analyzing receipt: {}", "→".dimmed(), args.image);
    match analyzer.analyze(AnalysisRequest::new(image_ref)).await {
        Ok(result) => {
            println!("{}", result.text);
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            if let Some(retry_after) = e.retry_after() {
                eprintln!("  Retry after {}s", retry_after.as_secs().max(1));
            }
            anyhow::bail!("analysis failed ({:?})", e.kind())
        }
    }
}

/// URLs pass through; local files become `data:` URLs.
async fn resolve_image_ref(image: &str) -> Result<String> {
    let lower = image.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("data:") {
        return Ok(image.to_string());
    }

    let path = Path::new(image);
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image file {}", path.display()))?;

    Ok(encode_data_url(&bytes, media_type_from_path(path)))
}
