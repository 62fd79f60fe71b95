//! Config command - show the resolved configuration.

use anyhow::Result;
use clap::Args;
use console::Style;

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Also list the files the configuration was loaded from
    #[arg(long)]
    pub sources: bool,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    let mut resolved = ctx.config.clone();
    // Show effective values, not just what the files set
    resolved.session = Some(resolved.session());
    resolved.logging = Some(resolved.logging());

    if ctx.json_output {
        let output = serde_json::json!({
            "config": resolved,
            "sources": ctx.sources,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print!("{}", resolved.to_toml()?);

    if args.sources {
        let dim = Style::new().dim();
        println!();
        if ctx.sources.is_empty() {
            println!("{}", dim.apply_to("# No config files found, using defaults"));
        }
        for path in &ctx.sources {
            println!("{} {}", dim.apply_to("# Loaded from"), path.display());
        }
    }

    Ok(())
}
