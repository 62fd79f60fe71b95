//! Watch command - observe how long an untouched session survives.

use std::time::Duration;

use anyhow::{Result, bail};
use clap::Args;
use console::Style;
use lapse_session::Error;
use serde_json::json;
use tokio::time::{Instant, sleep};
use tracing::debug;

use super::{Context, StoreArgs};

/// Arguments for the watch command.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Milliseconds between reads
    #[arg(long, default_value_t = 100)]
    pub poll_ms: u64,

    #[command(flatten)]
    pub store: StoreArgs,
}

/// Run the watch command.
pub async fn run(args: WatchArgs, ctx: &Context) -> Result<()> {
    let store = args.store.open_store(ctx)?;
    let config = store.config().clone();
    let poll = Duration::from_millis(args.poll_ms.max(1));
    // Past this the sweeper has certainly missed its window
    let deadline = config
        .ttl
        .saturating_add(config.sweep_interval.saturating_mul(2))
        .saturating_add(poll);

    let session_id = store.create()?;
    let started = Instant::now();

    if !ctx.json_output {
        let dim = Style::new().dim();
        println!(
            "{} {} (ttl {}s, sweep every {}s)",
            dim.apply_to("Watching session"),
            session_id,
            config.ttl.as_secs_f64(),
            config.sweep_interval.as_secs_f64()
        );
    }

    loop {
        sleep(poll).await;
        let elapsed = started.elapsed();

        match store.get(&session_id) {
            Ok(_) => {
                debug!(
                    elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                    "Session still present"
                );
                if ctx.verbose && !ctx.json_output {
                    let dim = Style::new().dim();
                    println!("{}", dim.apply_to(format!("  {:.1}s present", elapsed.as_secs_f64())));
                }
                if elapsed > deadline {
                    bail!(
                        "session {} outlived its eviction window ({:.1}s)",
                        session_id,
                        elapsed.as_secs_f64()
                    );
                }
            }
            Err(Error::NotFound(_)) => {
                if ctx.json_output {
                    let output = json!({
                        "session_id": session_id,
                        "expired_after_secs": elapsed.as_secs_f64(),
                        "ttl_secs": config.ttl.as_secs_f64(),
                        "sweep_interval_secs": config.sweep_interval.as_secs_f64(),
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                } else {
                    let green = Style::new().green();
                    println!(
                        "{}",
                        green.apply_to(format!(
                            "Session expired after {:.1}s",
                            elapsed.as_secs_f64()
                        ))
                    );
                }
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }
    }
}
