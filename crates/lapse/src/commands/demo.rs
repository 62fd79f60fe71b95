//! Demo command - create a session, update it and read it back.

use anyhow::Result;
use clap::Args;
use console::Style;
use lapse_session::SessionData;
use serde_json::json;
use tracing::info;

use super::{Context, StoreArgs};

/// Arguments for the demo command.
#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Value stored under the `website` key
    #[arg(long, default_value = "example.org")]
    pub website: String,

    #[command(flatten)]
    pub store: StoreArgs,
}

/// Run the demo command.
pub async fn run(args: DemoArgs, ctx: &Context) -> Result<()> {
    let store = args.store.open_store(ctx)?;

    let session_id = store.create()?;
    info!(session_id = %session_id, "Created new session");

    let mut data = SessionData::new();
    data.insert("website".to_string(), json!(args.website));
    store.update(&session_id, data)?;
    info!(website = %args.website, "Updated session data");

    let stored = store.get(&session_id)?;

    if ctx.json_output {
        let output = json!({
            "session_id": session_id,
            "data": stored,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let dim = Style::new().dim();
        let green = Style::new().green();
        println!();
        println!("  {} {}", dim.apply_to("Session:"), session_id);
        println!(
            "  {} {}",
            dim.apply_to("Data:   "),
            green.apply_to(serde_json::Value::Object(stored))
        );
        println!();
    }

    Ok(())
}
