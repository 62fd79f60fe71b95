//! CLI command handlers.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use lapse_config::LapseConfig;
use lapse_session::{ExpiryPolicy, SessionStore, StoreConfig};

pub mod config;
pub mod demo;
pub mod watch;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Resolved configuration.
    pub config: LapseConfig,
    /// Config files the configuration was loaded from.
    pub sources: Vec<PathBuf>,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

/// Store settings that override the config file for a single run.
#[derive(Args, Debug, Default)]
pub struct StoreArgs {
    /// Session TTL in seconds
    #[arg(long)]
    pub ttl_secs: Option<u64>,

    /// Seconds between background sweeps
    #[arg(long)]
    pub sweep_interval_secs: Option<u64>,

    /// Treat sessions as gone the moment their TTL elapses
    #[arg(long)]
    pub logical: bool,
}

impl StoreArgs {
    /// Layer these arguments over the configured session settings.
    ///
    /// The combined values go through the same validation as the config
    /// file.
    pub fn store_config(&self, ctx: &Context) -> Result<StoreConfig> {
        let mut session = ctx.config.session();
        if let Some(secs) = self.ttl_secs {
            session.ttl_secs = secs;
        }
        if let Some(secs) = self.sweep_interval_secs {
            session.sweep_interval_secs = secs;
        }
        if self.logical {
            session.expiry = ExpiryPolicy::Logical;
        }
        session.validate()?;
        Ok(StoreConfig::from_settings(&session))
    }

    /// Start a store with the layered settings.
    pub fn open_store(&self, ctx: &Context) -> Result<SessionStore> {
        Ok(SessionStore::new(self.store_config(ctx)?)?)
    }
}
