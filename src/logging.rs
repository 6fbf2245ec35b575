//! Tracing subscriber setup for the gossip binary

use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Install the global subscriber.
///
/// `level` is the default directive; `RUST_LOG` still wins for any target it
/// names. Returns an error if a subscriber is already installed or `level`
/// does not parse.
pub fn init_logging(level: &str, json: bool) -> anyhow::Result<()> {
    let default: LevelFilter = level.parse()?;
    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).try_init()?;
    } else {
        registry.with(fmt::layer()).try_init()?;
    }
    Ok(())
}
