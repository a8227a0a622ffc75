use anyhow::{Result, anyhow};
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

const BOOTSTRAP_FILTER: &str = "info";

pub struct Logger {
    filter_handle: reload::Handle<EnvFilter, Registry>,
}

impl Logger {
    /// `RUST_LOG` if set, `info` otherwise, until [`Logger::apply`] is called.
    pub fn install() -> Self {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(BOOTSTRAP_FILTER));
        let (filter, filter_handle) = reload::Layer::new(filter);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();

        Self { filter_handle }
    }

    /// Swap in the `log.filter` directives from settings.
    pub fn apply(&self, directives: &str) -> Result<()> {
        let filter = parse_filter(directives)?;
        self.filter_handle.reload(filter).map_err(|e| anyhow!(e))
    }
}

fn parse_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives).map_err(|e| anyhow!("invalid log.filter {directives:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_settings_filters() {
        for directives in ["info", "boardsignal_auth=debug,info", "warn,warp=error"] {
            assert!(parse_filter(directives).is_ok(), "{directives}");
        }
    }

    #[test]
    fn rejects_malformed_filter() {
        assert!(parse_filter("boardsignal_auth=loud").is_err());
    }
}
