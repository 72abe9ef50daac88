//! Subscriber setup: human-readable output in development, JSON lines in production.

use mirror_core::MirrorConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(cfg: &MirrorConfig) -> &'static str {
    if cfg.is_production() {
        "info,tower_http=info"
    } else {
        "debug,hyper=info,reqwest=info"
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logging(cfg: &MirrorConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(cfg).into());
    let registry = tracing_subscriber::registry().with(filter);
    if cfg.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_is_quieter() {
        let mut cfg = MirrorConfig::default();
        assert!(default_filter(&cfg).starts_with("debug"));
        cfg.environment = "production".into();
        assert!(default_filter(&cfg).starts_with("info"));
    }
}
