//! Sentry and tracing setup.
//!
//! Sentry must be initialized before the subscriber so that the Sentry
//! tracing layer has a client to report to.

use std::borrow::Cow;

use sentry::integrations::tracing::{self as sentry_tracing, EventFilter};
use tracing::{Level, Metadata};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::StorefrontConfig;

/// Used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "boutique_storefront=info,tower_http=debug";

/// Start the Sentry client. `None` when no DSN is configured; the guard must
/// live until shutdown or buffered events are lost.
#[must_use]
pub fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config.sentry_environment.clone().map(Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));
    Some(guard)
}

/// Install the global subscriber: env filter, fmt output, Sentry forwarding.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

/// Warnings and errors become Sentry events, info and debug become breadcrumbs.
fn sentry_event_filter(metadata: &Metadata<'_>) -> EventFilter {
    level_filter(*metadata.level())
}

fn level_filter(level: Level) -> EventFilter {
    match level {
        Level::ERROR | Level::WARN => EventFilter::Event,
        Level::INFO | Level::DEBUG => EventFilter::Breadcrumb,
        Level::TRACE => EventFilter::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter() {
        assert_eq!(level_filter(Level::ERROR).bits(), EventFilter::Event.bits());
        assert_eq!(level_filter(Level::WARN).bits(), EventFilter::Event.bits());
        assert_eq!(level_filter(Level::INFO).bits(), EventFilter::Breadcrumb.bits());
        assert_eq!(level_filter(Level::TRACE).bits(), EventFilter::Ignore.bits());
    }

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }
}
