//! Test support: logging setup and throwaway configuration.

use std::path::Path;
use std::sync::Once;

use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::config::{NavigationConfig, Settings};

static TEST_SETUP: Once = Once::new();

/// Install a global tracing subscriber once per test binary.
///
/// `RUST_LOG` wins; the default is `marktree=debug`.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("marktree=debug"));

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_test_writer()
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_filter(env_filter),
        );

        if tracing::dispatcher::has_been_set() {
            return;
        }
        if let Err(e) = subscriber.try_init() {
            eprintln!("Error: Failed to set up logging: {}", e);
        }
        info!("Test Setup complete");
    });
}

/// Settings whose store lives in `dir`.
pub fn settings_in(dir: &Path, wraparound: bool) -> Settings {
    Settings {
        store_path: dir.join("bookmarks.json"),
        navigation: NavigationConfig { wraparound },
        ..Settings::default()
    }
}
