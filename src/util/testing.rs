//! Test support: logging setup and a seeded service container.

use std::sync::{Arc, Once};

use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::DemoIds;
use crate::config::Settings;
use crate::infrastructure::traits::{FixedClock, InMemoryRepository};
use crate::infrastructure::ServiceContainer;

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Instant every test clock is frozen at: 2024-03-01 09:00 UTC.
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Container over an empty in-memory store and a frozen clock.
pub fn empty_container() -> ServiceContainer {
    init_test_setup();
    let settings = Settings {
        seed_demo_data: false,
        ..Settings::default()
    };
    ServiceContainer::with_deps(
        settings,
        Arc::new(InMemoryRepository::new()),
        Arc::new(FixedClock(test_now())),
    )
}

/// Container with the demo dataset loaded.
pub fn seeded_container() -> (ServiceContainer, DemoIds) {
    init_test_setup();
    let container = ServiceContainer::with_deps(
        Settings::default(),
        Arc::new(InMemoryRepository::new()),
        Arc::new(FixedClock(test_now())),
    );
    let ids = match container.seed() {
        Ok(Some(ids)) => ids,
        Ok(None) => panic!("seeding is enabled by default"),
        Err(e) => panic!("demo data must seed cleanly: {e}"),
    };
    (container, ids)
}
