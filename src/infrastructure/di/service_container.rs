//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::{
    ApplicationService, CompanyService, IdentityService, InternshipService, ReportService,
    WorkshopService,
};
use crate::application::{seed_demo_data, ApplicationResult, DemoIds, Statistics};
use crate::config::Settings;
use crate::infrastructure::traits::{Clock, InMemoryRepository, Repository, SystemClock};

/// Container holding all application services.
///
/// Every service shares the same repository and clock.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Entity store
    pub repo: Arc<dyn Repository>,

    /// Time source
    pub clock: Arc<dyn Clock>,

    pub identity: IdentityService,
    pub companies: CompanyService,
    pub internships: InternshipService,
    pub applications: ApplicationService,
    pub reports: ReportService,
    pub workshops: WorkshopService,
}

impl ServiceContainer {
    /// Create a new service container with an in-memory store and the wall clock.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(
            settings,
            Arc::new(InMemoryRepository::new()),
            Arc::new(SystemClock),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, repo: Arc<dyn Repository>, clock: Arc<dyn Clock>) -> Self {
        let settings = Arc::new(settings);

        Self {
            identity: IdentityService::new(repo.clone(), clock.clone(), settings.min_password_len),
            companies: CompanyService::new(repo.clone(), clock.clone()),
            internships: InternshipService::new(repo.clone(), clock.clone()),
            applications: ApplicationService::new(repo.clone(), clock.clone()),
            reports: ReportService::new(repo.clone(), clock.clone()),
            workshops: WorkshopService::new(repo.clone(), clock.clone()),
            settings,
            repo,
            clock,
        }
    }

    /// Load the demo dataset if `seed_demo_data` is enabled.
    pub fn seed(&self) -> ApplicationResult<Option<DemoIds>> {
        if !self.settings.seed_demo_data {
            debug!("seeding disabled");
            return Ok(None);
        }
        seed_demo_data(
            self.repo.clone(),
            self.clock.clone(),
            self.settings.min_password_len,
        )
        .map(Some)
    }

    /// Snapshot statistics of the current store.
    pub fn statistics(&self) -> Statistics {
        Statistics::collect(
            self.repo.as_ref(),
            self.clock.now(),
            self.settings.top_companies,
        )
    }
}
