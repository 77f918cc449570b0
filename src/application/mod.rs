//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic and depends on the storage and clock
//! boundary traits.

pub mod error;
pub mod seed;
pub mod services;
pub mod statistics;

pub use error::{ApplicationError, ApplicationResult};
pub use seed::{seed_demo_data, DemoIds, DEMO_PASSWORD};
pub use statistics::Statistics;
