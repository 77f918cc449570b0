//! Infrastructure layer: storage, time, wiring and file export

pub mod di;
pub mod error;
pub mod export;
pub mod traits;

pub use di::ServiceContainer;
pub use error::{InfraError, InfraResult};
