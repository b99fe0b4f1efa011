//! TripNow Risk Worker
//!
//! The [`RiskResolver`] turns one pending reservation into a decision; the
//! [`RiskPoller`] drives it over every pending reservation on a fixed
//! interval until shut down.

pub mod error;
pub mod metrics;
pub mod poller;
pub mod resolver;

pub use error::{WorkerError, WorkerResult};
pub use metrics::{PollerMetrics, PollerMetricsSnapshot};
pub use poller::{CycleReport, PollerHandle, RiskPoller};
pub use resolver::RiskResolver;
