//! # routewatch-ingest
//!
//! Everything between the external event source and the core: raw record
//! validation, the reconnecting ingestion loop, typed subscriber fan-out,
//! the periodic eviction, safety-sampling and metrics loops, and service
//! assembly from a validated config.

pub mod backoff;
pub mod boundary;
pub mod fanout;
pub mod maintenance;
pub mod pipeline;
pub mod service;
pub mod shutdown;
pub mod source;

pub use backoff::Backoff;
pub use boundary::RawForwardingRecord;
pub use fanout::Fanout;
pub use pipeline::IngestionPipeline;
pub use service::{Collaborators, RoutewatchService};
pub use shutdown::{shutdown_channel, Shutdown, ShutdownTrigger};
pub use source::IEventSource;
