//! # Pool de Workers
//!
//! Cola acotada de conexiones y el conjunto fijo de threads que la consume.
//!
//! ```text
//! Listener --push--> TaskQueue --pop--> worker-0..N --> handler
//! ```

pub mod queue;
pub mod worker;

pub use queue::{Closed, QueueStats, TaskQueue};
pub use worker::{current_worker_name, WorkerPool};
