//! Application layer: the input façade, the scheduler, and timed automation.
//!
//! These types depend only on the infrastructure traits, never on a concrete
//! OS adapter, so every use case runs against the recording doubles in tests.

pub mod input_driver;
pub mod scheduler;
pub mod timed_task;

pub use input_driver::{DriverError, InputDriver};
pub use scheduler::{Scheduler, SchedulerConfig, SchedulerError};
pub use timed_task::TimedTaskPoller;
