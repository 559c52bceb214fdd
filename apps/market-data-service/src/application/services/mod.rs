//! Application services.

mod refresh_scheduler;

pub use refresh_scheduler::{
    ControlOutcome, RefreshScheduler, ScheduledSource, SchedulerStatus, SourceFreshness,
};
