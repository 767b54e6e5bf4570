//! Scheduled rule evaluation and action dispatch.

mod controller;
mod engine;

pub use controller::{AutomationController, SchedulerConfig};
pub use engine::AutomationEngine;
