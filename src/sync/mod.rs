pub mod orchestrator;
pub mod schedule;
pub mod scheduler;
pub mod throttle;
