pub mod annotate;
pub mod export;
pub mod log;
pub mod report;
pub mod timer;
pub mod timer_store;
