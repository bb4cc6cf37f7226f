pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod session;

pub use error::{Result, TelemetryError};
pub use pipeline::driver::run_cycle;
pub use pipeline::queue::{double_buffered, QueueConsumer, QueueProducer};
pub use pipeline::sample::Sample;
pub use pipeline::window::{SlidingWindow, VisibleRange, WindowEntry};
