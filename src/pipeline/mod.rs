pub mod driver;
pub mod generator;
pub mod queue;
pub mod sample;
pub mod window;
