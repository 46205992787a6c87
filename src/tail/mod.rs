pub mod config;
pub mod error;
pub mod orchestrator;
pub mod processor;
pub mod selector;

pub use config::{TailConfig, WindowStrategy};
pub use orchestrator::{MultiTail, Source, TailReport};
