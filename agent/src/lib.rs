pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod telemetry;

pub use bootstrap::{Agent, WhitelistContext};
pub use config::AgentConfig;
