pub mod banner;
pub mod config;
pub mod consts;
pub mod decider;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod pipeline;
pub mod prompts;
pub mod report;
pub mod server;
pub mod units;
