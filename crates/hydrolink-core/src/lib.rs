// hydrolink-core: Types, errors and configuration for the Hydrolink simulator bridge.

pub mod config;
pub mod error;
pub mod types;
