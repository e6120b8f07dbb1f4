pub mod config;
pub mod job;
