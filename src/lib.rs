// ABOUTME: Library root for podexec - run commands in pod containers.
// ABOUTME: The CLI binary is in main.rs.

pub mod cluster;
pub mod config;
pub mod error;
pub mod exec;
