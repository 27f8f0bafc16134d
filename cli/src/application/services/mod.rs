//! Application services: use-case orchestration over port traits.

pub mod acquire;
pub mod artifact;
pub mod build;
pub mod download;
pub mod host;
pub mod install;
pub mod service;
pub mod source;
