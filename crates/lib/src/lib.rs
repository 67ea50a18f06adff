//! distbump-lib: Core types and logic for distbump
//!
//! This crate maintains the prebuilt-artifact manifest of a release:
//! - `manifest`: lossless line model of `sys/dist.txt`
//! - `refresh`: re-tag the manifest and recompute artifact digests and sizes
//! - `fetch` / `cache`: artifact download and the resumable scratch directory
//! - `version`: semantic version bumping of Cargo manifests

pub mod cache;
pub mod consts;
pub mod fetch;
pub mod manifest;
pub mod platform;
pub mod refresh;
pub mod util;
pub mod version;
