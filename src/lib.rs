//! Gatepost - license activation and update distribution for commercial plugins
//!
//! Answers four questions for an installed plugin: is this key valid, may this
//! site activate it, is there a newer release, and can this site download it.
//! It also serves versioned prompt bundles from a key-value store.

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod id;
pub mod licensing;
pub mod models;
pub mod prompts;
pub mod storage;
pub mod version;
