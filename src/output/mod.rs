// src/output/mod.rs
//! User-facing output concerns beyond logging.

pub mod clipboard;
