// src/model/mod.rs
//! Outbound domain model — the blocks and page bodies the upload
//! pipeline sends to the API.

mod block;

pub use block::{Block, CodeContent, TextBlockContent};
