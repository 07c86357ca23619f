// src/constants.rs
//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role. Reading these constants should tell you the story of
//! how the system talks to the Notion API: how many blocks fit into one
//! request, how long it waits between files, how much of an error list
//! a summary shows.

// ---------------------------------------------------------------------------
// Notion API boundaries
// ---------------------------------------------------------------------------

/// Notion API version header value sent with every request.
pub const NOTION_VERSION: &str = "2022-06-28";

/// Base URL for all Notion API endpoints.
pub const API_BASE_URL: &str = "https://api.notion.com/v1";

/// Maximum number of blocks the Notion API accepts in a single
/// page-creation or append-children request.
///
/// Block sequences longer than this are split: the first 100 blocks ride
/// along with page creation, the remainder goes out in append batches.
pub const BLOCKS_PER_REQUEST: usize = 100;

/// Maximum number of rich-text spans a single block may carry.
///
/// Paragraphs exceeding this are split into multiple paragraph blocks
/// before upload.
pub const RICH_TEXT_SPANS_PER_BLOCK: usize = 100;

// ---------------------------------------------------------------------------
// Batch driver pacing
// ---------------------------------------------------------------------------

/// Fixed pause between consecutive file uploads in a batch run.
///
/// A simple fixed delay rather than adaptive backoff; adequate for the
/// API's observed rate limits when requests are strictly sequential.
pub const BATCH_REQUEST_DELAY_MS: u64 = 100;

/// How many files between progress log lines during a batch run.
pub const BATCH_PROGRESS_INTERVAL: usize = 5;

/// How many per-file errors a batch summary shows inline before
/// collapsing the rest into a count.
pub const SUMMARY_ERROR_PREVIEW: usize = 5;
