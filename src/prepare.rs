// src/prepare.rs
//! Block preparation and chunking.
//!
//! Two jobs happen between conversion and submission:
//!
//! 1. **Preparation** — strip styling annotations from code-block spans
//!    (the creation endpoint rejects them) and split paragraphs whose
//!    rich-text array exceeds the span limit into consecutive paragraphs.
//! 2. **Chunking** — partition the prepared sequence into the first
//!    request's `children` and zero or more append batches, because the
//!    API caps blocks per request at 100.
//!
//! Both are pure block-list transformations; no network here.

use crate::constants::{BLOCKS_PER_REQUEST, RICH_TEXT_SPANS_PER_BLOCK};
use crate::model::{Block, TextBlockContent};

/// A block sequence partitioned to fit the per-request cap.
///
/// Invariant: `first_chunk ++ extra_chunks.flatten()` reproduces the
/// prepared input exactly, and every slice holds at most
/// [`BLOCKS_PER_REQUEST`] blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedBlocks {
    pub first_chunk: Vec<Block>,
    pub extra_chunks: Vec<Vec<Block>>,
}

impl PreparedBlocks {
    /// Total number of blocks across all chunks.
    pub fn total_blocks(&self) -> usize {
        self.first_chunk.len() + self.extra_chunks.iter().map(Vec::len).sum::<usize>()
    }
}

/// Strips unsupported formatting and splits oversized paragraphs, then
/// partitions the result into request-sized chunks.
pub fn prepare_blocks(mut blocks: Vec<Block>) -> PreparedBlocks {
    strip_code_annotations(&mut blocks);
    let blocks = split_oversized_paragraphs(blocks);
    chunk_blocks(blocks)
}

/// Removes styling annotations from every span of every code block.
/// Non-code blocks are untouched.
pub fn strip_code_annotations(blocks: &mut [Block]) {
    for block in blocks {
        if let Block::Code(code) = block {
            for span in &mut code.rich_text {
                span.annotations = None;
            }
        }
    }
}

/// Replaces any paragraph whose span count exceeds the limit with a run
/// of paragraphs each carrying at most [`RICH_TEXT_SPANS_PER_BLOCK`]
/// spans, at the original position and in span order.
pub fn split_oversized_paragraphs(blocks: Vec<Block>) -> Vec<Block> {
    let mut result = Vec::with_capacity(blocks.len());

    for block in blocks {
        match block {
            Block::Paragraph(content) if content.rich_text.len() > RICH_TEXT_SPANS_PER_BLOCK => {
                log::debug!(
                    "Splitting paragraph with {} rich text spans",
                    content.rich_text.len()
                );
                let mut spans = content.rich_text;
                while !spans.is_empty() {
                    let rest = spans.split_off(spans.len().min(RICH_TEXT_SPANS_PER_BLOCK));
                    result.push(Block::Paragraph(TextBlockContent { rich_text: spans }));
                    spans = rest;
                }
            }
            other => result.push(other),
        }
    }

    result
}

/// Partitions blocks into the page-creation payload and follow-up
/// append batches.
pub fn chunk_blocks(mut blocks: Vec<Block>) -> PreparedBlocks {
    if blocks.len() <= BLOCKS_PER_REQUEST {
        return PreparedBlocks {
            first_chunk: blocks,
            extra_chunks: Vec::new(),
        };
    }

    let mut rest = blocks.split_off(BLOCKS_PER_REQUEST);
    let mut extra_chunks = Vec::new();
    while !rest.is_empty() {
        let tail = rest.split_off(rest.len().min(BLOCKS_PER_REQUEST));
        extra_chunks.push(rest);
        rest = tail;
    }

    log::debug!(
        "Blocks split into {} extra chunk(s) beyond the first {}",
        extra_chunks.len(),
        BLOCKS_PER_REQUEST
    );

    PreparedBlocks {
        first_chunk: blocks,
        extra_chunks,
    }
}
