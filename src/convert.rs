// src/convert.rs
//! Markdown → block conversion seam.
//!
//! Full markdown conversion is a collaborator concern: the pipeline only
//! depends on the [`MarkdownConverter`] trait and builds its chunking and
//! submission logic on top of whatever block sequence comes back. The
//! bundled [`BasicConverter`] covers the common note shapes (paragraphs,
//! fenced code, images) so the binary works out of the box; a richer
//! converter can be substituted without touching the pipeline.

use crate::error::AppError;
use crate::model::Block;
use crate::types::RichTextItem;
use url::Url;

/// Options the pipeline passes down to the converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    /// Require external image URLs to parse as absolute URLs; lines that
    /// fail validation degrade to plain paragraphs instead of image blocks.
    pub strict_image_urls: bool,
    /// Allow the converter to truncate overlong content. The pipeline
    /// always disables this: splitting is the block preparer's job.
    pub truncate: bool,
}

/// The ability to turn a note body into a block sequence.
pub trait MarkdownConverter: Send + Sync {
    fn convert(&self, markdown: &str, options: &ConvertOptions) -> Result<Vec<Block>, AppError>;
}

/// Minimal built-in converter: blank-line separated paragraphs, fenced
/// code blocks, and standalone image lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicConverter;

impl MarkdownConverter for BasicConverter {
    fn convert(&self, markdown: &str, options: &ConvertOptions) -> Result<Vec<Block>, AppError> {
        let mut blocks = Vec::new();
        let mut paragraph_lines: Vec<&str> = Vec::new();
        let mut code_lines: Vec<&str> = Vec::new();
        let mut code_language: Option<String> = None;

        let flush_paragraph = |lines: &mut Vec<&str>, blocks: &mut Vec<Block>| {
            if lines.is_empty() {
                return;
            }
            let text = lines.join("\n");
            lines.clear();
            blocks.push(Block::paragraph(vec![RichTextItem::plain(text)]));
        };

        for line in markdown.lines() {
            if let Some(language) = code_language.as_ref() {
                if line.trim_start().starts_with("```") {
                    blocks.push(Block::code(
                        vec![RichTextItem::plain(code_lines.join("\n"))],
                        language.clone(),
                    ));
                    code_lines.clear();
                    code_language = None;
                } else {
                    code_lines.push(line);
                }
                continue;
            }

            if let Some(fence_rest) = line.trim_start().strip_prefix("```") {
                flush_paragraph(&mut paragraph_lines, &mut blocks);
                let language = fence_rest.trim();
                code_language = Some(if language.is_empty() {
                    "plain text".to_string()
                } else {
                    language.to_string()
                });
                continue;
            }

            if line.trim().is_empty() {
                flush_paragraph(&mut paragraph_lines, &mut blocks);
                continue;
            }

            if let Some(block) = image_block(line, options) {
                flush_paragraph(&mut paragraph_lines, &mut blocks);
                blocks.push(block);
                continue;
            }

            paragraph_lines.push(line);
        }

        // Unterminated fence: treat the remainder as code rather than dropping it.
        if let Some(language) = code_language {
            blocks.push(Block::code(
                vec![RichTextItem::plain(code_lines.join("\n"))],
                language,
            ));
        }
        flush_paragraph(&mut paragraph_lines, &mut blocks);

        log::debug!(
            "Converted markdown to {} blocks (first kinds: {:?})",
            blocks.len(),
            blocks.iter().take(5).map(Block::kind).collect::<Vec<_>>()
        );

        Ok(blocks)
    }
}

/// Parses a standalone `![alt](url)` line into an external image block.
fn image_block(line: &str, options: &ConvertOptions) -> Option<Block> {
    let trimmed = line.trim();
    let rest = trimmed.strip_prefix("![")?;
    let (_, after_alt) = rest.split_once("](")?;
    let url = after_alt.strip_suffix(')')?;

    if options.strict_image_urls && Url::parse(url).is_err() {
        log::warn!("Rejecting image with unparseable URL: {}", url);
        return None;
    }

    Some(Block::Other(serde_json::json!({
        "object": "block",
        "type": "image",
        "image": {
            "type": "external",
            "external": { "url": url }
        }
    })))
}
