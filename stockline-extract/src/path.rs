//! Object-key reconstruction from classified inline markup nodes.
//!
//! The entry page encodes the object key as a run of `<span>` elements, each
//! carrying either a path component or the delimiter between two components.
//! [`reconstruct_path`] walks that run left to right and reassembles the key.
//!
//! The keep/discard rule is intentionally literal: a segment with no
//! immediately-following separator is dropped unless it is the final node.
//! Real entry pages only produce that shape when the markup is malformed
//! (two segments back to back), and dropping the ambiguous one matches the
//! behavior downstream consumers rely on. Resist the urge to make this a
//! smarter path joiner.

/// Classification of one inline node, assigned during markup extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    /// One component of the key (a folder or file name).
    Segment,
    /// The delimiter between two components.
    Separator,
    /// Anything else; contributes nothing to the output.
    Other,
}

/// A classified text-bearing node. `text` is raw, pre-trim; order within the
/// sequence is what encodes the left-to-right reading of the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineNode {
    pub role: NodeRole,
    pub text: String,
}

impl InlineNode {
    pub fn segment(text: impl Into<String>) -> Self {
        Self {
            role: NodeRole::Segment,
            text: text.into(),
        }
    }

    pub fn separator(text: impl Into<String>) -> Self {
        Self {
            role: NodeRole::Separator,
            text: text.into(),
        }
    }

    pub fn other(text: impl Into<String>) -> Self {
        Self {
            role: NodeRole::Other,
            text: text.into(),
        }
    }
}

/// Substituted for a separator whose text is empty after trimming.
const DEFAULT_SEPARATOR: &str = "/";

/// Reassemble an object key from an ordered node sequence.
///
/// Single left-to-right pass, no backtracking. Total over its input: never
/// fails, and an empty sequence yields an empty string.
///
/// - A separator contributes its trimmed text, or `"/"` when that is empty.
/// - A segment immediately followed by a separator contributes both (cursor
///   advances past the pair so the separator is not reprocessed).
/// - A trailing segment with nothing after it is kept.
/// - Any other segment is discarded. The lookahead checks only the
///   *immediate* next node, so a `Other` node wedged between a segment and
///   its separator still discards the segment.
pub fn reconstruct_path(nodes: &[InlineNode]) -> String {
    let mut parts: Vec<&str> = Vec::new();
    let mut i = 0;

    while i < nodes.len() {
        match nodes[i].role {
            NodeRole::Separator => {
                parts.push(separator_or_default(&nodes[i]));
                i += 1;
            }
            NodeRole::Segment => {
                let followed_by_separator = nodes
                    .get(i + 1)
                    .is_some_and(|next| next.role == NodeRole::Separator);
                if followed_by_separator {
                    parts.push(nodes[i].text.trim());
                    parts.push(separator_or_default(&nodes[i + 1]));
                    i += 2;
                } else if i == nodes.len() - 1 {
                    // Trailing segment with no separator after it.
                    parts.push(nodes[i].text.trim());
                    i += 1;
                } else {
                    // Segment adjacent to a non-separator: malformed markup, drop it.
                    i += 1;
                }
            }
            NodeRole::Other => {
                i += 1;
            }
        }
    }

    parts.concat()
}

fn separator_or_default(node: &InlineNode) -> &str {
    let trimmed = node.text.trim();
    if trimmed.is_empty() {
        DEFAULT_SEPARATOR
    } else {
        trimmed
    }
}
