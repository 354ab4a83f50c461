//! Entry-page markup extraction.
//!
//! Submodules split the work the way it flows: `entry` rewrites the entry
//! URL to its raw form, `page` locates the bucket/region/object elements in
//! the fetched document, and `path` reassembles the object key from the
//! classified inline nodes. `path` is the only piece with real logic and is
//! deliberately free of any HTML dependency so it can be tested on plain
//! node sequences.

pub mod entry;
pub mod page;
pub mod path;

pub use entry::to_raw_url;
pub use page::{extract_object_details, ObjectDetails};
pub use path::{reconstruct_path, InlineNode, NodeRole};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// One of the required entry-page elements could not be located.
    #[error("missing required field in entry markup: {0}")]
    MissingRequiredField(&'static str),
    #[error("invalid entry URL: {0}")]
    EntryUrl(String),
}
