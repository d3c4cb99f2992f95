//! Threat catalog reports rendered to paginated PDF documents.
//!
//! A [Catalog] of threats is turned into a report by [compose], which lays the
//! selected threats out line by line over fixed size pages, and an [Exporter],
//! which renders the result with an embedded TrueType font.

mod catalog;
pub use catalog::*;

mod compose;
pub use compose::*;

mod config;
pub use config::*;

mod content;

mod document;
pub use document::*;

mod error;
pub use error::*;

mod export;
pub use export::*;

mod font;
pub use font::*;

mod info;
pub use info::*;

/// Line wrapping and pagination
pub mod layout;

mod page;
pub use page::*;

/// Common page dimensions
pub mod pagesize;

mod rect;
pub use rect::*;

pub(crate) mod refs;

mod request;
pub use request::*;

mod units;
pub use units::*;

/// Re-export PDF-writer functionality
pub use pdf_writer;
