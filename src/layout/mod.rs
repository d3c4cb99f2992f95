//! Positioning report lines on pages.
//!
//! [wrap_text] breaks a run of text into lines no wider than a given width,
//! measured through the [Measure] trait so layout can be exercised without a
//! real font. A [Paginator] then places those lines top to bottom, starting a
//! new page whenever the cursor drops below the bottom margin.
//!
//! # Example
//!
//! ```
//! use threat_report::layout::{wrap_text, Measure, Paginator};
//! use threat_report::{LayoutConfig, Pt};
//!
//! struct Monospace;
//!
//! impl Measure for Monospace {
//!     fn width_of(&self, text: &str, size: Pt) -> Pt {
//!         Pt(text.chars().count() as f32 * size.0 * 0.6)
//!     }
//! }
//!
//! let config = LayoutConfig::default();
//! let mut paginator = Paginator::new(&config);
//! for line in wrap_text("Hello, world!", config.max_width, config.body_size, &Monospace) {
//!     paginator.place(&line, config.body_size, false, config.margins.left);
//! }
//! let document = paginator.finish();
//! assert_eq!(document.page_count(), 1);
//! ```

mod margins;
mod paginate;
mod text;

pub use margins::*;
pub use paginate::*;
pub use text::*;
