//! Pre-defined page sizes for the paper formats reports are printed on.
//!
//! All sizes are (width, height) in portrait orientation.

use crate::units::*;

/// Page dimensions as (width, height) in points.
pub type PageSize = (Pt, Pt);

/// ISO A4 rounded to whole points, the size the catalog viewer has always produced
pub const A4: PageSize = (Pt(595.0), Pt(842.0));
pub const A5: PageSize = (Pt(420.0), Pt(595.0));
pub const LETTER: PageSize = (Pt(8.5 * 72.0), Pt(11.0 * 72.0));
pub const LEGAL: PageSize = (Pt(8.5 * 72.0), Pt(14.0 * 72.0));

/// Look up a page size by its common name, ignoring case
pub fn by_name(name: &str) -> Option<PageSize> {
    match name.to_ascii_lowercase().as_str() {
        "a4" => Some(A4),
        "a5" => Some(A5),
        "letter" => Some(LETTER),
        "legal" => Some(LEGAL),
        _ => None,
    }
}
