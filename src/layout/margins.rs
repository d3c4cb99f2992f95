use crate::units::Pt;
use serde::Deserialize;

/// Margins are used when laying out lines on a page: the paginator starts each
/// page at the top margin and never draws below the bottom margin. They are also
/// applied to [`Page`](crate::Page)s to determine the `ArtBox` of each page in the
/// generated PDF
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct Margins {
    pub top: Pt,
    pub right: Pt,
    pub bottom: Pt,
    pub left: Pt,
}

impl Margins {
    /// Create margins by specifying individual components in a clockwise fashion
    /// starting at the top (in the same order as CSS margins)
    pub fn trbl(top: Pt, right: Pt, bottom: Pt, left: Pt) -> Margins {
        Margins {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Create margins where all values are equal
    pub fn all<D: Into<Pt>>(value: D) -> Margins {
        let value: Pt = value.into();
        Margins {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Create margins by specifying different values for vertical (top and bottom)
    /// and horizontal (left and right) margins
    pub fn symmetric(vertical: Pt, horizontal: Pt) -> Margins {
        Margins {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(Margins::all(Pt(50.0)), Margins::symmetric(Pt(50.0), Pt(50.0)));
        let m = Margins::trbl(Pt(1.0), Pt(2.0), Pt(3.0), Pt(4.0));
        assert_eq!((m.top, m.right, m.bottom, m.left), (Pt(1.0), Pt(2.0), Pt(3.0), Pt(4.0)));
    }

    #[test]
    fn test_deserialize() {
        let m: Margins =
            serde_json::from_str(r#"{"top": 40, "right": 30, "bottom": 40, "left": 30}"#)
                .expect("margins parse");
        assert_eq!(m, Margins::symmetric(Pt(40.0), Pt(30.0)));
    }
}
