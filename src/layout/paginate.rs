use crate::config::LayoutConfig;
use crate::document::Document;
use crate::page::{LineLayout, Page};
use crate::units::Pt;
use id_arena::Id;

/// Where the next line will be drawn: a page in the document and the baseline
/// offset on it
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Cursor {
    pub page: Id<Page>,
    pub y: Pt,
}

/// Draws lines top to bottom, allocating a fresh page whenever the cursor has
/// dropped below the bottom margin. Every line advances the cursor by the same
/// line height regardless of its font size; callers add blank lines with
/// [`Paginator::advance`] for extra spacing.
pub struct Paginator<'c> {
    config: &'c LayoutConfig,
    document: Document,
    cursor: Cursor,
}

impl<'c> Paginator<'c> {
    /// Start a document with a single empty page
    pub fn new(config: &'c LayoutConfig) -> Paginator<'c> {
        let mut document = Document::default();
        let page = document.add_page(Page::new(config.page_size, &config.margins));
        let cursor = Cursor {
            page,
            y: Self::top(config),
        };

        Paginator {
            config,
            document,
            cursor,
        }
    }

    fn top(config: &LayoutConfig) -> Pt {
        config.page_size.1 - config.margins.top
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Draw `line` at the cursor, breaking to a new page first if the cursor is
    /// already below the bottom margin
    pub fn place(&mut self, line: &str, size: Pt, emphasis: bool, x: Pt) {
        if self.cursor.y < self.config.margins.bottom {
            self.break_page();
        }

        let layout = LineLayout {
            text: line.to_string(),
            size,
            emphasis,
            coords: (x, self.cursor.y),
        };
        // the cursor always points at a page this paginator allocated
        if let Some(page) = self.document.pages.get_mut(self.cursor.page) {
            page.add_line(layout);
        }

        self.cursor.y -= self.config.line_height;
    }

    /// Move the cursor down by `lines` blank lines. Never breaks the page itself;
    /// the next [`Paginator::place`] does if needed.
    pub fn advance(&mut self, lines: usize) {
        self.cursor.y -= self.config.line_height * lines as f32;
    }

    /// How many lines fit on one page when nothing but lines are placed
    pub fn lines_per_page(&self) -> usize {
        let span = Self::top(self.config) - self.config.margins.bottom;
        if span < Pt(0.0) {
            return 1;
        }
        (span / self.config.line_height).floor() as usize + 1
    }

    fn break_page(&mut self) {
        let page = self
            .document
            .add_page(Page::new(self.config.page_size, &self.config.margins));
        log::debug!(
            "page {} full, continuing on page {}",
            self.document.page_count() - 1,
            self.document.page_count()
        );
        self.cursor = Cursor {
            page,
            y: Self::top(self.config),
        };
    }

    /// Stop placing lines and hand over the finished document
    pub fn finish(self) -> Document {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Margins;
    use crate::pagesize::A4;

    fn all_lines(document: &Document) -> Vec<&LineLayout> {
        document.pages().flat_map(|page| page.lines.iter()).collect()
    }

    #[test]
    fn test_first_line_at_top_margin() {
        let config = LayoutConfig::default();
        let mut paginator = Paginator::new(&config);
        paginator.place("Отчет по угрозам безопасности", Pt(18.0), true, Pt(50.0));

        let document = paginator.finish();
        assert_eq!(document.page_count(), 1);
        let lines = all_lines(&document);
        assert_eq!(lines[0].coords, (Pt(50.0), Pt(792.0)));
        assert!(lines[0].emphasis);
    }

    #[test]
    fn test_fixed_line_height_independent_of_size() {
        let config = LayoutConfig::default();
        let mut paginator = Paginator::new(&config);
        paginator.place("big", Pt(18.0), true, Pt(50.0));
        paginator.place("small", Pt(8.0), false, Pt(50.0));
        paginator.advance(2);
        paginator.place("after", Pt(12.0), false, Pt(60.0));

        let document = paginator.finish();
        let ys: Vec<Pt> = all_lines(&document).iter().map(|l| l.coords.1).collect();
        assert_eq!(ys, vec![Pt(792.0), Pt(772.0), Pt(712.0)]);
    }

    #[test]
    fn test_lines_per_page_matches_default_geometry() {
        // baselines at 792, 772, ... down to 52 are all at or above the 50pt margin
        let config = LayoutConfig::default();
        assert_eq!(Paginator::new(&config).lines_per_page(), 38);
    }

    #[test]
    fn test_page_break_resets_cursor_to_top() {
        let config = LayoutConfig::default();
        let mut paginator = Paginator::new(&config);
        let per_page = paginator.lines_per_page();
        for i in 0..per_page {
            paginator.place(&format!("line {i}"), Pt(12.0), false, Pt(50.0));
        }
        let first_page = paginator.cursor().page;

        paginator.place("overflow", Pt(12.0), false, Pt(50.0));
        assert_ne!(paginator.cursor().page, first_page);
        assert_eq!(paginator.cursor().y, Pt(772.0));

        let document = paginator.finish();
        assert_eq!(document.page_count(), 2);
        let second = document.pages().nth(1).expect("second page");
        assert_eq!(second.text(), vec!["overflow"]);
        assert_eq!(second.lines[0].coords.1, Pt(792.0));
    }

    #[test]
    fn test_never_draws_below_bottom_margin() {
        let config = LayoutConfig::default().with_margins(Margins::trbl(
            Pt(30.0),
            Pt(40.0),
            Pt(70.0),
            Pt(40.0),
        ));
        let mut paginator = Paginator::new(&config);
        for i in 0..500 {
            paginator.place("x", Pt(12.0), false, Pt(40.0));
            if i % 7 == 0 {
                paginator.advance(i % 3);
            }
        }

        let document = paginator.finish();
        assert!(document.page_count() > 1);
        for line in all_lines(&document) {
            assert!(line.coords.1 >= config.margins.bottom, "{:?}", line);
            assert!(line.coords.1 <= A4.1 - config.margins.top);
        }
    }

    #[test]
    fn test_page_count_is_ceiling_of_content_height() {
        let config = LayoutConfig::default().with_line_height(Pt(14.0));
        for total in [1usize, 37, 38, 39, 76, 77, 200, 1000] {
            let mut paginator = Paginator::new(&config);
            let per_page = paginator.lines_per_page();
            for _ in 0..total {
                paginator.place("line", Pt(12.0), false, Pt(50.0));
            }
            let document = paginator.finish();

            let line_height = config.line_height.0;
            let content_height = total as f32 * line_height;
            let available_per_page = per_page as f32 * line_height;
            let expected = (content_height / available_per_page).ceil() as usize;
            assert_eq!(document.page_count(), expected, "{total} lines");
        }
    }

    #[test]
    fn test_blank_advance_past_bottom_breaks_on_next_place() {
        let config = LayoutConfig::default();
        let mut paginator = Paginator::new(&config);
        paginator.advance(100);
        assert_eq!(paginator.finish().page_count(), 1);

        let mut paginator = Paginator::new(&config);
        paginator.advance(100);
        paginator.place("next", Pt(12.0), false, Pt(50.0));
        let document = paginator.finish();
        assert_eq!(document.page_count(), 2);
        assert!(document.pages().next().expect("first page").lines.is_empty());
    }
}
