use crate::content::render_lines;
use crate::error::{ReportError, Result};
use crate::font::Font;
use crate::layout::Margins;
use crate::pagesize::PageSize;
use crate::rect::Rect;
use crate::refs::{ObjectReferences, RefType};
use crate::units::*;
use pdf_writer::{Filter, Finish, Name, Pdf};

/// A line of text positioned on a page. `coords` is the left end of the baseline.
#[derive(Clone, PartialEq, Debug)]
pub struct LineLayout {
    pub text: String,
    pub size: Pt,
    pub emphasis: bool,
    pub coords: (Pt, Pt),
}

/// A fixed-size page holding the lines drawn on it, in drawing order
#[derive(Clone, Debug)]
pub struct Page {
    /// The size of the page
    pub media_box: Rect,
    /// Where content can live, i.e. within the margins
    pub content_box: Rect,
    /// The laid out lines
    pub lines: Vec<LineLayout>,
}

impl Page {
    pub fn new(size: PageSize, margins: &Margins) -> Page {
        Page {
            media_box: Rect {
                x1: Pt(0.0),
                y1: Pt(0.0),
                x2: size.0,
                y2: size.1,
            },
            content_box: Rect {
                x1: margins.left,
                y1: margins.bottom,
                x2: size.0 - margins.right,
                y2: size.1 - margins.top,
            },
            lines: Vec::default(),
        }
    }

    pub fn add_line(&mut self, line: LineLayout) {
        self.lines.push(line);
    }

    /// The text of every line on the page, top to bottom
    pub fn text(&self) -> Vec<&str> {
        self.lines.iter().map(|line| line.text.as_str()).collect()
    }

    pub(crate) fn write(
        &self,
        refs: &mut ObjectReferences,
        page_index: usize,
        font: &Font,
        writer: &mut Pdf,
    ) -> Result<()> {
        let missing = |what: &str| ReportError::Rendering(format!("{what} was not allocated"));
        let id = refs
            .get(RefType::Page(page_index))
            .ok_or_else(|| missing("page reference"))?;
        let page_tree_id = refs
            .get(RefType::PageTree)
            .ok_or_else(|| missing("page tree"))?;
        let font_id = refs.get(RefType::Font).ok_or_else(|| missing("font"))?;
        let content_id = refs.gen(RefType::ContentForPage(page_index));

        let mut page = writer.page(id);
        page.media_box(self.media_box.into());
        page.art_box(self.content_box.into());
        page.parent(page_tree_id);

        let mut resources = page.resources();
        resources.fonts().pair(Name(b"F0"), font_id);
        resources.finish();

        page.contents(content_id);
        page.finish();

        let rendered = render_lines(&self.lines, font)?;
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(
            rendered.as_slice(),
            miniz_oxide::deflate::CompressionLevel::DefaultCompression as u8,
        );
        writer
            .stream(content_id, compressed.as_slice())
            .filter(Filter::FlateDecode);

        Ok(())
    }
}
