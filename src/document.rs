use crate::{
    error::{ReportError, Result},
    font::Font,
    info::Info,
    page::Page,
    refs::{ObjectReferences, RefType},
};
use id_arena::{Arena, Id};
use pdf_writer::{Pdf, Ref};
use std::io::Write;

#[derive(Default, Debug)]
/// A laid out report: its pages in reading order plus optional metadata. The
/// document is rendered to PDF with a call to [Document::write]
pub struct Document {
    pub info: Option<Info>,
    pub pages: Arena<Page>,
    pub page_order: Vec<Id<Page>>,
}

impl Document {
    /// Sets information about the document. If not provided, no information block will be
    /// written to the PDF
    pub fn set_info(&mut self, info: Info) {
        self.info = Some(info);
    }

    /// Add a page to the end of the document, returning its id
    pub fn add_page(&mut self, page: Page) -> Id<Page> {
        let id = self.pages.alloc(page);
        self.page_order.push(id);
        id
    }

    pub fn page_count(&self) -> usize {
        self.page_order.len()
    }

    /// The pages in reading order
    pub fn pages(&self) -> impl Iterator<Item = &Page> + '_ {
        self.page_order.iter().filter_map(|id| self.pages.get(*id))
    }

    /// Write the entire document to the writer, embedding `font` as the one font
    /// every line is drawn with. The whole PDF is rendered in memory first, so
    /// nothing reaches `w` unless rendering succeeded.
    pub fn write<W: Write>(&self, font: &Font, mut w: W) -> Result<()> {
        let bytes = self.render(font)?;
        w.write_all(bytes.as_slice()).map_err(Into::into)
    }

    /// Render the document into PDF bytes
    pub fn render(&self, font: &Font) -> Result<Vec<u8>> {
        let mut refs = ObjectReferences::new();

        let catalog_id = refs.gen(RefType::Catalog);
        let page_tree_id = refs.gen(RefType::PageTree);

        let mut writer = Pdf::new();
        if let Some(info) = &self.info {
            info.write(&mut refs, &mut writer);
        }

        let page_refs: Vec<Ref> = (0..self.page_order.len())
            .map(|i| refs.gen(RefType::Page(i)))
            .collect();

        writer
            .pages(page_tree_id)
            .count(page_refs.len() as i32)
            .kids(page_refs);

        font.write(&mut refs, &mut writer)?;

        for (page_index, id) in self.page_order.iter().enumerate() {
            let page = self.pages.get(*id).ok_or_else(|| {
                ReportError::Rendering(format!("page {page_index} is missing from the document"))
            })?;
            page.write(&mut refs, page_index, font, &mut writer)?;
        }

        writer.catalog(catalog_id).pages(page_tree_id);

        Ok(writer.finish())
    }
}
