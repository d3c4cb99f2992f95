//! Producing the final PDF artifact for an export request.

use crate::catalog::Catalog;
use crate::compose::compose;
use crate::config::LayoutConfig;
use crate::error::{FontLoadError, ReportError, Result};
use crate::font::TypefaceCache;
use crate::request::ExportRequest;
use std::path::{Path, PathBuf};

/// A finished report, ready to be saved or handed to whoever asked for it
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

impl Artifact {
    /// Save the report into `dir` under its file name, returning the full path
    pub fn write_to_dir<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        log::info!("wrote {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Turns export requests into PDF artifacts. The typeface is loaded on the
/// first export and shared by every export after it.
#[derive(Debug)]
pub struct Exporter {
    config: LayoutConfig,
    typeface: TypefaceCache,
}

impl Exporter {
    pub fn new(config: LayoutConfig) -> Result<Exporter> {
        config.validate()?;
        Ok(Exporter {
            config,
            typeface: TypefaceCache::new(),
        })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn typeface(&self) -> &TypefaceCache {
        &self.typeface
    }

    /// Compose and render the report for `request`. `fetch` supplies the
    /// typeface bytes and is only called while no typeface has loaded yet.
    pub fn export<F>(&self, catalog: &Catalog, request: &ExportRequest, fetch: F) -> Result<Artifact>
    where
        F: FnOnce() -> std::result::Result<Vec<u8>, FontLoadError>,
    {
        if request.selection().is_empty() {
            return Err(ReportError::EmptySelection);
        }

        let font = self.typeface.get_or_load(fetch)?;
        let document = compose(catalog, request, &self.config, font.as_ref())?;
        let bytes = document.render(&font)?;

        let artifact = Artifact {
            file_name: request.file_name(),
            bytes,
            page_count: document.page_count(),
        };
        log::info!(
            "exported {} ({} pages, {} bytes)",
            artifact.file_name,
            artifact.page_count,
            artifact.bytes.len()
        );
        Ok(artifact)
    }

    /// [Exporter::export] with the typeface read from a font file on disk
    pub fn export_with_font_file<P: AsRef<Path>>(
        &self,
        catalog: &Catalog,
        request: &ExportRequest,
        font_path: P,
    ) -> Result<Artifact> {
        let path = font_path.as_ref();
        self.export(catalog, request, || {
            log::debug!("reading typeface from {}", path.display());
            std::fs::read(path).map_err(FontLoadError::from)
        })
    }
}
