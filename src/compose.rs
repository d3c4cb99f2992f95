//! Turns a threat selection into a laid out report.
//!
//! Composition happens in two passes. [outline] walks the catalog and produces
//! the ordered [Block]s of the report: headings, bullet lines and blank-line
//! spacing. [layout] then wraps every text block to the line width and hands the
//! lines to a [Paginator]. [compose] runs both and attaches document metadata.

use crate::catalog::{Catalog, ImpactObject, Implementation, Threat};
use crate::config::LayoutConfig;
use crate::document::Document;
use crate::error::{ReportError, Result};
use crate::info::Info;
use crate::layout::{wrap_text, Measure, Paginator};
use crate::request::{ExportRequest, ViewMode};
use crate::units::Pt;
use std::collections::HashSet;

pub const REPORT_TITLE: &str = "Отчет по угрозам безопасности";

const OBJECTS_HEADING: &str = "Объекты воздействия:";
const METHODS_HEADING: &str = "Способы реализации:";
const ALL_OBJECTS_HEADING: &str = "Все объекты воздействия:";
const ALL_METHODS_HEADING: &str = "Все способы реализации:";
const FOUND_OBJECTS_HEADING: &str = "Найденные объекты воздействия:";
const FOUND_METHODS_HEADING: &str = "Найденные способы реализации:";
const NOTHING_FOUND: &str = "Ничего не найдено";

/// A run of text with its formatting, before wrapping
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub text: String,
    pub size: Pt,
    pub emphasis: bool,
    /// Offset from the left margin
    pub indent: Pt,
}

/// One step of the report outline
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text(TextBlock),
    /// Blank lines between sections
    Space(usize),
}

impl Block {
    pub fn text(&self) -> Option<&str> {
        match self {
            Block::Text(block) => Some(block.text.as_str()),
            Block::Space(_) => None,
        }
    }
}

struct OutlineBuilder<'c> {
    config: &'c LayoutConfig,
    blocks: Vec<Block>,
}

impl<'c> OutlineBuilder<'c> {
    fn new(config: &'c LayoutConfig) -> Self {
        OutlineBuilder {
            config,
            blocks: Vec::new(),
        }
    }

    fn push(&mut self, text: String, size: Pt, emphasis: bool, indent: Pt) {
        self.blocks.push(Block::Text(TextBlock {
            text,
            size,
            emphasis,
            indent,
        }));
    }

    fn title(&mut self, text: &str) {
        self.push(text.to_string(), self.config.title_size, true, Pt(0.0));
    }

    fn heading(&mut self, text: String) {
        self.push(text, self.config.heading_size, true, Pt(0.0));
    }

    fn subheading(&mut self, text: &str) {
        self.push(text.to_string(), self.config.body_size, true, Pt(0.0));
    }

    fn line(&mut self, text: String) {
        self.push(text, self.config.body_size, false, Pt(0.0));
    }

    fn space(&mut self, lines: usize) {
        self.blocks.push(Block::Space(lines));
    }

    fn object(&mut self, object: &ImpactObject) {
        let text = match &object.kind {
            Some(kind) => format!("• {}: {} ({})", object.id, object.name, kind),
            None => format!("• {}: {}", object.id, object.name),
        };
        self.line(text);
    }

    fn implementation(&mut self, implementation: &Implementation) {
        self.line(format!("• {}: {}", implementation.id, implementation.name));

        let indent = self.config.detail_indent;
        let size = self.config.body_size;
        if let Some(category) = &implementation.category {
            self.push(format!("  Категория: {category}"), size, false, indent);
        }
        if let Some(risk_level) = &implementation.risk_level {
            self.push(format!("  Уровень риска: {risk_level}"), size, false, indent);
        }
    }

    fn finish(self) -> Vec<Block> {
        self.blocks
    }
}

fn lookup<'a>(catalog: &'a Catalog, id: &str) -> Result<&'a Threat> {
    catalog
        .get(id)
        .ok_or_else(|| ReportError::Rendering(format!("threat {id} is not in the catalog")))
}

/// Objects and methods of the selected threats, each id listed once in the
/// order it is first met. The first record seen for an id is the one kept.
pub fn deduplicate<'a>(
    catalog: &'a Catalog,
    request: &ExportRequest,
) -> Result<(Vec<&'a ImpactObject>, Vec<&'a Implementation>)> {
    let search = request.search();

    let mut seen_objects: HashSet<&str> = HashSet::new();
    let mut seen_methods: HashSet<&str> = HashSet::new();
    let mut objects: Vec<&ImpactObject> = Vec::new();
    let mut methods: Vec<&Implementation> = Vec::new();

    for id in request.selection() {
        let threat = lookup(catalog, id)?;

        for object in threat.objects.iter() {
            if search.is_some_and(|needle| !object.matches(needle)) {
                continue;
            }
            if seen_objects.insert(object.id.as_str()) {
                objects.push(object);
            }
        }

        for method in threat.implementations.iter() {
            if search.is_some_and(|needle| !method.matches(needle)) {
                continue;
            }
            if seen_methods.insert(method.id.as_str()) {
                methods.push(method);
            }
        }
    }

    Ok((objects, methods))
}

fn per_item(builder: &mut OutlineBuilder, catalog: &Catalog, request: &ExportRequest) -> Result<()> {
    let search = request.search();
    let mut emitted = 0usize;

    for id in request.selection() {
        let threat = lookup(catalog, id)?;

        let objects: Vec<&ImpactObject> = threat
            .objects
            .iter()
            .filter(|object| search.map_or(true, |needle| object.matches(needle)))
            .collect();
        let methods: Vec<&Implementation> = threat
            .implementations
            .iter()
            .filter(|method| search.map_or(true, |needle| method.matches(needle)))
            .collect();

        let searching = search.is_some();
        if searching && objects.is_empty() && methods.is_empty() {
            log::debug!("threat {id} has no entries matching the search");
            continue;
        }
        emitted += 1;

        builder.heading(format!(
            "{}: {}",
            id,
            threat.description.as_deref().unwrap_or_default()
        ));
        builder.space(1);

        if !searching || !objects.is_empty() {
            builder.subheading(OBJECTS_HEADING);
            for object in objects {
                builder.object(object);
            }
            builder.space(1);
        }

        if !searching || !methods.is_empty() {
            builder.subheading(METHODS_HEADING);
            for method in methods {
                builder.implementation(method);
            }
        }
        builder.space(2);
    }

    if emitted == 0 {
        builder.line(NOTHING_FOUND.to_string());
    }

    Ok(())
}

fn summary(builder: &mut OutlineBuilder, catalog: &Catalog, request: &ExportRequest) -> Result<()> {
    let (objects, methods) = deduplicate(catalog, request)?;
    log::debug!(
        "summary of {} threats: {} objects, {} methods",
        request.selection().len(),
        objects.len(),
        methods.len()
    );

    let searching = request.search().is_some();
    if searching && objects.is_empty() && methods.is_empty() {
        builder.line(NOTHING_FOUND.to_string());
        return Ok(());
    }

    let (objects_heading, methods_heading) = if searching {
        (FOUND_OBJECTS_HEADING, FOUND_METHODS_HEADING)
    } else {
        (ALL_OBJECTS_HEADING, ALL_METHODS_HEADING)
    };

    if !searching || !objects.is_empty() {
        builder.heading(objects_heading.to_string());
        builder.space(1);
        for object in objects {
            builder.object(object);
        }
        builder.space(2);
    }

    if !searching || !methods.is_empty() {
        builder.heading(methods_heading.to_string());
        builder.space(1);
        for method in methods {
            builder.implementation(method);
        }
    }

    Ok(())
}

/// The ordered blocks of the report for `request`. Fails before producing
/// anything if the selection is empty or names a threat the catalog lacks.
pub fn outline(
    catalog: &Catalog,
    request: &ExportRequest,
    config: &LayoutConfig,
) -> Result<Vec<Block>> {
    if request.selection().is_empty() {
        return Err(ReportError::EmptySelection);
    }

    let mut builder = OutlineBuilder::new(config);
    builder.title(REPORT_TITLE);
    builder.space(1);
    builder.line(format!("Дата создания: {}", request.timestamp_label()));
    builder.space(2);

    match request.view() {
        ViewMode::PerItem => per_item(&mut builder, catalog, request)?,
        ViewMode::Summary => summary(&mut builder, catalog, request)?,
    }

    Ok(builder.finish())
}

/// Wrap and paginate `blocks`. Lines start at the left margin plus the block's
/// indent and wrap to the max width less that indent.
pub fn layout<M: Measure + ?Sized>(
    blocks: &[Block],
    config: &LayoutConfig,
    metrics: &M,
) -> Document {
    let mut paginator = Paginator::new(config);

    for block in blocks {
        match block {
            Block::Space(lines) => paginator.advance(*lines),
            Block::Text(text) => {
                let x = config.margins.left + text.indent;
                let width = config.max_width - text.indent;
                for line in wrap_text(&text.text, width, text.size, metrics) {
                    paginator.place(&line, text.size, text.emphasis, x);
                }
            }
        }
    }

    paginator.finish()
}

/// Lay out the report for `request`, measuring text with `metrics`
pub fn compose<M: Measure + ?Sized>(
    catalog: &Catalog,
    request: &ExportRequest,
    config: &LayoutConfig,
    metrics: &M,
) -> Result<Document> {
    config.validate()?;
    let blocks = outline(catalog, request, config)?;
    let mut document = layout(&blocks, config, metrics);

    document.set_info(
        Info::new()
            .title(REPORT_TITLE)
            .subject(match request.view() {
                ViewMode::PerItem => "Объекты воздействия и способы реализации по угрозам",
                ViewMode::Summary => "Общие объекты воздействия и способы реализации",
            })
            .keywords(request.selection().join(", "))
            .created(request.timestamp()),
    );

    log::info!(
        "composed {:?} report for {} threats: {} blocks on {} pages",
        request.view(),
        request.selection().len(),
        blocks.len(),
        document.page_count()
    );

    Ok(document)
}
