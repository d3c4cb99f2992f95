//! Layout configuration for generated reports.

use crate::error::{ReportError, Result};
use crate::layout::Margins;
use crate::pagesize::{self, PageSize};
use crate::units::Pt;
use serde::{Deserialize, Deserializer};

/// Page geometry and type sizes used when laying out a report.
///
/// The defaults reproduce the catalog viewer's original export: A4 pages with
/// 50pt margins, a fixed 20pt line advance and lines at most 500pt wide.
/// Deserializing accepts any subset of the fields; the rest keep their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Either a name such as `"A4"` or `"letter"`, or `[width, height]` in points
    #[serde(deserialize_with = "deserialize_page_size")]
    pub page_size: PageSize,
    pub margins: Margins,
    /// Vertical advance after every line, whatever its size
    pub line_height: Pt,
    /// Widest a line may be before it wraps
    pub max_width: Pt,
    pub title_size: Pt,
    pub heading_size: Pt,
    pub body_size: Pt,
    /// Extra left offset for the category and risk level lines under a method
    pub detail_indent: Pt,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            page_size: pagesize::A4,
            margins: Margins::all(Pt(50.0)),
            line_height: Pt(20.0),
            max_width: Pt(500.0),
            title_size: Pt(18.0),
            heading_size: Pt(14.0),
            body_size: Pt(12.0),
            detail_indent: Pt(10.0),
        }
    }
}

impl LayoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON, filling in defaults for missing fields
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LayoutConfig =
            serde_json::from_str(json).map_err(|err| ReportError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn with_line_height(mut self, line_height: Pt) -> Self {
        self.line_height = line_height;
        self
    }

    pub fn with_max_width(mut self, max_width: Pt) -> Self {
        self.max_width = max_width;
        self
    }

    /// Set title, heading and body sizes at once
    pub fn with_sizes(mut self, title: Pt, heading: Pt, body: Pt) -> Self {
        self.title_size = title;
        self.heading_size = heading;
        self.body_size = body;
        self
    }

    pub fn with_detail_indent(mut self, detail_indent: Pt) -> Self {
        self.detail_indent = detail_indent;
        self
    }

    /// Reject geometry that would leave no room to draw or would never advance
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("page width", self.page_size.0),
            ("page height", self.page_size.1),
            ("line height", self.line_height),
            ("max width", self.max_width),
            ("title size", self.title_size),
            ("heading size", self.heading_size),
            ("body size", self.body_size),
        ];
        for (name, value) in positive {
            if !(value > Pt(0.0)) {
                return Err(ReportError::Config(format!("{name} must be positive, got {value}")));
            }
        }

        let Margins {
            top,
            right,
            bottom,
            left,
        } = self.margins;
        if [top, right, bottom, left].iter().any(|m| *m < Pt(0.0)) {
            return Err(ReportError::Config("margins must not be negative".into()));
        }
        if top + bottom >= self.page_size.1 || left + right >= self.page_size.0 {
            return Err(ReportError::Config(
                "margins leave no content area on the page".into(),
            ));
        }
        if self.detail_indent < Pt(0.0) || self.detail_indent >= self.max_width {
            return Err(ReportError::Config(format!(
                "detail indent {} must be between 0 and the max width {}",
                self.detail_indent, self.max_width
            )));
        }

        Ok(())
    }
}

fn deserialize_page_size<'de, D>(deserializer: D) -> std::result::Result<PageSize, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Paper {
        Named(String),
        Dimensions(Pt, Pt),
    }

    match Paper::deserialize(deserializer)? {
        Paper::Named(name) => pagesize::by_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown page size {name:?}"))),
        Paper::Dimensions(width, height) => Ok((width, height)),
    }
}
