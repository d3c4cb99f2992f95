use thiserror::Error;

/// Result type alias for report generation
pub type Result<T> = std::result::Result<T, ReportError>;

/// Everything that can abort a report export. No variant ever comes with a
/// partially written document.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to load typeface: {0}")]
    /// The typeface bytes could not be fetched or parsed
    FontLoad(#[from] FontLoadError),

    #[error("no typeface has been loaded")]
    /// Text measurement was requested before a typeface was loaded
    FontUnavailable,

    #[error("no threats selected")]
    /// An export was requested with nothing selected
    EmptySelection,

    #[error("rendering failed: {0}")]
    /// Composition or serialization could not complete
    Rendering(String),

    #[error("invalid threat catalog: {0}")]
    /// The catalog JSON is malformed or misses required fields
    Dataset(#[from] serde_json::Error),

    #[error("invalid layout configuration: {0}")]
    /// The layout configuration leaves no room for content
    Config(String),

    #[error(transparent)]
    /// An I/O error occurred while writing the artifact
    Io(#[from] std::io::Error),
}

/// Why the typeface could not be loaded
#[derive(Error, Debug)]
pub enum FontLoadError {
    #[error(transparent)]
    /// The font resource could not be read
    Io(#[from] std::io::Error),

    #[error(transparent)]
    /// [owned_ttf_parser] failed to parse the font
    FaceParsing(#[from] owned_ttf_parser::FaceParsingError),
}

impl From<owned_ttf_parser::FaceParsingError> for ReportError {
    fn from(err: owned_ttf_parser::FaceParsingError) -> Self {
        ReportError::FontLoad(err.into())
    }
}
