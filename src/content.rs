//! Content stream rendering for report pages.

use crate::error::{ReportError, Result};
use crate::font::Font;
use crate::page::LineLayout;
use crate::units::Pt;
use std::io::Write;

/// Stroke width of emphasised text, as a fraction of the font size. The report
/// embeds a single regular face, so emphasis is drawn by filling and stroking the
/// glyph outlines.
const EMPHASIS_STROKE: f32 = 0.03;

/// Renders positioned lines to PDF content stream operators, drawing every
/// line with the embedded font `/F0` in black.
#[allow(clippy::write_with_newline)]
pub(crate) fn render_lines(lines: &[LineLayout], font: &Font) -> Result<Vec<u8>> {
    let mut content: Vec<u8> = Vec::default();
    if lines.is_empty() {
        return Ok(content);
    }

    write!(content, "q\n")?;
    write!(content, "0 g\n0 G\n")?;

    let mut current_size: Option<Pt> = None;
    let mut emphasised = false;

    for line in lines.iter() {
        if current_size != Some(line.size) {
            current_size = Some(line.size);
            write!(content, "/F0 {} Tf\n", line.size.0)?;
            if emphasised {
                write!(content, "{} w\n", line.size.0 * EMPHASIS_STROKE)?;
            }
        }
        if line.emphasis != emphasised {
            emphasised = line.emphasis;
            if emphasised {
                write!(content, "2 Tr\n{} w\n", line.size.0 * EMPHASIS_STROKE)?;
            } else {
                write!(content, "0 Tr\n")?;
            }
        }

        write!(content, "BT\n")?;
        write!(content, "{} {} Td\n", line.coords.0 .0, line.coords.1 .0)?;
        write!(content, "<")?;
        for ch in line.text.chars() {
            let gid = font.glyph_for(ch).ok_or_else(|| {
                ReportError::Rendering(format!(
                    "typeface {} cannot draw {ch:?} and has no replacement glyph",
                    font.name()
                ))
            })?;
            write!(content, "{gid:04x}")?;
        }
        write!(content, "> Tj\n")?;
        write!(content, "ET\n")?;
    }

    write!(content, "Q\n")?;
    Ok(content)
}
