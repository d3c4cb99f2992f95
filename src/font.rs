use crate::{
    error::{FontLoadError, ReportError, Result},
    refs::{ObjectReferences, RefType},
};
use owned_ttf_parser::{AsFaceRef, OwnedFace};
use pdf_writer::{
    types::{FontFlags, SystemInfo},
    Finish, Name, Pdf, Ref, Str,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The single typeface a report is measured and drawn with. The font is embedded in
/// its entirety in the generated PDF.
pub struct Font {
    pub face: OwnedFace,
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Font").field("name", &self.name()).finish()
    }
}

impl Font {
    /// Load a font from raw bytes, parsing the font and returning an error if the font
    /// could not be parsed
    pub fn load(bytes: Vec<u8>) -> Result<Font> {
        let face = OwnedFace::from_vec(bytes, 0)?;

        Ok(Font { face })
    }

    /// Read and parse a font file from disk
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Font> {
        let bytes = std::fs::read(path.as_ref()).map_err(FontLoadError::from)?;
        Font::load(bytes)
    }

    fn find_name(&self, name_id: u16) -> Option<String> {
        self.face
            .as_face_ref()
            .names()
            .into_iter()
            .find(|name| name.name_id == name_id && name.is_unicode())
            .and_then(|name| name.to_string())
    }

    /// Obtain the full name of the font
    pub fn name(&self) -> String {
        self.find_name(owned_ttf_parser::name_id::FULL_NAME)
            .unwrap_or_else(|| "Typeface".to_string())
    }

    /// Obtain the family name of the font, falling back to the full name
    pub fn family(&self) -> String {
        self.find_name(owned_ttf_parser::name_id::FAMILY)
            .unwrap_or_else(|| self.name())
    }

    pub fn units_per_em(&self) -> u16 {
        self.face.as_face_ref().units_per_em()
    }

    pub fn glyph_id(&self, ch: char) -> Option<u16> {
        self.face.as_face_ref().glyph_index(ch).map(|i| i.0)
    }

    pub fn replacement_glyph_id(&self) -> Option<u16> {
        self.face.as_face_ref().glyph_index('\u{FFFD}').map(|i| i.0)
    }

    /// The glyph drawn for `ch`: its own glyph, else the replacement character, else `?`
    pub fn glyph_for(&self, ch: char) -> Option<u16> {
        self.glyph_id(ch)
            .or_else(|| self.replacement_glyph_id())
            .or_else(|| self.glyph_id('?'))
    }

    /// Horizontal advance of a glyph in font units
    pub(crate) fn advance(&self, gid: u16) -> u16 {
        self.face
            .as_face_ref()
            .glyph_hor_advance(owned_ttf_parser::GlyphId(gid))
            .unwrap_or_default()
    }

    fn write_cid(&self, refs: &mut ObjectReferences, writer: &mut Pdf) -> Result<Ref> {
        let font_descriptor_id = self.write_descriptor(refs, writer)?;

        let id = refs.gen(RefType::CidFont);

        let mut cid_font = writer.cid_font(id);
        cid_font.subtype(pdf_writer::types::CidFontType::Type2);
        cid_font.base_font(Name(b"F0"));
        cid_font.system_info(SystemInfo {
            registry: Str(b"Adobe"),
            ordering: Str(b"Identity"),
            supplement: 0,
        });
        cid_font.font_descriptor(font_descriptor_id);

        let ids = self.glyph_ids()?;
        let ids_augmented = self.glyphs_sizing(&ids);

        let scaling = 1000.0 / self.face.as_face_ref().units_per_em() as f32;

        // the most popular width becomes the default
        let mut widths_counts: HashMap<u16, usize> = HashMap::new();
        for (_, (width, _)) in ids_augmented.values() {
            *widths_counts.entry(*width).or_insert(0) += 1;
        }
        let most_common_width = widths_counts
            .iter()
            .max_by_key(|(_, &count)| count)
            .map(|(&width, _)| width as f32 * scaling)
            .unwrap_or(1000.0);

        let mut id_widths: Vec<(u16, f32)> = ids_augmented
            .iter()
            .map(|(&cid, &(_, (width, _)))| (cid, width as f32 * scaling))
            .collect();
        id_widths.sort_by_key(|(id, _)| *id);

        let Some(&(first_cid, first_width)) = id_widths.first() else {
            return Err(ReportError::Rendering(format!(
                "typeface {} has no measurable glyphs",
                self.name()
            )));
        };

        let mut widths = cid_font.widths();
        widths.consecutive(0, [1000.0]);

        let mut start_cid: u16 = first_cid;
        let mut current_widths: Vec<f32> = vec![first_width];
        for (cid, width) in id_widths.into_iter().skip(1) {
            if (cid - start_cid) as usize > current_widths.len() {
                // gap in the glyph ids, start a new run
                widths.consecutive(start_cid, current_widths.clone());
                start_cid = cid;
                current_widths.clear();
            }

            current_widths.push(width);
        }

        if !current_widths.is_empty() {
            widths.consecutive(start_cid, current_widths);
        }

        widths.finish();

        cid_font.default_width(most_common_width);
        cid_font.cid_to_gid_map_predefined(Name(b"Identity"));

        Ok(id)
    }

    fn write_font_data(&self, refs: &mut ObjectReferences, writer: &mut Pdf) -> Ref {
        let id = refs.gen(RefType::FontData);

        writer
            .stream(id, self.face.as_slice())
            .pair(Name(b"Length1"), self.face.as_slice().len() as i32);

        id
    }

    fn write_descriptor(&self, refs: &mut ObjectReferences, writer: &mut Pdf) -> Result<Ref> {
        let font_data_stream_id = self.write_font_data(refs, writer);

        let gids = self.glyph_ids()?;
        let gids_augmented = self.glyphs_sizing(&gids);

        let max_width = gids_augmented
            .values()
            .map(|&(_, (w, _))| w)
            .max()
            .unwrap_or_default();
        let max_height = gids_augmented
            .values()
            .map(|&(_, (_, h))| h)
            .max()
            .unwrap_or_default();
        let sum_width: usize = gids_augmented.values().map(|&(_, (w, _))| w as usize).sum();
        let avg_width = sum_width as f32 / gids_augmented.len().max(1) as f32;

        let id = refs.gen(RefType::FontDescriptor);

        let face = self.face.as_face_ref();
        let name = self.name().replace(' ', "");
        let family = self.family();

        let mut descriptor = writer.font_descriptor(id);
        descriptor.name(Name(name.as_bytes()));
        descriptor.family(Str(family.as_bytes()));
        descriptor.weight(face.weight().to_number());

        let mut flags: FontFlags = FontFlags::NON_SYMBOLIC;
        if face.is_monospaced() {
            flags.set(FontFlags::FIXED_PITCH, true);
        }
        if face.is_italic() {
            flags.set(FontFlags::ITALIC, true);
        }
        descriptor.flags(flags);

        let scaling = 1000.0 / face.units_per_em() as f32;
        descriptor.bbox(pdf_writer::Rect {
            x1: 0.0,
            y1: face.descender() as f32 * scaling,
            x2: max_width as f32 * scaling,
            y2: max_height as f32 * scaling,
        });
        descriptor.italic_angle(if face.is_italic() { -12.0 } else { 0.0 });
        descriptor.ascent(face.ascender() as f32 * scaling);
        descriptor.descent(face.descender() as f32 * scaling);
        descriptor.leading(face.line_gap() as f32 * scaling);
        descriptor.cap_height(
            face.capital_height()
                .map(|h| h as f32 * scaling)
                .unwrap_or(1000.0),
        );
        descriptor.x_height(
            face.x_height()
                .unwrap_or_else(|| face.capital_height().unwrap_or_default()) as f32
                * scaling,
        );
        // TrueType faces carry no stem widths; 80 is the customary regular-weight value
        descriptor.stem_v(80.0);
        descriptor.avg_width(avg_width * scaling);
        descriptor.max_width(max_width as f32 * scaling);
        descriptor.missing_width(max_width as f32 * scaling);

        descriptor.font_file2(font_data_stream_id);

        Ok(id)
    }

    fn glyph_ids(&self) -> Result<HashMap<u16, char>> {
        let cmap = self.face.as_face_ref().tables().cmap.ok_or_else(|| {
            ReportError::Rendering(format!("typeface {} has no cmap table", self.name()))
        })?;

        let mut map: HashMap<u16, char> = HashMap::new();
        for subtable in cmap.subtables.into_iter().filter(|table| table.is_unicode()) {
            subtable.codepoints(|codepoint: u32| {
                if let Ok(ch) = char::try_from(codepoint) {
                    if let Some(index) = subtable.glyph_index(codepoint).filter(|index| index.0 > 0)
                    {
                        map.entry(index.0).or_insert(ch);
                    }
                }
            });
        }

        Ok(map)
    }

    fn glyphs_sizing(&self, ids: &HashMap<u16, char>) -> HashMap<u16, (char, (u16, i16))> {
        let face = self.face.as_face_ref();
        let mut ids_augmented: HashMap<u16, (char, (u16, i16))> = HashMap::new();
        for (&id, &ch) in ids.iter() {
            if let Some(gid) = face.glyph_index(ch) {
                if let Some(h_advance) = face.glyph_hor_advance(gid) {
                    let height = face
                        .glyph_bounding_box(gid)
                        .map(|bbox| bbox.y_max - bbox.y_min - face.descender())
                        .unwrap_or(1000);
                    ids_augmented.insert(id, (ch, (h_advance, height)));
                }
            }
        }
        ids_augmented
    }

    fn write_to_unicode(&self, refs: &mut ObjectReferences, writer: &mut Pdf) -> Result<Ref> {
        let id = refs.gen(RefType::ToUnicode);

        let mut map: String = r#"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo
<< /Registry (Adobe)
/Ordering (UCS) /Supplement 0 >> def
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
"#
        .replace("\r\n", "\n");

        let mut ids: Vec<(u16, char)> = self.glyph_ids()?.into_iter().collect();
        ids.sort_by_key(|&(id, _)| id);

        // bfchar blocks hold at most 100 entries sharing a high byte
        let mut cmap_blocks: Vec<Vec<(u16, char)>> = Vec::new();
        let mut current_block: Vec<(u16, char)> = Vec::new();
        let mut high_byte: u8 = 0;
        for &(id, ch) in ids.iter() {
            if (id >> 8) as u8 != high_byte || current_block.len() >= 100 {
                if !current_block.is_empty() {
                    cmap_blocks.push(std::mem::take(&mut current_block));
                }
                high_byte = (id >> 8) as u8;
            }

            current_block.push((id, ch));
        }
        if !current_block.is_empty() {
            cmap_blocks.push(current_block);
        }

        for block in cmap_blocks.into_iter() {
            map.push_str(&format!("{} beginbfchar\n", block.len()));
            for (id, ch) in block.into_iter() {
                map.push_str(&format!("<{id:04x}> <{}>\n", utf16_hex(ch)));
            }
            map.push_str("endbfchar\n");
        }

        map.push_str("endcmap CMapName currentdict /CMap defineresource pop end end\n");

        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(
            map.as_bytes(),
            miniz_oxide::deflate::CompressionLevel::DefaultCompression as u8,
        );
        let mut stream = writer.stream(id, compressed.as_slice());
        stream.filter(pdf_writer::Filter::FlateDecode);

        Ok(id)
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, writer: &mut Pdf) -> Result<()> {
        let font_id = refs.gen(RefType::Font);
        let cid_font_id = self.write_cid(refs, writer)?;
        let to_unicode_id = self.write_to_unicode(refs, writer)?;

        let mut font = writer.type0_font(font_id);
        font.base_font(Name(b"F0"));
        font.encoding_predefined(Name(b"Identity-H"));
        font.descendant_font(cid_font_id);
        font.to_unicode(to_unicode_id);

        Ok(())
    }
}

/// ToUnicode destinations are UTF-16BE, so characters outside the BMP need a surrogate pair
fn utf16_hex(ch: char) -> String {
    let mut buf = [0u16; 2];
    ch.encode_utf16(&mut buf)
        .iter()
        .map(|unit| format!("{unit:04x}"))
        .collect()
}

/// Loads the report typeface at most once and hands out the same parsed face to
/// every export. Loaders that fail leave the cache empty, so a later export tries
/// again; concurrent callers wait on the lock instead of fetching twice.
#[derive(Debug, Default)]
pub struct TypefaceCache {
    font: Mutex<Option<Arc<Font>>>,
}

impl TypefaceCache {
    pub fn new() -> TypefaceCache {
        TypefaceCache::default()
    }

    /// The loaded typeface, or [ReportError::FontUnavailable] if nothing has been loaded yet
    pub fn get(&self) -> Result<Arc<Font>> {
        self.slot().clone().ok_or(ReportError::FontUnavailable)
    }

    pub fn is_loaded(&self) -> bool {
        self.slot().is_some()
    }

    /// Return the cached typeface, calling `fetch` for its bytes only if no load
    /// has succeeded before
    pub fn get_or_load<F>(&self, fetch: F) -> Result<Arc<Font>>
    where
        F: FnOnce() -> std::result::Result<Vec<u8>, FontLoadError>,
    {
        let mut slot = self.slot();
        if let Some(font) = slot.as_ref() {
            return Ok(Arc::clone(font));
        }

        let font = fetch()
            .map_err(ReportError::from)
            .and_then(Font::load)
            .map_err(|err| {
                log::warn!("typeface load failed: {err}");
                err
            })?;
        log::debug!("loaded typeface {}", font.name());

        let font = Arc::new(font);
        *slot = Some(Arc::clone(&font));
        Ok(font)
    }

    /// The slot is only written after a successful load, so a loader that
    /// panicked leaves it empty and the poisoned guard is safe to reuse
    fn slot(&self) -> MutexGuard<'_, Option<Arc<Font>>> {
        self.font.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_empty_cache_is_unavailable() {
        let cache = TypefaceCache::new();
        assert!(!cache.is_loaded());
        assert!(matches!(cache.get(), Err(ReportError::FontUnavailable)));
    }

    #[test]
    fn test_failed_load_leaves_cache_empty() {
        let cache = TypefaceCache::new();
        let attempts = Cell::new(0);

        for _ in 0..2 {
            let result = cache.get_or_load(|| {
                attempts.set(attempts.get() + 1);
                Ok(b"not a font".to_vec())
            });
            assert!(matches!(
                result,
                Err(ReportError::FontLoad(FontLoadError::FaceParsing(_)))
            ));
        }

        // every export re-attempts while nothing was ever loaded
        assert_eq!(attempts.get(), 2);
        assert!(!cache.is_loaded());
    }

    #[test]
    fn test_panicking_loader_does_not_block_later_loads() {
        let cache = TypefaceCache::new();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            cache.get_or_load(|| panic!("connection reset while fetching typeface"))
        }));
        assert!(outcome.is_err());
        assert!(!cache.is_loaded());

        let fetched = Cell::new(false);
        let result = cache.get_or_load(|| {
            fetched.set(true);
            Ok(b"still not a font".to_vec())
        });
        assert!(fetched.get());
        assert!(matches!(
            result,
            Err(ReportError::FontLoad(FontLoadError::FaceParsing(_)))
        ));
        assert!(matches!(cache.get(), Err(ReportError::FontUnavailable)));
    }

    #[test]
    fn test_fetch_error_is_surfaced() {
        let cache = TypefaceCache::new();
        let result = cache.get_or_load(|| {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "fonts/Roboto-Regular.ttf").into())
        });
        assert!(matches!(
            result,
            Err(ReportError::FontLoad(FontLoadError::Io(_)))
        ));
    }

    #[test]
    fn test_utf16_hex() {
        assert_eq!(utf16_hex('A'), "0041");
        assert_eq!(utf16_hex('Ж'), "0416");
        assert_eq!(utf16_hex('😀'), "d83dde00");
    }
}
