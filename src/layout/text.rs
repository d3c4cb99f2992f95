use crate::font::Font;
use crate::units::Pt;

/// Measures the rendered width of a run of text. Implementations must be pure:
/// the same text at the same size always measures the same.
pub trait Measure {
    /// Width of `text` set at `size`, in points
    fn width_of(&self, text: &str, size: Pt) -> Pt;
}

impl Measure for Font {
    fn width_of(&self, text: &str, size: Pt) -> Pt {
        width_of_text(text, self, size)
    }
}

/// Calculate the width of a given string of text given the font and font size.
/// Characters the font has no glyph for are measured as the glyph that will be
/// drawn in their place.
pub fn width_of_text(text: &str, font: &Font, size: Pt) -> Pt {
    let scaling: Pt = size / font.units_per_em() as f32;
    text.chars()
        .filter_map(|ch| font.glyph_for(ch))
        .map(|gid| scaling * font.advance(gid) as f32)
        .sum()
}

/// Wraps `text` into lines no wider than `max_width` when set at `size`.
///
/// Words are separated by whitespace and rejoined with single spaces. A word that
/// does not fit on a line of its own is broken by character count in proportion
/// to how far it overflows, i.e. `floor(chars * max_width / width)` characters
/// stay on the line and the rest is wrapped again. This assumes roughly uniform
/// glyph widths, so a fragment of a word with unusually wide characters can still
/// overflow slightly. Fragments are never shorter than one character, so a single
/// character wider than the line ends up on a line of its own.
pub fn wrap_text<M: Measure + ?Sized>(
    text: &str,
    max_width: Pt,
    size: Pt,
    metrics: &M,
) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut pending: String = word.to_string();

        loop {
            let candidate = if current.is_empty() {
                pending.clone()
            } else {
                format!("{current} {pending}")
            };

            let width = metrics.width_of(&candidate, size);
            if width <= max_width {
                current = candidate;
                break;
            }

            if !current.is_empty() {
                // finish the line and try the word again on an empty one
                lines.push(std::mem::take(&mut current));
                continue;
            }

            let (head, tail) = split_overflowing(&pending, max_width, width);
            log::warn!(
                "forced break in {:?} ({} wide, {} available) after {} chars",
                pending,
                width,
                max_width,
                head.chars().count()
            );
            lines.push(head);
            match tail {
                Some(rest) => pending = rest,
                None => break,
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// Splits a word that is `width` wide into the share of characters that fits
/// `max_width` and the remainder, if any
fn split_overflowing(word: &str, max_width: Pt, width: Pt) -> (String, Option<String>) {
    let len = word.chars().count();
    let fits = (len as f32 * max_width.0 / width.0).floor();
    let take = if fits.is_finite() && fits >= 1.0 {
        (fits as usize).min(len)
    } else {
        1
    };

    let split = word
        .char_indices()
        .nth(take)
        .map(|(i, _)| i)
        .unwrap_or(word.len());
    let (head, tail) = word.split_at(split);
    (head.to_string(), (!tail.is_empty()).then(|| tail.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is `advance` points wide at size 1, scaled linearly
    struct FixedAdvance {
        advance: f32,
    }

    impl Measure for FixedAdvance {
        fn width_of(&self, text: &str, size: Pt) -> Pt {
            Pt(text.chars().count() as f32 * self.advance * size.0)
        }
    }

    /// Wide 'W', narrow everything else
    struct Proportional;

    impl Measure for Proportional {
        fn width_of(&self, text: &str, size: Pt) -> Pt {
            text.chars()
                .map(|ch| if ch == 'W' { Pt(3.0) } else { Pt(1.0) })
                .sum::<Pt>()
                * size.0
        }
    }

    const MONO: FixedAdvance = FixedAdvance { advance: 1.0 };

    #[test]
    fn test_empty_input_yields_no_lines() {
        assert!(wrap_text("", Pt(10.0), Pt(1.0), &MONO).is_empty());
        assert!(wrap_text("  \t\n ", Pt(10.0), Pt(1.0), &MONO).is_empty());
    }

    #[test]
    fn test_fitting_text_is_one_line() {
        let text = "1.1: Угроза несанкционированного доступа";
        let width = MONO.width_of(text, Pt(1.0));
        assert_eq!(wrap_text(text, width, Pt(1.0), &MONO), vec![text]);
        assert_eq!(wrap_text(text, width + Pt(50.0), Pt(1.0), &MONO), vec![text]);
    }

    #[test]
    fn test_wraps_at_word_boundaries() {
        let lines = wrap_text("aaa bbb ccc dddd", Pt(7.0), Pt(1.0), &MONO);
        assert_eq!(lines, vec!["aaa bbb", "ccc", "dddd"]);
    }

    #[test]
    fn test_whitespace_is_normalised() {
        let lines = wrap_text("  Категория:   Сетевая \t атака ", Pt(100.0), Pt(1.0), &MONO);
        assert_eq!(lines, vec!["Категория: Сетевая атака"]);
    }

    #[test]
    fn test_forced_split_uses_proportional_character_count() {
        // 20 characters at 30pt each: 600pt wide against a 500pt line
        let metrics = FixedAdvance { advance: 30.0 };
        let word = "ABCDEFGHIJKLMNOPQRST";
        assert_eq!(metrics.width_of(word, Pt(1.0)), Pt(600.0));

        let lines = wrap_text(word, Pt(500.0), Pt(1.0), &metrics);
        assert_eq!(lines, vec!["ABCDEFGHIJKLMNOP", "QRST"]);
        assert_eq!(lines[0].chars().count(), 16);
    }

    #[test]
    fn test_remainder_continues_wrapping_with_following_words() {
        let metrics = FixedAdvance { advance: 30.0 };
        let lines = wrap_text("ABCDEFGHIJKLMNOPQRST xy", Pt(500.0), Pt(1.0), &metrics);
        assert_eq!(lines, vec!["ABCDEFGHIJKLMNOP", "QRST xy"]);
    }

    #[test]
    fn test_overflowing_word_after_text_starts_new_line() {
        let lines = wrap_text("ab cdefghijklmn", Pt(5.0), Pt(1.0), &MONO);
        assert_eq!(lines, vec!["ab", "cdefg", "hijkl", "mn"]);
    }

    #[test]
    fn test_extreme_overflow_is_split_repeatedly() {
        let word = "x".repeat(1000);
        let lines = wrap_text(&word, Pt(10.0), Pt(1.0), &MONO);
        assert_eq!(lines.len(), 100);
        assert!(lines.iter().all(|line| line.len() == 10));
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn test_single_character_wider_than_line_is_kept() {
        let lines = wrap_text("a W b", Pt(2.0), Pt(1.0), &Proportional);
        assert_eq!(lines, vec!["a", "W", "b"]);

        let lines = wrap_text("WWW", Pt(2.0), Pt(1.0), &Proportional);
        assert_eq!(lines, vec!["W", "W", "W"]);
    }

    #[test]
    fn test_non_positive_width_still_terminates() {
        let lines = wrap_text("abc de", Pt(0.0), Pt(1.0), &MONO);
        assert_eq!(lines, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_cyrillic_split_respects_char_boundaries() {
        let lines = wrap_text("Несанкционированный", Pt(10.0), Pt(1.0), &MONO);
        assert_eq!(lines, vec!["Несанкцион", "ированный"]);
    }

    #[test]
    fn test_lines_fit_and_reconstruct_input() {
        let text = lipsum::lipsum(300);
        let normalised = text.split_whitespace().collect::<Vec<_>>().join(" ");
        for max in [8.0, 20.0, 45.0, 120.0] {
            let lines = wrap_text(&text, Pt(max), Pt(1.0), &MONO);
            for line in lines.iter() {
                assert!(
                    MONO.width_of(line, Pt(1.0)) <= Pt(max) || line.chars().count() == 1,
                    "{line:?} overflows {max}"
                );
            }

            // forced breaks only happen inside words longer than the line
            let rejoined = lines.join(" ");
            if normalised.split(' ').all(|w| w.chars().count() as f32 <= max) {
                assert_eq!(rejoined, normalised);
            } else {
                assert_eq!(rejoined.replace(' ', ""), normalised.replace(' ', ""));
            }
        }
    }

    #[test]
    fn test_size_scales_measurement() {
        let lines = wrap_text("aa bb cc", Pt(10.0), Pt(2.0), &MONO);
        assert_eq!(lines, vec!["aa bb", "cc"]);
    }
}
