//! Text measurement oracle
//!
//! The layout engine never touches pixels; it asks a [`TextMeasurer`] for
//! bounding boxes and treats the answer as an opaque, deterministic function
//! of (text, font attributes). [`HeuristicMeasurer`] is the built-in
//! estimator; hosts with a real text stack can plug in their own.

use std::collections::HashMap;

use crate::theme::FontOptions;

/// A width/height pair
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    /// Zero-sized box, used for sentinel lanes and empty text
    pub const NONE: Dimensions = Dimensions {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Horizontal center offset
    pub fn cx(&self) -> f64 {
        self.width / 2.0
    }
}

/// Measurement oracle: bounding box for a piece of text under a font.
///
/// Implementations must be deterministic within a render; the engine may
/// measure the same text several times across the layout and paint passes.
pub trait TextMeasurer {
    fn measure(&mut self, text: &str, font: &FontOptions) -> Dimensions;
}

fn char_weight(c: char) -> f64 {
    if c.is_ascii() {
        if c.is_uppercase() {
            0.7
        } else {
            0.5
        }
    } else {
        1.0 // CJK and other characters are wider
    }
}

/// Per-character width estimator (rough approximation, no font shaping)
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicMeasurer;

impl TextMeasurer for HeuristicMeasurer {
    fn measure(&mut self, text: &str, font: &FontOptions) -> Dimensions {
        if text.trim().is_empty() {
            return Dimensions::NONE;
        }

        let line_height = font.size + 4.0;
        let widest = text
            .lines()
            .map(|line| line.chars().map(char_weight).sum::<f64>())
            .fold(0.0_f64, f64::max);
        let lines = text.lines().count().max(1);

        Dimensions::new(widest * font.size, lines as f64 * line_height)
    }
}

/// Memoizing wrapper around another measurer.
///
/// The same alias or message text is measured during both the layout and the
/// paint pass; hosts whose oracle is expensive should wrap it for the
/// duration of one render.
#[derive(Debug, Default)]
pub struct MemoMeasurer<M> {
    inner: M,
    cache: HashMap<(String, FontKey), Dimensions>,
}

type FontKey = (String, String, u64);

fn font_key(font: &FontOptions) -> FontKey {
    (font.family.clone(), font.weight.clone(), font.size.to_bits())
}

impl<M: TextMeasurer> MemoMeasurer<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            cache: HashMap::new(),
        }
    }
}

impl<M: TextMeasurer> TextMeasurer for MemoMeasurer<M> {
    fn measure(&mut self, text: &str, font: &FontOptions) -> Dimensions {
        let key = (text.to_string(), font_key(font));
        if let Some(hit) = self.cache.get(&key) {
            return *hit;
        }
        let size = self.inner.measure(text, font);
        self.cache.insert(key, size);
        size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_measures_zero() {
        let mut m = HeuristicMeasurer;
        let font = FontOptions::default();
        assert_eq!(m.measure("", &font), Dimensions::NONE);
        assert_eq!(m.measure("   ", &font), Dimensions::NONE);
    }

    #[test]
    fn wider_text_measures_wider() {
        let mut m = HeuristicMeasurer;
        let font = FontOptions::default();
        let short = m.measure("hi", &font);
        let long = m.measure("hello there", &font);
        assert!(long.width > short.width);
        assert_eq!(long.height, short.height);
    }

    #[test]
    fn multiline_takes_widest_line() {
        let mut m = HeuristicMeasurer;
        let font = FontOptions::default();
        let single = m.measure("wide wide wide", &font);
        let multi = m.measure("wide wide wide\nnarrow", &font);
        assert_eq!(multi.width, single.width);
        assert_eq!(multi.height, 2.0 * single.height);
    }

    #[test]
    fn memo_is_transparent() {
        let mut plain = HeuristicMeasurer;
        let mut memo = MemoMeasurer::new(HeuristicMeasurer);
        let font = FontOptions::default();
        for text in ["a", "b", "a", "longer text", "a"] {
            assert_eq!(memo.measure(text, &font), plain.measure(text, &font));
        }
    }
}
