/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::fmt::Debug;
use std::sync::Arc;

/// The metrics a laid out font exposes to layout and hit testing.
///
/// Implementations are owned by the font subsystem. The display list holds shared references to
/// them for as long as any text item, sorted slot or snapshot mentions the font, so a font is
/// never released while one of those still exists.
pub trait FontMetrics: Debug + Send + Sync {
    /// Pixels from the baseline to the top of the font's glyph box.
    fn ascent(&self) -> i32;

    /// Pixels from the baseline to the bottom of the font's glyph box.
    fn descent(&self) -> i32;

    /// The advance width of `text` in pixels.
    fn text_width(&self, text: &str) -> i32;

    /// The number of leading characters of `text` whose rendering fits in `width` pixels.
    fn chars_fitting(&self, text: &str, width: i32) -> usize {
        let mut fitting = 0;
        for (count, (index, character)) in text.char_indices().enumerate() {
            if self.text_width(&text[..index + character.len_utf8()]) > width {
                return count;
            }
            fitting = count + 1;
        }
        fitting
    }
}

pub type FontHandle = Arc<dyn FontMetrics>;

/// A decoded image, as far as layout is concerned.
#[derive(Debug)]
pub struct Image {
    pub width: i32,
    pub height: i32,
    /// Where the image came from, for debugging output.
    pub source: String,
}

pub type ImageHandle = Arc<Image>;

/// The prefix of `text` made of its first `chars` characters.
pub fn prefix_by_chars(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
