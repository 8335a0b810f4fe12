//! Bitmap glyphs for the rasterizer.
//!
//! Uses the Spleen bitmap families. The source size is picked from the
//! target pixel height and scaled with nearest-neighbour sampling, so small
//! text keeps crisp strokes and large text does not look blocky.

use std::collections::HashMap;

use spleen_font::{FONT_6X12, FONT_8X16, FONT_12X24, PSF2Font};

/// Width of a glyph cell relative to the font size (all Spleen sizes are 1:2).
pub const ADVANCE_RATIO: f64 = 0.5;

/// One decoded glyph, row-major.
#[derive(Debug, Clone)]
pub struct Glyph {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl Glyph {
    fn blank(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width * height],
        }
    }

    /// Box outline for characters the font lacks.
    fn missing(width: usize, height: usize) -> Self {
        let mut glyph = Self::blank(width, height);
        for x in 0..width {
            glyph.bits[width * 2 + x] = true;
            glyph.bits[(height - 3) * width + x] = true;
        }
        for y in 2..height - 2 {
            glyph.bits[y * width] = true;
            glyph.bits[y * width + width - 1] = true;
        }
        glyph
    }

    /// Whether the glyph is inked at normalized cell coordinates `u`, `v` in `[0, 1)`.
    pub fn ink(&self, u: f64, v: f64) -> bool {
        if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
            return false;
        }
        let x = (u * self.width as f64) as usize;
        let y = (v * self.height as f64) as usize;
        self.bits[y * self.width + x]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Face {
    Small,
    Medium,
    Large,
}

impl Face {
    fn for_pixel_height(px: f64) -> Self {
        if px <= 14.0 {
            Face::Small
        } else if px <= 20.0 {
            Face::Medium
        } else {
            Face::Large
        }
    }

    fn data(self) -> &'static [u8] {
        match self {
            Face::Small => FONT_6X12,
            Face::Medium => FONT_8X16,
            Face::Large => FONT_12X24,
        }
    }

    fn cell(self) -> (usize, usize) {
        match self {
            Face::Small => (6, 12),
            Face::Medium => (8, 16),
            Face::Large => (12, 24),
        }
    }
}

/// Decoded glyph cache for one rasterization pass.
#[derive(Debug, Default)]
pub struct GlyphCache {
    glyphs: HashMap<(Face, char), Glyph>,
}

impl GlyphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Glyph for `ch` at a font size of `px` output pixels.
    pub fn glyph(&mut self, ch: char, px: f64) -> &Glyph {
        let face = Face::for_pixel_height(px);
        self.glyphs
            .entry((face, ch))
            .or_insert_with(|| decode(face, ch))
    }
}

fn decode(face: Face, ch: char) -> Glyph {
    let (width, height) = face.cell();
    if ch.is_whitespace() {
        return Glyph::blank(width, height);
    }
    let Ok(mut font) = PSF2Font::new(face.data()) else {
        tracing::warn!(?face, "bitmap font failed to load");
        return Glyph::missing(width, height);
    };

    let utf8 = ch.to_string();
    match font.glyph_for_utf8(utf8.as_bytes()) {
        Some(rows) => {
            let mut glyph = Glyph::blank(width, height);
            for (y, row) in rows.enumerate() {
                for (x, on) in row.enumerate() {
                    if x < width && y < height {
                        glyph.bits[y * width + x] = on;
                    }
                }
            }
            glyph
        }
        None => Glyph::missing(width, height),
    }
}
