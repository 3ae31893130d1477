// glyph.rs
//
// Copyright (c) 2026  gifscribe developers
//
//! Glyph rasterization
//!
//! Every character is drawn black on white, centered in a square raster
//! whose side is the line height of the font.  Rendering is deterministic:
//! the same character and [FontSpec] always give identical pixels.
use font8x8::UnicodeFonts;
use pix::rgb::SRgba8;
use pix::Raster;
use std::collections::HashMap;

/// Default font family
pub const DEFAULT_FAMILY: &str = "Monospace";

/// Default point size
pub const DEFAULT_POINT_SIZE: u16 = 48;

/// Maximum point size (larger sizes are clamped)
pub const MAX_POINT_SIZE: u16 = 1024;

/// Maximum side length of glyph rasters
pub const MAX_SIDE: u32 = 2048;

/// Background color of glyph rasters
fn background() -> SRgba8 {
    SRgba8::new(0xFF, 0xFF, 0xFF, 0xFF)
}

/// Foreground color of glyph rasters
fn foreground() -> SRgba8 {
    SRgba8::new(0x00, 0x00, 0x00, 0xFF)
}

/// Font family and point size
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontSpec {
    family: String,
    point_size: u16,
}

/// Font metrics at one point size, in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Metrics {
    /// Distance from top of line to baseline
    pub ascent: u32,
    /// Distance from baseline to bottom of line
    pub descent: u32,
    /// Horizontal advance of every glyph
    pub advance: u32,
}

/// Coverage mask of one glyph
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphMask {
    width: u32,
    height: u32,
    /// Distance from top of mask to baseline
    ascent: u32,
    /// Row-major coverage (one per pixel)
    coverage: Vec<bool>,
}

/// A source of glyphs and metrics.
///
/// Implementations must be deterministic.
pub trait Typeface {
    /// Get metrics at a point size
    fn metrics(&self, point_size: u16) -> Metrics;

    /// Get a glyph mask at a point size.
    ///
    /// Returns `None` for characters without visible ink.
    fn glyph(&self, ch: char, point_size: u16) -> Option<GlyphMask>;
}

/// Monospace typeface scaled from an 8x8 bitmap font table
#[derive(Clone, Copy, Debug, Default)]
pub struct Fixed8x8;

/// Collection of typefaces by family name
pub struct FontCache {
    faces: HashMap<String, Box<dyn Typeface>>,
}

/// Renderer for one typeface at one point size
pub struct Rasterizer<'a> {
    face: &'a dyn Typeface,
    point_size: u16,
    metrics: Metrics,
}

impl Default for FontSpec {
    fn default() -> Self {
        FontSpec {
            family: DEFAULT_FAMILY.to_string(),
            point_size: DEFAULT_POINT_SIZE,
        }
    }
}

impl FontSpec {
    /// Create a font spec (point size is clamped to 1 - 1024)
    pub fn new(family: &str, point_size: u16) -> Self {
        FontSpec {
            family: family.to_string(),
            point_size: clamp_point_size(point_size),
        }
    }
    pub fn with_family(mut self, family: &str) -> Self {
        self.family = family.to_string();
        self
    }
    pub fn family(&self) -> &str {
        &self.family
    }
    pub fn with_point_size(mut self, point_size: u16) -> Self {
        self.point_size = clamp_point_size(point_size);
        self
    }
    pub fn point_size(&self) -> u16 {
        self.point_size
    }
}

/// Clamp a point size to the supported range
fn clamp_point_size(point_size: u16) -> u16 {
    point_size.max(1).min(MAX_POINT_SIZE)
}

impl Metrics {
    /// Get the line height
    pub fn height(&self) -> u32 {
        self.ascent + self.descent
    }
}

impl GlyphMask {
    /// Create a glyph mask.
    ///
    /// `coverage` holds one entry per pixel, row-major.
    ///
    /// # Panics
    ///
    /// Panics if `coverage` does not have `width * height` entries.
    pub fn new(
        width: u32,
        height: u32,
        ascent: u32,
        coverage: Vec<bool>,
    ) -> Self {
        assert_eq!(coverage.len(), width as usize * height as usize);
        GlyphMask {
            width,
            height,
            ascent,
            coverage,
        }
    }

    /// Check if a pixel is covered
    fn covered(&self, x: u32, y: u32) -> bool {
        self.coverage[(y * self.width + x) as usize]
    }
}

impl Fixed8x8 {
    /// Look up the 8x8 bitmap of a character
    fn bitmap(ch: char) -> Option<[u8; 8]> {
        font8x8::BASIC_FONTS
            .get(ch)
            .or_else(|| font8x8::LATIN_FONTS.get(ch))
            .or_else(|| font8x8::GREEK_FONTS.get(ch))
            .or_else(|| font8x8::BOX_FONTS.get(ch))
            .or_else(|| font8x8::BLOCK_FONTS.get(ch))
            .or_else(|| font8x8::HIRAGANA_FONTS.get(ch))
            .or_else(|| font8x8::MISC_FONTS.get(ch))
    }

    /// Get the ascent of the glyph box (7 of 8 rows are above baseline)
    fn box_ascent(em: u32) -> u32 {
        em * 7 / 8
    }
}

impl Typeface for Fixed8x8 {
    fn metrics(&self, point_size: u16) -> Metrics {
        let em = u32::from(clamp_point_size(point_size));
        let leading = em / 8;
        let box_ascent = Self::box_ascent(em);
        Metrics {
            ascent: box_ascent + leading,
            descent: em - box_ascent + leading,
            advance: em,
        }
    }

    fn glyph(&self, ch: char, point_size: u16) -> Option<GlyphMask> {
        if ch.is_control() || ch.is_whitespace() {
            return None;
        }
        let rows = Self::bitmap(ch)?;
        if rows.iter().all(|r| *r == 0) {
            return None;
        }
        let em = u32::from(clamp_point_size(point_size));
        let mut coverage = Vec::with_capacity((em * em) as usize);
        for y in 0..em {
            let row = rows[(y * 8 / em) as usize];
            for x in 0..em {
                // bit 0 is the leftmost column
                coverage.push((row >> (x * 8 / em)) & 1 != 0);
            }
        }
        Some(GlyphMask::new(em, em, Self::box_ascent(em), coverage))
    }
}

impl Default for FontCache {
    fn default() -> Self {
        let mut fonts = FontCache {
            faces: HashMap::new(),
        };
        fonts.insert(DEFAULT_FAMILY, Box::new(Fixed8x8));
        fonts.insert("Monospaced", Box::new(Fixed8x8));
        fonts
    }
}

impl FontCache {
    /// Insert a typeface (family names are case-insensitive)
    pub fn insert(&mut self, family: &str, face: Box<dyn Typeface>) {
        self.faces.insert(family.to_lowercase(), face);
    }

    /// Check if a family is available
    pub fn contains(&self, family: &str) -> bool {
        self.faces.contains_key(&family.to_lowercase())
    }

    /// Look up a typeface, falling back to the default family
    pub fn typeface(&self, family: &str) -> &dyn Typeface {
        match self.faces.get(&family.to_lowercase()) {
            Some(face) => &**face,
            None => {
                warn!("font {:?} not found, using {}", family, DEFAULT_FAMILY);
                match self.faces.get(&DEFAULT_FAMILY.to_lowercase()) {
                    Some(face) => &**face,
                    None => &Fixed8x8,
                }
            }
        }
    }

    /// Make a rasterizer for a font spec
    pub fn rasterizer(&self, font: &FontSpec) -> Rasterizer<'_> {
        Rasterizer::new(self.typeface(font.family()), font.point_size())
    }
}

impl<'a> Rasterizer<'a> {
    /// Create a rasterizer
    pub fn new(face: &'a dyn Typeface, point_size: u16) -> Self {
        let point_size = clamp_point_size(point_size);
        let metrics = face.metrics(point_size);
        Rasterizer {
            face,
            point_size,
            metrics,
        }
    }

    /// Get the font metrics
    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    /// Get the side length of rendered rasters
    pub fn side(&self) -> u32 {
        self.metrics.height().max(1)
    }

    /// Render one character to a square raster
    pub fn render(&self, ch: char) -> Raster<SRgba8> {
        let side = self.side();
        let mut raster = Raster::with_color(side, side, background());
        if let Some(mask) = self.face.glyph(ch, self.point_size) {
            let m = &self.metrics;
            let x0 = (side as i32 - m.advance as i32) / 2;
            let baseline = (side as i32 - m.height() as i32) / 2
                + m.ascent as i32;
            let y0 = baseline - mask.ascent as i32;
            draw_mask(&mut raster, &mask, x0, y0);
        }
        raster
    }
}

/// Draw a glyph mask onto a raster, clipping at the edges
fn draw_mask(raster: &mut Raster<SRgba8>, mask: &GlyphMask, x0: i32, y0: i32) {
    let (w, h) = (raster.width() as i32, raster.height() as i32);
    for y in 0..mask.height {
        let ry = y0 + y as i32;
        if ry < 0 || ry >= h {
            continue;
        }
        for x in 0..mask.width {
            let rx = x0 + x as i32;
            if rx >= 0 && rx < w && mask.covered(x, y) {
                *raster.pixel_mut(rx, ry) = foreground();
            }
        }
    }
}

/// Render one character with the built-in fonts.
///
/// Unknown families fall back to the default monospace typeface.
pub fn render(ch: char, font: &FontSpec) -> Raster<SRgba8> {
    FontCache::default().rasterizer(font).render(ch)
}
