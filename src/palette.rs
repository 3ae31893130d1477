// palette.rs
//
// Copyright (c) 2026  gifscribe developers
//
//! Indexed palettes for GIF frames
use crate::block::MAX_TABLE_LEN;
use pix::el::Pixel;
use pix::gray::Gray8;
use pix::rgb::{SRgb8, SRgba8};
use pix::Raster;
use std::collections::HashMap;

/// Pixels with alpha below this value are transparent
const ALPHA_THRESHOLD: u8 = 128;

/// Color of the transparent palette entry
const TRANSPARENT_RGB: [u8; 3] = [0, 0, 0];

/// Indexed color palette with at most 256 entries
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Palette {
    /// RGB entries
    colors: Vec<[u8; 3]>,
    /// Transparent entry index
    transparent: Option<u8>,
}

/// Builder which reduces a raster to a palette and an index raster.
///
/// Distinct colors are used directly (in first-seen order) when they fit.
/// Otherwise, a weighted median-cut reduction picks representative colors,
/// and every pixel maps to its nearest representative (squared RGB
/// distance).  The result only depends on the raster contents.
#[derive(Clone, Copy, Debug)]
pub struct PaletteBuilder {
    /// Maximum number of entries (2 - 256)
    max_colors: usize,
}

/// Color key: `None` for transparent pixels
type Key = Option<[u8; 3]>;

/// Distinct opaque color with pixel count
#[derive(Clone, Copy, Debug)]
struct ColorCount {
    rgb: [u8; 3],
    count: usize,
}

impl Palette {
    /// Get the number of entries
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Check if the palette has no entries
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Get one entry
    pub fn entry(&self, i: usize) -> Option<SRgb8> {
        self.colors.get(i).map(|c| SRgb8::new(c[0], c[1], c[2]))
    }

    /// Get the transparent entry index
    pub fn transparent_color(&self) -> Option<u8> {
        self.transparent
    }

    /// Get entries as packed RGB bytes
    pub fn as_rgb_bytes(&self) -> Vec<u8> {
        self.colors.iter().flat_map(|c| c.iter().copied()).collect()
    }
}

impl Default for PaletteBuilder {
    fn default() -> Self {
        PaletteBuilder {
            max_colors: MAX_TABLE_LEN,
        }
    }
}

impl PaletteBuilder {
    /// Limit the number of palette entries (clamped to 2 - 256).
    pub fn with_max_colors(mut self, max_colors: usize) -> Self {
        self.max_colors = max_colors.max(2).min(MAX_TABLE_LEN);
        self
    }

    /// Reduce a raster to a palette and an index raster.
    pub fn reduce(&self, raster: &Raster<SRgba8>) -> (Palette, Raster<Gray8>) {
        let (keys, counts) = distinct_keys(raster);
        let has_transparent = keys.iter().any(|k| k.is_none());
        let capacity = self.max_colors - has_transparent as usize;
        let n_opaque = keys.len() - has_transparent as usize;
        let (palette, mapping) = if n_opaque <= capacity {
            direct(&keys)
        } else {
            debug!("reducing {} colors to {}", n_opaque, capacity);
            reduced(&keys, &counts, capacity)
        };
        let mut indexed = Raster::with_clear(raster.width(), raster.height());
        for (dst, src) in indexed.pixels_mut().iter_mut().zip(raster.pixels())
        {
            // every key was collected from this raster
            let i = mapping.get(&key(*src)).copied().unwrap_or_default();
            *dst = Gray8::new(i);
        }
        (palette, indexed)
    }
}

/// Get the color key of a pixel
fn key(p: SRgba8) -> Key {
    let ch = p.channels();
    if u8::from(ch[3]) < ALPHA_THRESHOLD {
        None
    } else {
        Some([u8::from(ch[0]), u8::from(ch[1]), u8::from(ch[2])])
    }
}

/// Collect distinct keys in first-seen order, with pixel counts
fn distinct_keys(raster: &Raster<SRgba8>) -> (Vec<Key>, Vec<usize>) {
    let mut positions = HashMap::new();
    let mut keys = vec![];
    let mut counts: Vec<usize> = vec![];
    for p in raster.pixels() {
        let k = key(*p);
        let i = *positions.entry(k).or_insert_with(|| {
            keys.push(k);
            counts.push(0);
            keys.len() - 1
        });
        counts[i] += 1;
    }
    (keys, counts)
}

/// Make a palette using every distinct key
fn direct(keys: &[Key]) -> (Palette, HashMap<Key, u8>) {
    let mut palette = Palette::default();
    let mut mapping = HashMap::with_capacity(keys.len());
    for (i, k) in keys.iter().enumerate() {
        let i = i as u8;
        match k {
            Some(rgb) => palette.colors.push(*rgb),
            None => {
                palette.colors.push(TRANSPARENT_RGB);
                palette.transparent = Some(i);
            }
        }
        mapping.insert(*k, i);
    }
    (palette, mapping)
}

/// Make a palette of representative colors
fn reduced(
    keys: &[Key],
    counts: &[usize],
    capacity: usize,
) -> (Palette, HashMap<Key, u8>) {
    let colors: Vec<ColorCount> = keys
        .iter()
        .zip(counts)
        .filter_map(|(k, &count)| k.map(|rgb| ColorCount { rgb, count }))
        .collect();
    let mut palette = Palette {
        colors: median_cut(colors.clone(), capacity),
        transparent: None,
    };
    let mut mapping = HashMap::with_capacity(keys.len());
    for c in &colors {
        mapping.insert(Some(c.rgb), nearest(&palette.colors, c.rgb));
    }
    if keys.contains(&None) {
        let t = palette.colors.len() as u8;
        palette.colors.push(TRANSPARENT_RGB);
        palette.transparent = Some(t);
        mapping.insert(None, t);
    }
    (palette, mapping)
}

/// Find the index of the nearest color (lowest index on ties)
fn nearest(colors: &[[u8; 3]], rgb: [u8; 3]) -> u8 {
    let mut best = (0, u32::MAX);
    for (i, c) in colors.iter().enumerate() {
        let d = distance_sq(*c, rgb);
        if d < best.1 {
            best = (i, d);
        }
    }
    best.0 as u8
}

/// Squared euclidean distance in RGB space
fn distance_sq(a: [u8; 3], b: [u8; 3]) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(&a, &b)| {
            let d = i32::from(a) - i32::from(b);
            (d * d) as u32
        })
        .sum()
}

/// Get the (channel, range) with the widest range in a box
fn widest_channel(bx: &[ColorCount]) -> (usize, u8) {
    let mut widest = (0, 0);
    for ch in 0..3 {
        let lo = bx.iter().map(|c| c.rgb[ch]).min().unwrap_or(0);
        let hi = bx.iter().map(|c| c.rgb[ch]).max().unwrap_or(0);
        if hi - lo > widest.1 {
            widest = (ch, hi - lo);
        }
    }
    widest
}

/// Reduce colors to at most `capacity` representatives by median cut
fn median_cut(colors: Vec<ColorCount>, capacity: usize) -> Vec<[u8; 3]> {
    let mut boxes = vec![colors];
    while boxes.len() < capacity {
        // pick the splittable box with the widest range
        let mut pick = None;
        for (i, bx) in boxes.iter().enumerate() {
            if bx.len() < 2 {
                continue;
            }
            let (ch, range) = widest_channel(bx);
            match pick {
                Some((_, _, r)) if r >= range => {}
                _ => pick = Some((i, ch, range)),
            }
        }
        let (i, ch, _) = match pick {
            Some(p) => p,
            None => break,
        };
        let mut bx = std::mem::take(&mut boxes[i]);
        bx.sort_by_key(|c| (c.rgb[ch], c.rgb));
        let total: usize = bx.iter().map(|c| c.count).sum();
        let mut acc = 0;
        let mut split = bx.len() - 1;
        for (j, c) in bx.iter().enumerate() {
            acc += c.count;
            if acc * 2 >= total {
                split = j + 1;
                break;
            }
        }
        let split = split.max(1).min(bx.len() - 1);
        let upper = bx.split_off(split);
        boxes[i] = bx;
        boxes.push(upper);
    }
    let mut reps: Vec<[u8; 3]> = Vec::with_capacity(boxes.len());
    for bx in &boxes {
        let rep = mean(bx);
        if !reps.contains(&rep) {
            reps.push(rep);
        }
    }
    reps
}

/// Get the count-weighted mean color of a box
fn mean(bx: &[ColorCount]) -> [u8; 3] {
    let total: usize = bx.iter().map(|c| c.count).sum::<usize>().max(1);
    let mut rgb = [0; 3];
    for (ch, v) in rgb.iter_mut().enumerate() {
        let sum: usize =
            bx.iter().map(|c| c.rgb[ch] as usize * c.count).sum();
        *v = ((sum + total / 2) / total) as u8;
    }
    rgb
}
