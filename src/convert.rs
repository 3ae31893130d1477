// convert.rs
//
// Copyright (c) 2026  gifscribe developers
//
//! Text to animated GIF conversion
use crate::block::DisposalMethod;
use crate::error::{Error, Result};
use crate::glyph::{FontCache, FontSpec, MAX_SIDE};
use crate::private::{Encoder, DEFAULT_DELAY_TIME_CS};
use crate::sequence::{Chars, Frames};
use std::io::{Read, Write};

/// Converter from text to an animated GIF, one frame per character.
///
/// ## Example
/// ```
/// use gifscribe::Converter;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut gif = Vec::new();
/// let n_frames = Converter::default()
///     .with_delay_time_cs(50)
///     .with_loop_count(Some(0))
///     .convert_str("Hello", &mut gif)?;
/// assert_eq!(n_frames, 5);
/// assert_eq!(gif.last(), Some(&0x3B));
/// # Ok(())
/// # }
/// ```
pub struct Converter {
    /// Available typefaces
    fonts: FontCache,
    /// Font to render with
    font: FontSpec,
    /// Delay of each frame (hundredths of a second)
    delay_time_cs: u16,
    /// Animation loop count
    loop_count: Option<u16>,
    /// Disposal method of each frame
    disposal_method: DisposalMethod,
}

impl Default for Converter {
    fn default() -> Self {
        Converter {
            fonts: FontCache::default(),
            font: FontSpec::default(),
            delay_time_cs: DEFAULT_DELAY_TIME_CS,
            loop_count: None,
            disposal_method: DisposalMethod::default(),
        }
    }
}

impl Converter {
    /// Set the font
    pub fn with_font(mut self, font: FontSpec) -> Self {
        self.font = font;
        self
    }

    /// Set the available typefaces
    pub fn with_fonts(mut self, fonts: FontCache) -> Self {
        self.fonts = fonts;
        self
    }

    /// Set the delay of each frame (hundredths of a second)
    pub fn with_delay_time_cs(mut self, delay_time_cs: u16) -> Self {
        self.delay_time_cs = delay_time_cs;
        self
    }

    /// Set the animation loop count (`Some(0)` loops forever)
    pub fn with_loop_count(mut self, loop_count: Option<u16>) -> Self {
        self.loop_count = loop_count;
        self
    }

    /// Set the disposal method of each frame
    pub fn with_disposal_method(
        mut self,
        disposal_method: DisposalMethod,
    ) -> Self {
        self.disposal_method = disposal_method;
        self
    }

    /// Convert text to an animated GIF.
    ///
    /// Returns the number of frames written.  On error, the sink holds a
    /// truncated file.  Typefaces with a line height above 2048 pixels are
    /// rejected before anything is written.
    pub fn convert<R, W>(&self, text: R, sink: W) -> Result<usize>
    where
        R: Read,
        W: Write,
    {
        let rasterizer = self.fonts.rasterizer(&self.font);
        let frames = Frames::new(Chars::new(text), rasterizer)
            .with_delay_time_cs(self.delay_time_cs)
            .with_disposal_method(self.disposal_method);
        let side = frames.side();
        if side > MAX_SIDE {
            return Err(Error::InvalidRasterDimensions);
        }
        let mut enc = Encoder::new(sink)
            .with_loop_count(self.loop_count)
            .into_frame_enc(side, side)?;
        for frame in frames {
            enc.write_frame(&frame?)?;
        }
        let n_frames = enc.frame_count();
        enc.finish()?;
        info!(
            "converted {} frames ({}x{}, {} pt {})",
            n_frames,
            side,
            side,
            self.font.point_size(),
            self.font.family()
        );
        Ok(n_frames)
    }

    /// Convert a string to an animated GIF
    pub fn convert_str<W: Write>(&self, text: &str, sink: W) -> Result<usize> {
        self.convert(text.as_bytes(), sink)
    }
}

/// Convert text to an animated GIF with the default font.
///
/// * `delay_time_cs`: delay of each frame (hundredths of a second)
/// * `looping`: loop forever if `true`, otherwise play once
///
/// Returns the number of frames written.
pub fn convert<R, W>(
    text: R,
    sink: W,
    delay_time_cs: u16,
    looping: bool,
) -> Result<usize>
where
    R: Read,
    W: Write,
{
    Converter::default()
        .with_delay_time_cs(delay_time_cs)
        .with_loop_count(if looping { Some(0) } else { None })
        .convert(text, sink)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::encode::test::Limited;
    use crate::glyph::{render, GlyphMask, Metrics, Typeface};
    use crate::Frame;
    use gif::{ColorOutput, DecodeOptions, Repeat};
    use pix::rgb::SRgba8;
    use pix::Raster;

    /// Decoded animation
    struct Decoded {
        frames: Vec<gif::Frame<'static>>,
        repeat: Repeat,
        width: u16,
        height: u16,
    }

    fn decode(data: &[u8]) -> Decoded {
        let mut options = DecodeOptions::new();
        options.set_color_output(ColorOutput::RGBA);
        let mut decoder = options.read_info(data).unwrap();
        let width = decoder.width();
        let height = decoder.height();
        let mut frames = vec![];
        while let Some(frame) = decoder.read_next_frame().unwrap() {
            frames.push(frame.clone());
        }
        Decoded {
            frames,
            repeat: decoder.repeat(),
            width,
            height,
        }
    }

    fn count(data: &[u8], pat: &[u8]) -> usize {
        data.windows(pat.len()).filter(|w| *w == pat).count()
    }

    #[test]
    fn hi_looping() -> Result<()> {
        let mut out = vec![];
        assert_eq!(convert(&b"Hi"[..], &mut out, 100, true)?, 2);
        assert_eq!(&out[..6], b"GIF89a");
        assert_eq!(out.last(), Some(&0x3B));
        assert_eq!(count(&out, b"NETSCAPE2.0"), 1);
        let d = decode(&out);
        assert_eq!((d.width, d.height), (60, 60));
        assert_eq!(d.repeat, Repeat::Infinite);
        assert_eq!(d.frames.len(), 2);
        for f in &d.frames {
            assert_eq!((f.width, f.height), (60, 60));
            assert_eq!(f.delay, 100);
        }
        Ok(())
    }

    #[test]
    fn no_loop() -> Result<()> {
        let mut out = vec![];
        assert_eq!(convert(&b"abc"[..], &mut out, 20, false)?, 3);
        assert_eq!(count(&out, b"NETSCAPE2.0"), 0);
        let d = decode(&out);
        assert_eq!(d.frames.len(), 3);
        assert!(d.frames.iter().all(|f| f.delay == 20));
        Ok(())
    }

    #[test]
    fn finite_repeat() -> Result<()> {
        let mut out = vec![];
        Converter::default()
            .with_loop_count(Some(3))
            .convert_str("ab", &mut out)?;
        assert_eq!(decode(&out).repeat, Repeat::Finite(3));
        Ok(())
    }

    #[test]
    fn empty_text() -> Result<()> {
        let mut out = vec![];
        assert_eq!(convert(&b""[..], &mut out, 100, true)?, 0);
        // header, screen descriptor, loop extension, trailer
        assert_eq!(out.len(), 6 + 7 + 19 + 1);
        assert_eq!(decode(&out).frames.len(), 0);
        let mut out = vec![];
        assert_eq!(convert(&b""[..], &mut out, 100, false)?, 0);
        assert_eq!(out.len(), 6 + 7 + 1);
        Ok(())
    }

    #[test]
    fn whitespace_frames() -> Result<()> {
        let text = "a b\n\tc ";
        let mut out = vec![];
        let n = Converter::default().convert_str(text, &mut out)?;
        assert_eq!(n, text.chars().count());
        assert_eq!(decode(&out).frames.len(), n);
        Ok(())
    }

    #[test]
    fn identical_bytes() -> Result<()> {
        let conv = Converter::default().with_loop_count(Some(0));
        let mut a = vec![];
        let mut b = vec![];
        conv.convert_str("Same text ÄΩ█", &mut a)?;
        conv.convert_str("Same text ÄΩ█", &mut b)?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn pixels_round_trip() -> Result<()> {
        let text = "Gif!█ ";
        let font = FontSpec::new("Monospace", 16);
        let mut out = vec![];
        Converter::default()
            .with_font(font.clone())
            .with_disposal_method(DisposalMethod::Background)
            .convert_str(text, &mut out)?;
        let d = decode(&out);
        assert_eq!(d.frames.len(), text.chars().count());
        for (f, c) in d.frames.iter().zip(text.chars()) {
            let raster = render(c, &font);
            assert_eq!(f.width as u32, raster.width());
            assert_eq!(&f.buffer[..], raster.as_u8_slice(), "{:?}", c);
            assert_eq!(f.dispose, gif::DisposalMethod::Background);
        }
        Ok(())
    }

    #[test]
    fn many_colors() -> Result<()> {
        let mut raster = Raster::with_clear(20, 15);
        for (i, p) in raster.pixels_mut().iter_mut().enumerate() {
            *p = SRgba8::new(i as u8, (i >> 8) as u8 * 100, 7, 255);
        }
        let encode = || -> Result<Vec<u8>> {
            let mut enc = Encoder::new(vec![]).into_frame_enc(20, 15)?;
            enc.write_frame(&Frame::new(raster.clone()))?;
            enc.finish()
        };
        let a = encode()?;
        assert_eq!(a, encode()?);
        let d = decode(&a);
        assert_eq!(d.frames.len(), 1);
        assert_eq!(d.frames[0].buffer.len(), 20 * 15 * 4);
        Ok(())
    }

    #[test]
    fn unknown_font() -> Result<()> {
        let mut a = vec![];
        let mut b = vec![];
        Converter::default()
            .with_font(FontSpec::new("Nonexistent Sans", 48))
            .convert_str("A", &mut a)?;
        Converter::default().convert_str("A", &mut b)?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn invalid_input() {
        let mut out = vec![];
        match convert(&b"ok\xFE"[..], &mut out, 100, false) {
            Err(Error::InvalidUtf8 { offset }) => assert_eq!(offset, 2),
            _ => panic!("expected invalid UTF-8"),
        }
        // frames before the error were written, but no trailer
        assert_ne!(out.last(), Some(&0x3B));
    }

    /// Typeface with an oversized line height
    struct Huge;

    impl Typeface for Huge {
        fn metrics(&self, _point_size: u16) -> Metrics {
            Metrics {
                ascent: 60_000,
                descent: 2_000,
                advance: 40_000,
            }
        }

        fn glyph(&self, _ch: char, _point_size: u16) -> Option<GlyphMask> {
            None
        }
    }

    #[test]
    fn oversized_typeface() {
        let mut fonts = FontCache::default();
        fonts.insert("Huge", Box::new(Huge));
        let mut out = vec![];
        let res = Converter::default()
            .with_fonts(fonts)
            .with_font(FontSpec::new("huge", 48))
            .convert_str("A", &mut out);
        assert!(matches!(res, Err(Error::InvalidRasterDimensions)));
        assert!(out.is_empty());
    }

    #[test]
    fn sink_failure() {
        let conv = Converter::default().with_loop_count(Some(0));
        let mut full = vec![];
        conv.convert_str("Hi!", &mut full).unwrap();
        for limit in &[0, 10, 32, 100, full.len() - 1] {
            let mut sink = Limited::new(*limit);
            match conv.convert_str("Hi!", &mut sink) {
                Err(Error::Io(_)) => (),
                _ => panic!("expected I/O error at limit {}", limit),
            }
            // nothing past the failed write, and no trailer
            assert!(full.starts_with(sink.data()));
            assert!(sink.data().len() < full.len());
        }
    }
}
