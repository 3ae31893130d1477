// private.rs
//
// Copyright (c) 2026  gifscribe developers
//
//! Private module for top-level items
use crate::block::DisposalMethod;
use crate::encode::{BlockEnc, FrameEnc};
use crate::palette::PaletteBuilder;
use crate::Result;
use pix::rgb::SRgba8;
use pix::Raster;
use std::io::Write;

/// Default frame delay (hundredths of a second)
pub const DEFAULT_DELAY_TIME_CS: u16 = 100;

/// One animation frame: a raster with timing and disposal
#[derive(Clone)]
pub struct Frame {
    /// Raster of frame pixels
    raster: Raster<SRgba8>,
    /// Display delay (hundredths of a second)
    delay_time_cs: u16,
    /// Disposal method
    disposal_method: DisposalMethod,
}

impl Frame {
    /// Create a frame from a raster
    pub fn new(raster: Raster<SRgba8>) -> Self {
        Frame {
            raster,
            delay_time_cs: DEFAULT_DELAY_TIME_CS,
            disposal_method: DisposalMethod::default(),
        }
    }
    pub fn with_delay_time_cs(mut self, delay_time_cs: u16) -> Self {
        self.delay_time_cs = delay_time_cs;
        self
    }
    pub fn with_disposal_method(
        mut self,
        disposal_method: DisposalMethod,
    ) -> Self {
        self.disposal_method = disposal_method;
        self
    }
    pub fn raster(&self) -> &Raster<SRgba8> {
        &self.raster
    }
    pub fn delay_time_cs(&self) -> u16 {
        self.delay_time_cs
    }
    pub fn disposal_method(&self) -> DisposalMethod {
        self.disposal_method
    }
    /// Get the raster back
    pub fn into_raster(self) -> Raster<SRgba8> {
        self.raster
    }
}

/// GIF file encoder
///
/// Can be converted to one of two encoders:
/// * [into_frame_enc] for streaming [Frame]s
/// * [into_block_enc] for low-level [Block]s
///
/// The writer is not buffered; wrap files in a `BufWriter`.
///
/// ## Encoding Example
/// ```
/// use gifscribe::{Encoder, Frame};
/// use pix::{rgb::SRgba8, Raster};
/// use std::error::Error;
/// use std::io::Write;
///
/// fn encode<W: Write>(w: W) -> Result<W, Box<dyn Error>> {
///     let mut enc = Encoder::new(w)
///         .with_loop_count(Some(0))
///         .into_frame_enc(4, 4)?;
///     for i in 0..4 {
///         let black = SRgba8::new(0, 0, 0, 255);
///         let mut raster = Raster::with_color(4, 4, black);
///         *raster.pixel_mut(i, i) = SRgba8::new(0xFF, 0xFF, 0, 255);
///         enc.write_frame(&Frame::new(raster).with_delay_time_cs(50))?;
///     }
///     Ok(enc.finish()?)
/// }
/// # let gif = encode(Vec::new()).unwrap();
/// # assert_eq!(&gif[..6], b"GIF89a");
/// ```
///
/// [Block]: block/enum.Block.html
/// [Frame]: struct.Frame.html
/// [into_block_enc]: struct.Encoder.html#method.into_block_enc
/// [into_frame_enc]: struct.Encoder.html#method.into_frame_enc
pub struct Encoder<W: Write> {
    /// Writer for output data
    writer: W,
    /// Animation loop count (0 for infinite)
    loop_count: Option<u16>,
    /// Palette builder for frames
    palette_builder: PaletteBuilder,
}

impl<W: Write> Encoder<W> {
    /// Create a new GIF encoder.
    pub fn new(writer: W) -> Self {
        Encoder {
            writer,
            loop_count: None,
            palette_builder: PaletteBuilder::default(),
        }
    }

    /// Set the animation loop count.
    ///
    /// * `None`: play once (no looping extension)
    /// * `Some(0)`: loop forever
    /// * `Some(n)`: loop `n` times
    pub fn with_loop_count(mut self, loop_count: Option<u16>) -> Self {
        self.loop_count = loop_count;
        self
    }

    /// Set the palette builder used for each frame.
    pub fn with_palette_builder(
        mut self,
        palette_builder: PaletteBuilder,
    ) -> Self {
        self.palette_builder = palette_builder;
        self
    }

    /// Convert into a block encoder.
    pub fn into_block_enc(self) -> BlockEnc<W> {
        BlockEnc::new(self.writer)
    }

    /// Convert into a frame encoder, writing the file preamble.
    ///
    /// Every frame must be `width` x `height` pixels.
    pub fn into_frame_enc(
        self,
        width: u32,
        height: u32,
    ) -> Result<FrameEnc<W>> {
        let loop_count = self.loop_count;
        let palette_builder = self.palette_builder;
        FrameEnc::open(
            self.into_block_enc(),
            width,
            height,
            loop_count,
            palette_builder,
        )
    }
}
