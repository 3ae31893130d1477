// encode.rs
//
// Copyright (c) 2026  gifscribe developers
//
//! GIF file encoding
use crate::block::*;
use crate::error::{Error, Result};
use crate::lzw::Compressor;
use crate::palette::PaletteBuilder;
use crate::private::Frame;
use std::convert::TryFrom;
use std::io::{self, Write};

/// Maximum bytes in one sub-block
const SUB_BLOCK_SZ: usize = 0xFF;

/// Low-level encoder for [Block]s.
///
/// Blocks are written as given; no sequence checking is done.
///
/// [Block]: block/enum.Block.html
pub struct BlockEnc<W: Write> {
    /// Writer for output data
    writer: W,
}

/// Encoder state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    /// Header, screen descriptor and loop extension written
    HeaderWritten,
    /// At least one frame written
    FrameWritten,
    /// Trailer written
    Finalized,
}

/// Streaming encoder for [Frame]s.
///
/// The preamble is written when the encoder is opened; each frame is written
/// immediately with its own local color table.  Call [close] (or [finish])
/// to write the trailer.  Dropping the encoder without closing it leaves a
/// truncated file.
///
/// [close]: struct.FrameEnc.html#method.close
/// [finish]: struct.FrameEnc.html#method.finish
/// [Frame]: struct.Frame.html
pub struct FrameEnc<W: Write> {
    /// Block encoder
    block_enc: BlockEnc<W>,
    /// Canvas width
    width: u16,
    /// Canvas height
    height: u16,
    /// Palette builder for frames
    palette_builder: PaletteBuilder,
    /// Current state
    state: State,
    /// Number of frames written
    n_frames: usize,
}

impl<W: Write> BlockEnc<W> {
    /// Create a new block encoder
    pub(crate) fn new(writer: W) -> Self {
        BlockEnc { writer }
    }

    /// Encode one block
    pub fn encode<B>(&mut self, block: B) -> io::Result<()>
    where
        B: Into<Block>,
    {
        use crate::block::Block::*;
        let mut w = &mut self.writer;
        match block.into() {
            Header(b) => b.format(&mut w),
            LogicalScreenDesc(b) => b.format(&mut w),
            Application(b) => b.format(&mut w),
            GraphicControl(b) => b.format(&mut w),
            ImageDesc(b) => b.format(&mut w),
            LocalColorTable(b) => b.format(&mut w),
            ImageData(b) => b.format(&mut w),
            Trailer(b) => b.format(&mut w),
        }
    }

    /// Flush the writer
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Get the writer back
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl Header {
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(b"GIF")?;
        w.write_all(&self.version())
    }
}

impl LogicalScreenDesc {
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let mut buf = Vec::with_capacity(7);
        buf.extend_from_slice(&self.screen_width().to_le_bytes());
        buf.extend_from_slice(&self.screen_height().to_le_bytes());
        buf.push(self.flags());
        buf.push(self.background_color_idx());
        buf.push(self.pixel_aspect_ratio());
        w.write_all(&buf)
    }
}

impl Application {
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&[
            BlockCode::Extension_.signature(),
            ExtensionCode::Application_.into(),
        ])?;
        for c in self.app_data() {
            assert!(c.len() <= SUB_BLOCK_SZ);
            w.write_all(&[c.len() as u8])?; // block size
            w.write_all(c)?;
        }
        w.write_all(&[0]) // block size
    }
}

impl GraphicControl {
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let mut buf = Vec::with_capacity(8);
        buf.push(BlockCode::Extension_.signature());
        buf.push(ExtensionCode::GraphicControl_.into());
        buf.push(4); // block size
        buf.push(self.flags());
        buf.extend_from_slice(&self.delay_time_cs().to_le_bytes());
        buf.push(self.transparent_color_idx());
        buf.push(0); // block size
        w.write_all(&buf)
    }
}

impl ImageDesc {
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let mut buf = Vec::with_capacity(10);
        buf.push(BlockCode::ImageDesc_.signature());
        buf.extend_from_slice(&self.left().to_le_bytes());
        buf.extend_from_slice(&self.top().to_le_bytes());
        buf.extend_from_slice(&self.width().to_le_bytes());
        buf.extend_from_slice(&self.height().to_le_bytes());
        buf.push(self.flags());
        w.write_all(&buf)
    }
}

impl LocalColorTable {
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(self.colors())
    }
}

impl ImageData {
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let mut buffer = Vec::with_capacity(self.data().len() / 2 + 16);
        let mut compressor = Compressor::new(self.min_code_size());
        compressor.compress(self.data(), &mut buffer);
        w.write_all(&[self.min_code_size()])?;
        for chunk in buffer.chunks(SUB_BLOCK_SZ) {
            w.write_all(&[chunk.len() as u8])?; // block size
            w.write_all(chunk)?;
        }
        w.write_all(&[0]) // block size
    }
}

impl Trailer {
    fn format<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&[BlockCode::Trailer_.signature()])
    }
}

impl<W: Write> FrameEnc<W> {
    /// Open a frame encoder, writing the preamble blocks
    pub(crate) fn open(
        mut block_enc: BlockEnc<W>,
        width: u32,
        height: u32,
        loop_count: Option<u16>,
        palette_builder: PaletteBuilder,
    ) -> Result<Self> {
        let width = canvas_dim(width)?;
        let height = canvas_dim(height)?;
        debug!("header: {}x{}, loop count {:?}", width, height, loop_count);
        block_enc.encode(Header::default())?;
        block_enc.encode(
            LogicalScreenDesc::default()
                .with_screen_width(width)
                .with_screen_height(height),
        )?;
        if let Some(loop_count) = loop_count {
            block_enc.encode(Application::with_loop_count(loop_count))?;
        }
        Ok(FrameEnc {
            block_enc,
            width,
            height,
            palette_builder,
            state: State::HeaderWritten,
            n_frames: 0,
        })
    }

    /// Get the canvas width
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Get the canvas height
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Get the number of frames written
    pub fn frame_count(&self) -> usize {
        self.n_frames
    }

    /// Check if the trailer has been written
    pub fn is_finalized(&self) -> bool {
        self.state == State::Finalized
    }

    /// Encode one frame.
    ///
    /// The frame raster must be the same size as the canvas.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        if self.state == State::Finalized {
            return Err(Error::InvalidStateTransition);
        }
        let raster = frame.raster();
        if raster.width() != u32::from(self.width)
            || raster.height() != u32::from(self.height)
        {
            return Err(Error::DimensionMismatch {
                frame: self.n_frames,
                expected: (self.width, self.height),
                found: (raster.width(), raster.height()),
            });
        }
        let (palette, indexed) = self.palette_builder.reduce(raster);
        let tbl = ColorTableConfig::new(palette.len());
        debug!(
            "frame {}: {} colors, delay {}cs",
            self.n_frames,
            palette.len(),
            frame.delay_time_cs()
        );
        let mut control = GraphicControl::default();
        control.set_disposal_method(frame.disposal_method());
        control.set_delay_time_cs(frame.delay_time_cs());
        control.set_transparent_color(palette.transparent_color());
        self.block_enc.encode(control)?;
        self.block_enc.encode(
            ImageDesc::default()
                .with_width(self.width)
                .with_height(self.height)
                .with_color_table_config(tbl),
        )?;
        let colors = palette.as_rgb_bytes();
        self.block_enc
            .encode(LocalColorTable::with_colors(&colors, tbl))?;
        let data = indexed.as_u8_slice().to_vec();
        self.block_enc
            .encode(ImageData::with_indices(tbl.min_code_size(), data))?;
        self.state = State::FrameWritten;
        self.n_frames += 1;
        Ok(())
    }

    /// Write the trailer and flush.
    ///
    /// Closing an encoder which is already closed does nothing.
    pub fn close(&mut self) -> Result<()> {
        if self.state != State::Finalized {
            self.block_enc.encode(Trailer::default())?;
            self.block_enc.flush()?;
            self.state = State::Finalized;
            debug!("trailer: {} frames", self.n_frames);
        }
        Ok(())
    }

    /// Close the encoder and get the writer back
    pub fn finish(mut self) -> Result<W> {
        self.close()?;
        Ok(self.block_enc.into_inner())
    }
}

/// Check one canvas dimension
fn canvas_dim(dim: u32) -> Result<u16> {
    match u16::try_from(dim) {
        Ok(d) if d > 0 => Ok(d),
        _ => Err(Error::InvalidRasterDimensions),
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::Encoder;
    use pix::rgb::SRgba8;
    use pix::Raster;

    /// Writer which fails once a byte limit would be exceeded
    pub(crate) struct Limited {
        data: Vec<u8>,
        limit: usize,
    }

    impl Limited {
        pub(crate) fn new(limit: usize) -> Self {
            Limited {
                data: vec![],
                limit,
            }
        }

        pub(crate) fn data(&self) -> &[u8] {
            &self.data
        }
    }

    impl Write for Limited {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.data.len() + buf.len() > self.limit {
                return Err(io::Error::new(io::ErrorKind::Other, "sink full"));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn frame(width: u32, height: u32) -> Frame {
        let white = SRgba8::new(255, 255, 255, 255);
        let mut r = Raster::with_color(width, height, white);
        *r.pixel_mut(0, 0) = SRgba8::new(0, 0, 0, 255);
        Frame::new(r).with_delay_time_cs(100)
    }

    #[test]
    fn preamble_without_loop() -> Result<()> {
        let enc = Encoder::new(vec![]).into_frame_enc(60, 60)?;
        let out = enc.finish()?;
        assert_eq!(
            out,
            vec![
                b'G', b'I', b'F', b'8', b'9', b'a', 60, 0, 60, 0, 0, 0, 0, 0x3B
            ]
        );
        Ok(())
    }

    #[test]
    fn loop_extension() -> Result<()> {
        let enc = Encoder::new(vec![])
            .with_loop_count(Some(0))
            .into_frame_enc(2, 1)?;
        let out = enc.finish()?;
        assert_eq!(out.len(), 6 + 7 + 19 + 1);
        assert_eq!(&out[13..16], &[0x21, 0xFF, 0x0B]);
        assert_eq!(&out[16..27], b"NETSCAPE2.0");
        assert_eq!(&out[27..32], &[3, 1, 0, 0, 0]);
        Ok(())
    }

    #[test]
    fn finite_loop_count() -> Result<()> {
        let enc = Encoder::new(vec![])
            .with_loop_count(Some(0x0203))
            .into_frame_enc(2, 1)?;
        let out = enc.finish()?;
        assert_eq!(&out[27..32], &[3, 1, 0x03, 0x02, 0]);
        Ok(())
    }

    #[test]
    fn frame_blocks() -> Result<()> {
        let mut enc = Encoder::new(vec![]).into_frame_enc(2, 2)?;
        enc.write_frame(&frame(2, 2))?;
        assert_eq!(enc.frame_count(), 1);
        let out = enc.finish()?;
        let f = &out[13..];
        // graphic control: keep, no transparency, 100cs
        assert_eq!(&f[..8], &[0x21, 0xF9, 4, 0b0000_0100, 100, 0, 0, 0]);
        // image descriptor: 2x2 with 2-entry local color table
        assert_eq!(&f[8..18], &[0x2C, 0, 0, 0, 0, 2, 0, 2, 0, 0x80]);
        // local color table: black first (first-seen), then white
        assert_eq!(&f[18..24], &[0, 0, 0, 255, 255, 255]);
        // LZW minimum code size
        assert_eq!(f[24], 2);
        assert_eq!(out.last(), Some(&0x3B));
        Ok(())
    }

    #[test]
    fn transparent_frame() -> Result<()> {
        let mut r = Raster::with_color(2, 1, SRgba8::new(0, 0, 0, 255));
        *r.pixel_mut(1, 0) = SRgba8::new(0, 0, 0, 0);
        let frame = Frame::new(r)
            .with_delay_time_cs(25)
            .with_disposal_method(DisposalMethod::Background);
        let mut enc = Encoder::new(vec![]).into_frame_enc(2, 1)?;
        enc.write_frame(&frame)?;
        let out = enc.finish()?;
        assert_eq!(&out[13..19], &[0x21, 0xF9, 4, 0b0000_1001, 25, 0]);
        // transparent entry follows the opaque black entry
        assert_eq!(out[19], 1);
        Ok(())
    }

    #[test]
    fn dimension_mismatch() -> Result<()> {
        let mut enc = Encoder::new(vec![]).into_frame_enc(4, 4)?;
        enc.write_frame(&frame(4, 4))?;
        match enc.write_frame(&frame(4, 5)) {
            Err(Error::DimensionMismatch {
                frame,
                expected,
                found,
            }) => {
                assert_eq!(frame, 1);
                assert_eq!(expected, (4, 4));
                assert_eq!(found, (4, 5));
            }
            _ => panic!("expected dimension mismatch"),
        }
        Ok(())
    }

    #[test]
    fn write_after_close() -> Result<()> {
        let mut enc = Encoder::new(vec![]).into_frame_enc(4, 4)?;
        enc.close()?;
        enc.close()?;
        assert!(enc.is_finalized());
        match enc.write_frame(&frame(4, 4)) {
            Err(Error::InvalidStateTransition) => (),
            _ => panic!("expected invalid state transition"),
        }
        let out = enc.finish()?;
        assert_eq!(out.iter().filter(|b| **b == 0x3B).count(), 1);
        Ok(())
    }

    #[test]
    fn invalid_canvas() {
        assert!(matches!(
            Encoder::new(vec![]).into_frame_enc(0, 4),
            Err(Error::InvalidRasterDimensions)
        ));
        assert!(matches!(
            Encoder::new(vec![]).into_frame_enc(4, 70_000),
            Err(Error::InvalidRasterDimensions)
        ));
    }

    #[test]
    fn sub_blocks() -> Result<()> {
        let data: Vec<u8> = (0..4000).map(|i| (i * 7 % 256) as u8).collect();
        let mut out = vec![];
        BlockEnc::new(&mut out).encode(ImageData::with_indices(8, data))?;
        assert_eq!(out[0], 8);
        let mut pos = 1;
        loop {
            let len = out[pos] as usize;
            pos += 1 + len;
            if len == 0 {
                break;
            }
            assert!(len == SUB_BLOCK_SZ || out[pos] == 0);
        }
        assert_eq!(pos, out.len());
        Ok(())
    }

    #[test]
    fn sink_failure_at_open() {
        for limit in &[0, 5, 12, 20] {
            let mut sink = Limited::new(*limit);
            let failed = {
                let res = Encoder::new(&mut sink)
                    .with_loop_count(Some(0))
                    .into_frame_enc(4, 4);
                matches!(res, Err(Error::Io(_)))
            };
            assert!(failed, "limit {}", limit);
            assert!(sink.data().len() <= *limit);
        }
    }

    #[test]
    fn sink_failure_at_frame() -> Result<()> {
        // preamble fits, frame does not
        let mut sink = Limited::new(6 + 7 + 10);
        let mut enc = Encoder::new(&mut sink).into_frame_enc(4, 4)?;
        match enc.write_frame(&frame(4, 4)) {
            Err(Error::Io(_)) => (),
            _ => panic!("expected I/O error"),
        }
        assert_eq!(enc.frame_count(), 0);
        assert!(!enc.is_finalized());
        drop(enc);
        // graphic control written, then the image descriptor failed
        assert_eq!(sink.data().len(), 6 + 7 + 8);
        assert_ne!(sink.data().last(), Some(&0x3B));
        Ok(())
    }

    #[test]
    fn sink_failure_at_close() -> Result<()> {
        let mut sink = Limited::new(6 + 7);
        let mut enc = Encoder::new(&mut sink).into_frame_enc(4, 4)?;
        assert!(matches!(enc.close(), Err(Error::Io(_))));
        assert!(!enc.is_finalized());
        drop(enc);
        assert_eq!(sink.data().len(), 6 + 7);
        Ok(())
    }
}
