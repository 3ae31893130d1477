// lib.rs      gifscribe crate.
//
// Copyright (c) 2026  gifscribe developers
//
//! A library for rendering text as animated GIFs, one glyph per frame.
//!
//! The crate is split into layers:
//! * [Converter] / [convert]: text to a complete GIF
//! * [Frames]: lazy frame sequence from text
//! * [FrameEnc]: streaming encoder for [Frame]s
//! * [BlockEnc]: low-level encoder for GIF [block]s
//!
//! [block]: block/index.html
//! [BlockEnc]: struct.BlockEnc.html
//! [convert]: fn.convert.html
//! [Converter]: struct.Converter.html
//! [Frame]: struct.Frame.html
//! [FrameEnc]: struct.FrameEnc.html
//! [Frames]: struct.Frames.html
#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

pub mod block;
mod convert;
mod encode;
mod error;
pub mod glyph;
mod lzw;
pub mod palette;
mod private;
mod sequence;

pub use crate::convert::{convert, Converter};
pub use crate::encode::{BlockEnc, FrameEnc};
pub use crate::error::{Error, Result};
pub use crate::private::{Encoder, Frame, DEFAULT_DELAY_TIME_CS};
pub use crate::sequence::{Chars, Frames};
