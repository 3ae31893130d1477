// error.rs
//
// Copyright (c) 2026  gifscribe developers
//
use std::fmt;
use std::io;

/// Errors encountered while rendering or encoding
#[derive(Debug)]
pub enum Error {
    /// A wrapped I/O error (reading text or writing the sink).
    Io(io::Error),
    /// Input text is not valid UTF-8 at the given byte offset.
    InvalidUtf8 {
        /// Byte offset of the invalid sequence
        offset: usize,
    },
    /// A frame does not match the canvas size fixed at open.
    DimensionMismatch {
        /// Index of the offending frame
        frame: usize,
        /// Canvas size (width, height)
        expected: (u16, u16),
        /// Frame size (width, height)
        found: (u32, u32),
    },
    /// Canvas width or height is zero or larger than 65535.
    InvalidRasterDimensions,
    /// A frame was written after the encoder was closed.
    InvalidStateTransition,
}

/// Gifscribe result type
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(fmt),
            Error::InvalidUtf8 { offset } => {
                write!(fmt, "invalid UTF-8 at byte {}", offset)
            }
            Error::DimensionMismatch {
                frame,
                expected,
                found,
            } => write!(
                fmt,
                "frame {} is {}x{}, canvas is {}x{}",
                frame, found.0, found.1, expected.0, expected.1
            ),
            _ => fmt::Debug::fmt(self, fmt),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
