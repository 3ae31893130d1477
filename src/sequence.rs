// sequence.rs
//
// Copyright (c) 2026  gifscribe developers
//
//! Frame sequencing from input text
use crate::block::DisposalMethod;
use crate::error::{Error, Result};
use crate::glyph::Rasterizer;
use crate::private::{Frame, DEFAULT_DELAY_TIME_CS};
use std::collections::VecDeque;
use std::io::{ErrorKind, Read};
use std::str;

/// Maximum bytes read from input at a time
const CHUNK_SZ: usize = 1024;

/// An `Iterator` of characters decoded from UTF-8 input.
///
/// Input is read in bounded chunks; sequences split between chunks are
/// reassembled.  After an error, the iterator is exhausted.
pub struct Chars<R: Read> {
    /// Reader for input text
    reader: R,
    /// Undecoded bytes (partial sequence from the previous chunk)
    buffer: Vec<u8>,
    /// Byte offset of the start of `buffer`
    offset: usize,
    /// Decoded characters not yet returned
    chars: VecDeque<char>,
    /// Error to return once `chars` is drained
    error: Option<Error>,
    /// Set at end of input or after an error
    done: bool,
}

/// An `Iterator` of [Frame]s, one per input character.
///
/// [Frame]: struct.Frame.html
pub struct Frames<'a, R: Read> {
    /// Input characters
    chars: Chars<R>,
    /// Glyph rasterizer
    rasterizer: Rasterizer<'a>,
    /// Delay for each frame
    delay_time_cs: u16,
    /// Disposal method for each frame
    disposal_method: DisposalMethod,
    /// Index of next frame
    index: usize,
}

impl<R: Read> Chars<R> {
    /// Create a character iterator
    pub fn new(reader: R) -> Self {
        Chars {
            reader,
            buffer: Vec::with_capacity(CHUNK_SZ + 4),
            offset: 0,
            chars: VecDeque::with_capacity(CHUNK_SZ),
            error: None,
            done: false,
        }
    }

    /// Read one chunk of input, returning number of bytes read
    fn read_chunk(&mut self) -> Result<usize> {
        let len = self.buffer.len();
        self.buffer.resize(len + CHUNK_SZ, 0);
        loop {
            match self.reader.read(&mut self.buffer[len..]) {
                Ok(n) => {
                    self.buffer.truncate(len + n);
                    return Ok(n);
                }
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    self.buffer.truncate(len);
                    return Err(e.into());
                }
            }
        }
    }

    /// Decode buffered bytes into characters
    fn decode(&mut self, eof: bool) {
        let valid = match str::from_utf8(&self.buffer) {
            Ok(s) => s.len(),
            Err(e) => {
                let valid = e.valid_up_to();
                // an incomplete sequence may finish in the next chunk
                if e.error_len().is_some() || eof {
                    self.error = Some(Error::InvalidUtf8 {
                        offset: self.offset + valid,
                    });
                }
                valid
            }
        };
        // bytes up to `valid` were checked above
        if let Ok(s) = str::from_utf8(&self.buffer[..valid]) {
            self.chars.extend(s.chars());
        }
        self.buffer.drain(..valid);
        self.offset += valid;
    }

    /// Fill the character queue
    fn fill(&mut self) {
        while self.chars.is_empty() && self.error.is_none() {
            match self.read_chunk() {
                Ok(n) => {
                    let eof = n == 0;
                    self.decode(eof);
                    if eof {
                        break;
                    }
                }
                Err(e) => self.error = Some(e),
            }
        }
    }
}

impl<R: Read> Iterator for Chars<R> {
    type Item = Result<char>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.chars.is_empty() {
            self.fill();
        }
        if let Some(c) = self.chars.pop_front() {
            return Some(Ok(c));
        }
        self.done = true;
        self.error.take().map(Err)
    }
}

impl<'a, R: Read> Frames<'a, R> {
    /// Create a frame iterator
    pub fn new(chars: Chars<R>, rasterizer: Rasterizer<'a>) -> Self {
        Frames {
            chars,
            rasterizer,
            delay_time_cs: DEFAULT_DELAY_TIME_CS,
            disposal_method: DisposalMethod::default(),
            index: 0,
        }
    }

    /// Set the delay of each frame (hundredths of a second)
    pub fn with_delay_time_cs(mut self, delay_time_cs: u16) -> Self {
        self.delay_time_cs = delay_time_cs;
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

    /// Get the side length of every frame
    pub fn side(&self) -> u32 {
        self.rasterizer.side()
    }
}

impl<'a, R: Read> Iterator for Frames<'a, R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        let ch = match self.chars.next()? {
            Ok(ch) => ch,
            Err(e) => return Some(Err(e)),
        };
        debug!("frame {}: {:?}", self.index, ch);
        self.index += 1;
        let frame = Frame::new(self.rasterizer.render(ch))
            .with_delay_time_cs(self.delay_time_cs)
            .with_disposal_method(self.disposal_method);
        Some(Ok(frame))
    }
}
