// lzw.rs
//
// Copyright (c) 2026  gifscribe developers
//
//! Lempel-Ziv-Welch compression for GIF image data
use std::cmp::Ordering;
use std::ops::AddAssign;

/// Code Bits
#[derive(Clone, Copy, Debug, PartialEq)]
struct Bits(u8);

impl From<u8> for Bits {
    fn from(bits: u8) -> Self {
        Bits(bits.min(Self::MAX.0))
    }
}

impl From<Bits> for u8 {
    fn from(bits: Bits) -> Self {
        bits.0
    }
}

impl AddAssign<u8> for Bits {
    fn add_assign(&mut self, rhs: u8) {
        self.0 = (self.0 + rhs).min(Self::MAX.0)
    }
}

impl Bits {
    /// Maximum code bits allowed for GIF
    const MAX: Self = Bits(12);

    /// Get the number of entries
    fn entries(self) -> u16 {
        1 << (self.0 as u16)
    }
}

/// Code type
type Code = u16;

/// Dictionary node.
///
/// Siblings sharing a prefix form a binary search tree (ordered by byte)
/// hanging off the prefix's `next` link.
#[derive(Clone, Copy, Debug)]
struct Node {
    /// First child code
    next: Option<Code>,
    /// Lesser sibling code
    left: Option<Code>,
    /// Greater sibling code
    right: Option<Code>,
    /// Byte value
    byte: u8,
}

impl Node {
    fn new(byte: u8) -> Self {
        Node {
            next: None,
            left: None,
            right: None,
            byte,
        }
    }

    /// Get a link code
    fn link(&self, ordering: Ordering) -> Option<Code> {
        match ordering {
            Ordering::Less => self.left,
            Ordering::Equal => self.next,
            Ordering::Greater => self.right,
        }
    }

    /// Set a link code
    fn set_link(&mut self, ordering: Ordering, code: Code) {
        match ordering {
            Ordering::Less => self.left = Some(code),
            Ordering::Equal => self.next = Some(code),
            Ordering::Greater => self.right = Some(code),
        }
    }
}

/// Code dictionary trie
#[derive(Debug)]
struct Trie {
    /// Table of codes
    table: Vec<Node>,
    /// Minimum code bits
    min_code_bits: u8,
}

impl Trie {
    /// Create a new code dictionary
    fn new(min_code_bits: u8) -> Self {
        let mut trie = Trie {
            table: Vec::with_capacity(Bits::MAX.entries().into()),
            min_code_bits,
        };
        trie.reset();
        trie
    }

    /// Get the clear code
    fn clear_code(&self) -> Code {
        1 << self.min_code_bits
    }

    /// Get the end code
    fn end_code(&self) -> Code {
        self.clear_code() + 1
    }

    /// Get the next available code
    fn next_code(&self) -> Code {
        self.table.len() as Code
    }

    /// Check whether every code is assigned
    fn is_full(&self) -> bool {
        self.next_code() >= Bits::MAX.entries()
    }

    /// Reset the dictionary
    fn reset(&mut self) {
        self.table.clear();
        for byte in 0..self.clear_code() {
            self.table.push(Node::new(byte as u8));
        }
        self.table.push(Node::new(0)); // clear code
        self.table.push(Node::new(0)); // end code
    }

    /// Get a mutable node
    fn node_mut(&mut self, code: Code) -> &mut Node {
        debug_assert!(code < self.next_code());
        &mut self.table[code as usize]
    }

    /// Find the code for `code` extended by `byte`
    fn find(&self, code: Code, byte: u8) -> Option<Code> {
        let mut link = self.table[code as usize].next;
        while let Some(c) = link {
            let node = &self.table[c as usize];
            match byte.cmp(&node.byte) {
                Ordering::Equal => return Some(c),
                ordering => link = node.link(ordering),
            }
        }
        None
    }

    /// Insert a new code for `code` extended by `byte`
    fn insert(&mut self, code: Code, byte: u8) {
        let next_code = self.next_code();
        let mut node = self.node_mut(code);
        let mut ordering = Ordering::Equal;
        while let Some(c) = node.link(ordering) {
            node = self.node_mut(c);
            ordering = byte.cmp(&node.byte);
        }
        node.set_link(ordering, next_code);
        self.table.push(Node::new(byte));
    }
}

/// LZW Data Compressor
pub struct Compressor {
    /// Code dictionary
    trie: Trie,
    /// Minimum code bits
    min_code_bits: u8,
    /// Current code bits
    code_bits: Bits,
    /// Pending bits
    code: u32,
    /// Number of pending bits
    n_bits: u8,
}

impl Compressor {
    /// Create a new compressor
    pub fn new(min_code_bits: u8) -> Self {
        let min_code_bits = min_code_bits.max(2).min(8);
        Compressor {
            trie: Trie::new(min_code_bits),
            min_code_bits,
            code_bits: Bits::from(min_code_bits + 1),
            code: 0,
            n_bits: 0,
        }
    }

    /// Pack a code into a buffer, least-significant bit first
    fn pack(&mut self, code: Code, buffer: &mut Vec<u8>) {
        self.code |= (code as u32) << self.n_bits;
        self.n_bits += u8::from(self.code_bits);
        while self.n_bits >= 8 {
            buffer.push(self.code as u8);
            self.code >>= 8;
            self.n_bits -= 8;
        }
    }

    /// Flush any partial byte
    fn flush(&mut self, buffer: &mut Vec<u8>) {
        if self.n_bits > 0 {
            buffer.push(self.code as u8);
            self.code = 0;
            self.n_bits = 0;
        }
    }

    /// Clear the dictionary
    fn clear(&mut self, buffer: &mut Vec<u8>) {
        self.pack(self.trie.clear_code(), buffer);
        self.trie.reset();
        self.code_bits = Bits::from(self.min_code_bits + 1);
    }

    /// Compress a buffer of color indices.
    ///
    /// Output starts with a clear code and ends with an end code.  Every
    /// index must be less than the clear code.
    pub fn compress(&mut self, bytes: &[u8], buffer: &mut Vec<u8>) {
        self.clear(buffer);
        let mut code: Option<Code> = None;
        for &byte in bytes {
            debug_assert!((byte as Code) < self.trie.clear_code());
            let prefix = match code {
                Some(prefix) => prefix,
                None => {
                    code = Some(byte as Code);
                    continue;
                }
            };
            if let Some(c) = self.trie.find(prefix, byte) {
                code = Some(c);
                continue;
            }
            self.pack(prefix, buffer);
            if self.trie.is_full() {
                trace!("LZW dictionary full; clearing");
                self.clear(buffer);
            } else {
                self.trie.insert(prefix, byte);
                if self.trie.next_code() > self.code_bits.entries() {
                    self.code_bits += 1;
                }
            }
            code = Some(byte as Code);
        }
        if let Some(code) = code {
            self.pack(code, buffer);
        }
        self.pack(self.trie.end_code(), buffer);
        self.flush(buffer);
    }
}
