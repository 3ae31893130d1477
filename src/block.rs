// block.rs
//
// Copyright (c) 2026  gifscribe developers
//
//! GIF blocks written by the encoder
use std::convert::TryFrom;

/// Color channels per table entry (RGB)
const CHANNELS: usize = 3;

/// Maximum number of entries in a color table
pub const MAX_TABLE_LEN: usize = 256;

/// Color table configuration for an image descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorTableConfig {
    /// Number of entries (power of two, 2...256), or 0 if absent
    table_len: usize,
}

impl Default for ColorTableConfig {
    fn default() -> Self {
        ColorTableConfig { table_len: 0 }
    }
}

impl ColorTableConfig {
    /// Create a color table config large enough for `n_colors` entries.
    ///
    /// The table length is rounded up to a power of two, minimum 2.
    pub fn new(n_colors: usize) -> Self {
        let table_len = n_colors.max(2).next_power_of_two().min(MAX_TABLE_LEN);
        ColorTableConfig { table_len }
    }

    /// Get the number of table entries
    pub fn len(&self) -> usize {
        self.table_len
    }

    /// Check if the table is absent
    pub fn is_empty(&self) -> bool {
        self.table_len == 0
    }

    /// Get the table size as encoded in a packed field (len = 2 << bits)
    fn len_bits(&self) -> u8 {
        let sz = self.table_len;
        for b in 0..7 {
            if (sz >> (b + 1)) == 1 {
                return b;
            }
        }
        7
    }

    /// Get the minimum LZW code size for image data using this table
    pub fn min_code_size(&self) -> u8 {
        (self.len_bits() + 1).max(2)
    }

    /// Get the table size in bytes
    pub fn size_bytes(&self) -> usize {
        self.table_len * CHANNELS
    }
}

/// Disposal method for a frame
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DisposalMethod {
    /// No disposal specified
    NoAction,
    /// Leave the frame in place (do not dispose)
    Keep,
    /// Restore the frame area to the background color
    Background,
    /// Restore the frame area to the previous contents
    Previous,
}

impl Default for DisposalMethod {
    fn default() -> Self {
        DisposalMethod::Keep
    }
}

impl From<DisposalMethod> for u8 {
    fn from(d: DisposalMethod) -> Self {
        use self::DisposalMethod::*;
        match d {
            NoAction => 0,
            Keep => 1,
            Background => 2,
            Previous => 3,
        }
    }
}

impl TryFrom<u8> for DisposalMethod {
    type Error = u8;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        use self::DisposalMethod::*;
        match n {
            0 => Ok(NoAction),
            1 => Ok(Keep),
            2 => Ok(Background),
            3 => Ok(Previous),
            _ => Err(n),
        }
    }
}

/// Block introducer codes
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum BlockCode {
    Extension_,
    ImageDesc_,
    Trailer_,
}

impl BlockCode {
    /// Get the signature byte of a block
    pub fn signature(self) -> u8 {
        use self::BlockCode::*;
        match self {
            Extension_ => b'!', // (0x21) Extension introducer
            ImageDesc_ => b',', // (0x2C) Image separator
            Trailer_ => b';',   // (0x3B) GIF trailer
        }
    }
}

/// Extension labels
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum ExtensionCode {
    GraphicControl_,
    Application_,
}

impl From<ExtensionCode> for u8 {
    fn from(t: ExtensionCode) -> Self {
        use self::ExtensionCode::*;
        match t {
            GraphicControl_ => 0xF9,
            Application_ => 0xFF,
        }
    }
}

/// Header block (signature and version)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    version: [u8; 3],
}

impl Default for Header {
    fn default() -> Self {
        Header { version: *b"89a" }
    }
}

impl Header {
    /// Get the GIF version
    pub fn version(&self) -> [u8; 3] {
        self.version
    }
}

/// Logical screen descriptor block
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LogicalScreenDesc {
    screen_width: u16,
    screen_height: u16,
    flags: u8,
    background_color_idx: u8,
    pixel_aspect_ratio: u8,
}

impl LogicalScreenDesc {
    pub fn with_screen_width(mut self, screen_width: u16) -> Self {
        self.screen_width = screen_width;
        self
    }
    pub fn screen_width(&self) -> u16 {
        self.screen_width
    }
    pub fn with_screen_height(mut self, screen_height: u16) -> Self {
        self.screen_height = screen_height;
        self
    }
    pub fn screen_height(&self) -> u16 {
        self.screen_height
    }
    /// Get packed flags (global color table is never present)
    pub fn flags(&self) -> u8 {
        self.flags
    }
    pub fn background_color_idx(&self) -> u8 {
        self.background_color_idx
    }
    pub fn pixel_aspect_ratio(&self) -> u8 {
        self.pixel_aspect_ratio
    }
}

/// Application extension block
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Application {
    app_data: Vec<Vec<u8>>, // sequence of sub-blocks
}

impl Application {
    /// Create a NETSCAPE2.0 looping extension.
    ///
    /// A loop count of zero means loop forever.
    pub fn with_loop_count(loop_count: u16) -> Self {
        let mut looping = vec![1];
        looping.extend_from_slice(&loop_count.to_le_bytes());
        let app_data = vec![b"NETSCAPE2.0".to_vec(), looping];
        Application { app_data }
    }
    pub fn app_data(&self) -> &[Vec<u8>] {
        &self.app_data
    }
    /// Get the loop count, if this is a looping extension
    pub fn loop_count(&self) -> Option<u16> {
        let d = &self.app_data;
        let exists = d.len() == 2
            && d[0] == b"NETSCAPE2.0"
            && d[1].len() == 3
            && d[1][0] == 1;
        if exists {
            Some(u16::from_le_bytes([d[1][1], d[1][2]]))
        } else {
            None
        }
    }
}

/// Graphic control extension block
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GraphicControl {
    flags: u8,
    delay_time_cs: u16, // delay in centiseconds (hundredths of a second)
    transparent_color_idx: u8,
}

impl GraphicControl {
    const DISPOSAL_METHOD: u8 = 0b0001_1100;
    const TRANSPARENT_COLOR: u8 = 0b0000_0001;

    pub fn flags(&self) -> u8 {
        self.flags
    }
    pub fn disposal_method(&self) -> DisposalMethod {
        let d = (self.flags & Self::DISPOSAL_METHOD) >> 2;
        DisposalMethod::try_from(d).unwrap_or(DisposalMethod::NoAction)
    }
    pub fn set_disposal_method(&mut self, disposal_method: DisposalMethod) {
        let d: u8 = disposal_method.into();
        self.flags = (self.flags & !Self::DISPOSAL_METHOD) | (d << 2);
    }
    pub fn delay_time_cs(&self) -> u16 {
        self.delay_time_cs
    }
    pub fn set_delay_time_cs(&mut self, delay_time_cs: u16) {
        self.delay_time_cs = delay_time_cs;
    }
    pub fn transparent_color(&self) -> Option<u8> {
        if self.flags & Self::TRANSPARENT_COLOR != 0 {
            Some(self.transparent_color_idx)
        } else {
            None
        }
    }
    pub fn transparent_color_idx(&self) -> u8 {
        self.transparent_color_idx
    }
    pub fn set_transparent_color(&mut self, transparent_color: Option<u8>) {
        match transparent_color {
            Some(t) => {
                self.flags |= Self::TRANSPARENT_COLOR;
                self.transparent_color_idx = t;
            }
            None => {
                self.flags &= !Self::TRANSPARENT_COLOR;
                self.transparent_color_idx = 0;
            }
        }
    }
}

/// Image descriptor block
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImageDesc {
    left: u16,
    top: u16,
    width: u16,
    height: u16,
    flags: u8,
}

impl ImageDesc {
    const COLOR_TABLE_PRESENT: u8 = 0b1000_0000;
    const COLOR_TABLE_SIZE: u8 = 0b0000_0111;

    pub fn left(&self) -> u16 {
        self.left
    }
    pub fn top(&self) -> u16 {
        self.top
    }
    pub fn with_width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }
    pub fn width(&self) -> u16 {
        self.width
    }
    pub fn with_height(mut self, height: u16) -> Self {
        self.height = height;
        self
    }
    pub fn height(&self) -> u16 {
        self.height
    }
    pub fn flags(&self) -> u8 {
        self.flags
    }
    pub fn color_table_config(&self) -> ColorTableConfig {
        if self.flags & Self::COLOR_TABLE_PRESENT != 0 {
            let table_len = 2 << (self.flags & Self::COLOR_TABLE_SIZE);
            ColorTableConfig { table_len }
        } else {
            ColorTableConfig::default()
        }
    }
    pub fn with_color_table_config(mut self, tbl: ColorTableConfig) -> Self {
        let mut flags = self.flags & !(Self::COLOR_TABLE_PRESENT
            | Self::COLOR_TABLE_SIZE);
        if !tbl.is_empty() {
            flags |= Self::COLOR_TABLE_PRESENT;
            flags |= tbl.len_bits() & Self::COLOR_TABLE_SIZE;
        }
        self.flags = flags;
        self
    }
}

/// Local color table block
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LocalColorTable {
    colors: Vec<u8>,
}

impl LocalColorTable {
    /// Create a color table, padding with black up to the config length.
    pub fn with_colors(colors: &[u8], tbl: ColorTableConfig) -> Self {
        assert_eq!(colors.len() % CHANNELS, 0);
        assert!(colors.len() <= tbl.size_bytes());
        let mut colors = colors.to_vec();
        colors.resize(tbl.size_bytes(), 0);
        LocalColorTable { colors }
    }
    pub fn len(&self) -> usize {
        self.colors.len() / CHANNELS
    }
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
    pub fn colors(&self) -> &[u8] {
        &self.colors
    }
}

/// Image data block (uncompressed color indices)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    min_code_size: u8,
    data: Vec<u8>,
}

impl ImageData {
    /// Create image data from color indices
    pub fn with_indices(min_code_size: u8, data: Vec<u8>) -> Self {
        let min_code_size = min_code_size.max(2).min(8);
        ImageData {
            min_code_size,
            data,
        }
    }
    pub fn min_code_size(&self) -> u8 {
        self.min_code_size
    }
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Trailer block
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Trailer {}

/// One block of a GIF file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Header(Header),
    LogicalScreenDesc(LogicalScreenDesc),
    Application(Application),
    GraphicControl(GraphicControl),
    ImageDesc(ImageDesc),
    LocalColorTable(LocalColorTable),
    ImageData(ImageData),
    Trailer(Trailer),
}

impl From<Header> for Block {
    fn from(b: Header) -> Self {
        Block::Header(b)
    }
}

impl From<LogicalScreenDesc> for Block {
    fn from(b: LogicalScreenDesc) -> Self {
        Block::LogicalScreenDesc(b)
    }
}

impl From<Application> for Block {
    fn from(b: Application) -> Self {
        Block::Application(b)
    }
}

impl From<GraphicControl> for Block {
    fn from(b: GraphicControl) -> Self {
        Block::GraphicControl(b)
    }
}

impl From<ImageDesc> for Block {
    fn from(b: ImageDesc) -> Self {
        Block::ImageDesc(b)
    }
}

impl From<LocalColorTable> for Block {
    fn from(b: LocalColorTable) -> Self {
        Block::LocalColorTable(b)
    }
}

impl From<ImageData> for Block {
    fn from(b: ImageData) -> Self {
        Block::ImageData(b)
    }
}

impl From<Trailer> for Block {
    fn from(b: Trailer) -> Self {
        Block::Trailer(b)
    }
}
