//! Pixel memory layout descriptors.
//!
//! A [`PixelFormat`] says where each channel of one pixel lives, what it
//! stores, and which channel (if any) is alpha. It carries no behavior;
//! colorspaces interpret buffers through it.

use alloc::borrow::Cow;
use alloc::vec::Vec;

use crate::error::FormatError;

/// Upper bound on channels per pixel.
pub const MAX_CHANNELS: usize = 8;

/// Native storage of one channel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    U8,
    U16,
    F32,
}

impl NumericKind {
    /// Bytes per element.
    pub const fn size(self) -> usize {
        match self {
            NumericKind::U8 => 1,
            NumericKind::U16 => 2,
            NumericKind::F32 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelRole {
    Color,
    Alpha,
}

/// One channel of a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelInfo {
    pub name: &'static str,
    /// Byte offset from the start of the pixel.
    pub offset: usize,
    pub role: ChannelRole,
    pub kind: NumericKind,
    /// Element size in bytes.
    pub size: usize,
    /// Color used to draw this channel in a UI (sRGB).
    pub display_color: [u8; 3],
}

impl ChannelInfo {
    pub const fn color(
        name: &'static str,
        offset: usize,
        kind: NumericKind,
        display_color: [u8; 3],
    ) -> Self {
        Self {
            name,
            offset,
            role: ChannelRole::Color,
            kind,
            size: kind.size(),
            display_color,
        }
    }

    pub const fn alpha(name: &'static str, offset: usize, kind: NumericKind) -> Self {
        Self {
            name,
            offset,
            role: ChannelRole::Alpha,
            kind,
            size: kind.size(),
            display_color: [128, 128, 128],
        }
    }
}

// ---------------------------------------------------------------------------
// Precomputed layout
// ---------------------------------------------------------------------------

/// Offsets the pixel loops need, computed once per format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Layout {
    pub pixel_size: usize,
    pub kind: NumericKind,
    pub alpha_index: Option<usize>,
    pub alpha_offset: Option<usize>,
    /// Channel index of each color channel, in descriptor order.
    pub color_index: [usize; MAX_CHANNELS],
    /// Byte offset of each color channel, in descriptor order.
    pub color_offset: [usize; MAX_CHANNELS],
    pub color_len: usize,
}

impl Layout {
    #[inline]
    pub fn color_offsets(&self) -> &[usize] {
        &self.color_offset[..self.color_len]
    }
}

const fn compute_layout(channels: &[ChannelInfo]) -> Result<Layout, FormatError> {
    if channels.is_empty() {
        return Err(FormatError::NoChannels);
    }
    if channels.len() > MAX_CHANNELS {
        return Err(FormatError::TooManyChannels { max: MAX_CHANNELS });
    }
    let kind = channels[0].kind;
    let mut layout = Layout {
        pixel_size: 0,
        kind,
        alpha_index: None,
        alpha_offset: None,
        color_index: [0; MAX_CHANNELS],
        color_offset: [0; MAX_CHANNELS],
        color_len: 0,
    };
    let mut i = 0;
    while i < channels.len() {
        let ch = &channels[i];
        if ch.kind as u8 != kind as u8 {
            return Err(FormatError::MixedNumericKinds);
        }
        if ch.size != kind.size() {
            return Err(FormatError::ElementSizeMismatch { index: i });
        }
        let mut j = 0;
        while j < i {
            let other = &channels[j];
            if ch.offset < other.offset + other.size && other.offset < ch.offset + ch.size {
                return Err(FormatError::ChannelOverlap { index: i });
            }
            j += 1;
        }
        match ch.role {
            ChannelRole::Alpha => {
                if layout.alpha_index.is_some() {
                    return Err(FormatError::MultipleAlpha);
                }
                layout.alpha_index = Some(i);
                layout.alpha_offset = Some(ch.offset);
            }
            ChannelRole::Color => {
                layout.color_index[layout.color_len] = i;
                layout.color_offset[layout.color_len] = ch.offset;
                layout.color_len += 1;
            }
        }
        if ch.offset + ch.size > layout.pixel_size {
            layout.pixel_size = ch.offset + ch.size;
        }
        i += 1;
    }
    Ok(layout)
}

// ---------------------------------------------------------------------------
// PixelFormat
// ---------------------------------------------------------------------------

/// Immutable description of one pixel's memory layout.
///
/// Channel order is stable: it is the order documents serialize channels in.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelFormat {
    channels: Cow<'static, [ChannelInfo]>,
    layout: Layout,
}

impl PixelFormat {
    /// Build a format from a static channel table.
    ///
    /// # Panics
    ///
    /// On an invalid table. Built-in formats evaluate this at compile time.
    pub const fn from_static(channels: &'static [ChannelInfo]) -> Self {
        let layout = match compute_layout(channels) {
            Ok(layout) => layout,
            Err(_) => panic!("invalid static pixel format"),
        };
        Self {
            channels: Cow::Borrowed(channels),
            layout,
        }
    }

    /// Build a format from an owned channel list.
    pub fn new(channels: Vec<ChannelInfo>) -> Result<Self, FormatError> {
        let layout = compute_layout(&channels)?;
        Ok(Self {
            channels: Cow::Owned(channels),
            layout,
        })
    }

    #[inline]
    pub fn channels(&self) -> &[ChannelInfo] {
        &self.channels
    }

    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    pub fn color_channel_count(&self) -> usize {
        self.layout.color_len
    }

    /// Bytes per pixel.
    #[inline]
    pub fn pixel_size(&self) -> usize {
        self.layout.pixel_size
    }

    #[inline]
    pub fn kind(&self) -> NumericKind {
        self.layout.kind
    }

    /// Index of the alpha channel in [`channels`](Self::channels), if any.
    #[inline]
    pub fn alpha_index(&self) -> Option<usize> {
        self.layout.alpha_index
    }

    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.layout.alpha_index.is_some()
    }

    #[inline]
    pub(crate) const fn layout(&self) -> &Layout {
        &self.layout
    }
}

// ---------------------------------------------------------------------------
// Channel selection
// ---------------------------------------------------------------------------

bitflags::bitflags! {
    /// Which channel roles a convolution writes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChannelFlags: u8 {
        const COLOR = 1;
        const ALPHA = 1 << 1;
    }
}

impl Default for ChannelFlags {
    fn default() -> Self {
        ChannelFlags::all()
    }
}

/// Per-channel write mask for blits, indexed like [`PixelFormat::channels`].
///
/// A deselected color channel keeps its destination value. A deselected
/// alpha channel locks destination alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelSelection(u32);

impl ChannelSelection {
    pub const ALL: Self = Self(u32::MAX);
    pub const NONE: Self = Self(0);

    pub const fn only(index: usize) -> Self {
        Self::NONE.with(index)
    }

    pub const fn with(self, index: usize) -> Self {
        if index < 32 { Self(self.0 | 1 << index) } else { self }
    }

    pub const fn without(self, index: usize) -> Self {
        if index < 32 { Self(self.0 & !(1 << index)) } else { self }
    }

    #[inline]
    pub const fn contains(self, index: usize) -> bool {
        index < 32 && self.0 & (1 << index) != 0
    }

    /// All channels of `format` whose role is in `flags`.
    pub fn from_flags(format: &PixelFormat, flags: ChannelFlags) -> Self {
        let mut sel = Self::NONE;
        for (i, ch) in format.channels().iter().enumerate() {
            let wanted = match ch.role {
                ChannelRole::Color => flags.contains(ChannelFlags::COLOR),
                ChannelRole::Alpha => flags.contains(ChannelFlags::ALPHA),
            };
            if wanted {
                sel = sel.with(i);
            }
        }
        sel
    }
}

impl Default for ChannelSelection {
    fn default() -> Self {
        Self::ALL
    }
}
