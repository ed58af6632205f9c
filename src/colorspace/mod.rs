//! Colorspaces: a pixel format plus the operations valid on it.
//!
//! A [`Colorspace`] is a plain value. Built-ins are `static`s in [`builtin`];
//! custom ones are built with [`Colorspace::new`]. All operations take raw
//! byte buffers whose layout matches [`Colorspace::format`], and dispatch on
//! the format's numeric kind so the per-pixel loops are monomorphized.
//!
//! ```rust
//! use impasto::colorspace::builtin::RGBA8;
//! use impasto::{BlitOptions, CompositeOp};
//!
//! // BGRA in memory: an opaque red destination, half-opaque black source.
//! let mut dst = [0u8, 0, 255, 255];
//! let src = [0u8, 0, 0, 128];
//! RGBA8
//!     .bit_blt(&mut dst, 4, &src, 4, None, &BlitOptions::new(CompositeOp::Over, 1, 1))
//!     .unwrap();
//! assert_eq!(dst, [0, 0, 127, 255]);
//! ```

use alloc::borrow::Cow;
use alloc::vec::Vec;

use crate::bytes;
use crate::composite::{BlitJob, Targets};
use crate::error::{BufferError, FormatError};
use crate::format::{
    ChannelFlags, ChannelInfo, ChannelSelection, MAX_CHANNELS, NumericKind, PixelFormat,
};
use crate::op::CompositeOp;

pub mod builtin;
mod pixel;
mod registry;

pub use registry::ColorspaceRegistry;

pub(crate) use pixel::convolve as convolve_pixel;

/// Family of color channels a colorspace stores, in descriptor order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorModel {
    /// Red, green, blue.
    Rgb,
    Gray,
    /// Cyan, magenta, yellow, black.
    Cmyk,
    /// Long, middle, short cone responses.
    Lms,
    /// No color channels.
    Alpha,
}

impl ColorModel {
    pub const fn color_channels(self) -> usize {
        match self {
            ColorModel::Rgb | ColorModel::Lms => 3,
            ColorModel::Gray => 1,
            ColorModel::Cmyk => 4,
            ColorModel::Alpha => 0,
        }
    }
}

/// Optional per-pixel coverage for [`Colorspace::bit_blt`], one byte per pixel.
#[derive(Debug, Clone, Copy)]
pub struct BlitMask<'a> {
    pub data: &'a [u8],
    /// Bytes between the starts of consecutive mask rows.
    pub stride: usize,
}

/// What a blit does and over how many pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlitOptions {
    pub op: CompositeOp,
    pub rows: usize,
    pub cols: usize,
    /// Global opacity, 255 is fully opaque.
    pub opacity: u8,
    pub channels: ChannelSelection,
}

impl BlitOptions {
    pub fn new(op: CompositeOp, rows: usize, cols: usize) -> Self {
        Self {
            op,
            rows,
            cols,
            opacity: u8::MAX,
            channels: ChannelSelection::ALL,
        }
    }

    pub fn with_opacity(mut self, opacity: u8) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_channels(mut self, channels: ChannelSelection) -> Self {
        self.channels = channels;
        self
    }
}

/// Evaluate `$body` with `$K` bound to the channel type of `$kind`.
macro_rules! by_kind {
    ($kind:expr, $K:ident => $body:expr) => {
        match $kind {
            $crate::format::NumericKind::U8 => {
                type $K = u8;
                $body
            }
            $crate::format::NumericKind::U16 => {
                type $K = u16;
                $body
            }
            $crate::format::NumericKind::F32 => {
                type $K = f32;
                $body
            }
        }
    };
}
pub(crate) use by_kind;

/// A named pixel layout plus the compositing operators it supports.
#[derive(Debug, Clone, PartialEq)]
pub struct Colorspace {
    id: &'static str,
    name: &'static str,
    model: ColorModel,
    format: PixelFormat,
    ops: Cow<'static, [CompositeOp]>,
}

impl Colorspace {
    /// # Panics
    ///
    /// If `model` needs more color channels than `format` has, or an
    /// HSV operator is listed for a non-RGB model.
    pub const fn from_static(
        id: &'static str,
        name: &'static str,
        model: ColorModel,
        format: PixelFormat,
        ops: &'static [CompositeOp],
    ) -> Self {
        if format.layout().color_len < model.color_channels() {
            panic!("color model needs more color channels than the format has");
        }
        if !matches!(model, ColorModel::Rgb) {
            let mut i = 0;
            while i < ops.len() {
                if ops[i].needs_rgb() {
                    panic!("HSV composite ops need an RGB color model");
                }
                i += 1;
            }
        }
        Self {
            id,
            name,
            model,
            format,
            ops: Cow::Borrowed(ops),
        }
    }

    pub fn new(
        id: &'static str,
        name: &'static str,
        model: ColorModel,
        format: PixelFormat,
        ops: Vec<CompositeOp>,
    ) -> Result<Self, FormatError> {
        let needed = model.color_channels();
        if format.color_channel_count() < needed {
            return Err(FormatError::ModelMismatch {
                needed,
                found: format.color_channel_count(),
            });
        }
        if model != ColorModel::Rgb {
            if let Some(&op) = ops.iter().find(|op| op.needs_rgb()) {
                return Err(FormatError::OpNeedsRgb { op });
            }
        }
        Ok(Self {
            id,
            name,
            model,
            format,
            ops: Cow::Owned(ops),
        })
    }

    /// Stable identifier, e.g. `"RGBA"`.
    pub fn id(&self) -> &'static str {
        self.id
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn model(&self) -> ColorModel {
        self.model
    }

    pub fn format(&self) -> &PixelFormat {
        &self.format
    }

    pub fn pixel_size(&self) -> usize {
        self.format.pixel_size()
    }

    pub fn channel_count(&self) -> usize {
        self.format.channel_count()
    }

    pub fn color_channel_count(&self) -> usize {
        self.format.color_channel_count()
    }

    /// Channel descriptors in their stable, serialized order.
    pub fn channels(&self) -> &[ChannelInfo] {
        self.format.channels()
    }

    /// Operators this colorspace implements.
    pub fn composite_ops(&self) -> &[CompositeOp] {
        &self.ops
    }

    pub fn supports(&self, op: CompositeOp) -> bool {
        self.ops.contains(&op)
    }

    /// BGRA8 storage, the layout the SIMD B<->R swap converts.
    fn is_bgra8(&self) -> bool {
        let l = self.format.layout();
        self.model == ColorModel::Rgb
            && l.kind == NumericKind::U8
            && l.pixel_size == 4
            && l.color_offsets() == [2, 1, 0]
            && l.alpha_offset == Some(3)
    }

    // =======================================================================
    // Pixel operations
    // =======================================================================

    /// Alpha-weighted average of `pixels` into `dst`. Weights are in 0..=255
    /// and usually sum to 255.
    pub fn mix_colors(
        &self,
        pixels: &[&[u8]],
        weights: &[u8],
        dst: &mut [u8],
    ) -> Result<(), BufferError> {
        let ps = self.pixel_size();
        if pixels.len() != weights.len() {
            return Err(BufferError::PixelCountMismatch);
        }
        if dst.len() < ps || pixels.iter().any(|p| p.len() < ps) {
            return Err(BufferError::NotPixelAligned);
        }
        let layout = self.format.layout();
        by_kind!(layout.kind, K => pixel::mix::<K>(layout, pixels, weights, dst));
        Ok(())
    }

    /// Kernel-weighted sum of `pixels` into `dst`: `Σ w·p / factor + offset`,
    /// clamped. `offset` is a fraction of the channel range. Channel roles
    /// absent from `flags` keep their value in `dst`.
    ///
    /// A `factor` of zero writes the offset alone, not zero.
    pub fn convolve_colors(
        &self,
        pixels: &[&[u8]],
        weights: &[f64],
        flags: ChannelFlags,
        factor: f64,
        offset: f64,
        dst: &mut [u8],
    ) -> Result<(), BufferError> {
        let ps = self.pixel_size();
        if pixels.len() != weights.len() {
            return Err(BufferError::PixelCountMismatch);
        }
        if dst.len() < ps || pixels.iter().any(|p| p.len() < ps) {
            return Err(BufferError::NotPixelAligned);
        }
        let layout = self.format.layout();
        by_kind!(
            layout.kind,
            K => convolve_pixel::<K>(layout, pixels, weights, flags, factor, offset, dst)
        );
        Ok(())
    }

    /// Replace every color channel `v` of the first `count` pixels with `max - v`.
    pub fn invert_color(&self, pixels: &mut [u8], count: usize) -> Result<(), BufferError> {
        let ps = self.pixel_size();
        bytes::check_pixels(pixels.len(), count, ps)?;
        if self.is_bgra8() {
            return bytes::invert_rgb8(&mut pixels[..count * ps]);
        }
        let layout = self.format.layout();
        by_kind!(layout.kind, K => pixel::invert::<K>(layout, pixels, count));
        Ok(())
    }

    /// Write into `dst` a pixel holding only channel `index` of `src`; every
    /// other channel, alpha included, is zero. An out-of-range index writes nothing.
    pub fn single_channel_pixel(
        &self,
        dst: &mut [u8],
        src: &[u8],
        index: usize,
    ) -> Result<(), BufferError> {
        let ps = self.pixel_size();
        if dst.len() < ps || src.len() < ps {
            return Err(BufferError::NotPixelAligned);
        }
        let Some(ch) = self.channels().get(index) else {
            log::debug!("{}: channel index {index} out of range, skipped", self.id);
            return Ok(());
        };
        let range = ch.offset..ch.offset + ch.size;
        dst[..ps].fill(0);
        dst[range.clone()].copy_from_slice(&src[range]);
        Ok(())
    }

    /// Channel `index` of `pixel` normalized to 0.0..=1.0.
    pub fn channel_value_f32(&self, pixel: &[u8], index: usize) -> Option<f32> {
        let ch = self.channels().get(index)?;
        if pixel.len() < self.pixel_size() {
            return None;
        }
        Some(by_kind!(ch.kind, K => pixel::channel_f32::<K>(pixel, ch.offset)))
    }

    /// Set channel `index` of `pixel` from a normalized value. Returns `false`
    /// if the index or pixel is invalid.
    pub fn set_channel_value_f32(&self, pixel: &mut [u8], index: usize, value: f32) -> bool {
        let Some(ch) = self.channels().get(index) else {
            return false;
        };
        if pixel.len() < self.pixel_size() {
            return false;
        }
        by_kind!(ch.kind, K => pixel::set_channel_f32::<K>(pixel, ch.offset, value));
        true
    }

    /// Opacity of `pixel` as 0..=255; 255 for formats without alpha.
    pub fn opacity_u8(&self, pixel: &[u8]) -> Result<u8, BufferError> {
        if pixel.len() < self.pixel_size() {
            return Err(BufferError::NotPixelAligned);
        }
        let layout = self.format.layout();
        Ok(by_kind!(layout.kind, K => pixel::opacity::<K>(layout, pixel)))
    }

    /// Set the alpha of the first `count` pixels. No-op without an alpha channel.
    pub fn set_opacity_u8(
        &self,
        pixels: &mut [u8],
        value: u8,
        count: usize,
    ) -> Result<(), BufferError> {
        bytes::check_pixels(pixels.len(), count, self.pixel_size())?;
        let layout = self.format.layout();
        by_kind!(layout.kind, K => pixel::set_opacity::<K>(layout, pixels, value, count));
        Ok(())
    }

    // =======================================================================
    // Conversion
    // =======================================================================

    /// One pixel as straight sRGB bytes in R, G, B, A order.
    pub fn to_rgba8(&self, pixel: &[u8]) -> Result<[u8; 4], BufferError> {
        if pixel.len() < self.pixel_size() {
            return Err(BufferError::NotPixelAligned);
        }
        let layout = self.format.layout();
        Ok(by_kind!(layout.kind, K => pixel::to_rgba8::<K>(self.model, layout, pixel)))
    }

    /// Encode straight sRGB bytes in R, G, B, A order into `pixel`.
    pub fn from_rgba8(&self, rgba: [u8; 4], pixel: &mut [u8]) -> Result<(), BufferError> {
        if pixel.len() < self.pixel_size() {
            return Err(BufferError::NotPixelAligned);
        }
        let layout = self.format.layout();
        by_kind!(layout.kind, K => pixel::from_rgba8::<K>(self.model, layout, rgba, pixel));
        Ok(())
    }

    /// Convert `count` pixels to RGBA bytes.
    pub fn to_rgba8_row(&self, src: &[u8], dst: &mut [u8], count: usize) -> Result<(), BufferError> {
        let ps = self.pixel_size();
        bytes::check_pixels(src.len(), count, ps)?;
        bytes::check_pixels(dst.len(), count, 4)?;
        if self.is_bgra8() {
            return bytes::copy_swap_br(&src[..count * 4], &mut dst[..count * 4]);
        }
        for (s, d) in src.chunks_exact(ps).zip(dst.chunks_exact_mut(4)).take(count) {
            d.copy_from_slice(&self.to_rgba8(s)?);
        }
        Ok(())
    }

    /// Convert `count` RGBA pixels into this colorspace.
    pub fn from_rgba8_row(&self, src: &[u8], dst: &mut [u8], count: usize) -> Result<(), BufferError> {
        let ps = self.pixel_size();
        bytes::check_pixels(src.len(), count, 4)?;
        bytes::check_pixels(dst.len(), count, ps)?;
        if self.is_bgra8() {
            return bytes::copy_swap_br(&src[..count * 4], &mut dst[..count * 4]);
        }
        for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(ps)).take(count) {
            self.from_rgba8([s[0], s[1], s[2], s[3]], d)?;
        }
        Ok(())
    }

    /// Perceived brightness of one pixel, 0..=255.
    pub fn intensity8(&self, pixel: &[u8]) -> Result<u8, BufferError> {
        let [r, g, b, _] = self.to_rgba8(pixel)?;
        Ok(pixel::luma8(r, g, b))
    }

    // =======================================================================
    // Compositing
    // =======================================================================

    /// Composite `rows × cols` pixels of `src` onto `dst` with `opts.op`.
    ///
    /// Strides are in bytes. Padding between rows is never read or written.
    /// Geometry is checked up front; operators this colorspace does not
    /// implement leave `dst` untouched and return `Ok`.
    pub fn bit_blt(
        &self,
        dst: &mut [u8],
        dst_stride: usize,
        src: &[u8],
        src_stride: usize,
        mask: Option<BlitMask<'_>>,
        opts: &BlitOptions,
    ) -> Result<(), BufferError> {
        let ps = self.pixel_size();
        let BlitOptions { rows, cols, .. } = *opts;
        bytes::check_strided(dst.len(), cols, rows, dst_stride, ps)?;
        bytes::check_strided(src.len(), cols, rows, src_stride, ps)?;
        if let Some(m) = mask {
            bytes::check_strided(m.data.len(), cols, rows, m.stride, 1)
                .map_err(|_| BufferError::MaskTooSmall)?;
        }
        if rows == 0 || cols == 0 || opts.op.is_noop() {
            return Ok(());
        }
        if !self.supports(opts.op) {
            log::trace!("{}: composite op `{}` not supported, skipped", self.id, opts.op);
            return Ok(());
        }

        let job = BlitJob {
            dst,
            dst_stride,
            src,
            src_stride,
            mask: mask.map(|m| (m.data, m.stride)),
            rows,
            cols,
            opacity: opts.opacity,
            op: opts.op,
            layout: *self.format.layout(),
            targets: self.targets(opts.channels),
        };
        match self.format.kind() {
            NumericKind::U8 => bytes::composite_u8(job),
            NumericKind::U16 => bytes::composite_u16(job),
            NumericKind::F32 => bytes::composite_f32(job),
        }
        Ok(())
    }

    fn targets(&self, sel: ChannelSelection) -> Targets {
        let l = self.format.layout();
        let mut color = [0usize; MAX_CHANNELS];
        let mut n = 0;
        for (&idx, &off) in l.color_index[..l.color_len].iter().zip(l.color_offsets()) {
            if sel.contains(idx) {
                color[n] = off;
                n += 1;
            }
        }
        let write_alpha = l.alpha_index.is_some_and(|i| sel.contains(i));
        let all = (0..self.channel_count()).all(|i| sel.contains(i));
        let rgb = (self.model == ColorModel::Rgb)
            .then(|| [l.color_offset[0], l.color_offset[1], l.color_offset[2]]);
        Targets::new(&color[..n], write_alpha, all, rgb)
    }
}
