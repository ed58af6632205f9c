//! Applying convolution kernels to whole buffers.
//!
//! A [`Convolver`] binds a colorspace, the channel roles to write and a
//! [`BorderPolicy`]. Every destination pixel is the kernel-weighted sum of
//! its source neighborhood, computed by [`Colorspace::convolve_colors`]
//! semantics: divided by the kernel factor, offset added, clamped.
//! Channels outside the selected roles are copied from the source pixel.
//!
//! Source and destination must not alias; the in-place helpers for alpha
//! masks copy the source first.

use alloc::vec;
use alloc::vec::Vec;

use crate::bytes;
use crate::colorspace::builtin::ALPHA8;
use crate::colorspace::{Colorspace, by_kind, convolve_pixel};
use crate::error::BufferError;
use crate::format::ChannelFlags;
use crate::kernel::{self, ConvolutionKernel};
use crate::math::Channel;

/// How reads outside the source rectangle are resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BorderPolicy {
    /// Clamp to the nearest edge pixel.
    #[default]
    Repeat,
    /// Reflect about the edge pixel, which is not repeated.
    Mirror,
    /// Outside pixels are all-zero.
    Transparent,
    /// Wrap around to the opposite edge.
    Wrap,
}

impl BorderPolicy {
    /// Source index for coordinate `i` along an axis of `len` pixels, or
    /// `None` for a transparent read.
    #[inline]
    fn resolve(self, i: isize, len: usize) -> Option<usize> {
        let n = len as isize;
        if (0..n).contains(&i) {
            return Some(i as usize);
        }
        let i = match self {
            BorderPolicy::Repeat => i.clamp(0, n - 1),
            BorderPolicy::Mirror => {
                if n == 1 {
                    0
                } else {
                    let period = 2 * (n - 1);
                    let m = i.rem_euclid(period);
                    if m < n { m } else { period - m }
                }
            }
            BorderPolicy::Transparent => return None,
            BorderPolicy::Wrap => i.rem_euclid(n),
        };
        Some(i as usize)
    }
}

/// Receives the number of destination rows finished so far.
///
/// Counts increase monotonically and end at the buffer height. Long
/// convolutions report once per row.
pub trait Progress {
    fn rows_completed(&mut self, rows: usize);
}

impl Progress for () {
    #[inline]
    fn rows_completed(&mut self, _rows: usize) {}
}

impl<F: FnMut(usize)> Progress for F {
    #[inline]
    fn rows_completed(&mut self, rows: usize) {
        self(rows)
    }
}

// ===========================================================================
// Buffers
// ===========================================================================

/// A read-only rectangle of pixels. `stride` is in bytes.
#[derive(Debug, Clone, Copy)]
pub struct PixelBuf<'a> {
    pub data: &'a [u8],
    pub width: usize,
    pub height: usize,
    pub stride: usize,
}

impl<'a> PixelBuf<'a> {
    pub fn new(data: &'a [u8], width: usize, height: usize, stride: usize) -> Self {
        Self {
            data,
            width,
            height,
            stride,
        }
    }
}

/// A writable rectangle of pixels. `stride` is in bytes.
#[derive(Debug)]
pub struct PixelBufMut<'a> {
    pub data: &'a mut [u8],
    pub width: usize,
    pub height: usize,
    pub stride: usize,
}

impl<'a> PixelBufMut<'a> {
    pub fn new(data: &'a mut [u8], width: usize, height: usize, stride: usize) -> Self {
        Self {
            data,
            width,
            height,
            stride,
        }
    }
}

/// Border-resolved pixel reads from a strided plane.
struct Plane<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    stride: usize,
    pixel_size: usize,
    border: BorderPolicy,
    zero: &'a [u8],
}

impl<'a> Plane<'a> {
    #[inline(always)]
    fn pixel(&self, x: isize, y: isize) -> &'a [u8] {
        match (
            self.border.resolve(x, self.width),
            self.border.resolve(y, self.height),
        ) {
            (Some(x), Some(y)) => {
                &self.data[y * self.stride + x * self.pixel_size..][..self.pixel_size]
            }
            _ => self.zero,
        }
    }
}

// ===========================================================================
// Convolver
// ===========================================================================

/// Applies kernels to buffers of one colorspace.
#[derive(Debug, Clone, Copy)]
pub struct Convolver<'c> {
    colorspace: &'c Colorspace,
    channels: ChannelFlags,
    border: BorderPolicy,
}

impl<'c> Convolver<'c> {
    /// All channels, [`BorderPolicy::Repeat`].
    pub fn new(colorspace: &'c Colorspace) -> Self {
        Self {
            colorspace,
            channels: ChannelFlags::all(),
            border: BorderPolicy::Repeat,
        }
    }

    pub fn with_channels(mut self, channels: ChannelFlags) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_border(mut self, border: BorderPolicy) -> Self {
        self.border = border;
        self
    }

    pub fn colorspace(&self) -> &'c Colorspace {
        self.colorspace
    }

    pub fn channels(&self) -> ChannelFlags {
        self.channels
    }

    pub fn border(&self) -> BorderPolicy {
        self.border
    }

    fn check(&self, src: &PixelBuf<'_>, dst: &PixelBufMut<'_>) -> Result<(), BufferError> {
        if src.width != dst.width || src.height != dst.height {
            return Err(BufferError::DimensionMismatch);
        }
        let ps = self.colorspace.pixel_size();
        bytes::check_strided(src.data.len(), src.width, src.height, src.stride, ps)?;
        bytes::check_strided(dst.data.len(), dst.width, dst.height, dst.stride, ps)
    }

    /// Convolve every pixel of `src` with `kernel` into `dst`.
    pub fn apply_matrix<P: Progress + ?Sized>(
        &self,
        kernel: &ConvolutionKernel,
        src: PixelBuf<'_>,
        dst: PixelBufMut<'_>,
        progress: &mut P,
    ) -> Result<(), BufferError> {
        self.check(&src, &dst)?;
        if src.width == 0 || src.height == 0 {
            return Ok(());
        }
        log::debug!(
            "{}: {}x{} kernel over {}x{} pixels, border {:?}",
            self.colorspace.id(),
            kernel.width(),
            kernel.height(),
            src.width,
            src.height,
            self.border
        );
        let zero = vec![0u8; self.colorspace.pixel_size()];
        let plane = self.plane(&src, &zero);
        let kind = self.colorspace.format().kind();
        by_kind!(kind, K => self.rows::<K, P>(kernel, &plane, 0, dst, progress));
        log::debug!("{}: convolution finished", self.colorspace.id());
        Ok(())
    }

    /// Two 1-D passes: `horizontal` into an intermediate buffer padded by half
    /// of `vertical`'s height on each side, then `vertical` into `dst`.
    ///
    /// Matches [`apply_matrix`](Self::apply_matrix) with the outer product of
    /// the two kernels up to rounding of the intermediate values.
    pub fn apply_separable<P: Progress + ?Sized>(
        &self,
        horizontal: &ConvolutionKernel,
        vertical: &ConvolutionKernel,
        src: PixelBuf<'_>,
        dst: PixelBufMut<'_>,
        progress: &mut P,
    ) -> Result<(), BufferError> {
        self.check(&src, &dst)?;
        if src.width == 0 || src.height == 0 {
            return Ok(());
        }
        let ps = self.colorspace.pixel_size();
        let pad = vertical.height() / 2;
        let mid_height = src.height + 2 * pad;
        let mid_stride = src.width * ps;
        log::debug!(
            "{}: separable {}x{} + {}x{} kernels over {}x{} pixels, border {:?}",
            self.colorspace.id(),
            horizontal.width(),
            horizontal.height(),
            vertical.width(),
            vertical.height(),
            src.width,
            src.height,
            self.border
        );

        let zero = vec![0u8; ps];
        let mut mid = vec![0u8; mid_stride * mid_height];
        let kind = self.colorspace.format().kind();
        {
            let plane = self.plane(&src, &zero);
            let out = PixelBufMut::new(&mut mid, src.width, mid_height, mid_stride);
            by_kind!(kind, K => self.rows::<K, ()>(horizontal, &plane, -(pad as isize), out, &mut ()));
        }
        let mid_buf = PixelBuf::new(&mid, src.width, mid_height, mid_stride);
        let plane = self.plane(&mid_buf, &zero);
        by_kind!(kind, K => self.rows::<K, P>(vertical, &plane, pad as isize, dst, progress));
        log::debug!("{}: convolution finished", self.colorspace.id());
        Ok(())
    }

    fn plane<'a>(&self, buf: &PixelBuf<'a>, zero: &'a [u8]) -> Plane<'a> {
        Plane {
            data: buf.data,
            width: buf.width,
            height: buf.height,
            stride: buf.stride,
            pixel_size: self.colorspace.pixel_size(),
            border: self.border,
            zero,
        }
    }

    /// Fill every row of `dst`. Destination row `j` is centered on plane row
    /// `first_row + j`.
    fn rows<K: Channel, P: Progress + ?Sized>(
        &self,
        kernel: &ConvolutionKernel,
        plane: &Plane<'_>,
        first_row: isize,
        dst: PixelBufMut<'_>,
        progress: &mut P,
    ) {
        let layout = self.colorspace.format().layout();
        let ps = layout.pixel_size;
        let (cx, cy) = kernel.center();
        let (cx, cy) = (cx as isize, cy as isize);
        let copy_center = self.channels != ChannelFlags::all();
        let mut neighbors: Vec<&[u8]> = Vec::with_capacity(kernel.weights().len());

        for j in 0..dst.height {
            let y = first_row + j as isize;
            let dst_row = &mut dst.data[j * dst.stride..][..dst.width * ps];
            for (x, out) in dst_row.chunks_exact_mut(ps).enumerate() {
                let x = x as isize;
                neighbors.clear();
                for ky in 0..kernel.height() as isize {
                    for kx in 0..kernel.width() as isize {
                        neighbors.push(plane.pixel(x + kx - cx, y + ky - cy));
                    }
                }
                if copy_center {
                    out.copy_from_slice(plane.pixel(x, y));
                }
                convolve_pixel::<K>(
                    layout,
                    &neighbors,
                    kernel.weights(),
                    self.channels,
                    kernel.factor(),
                    kernel.offset(),
                    out,
                );
            }
            progress.rows_completed(j + 1);
        }
    }
}

// ===========================================================================
// Whole-buffer helpers
// ===========================================================================

/// Gaussian blur of `radius` pixels over every channel, edge pixels repeated.
pub fn gaussian_blur(
    colorspace: &Colorspace,
    src: PixelBuf<'_>,
    dst: PixelBufMut<'_>,
    radius: f64,
) -> Result<(), BufferError> {
    let horizontal = kernel::gaussian_horizontal(radius);
    let vertical = horizontal.transposed();
    Convolver::new(colorspace).apply_separable(&horizontal, &vertical, src, dst, &mut ())
}

/// Grow the opaque area of a one-byte-per-pixel alpha mask, in place.
pub fn dilate_alpha(
    mask: &mut [u8],
    width: usize,
    height: usize,
    stride: usize,
    radius: f64,
) -> Result<(), BufferError> {
    bytes::check_strided(mask.len(), width, height, stride, 1)?;
    if width == 0 || height == 0 {
        return Ok(());
    }
    let mut src = vec![0u8; width * height];
    for (s, d) in mask.chunks(stride).zip(src.chunks_exact_mut(width)) {
        d.copy_from_slice(&s[..width]);
    }
    Convolver::new(&ALPHA8)
        .with_channels(ChannelFlags::ALPHA)
        .with_border(BorderPolicy::Repeat)
        .apply_matrix(
            &kernel::dilate(radius),
            PixelBuf::new(&src, width, height, width),
            PixelBufMut::new(mask, width, height, stride),
            &mut (),
        )
}

/// Shrink the opaque area of a one-byte-per-pixel alpha mask, in place:
/// invert, dilate, invert.
pub fn erode_alpha(
    mask: &mut [u8],
    width: usize,
    height: usize,
    stride: usize,
    radius: f64,
) -> Result<(), BufferError> {
    bytes::invert_bytes_strided(mask, width, height, stride)?;
    dilate_alpha(mask, width, height, stride, radius)?;
    bytes::invert_bytes_strided(mask, width, height, stride)
}
