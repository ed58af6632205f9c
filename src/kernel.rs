//! Convolution kernels and the standard generators.
//!
//! A kernel is an odd-sized weight matrix plus the `factor` the weighted sum
//! is divided by and an `offset` added afterwards. The offset is a fraction
//! of the channel range: `0.5` lifts a zero response to mid grey.
//!
//! Kernels are immutable once built and can be shared between threads.

use alloc::vec::Vec;
use core::f64::consts::PI;

use crate::error::KernelError;

/// Largest radius the generators honor. Larger radii, including infinity,
/// are clamped to it; NaN and negative radii count as zero.
pub const MAX_RADIUS: f64 = 256.0;

#[inline]
fn clamp_radius(radius: f64) -> f64 {
    // NaN.max(0.0) is 0.0.
    radius.max(0.0).min(MAX_RADIUS)
}

/// An odd-sized weight matrix, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvolutionKernel {
    width: usize,
    height: usize,
    data: Vec<f64>,
    factor: f64,
    offset: f64,
}

fn check_dims(width: usize, height: usize) -> Result<(), KernelError> {
    if width == 0 || height == 0 {
        return Err(KernelError::Empty);
    }
    if width % 2 == 0 || height % 2 == 0 {
        return Err(KernelError::EvenDimensions { width, height });
    }
    Ok(())
}

impl ConvolutionKernel {
    /// `data` holds `width × height` weights, row-major. Both dimensions must be odd.
    pub fn new(
        width: usize,
        height: usize,
        data: Vec<f64>,
        factor: f64,
        offset: f64,
    ) -> Result<Self, KernelError> {
        check_dims(width, height)?;
        let expected = width.saturating_mul(height);
        if data.len() != expected {
            return Err(KernelError::ElementCount {
                expected,
                actual: data.len(),
            });
        }
        if !factor.is_finite() || !offset.is_finite() || data.iter().any(|w| !w.is_finite()) {
            return Err(KernelError::NonFiniteWeight);
        }
        Ok(Self {
            width,
            height,
            data,
            factor,
            offset,
        })
    }

    /// Kernel from an 8-bit grey brush tip: dark pixels weigh most
    /// (`255 - value`), normalized by the total weight.
    pub fn from_gray8(pixels: &[u8], width: usize, height: usize) -> Result<Self, KernelError> {
        let data: Vec<f64> = pixels.iter().map(|&v| f64::from(255 - v)).collect();
        let factor = data.iter().sum();
        Self::new(width, height, data, factor, 0.0)
    }

    /// Same weights laid out as `width × height`.
    pub fn reshape(self, width: usize, height: usize) -> Result<Self, KernelError> {
        Self::new(width, height, self.data, self.factor, self.offset)
    }

    /// Rows become columns. A `1×K` kernel becomes `K×1`.
    pub fn transposed(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for x in 0..self.width {
            for y in 0..self.height {
                data.push(self.data[y * self.width + x]);
            }
        }
        Self {
            width: self.height,
            height: self.width,
            data,
            factor: self.factor,
            offset: self.offset,
        }
    }

    /// Replace the offset. Non-finite values are ignored.
    pub fn with_offset(mut self, offset: f64) -> Self {
        if offset.is_finite() {
            self.offset = offset;
        }
        self
    }

    /// Replace the divisor. Non-finite values are ignored.
    pub fn with_factor(mut self, factor: f64) -> Self {
        if factor.is_finite() {
            self.factor = factor;
        }
        self
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Weights, row-major.
    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn weight(&self, x: usize, y: usize) -> f64 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn factor(&self) -> f64 {
        self.factor
    }

    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Column and row of the center tap.
    #[inline]
    pub fn center(&self) -> (usize, usize) {
        (self.width / 2, self.height / 2)
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }
}

// ===========================================================================
// Gaussian
// ===========================================================================

/// Standard deviation used for a blur of `radius` pixels.
pub fn gaussian_sigma(radius: f64) -> f64 {
    0.3 * clamp_radius(radius) + 0.3
}

/// Taps in a 1-D Gaussian of `radius`: three sigmas each side of the center.
pub fn gaussian_kernel_size(radius: f64) -> usize {
    6 * libm::ceil(gaussian_sigma(radius)) as usize + 1
}

/// `1×K` Gaussian. Radii are clamped to `0..=MAX_RADIUS`.
pub fn gaussian_horizontal(radius: f64) -> ConvolutionKernel {
    let sigma = gaussian_sigma(radius);
    let size = gaussian_kernel_size(radius);
    let center = (size / 2) as f64;
    let scale = 1.0 / libm::sqrt(2.0 * PI * sigma * sigma);
    let exp_scale = 1.0 / (2.0 * sigma * sigma);

    let data: Vec<f64> = (0..size)
        .map(|i| {
            let x = i as f64 - center;
            scale * libm::exp(-x * x * exp_scale)
        })
        .collect();
    let factor = data.iter().sum();
    log::debug!("gaussian kernel: radius {radius}, sigma {sigma:.3}, {size} taps");
    ConvolutionKernel {
        width: size,
        height: 1,
        data,
        factor,
        offset: 0.0,
    }
}

/// `K×1` Gaussian, the transpose of [`gaussian_horizontal`].
pub fn gaussian_vertical(radius: f64) -> ConvolutionKernel {
    gaussian_horizontal(radius).transposed()
}

// ===========================================================================
// Edge detection
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// A single row of signed distances.
    Simple,
    /// Every row holds the signed distance from the center column.
    Prewitt,
    /// Signed distance divided by the squared distance from the center.
    Sobel,
}

/// Horizontal gradient kernel. The response is centered on mid grey
/// (offset `0.5`) and normalized by the positive weights. `reverse` flips
/// the gradient direction.
pub fn edge_horizontal(radius: f64, kind: EdgeKind, reverse: bool) -> ConvolutionKernel {
    let size = (2 * libm::ceil(clamp_radius(radius)) as usize + 1).max(3);
    let center = (size / 2) as f64;
    let height = if kind == EdgeKind::Simple { 1 } else { size };
    let row_center = (height / 2) as f64;

    let mut data = Vec::with_capacity(size * height);
    for y in 0..height {
        let dy = y as f64 - row_center;
        for x in 0..size {
            let dx = if reverse {
                x as f64 - center
            } else {
                center - x as f64
            };
            let w = match kind {
                EdgeKind::Simple | EdgeKind::Prewitt => dx,
                EdgeKind::Sobel => {
                    let d2 = dx * dx + dy * dy;
                    if d2 == 0.0 { 0.0 } else { dx / d2 }
                }
            };
            data.push(w);
        }
    }
    let factor = data.iter().filter(|w| **w > 0.0).sum();
    log::debug!("{kind:?} edge kernel: {size}x{height}, reverse {reverse}");
    ConvolutionKernel {
        width: size,
        height,
        data,
        factor,
        offset: 0.5,
    }
}

/// Vertical gradient kernel, the transpose of [`edge_horizontal`].
pub fn edge_vertical(radius: f64, kind: EdgeKind, reverse: bool) -> ConvolutionKernel {
    edge_horizontal(radius, kind, reverse).transposed()
}

// ===========================================================================
// Laplacian of Gaussian
// ===========================================================================

/// Square LoG kernel with `sigma = radius` (at least 0.5).
///
/// The center tap is replaced by the negated sum of all other taps, so the
/// weights sum to zero and flat regions give no response. Weights are then
/// scaled so the positive ones sum to `2 × coeff`.
pub fn laplacian_of_gaussian(radius: f64, coeff: f64) -> ConvolutionKernel {
    let sigma = clamp_radius(radius).max(0.5);
    let size = 2 * libm::ceil(sigma) as usize + 1;
    let half = (size / 2) as f64;
    let norm = -1.0 / (PI * sigma * sigma * sigma * sigma);
    let two_s2 = 2.0 * sigma * sigma;

    let mut data = Vec::with_capacity(size * size);
    for y in 0..size {
        for x in 0..size {
            let (dx, dy) = (x as f64 - half, y as f64 - half);
            let q = (dx * dx + dy * dy) / two_s2;
            data.push(norm * (1.0 - q) * libm::exp(-q));
        }
    }

    let mid = data.len() / 2;
    let others: f64 = data
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != mid)
        .map(|(_, w)| w)
        .sum();
    data[mid] = -others;

    let positive: f64 = data.iter().filter(|w| **w > 0.0).sum();
    if positive > 0.0 {
        let scale = 2.0 * coeff / positive;
        for w in &mut data {
            *w *= scale;
        }
    }
    log::debug!("LoG kernel: sigma {sigma}, {size}x{size}, coeff {coeff}");
    ConvolutionKernel {
        width: size,
        height: size,
        data,
        factor: 1.0,
        offset: 0.0,
    }
}

// ===========================================================================
// Morphology
// ===========================================================================

/// Radial dilation kernel: 1 inside `radius`, fading linearly to 0 over the
/// last pixel, 0 beyond. Radii below 1 are raised to 1, which is the identity.
pub fn dilate(radius: f64) -> ConvolutionKernel {
    let r = clamp_radius(radius).max(1.0);
    let size = 2 * libm::ceil(r) as usize + 1;
    let half = (size / 2) as f64;

    let mut data = Vec::with_capacity(size * size);
    for y in 0..size {
        for x in 0..size {
            let (dx, dy) = (x as f64 - half, y as f64 - half);
            let dist = libm::sqrt(dx * dx + dy * dy);
            // 1 up to r - 1, linear over the last pixel, 0 from r on.
            data.push((r - dist).clamp(0.0, 1.0));
        }
    }
    log::debug!("dilate kernel: radius {r}, {size}x{size}");
    ConvolutionKernel {
        width: size,
        height: size,
        data,
        factor: 1.0,
        offset: 0.0,
    }
}
