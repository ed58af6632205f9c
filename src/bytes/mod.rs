// ---------------------------------------------------------------------------
// Row-level kernels with SIMD dispatch.
//
// Architecture: portable #[inline(always)] row loops live here and serve as
// the scalar tier and the SIMD remainder. #[rite] row functions in the tier
// files hold the SIMD loops; #[arcane] wrappers are picked by incant! at
// runtime. Compositing rows are scalar, one monomorphized walker per
// channel kind.
// ---------------------------------------------------------------------------

use archmage::incant;

use crate::composite::{BlitJob, composite};
use crate::error::BufferError;

mod scalar;
use scalar::*;

#[cfg(target_arch = "x86_64")]
mod x86;
#[cfg(target_arch = "x86_64")]
use x86::*;

#[cfg(target_arch = "aarch64")]
mod arm;
#[cfg(target_arch = "aarch64")]
use arm::*;

#[cfg(test)]
mod tests;

// ===========================================================================
// Validation helpers
// ===========================================================================

#[inline]
pub(crate) fn check_pixels(len: usize, count: usize, bpp: usize) -> Result<(), BufferError> {
    let need = count.checked_mul(bpp).ok_or(BufferError::PixelCountMismatch)?;
    if len < need {
        Err(BufferError::PixelCountMismatch)
    } else {
        Ok(())
    }
}

/// `len` must cover `height` rows of `width × bpp` bytes spaced `stride` apart.
/// The last row needs no trailing padding.
#[inline]
pub(crate) fn check_strided(
    len: usize,
    width: usize,
    height: usize,
    stride: usize,
    bpp: usize,
) -> Result<(), BufferError> {
    if width == 0 || height == 0 {
        return Ok(());
    }
    let row_bytes = width.checked_mul(bpp).ok_or(BufferError::InvalidStride)?;
    if row_bytes > stride {
        return Err(BufferError::InvalidStride);
    }
    let total = (height - 1)
        .checked_mul(stride)
        .ok_or(BufferError::InvalidStride)?
        .checked_add(row_bytes)
        .ok_or(BufferError::InvalidStride)?;
    if len < total {
        return Err(BufferError::InvalidStride);
    }
    Ok(())
}

// ===========================================================================
// Portable row loops
// ===========================================================================

#[inline(always)]
fn swap_br_u32(v: u32) -> u32 {
    (v & 0xFF00_FF00) | (v.rotate_left(16) & 0x00FF_00FF)
}

/// BGRA ↔ RGBA copy.
#[inline(always)]
fn copy_swap_br_row(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        let v = u32::from_le_bytes([s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&swap_br_u32(v).to_le_bytes());
    }
}

/// `255 - v` on bytes 0..3 of every 4-byte pixel, byte 3 kept.
#[inline(always)]
fn invert_rgb_row(row: &mut [u8]) {
    for px in row.chunks_exact_mut(4) {
        let v = u32::from_le_bytes([px[0], px[1], px[2], px[3]]);
        px.copy_from_slice(&(v ^ 0x00FF_FFFF).to_le_bytes());
    }
}

/// `255 - v` on every byte.
#[inline(always)]
fn invert_bytes_row(row: &mut [u8]) {
    for v in row.iter_mut() {
        *v = !*v;
    }
}

// ===========================================================================
// Crate API
// ===========================================================================

/// Composite one validated job of `u8` channels.
pub(crate) fn composite_u8(job: BlitJob<'_>) {
    composite::<u8>(job);
}

/// Composite one validated job of `u16` channels.
pub(crate) fn composite_u16(job: BlitJob<'_>) {
    composite::<u16>(job);
}

/// Composite one validated job of `f32` channels.
pub(crate) fn composite_f32(job: BlitJob<'_>) {
    composite::<f32>(job);
}

/// Copy 4bpp pixels swapping bytes 0 and 2 (BGRA ↔ RGBA).
pub(crate) fn copy_swap_br(src: &[u8], dst: &mut [u8]) -> Result<(), BufferError> {
    if !src.len().is_multiple_of(4) {
        return Err(BufferError::NotPixelAligned);
    }
    check_pixels(dst.len(), src.len() / 4, 4)?;
    incant!(copy_swap_br_impl(src, dst), [v3, neon, scalar]);
    Ok(())
}

/// Invert the first three bytes of every 4bpp pixel in place.
pub(crate) fn invert_rgb8(buf: &mut [u8]) -> Result<(), BufferError> {
    if !buf.len().is_multiple_of(4) {
        return Err(BufferError::NotPixelAligned);
    }
    incant!(invert_rgb_impl(buf), [v3, neon, scalar]);
    Ok(())
}

/// Invert every byte of a strided one-byte-per-pixel image in place.
pub(crate) fn invert_bytes_strided(
    buf: &mut [u8],
    width: usize,
    height: usize,
    stride: usize,
) -> Result<(), BufferError> {
    check_strided(buf.len(), width, height, stride, 1)?;
    if width == 0 || height == 0 {
        return Ok(());
    }
    incant!(
        invert_bytes_strided_impl(buf, width, height, stride),
        [v3, neon, scalar]
    );
    Ok(())
}
