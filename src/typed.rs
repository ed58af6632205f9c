//! Compositing on [`rgb`] crate pixel slices via bytemuck.
//!
//! Each typed slice is reinterpreted as bytes and handed to the colorspace
//! whose layout it matches. No copies are made.
//!
//! ```rust
//! use impasto::typed;
//! use impasto::CompositeOp;
//! use rgb::Bgra;
//!
//! let src = vec![Bgra::new_bgra(0u8, 0, 0, 128); 4];
//! let mut dst = vec![Bgra::new_bgra(0u8, 0, 255, 255); 4];
//! typed::blit_bgra8(&mut dst, &src, CompositeOp::Over, 255).unwrap();
//! assert_eq!(dst[0], Bgra::new_bgra(0u8, 0, 127, 255));
//! ```

use bytemuck::Pod;
use rgb::{Bgra, GrayAlpha, Rgba};

use crate::colorspace::builtin::{GRAYA8, RGBA8, RGBA16, RGBAF32};
use crate::error::BufferError;
use crate::{BlitOptions, Colorspace, CompositeOp};

/// Composite a row of typed pixels through `colorspace`.
///
/// `T` must be exactly one pixel of the colorspace's layout.
pub fn blit<T: Pod>(
    colorspace: &Colorspace,
    dst: &mut [T],
    src: &[T],
    op: CompositeOp,
    opacity: u8,
) -> Result<(), BufferError> {
    if core::mem::size_of::<T>() != colorspace.pixel_size() {
        return Err(BufferError::PixelSizeMismatch);
    }
    if dst.len() != src.len() {
        return Err(BufferError::PixelCountMismatch);
    }
    let n = src.len();
    let d: &mut [u8] = bytemuck::cast_slice_mut(dst);
    let s: &[u8] = bytemuck::cast_slice(src);
    let row = d.len();
    let opts = BlitOptions::new(op, 1, n).with_opacity(opacity);
    colorspace.bit_blt(d, row, s, row, None, &opts)
}

/// [`blit`] through the 8-bit RGBA colorspace, which stores BGRA.
pub fn blit_bgra8(
    dst: &mut [Bgra<u8>],
    src: &[Bgra<u8>],
    op: CompositeOp,
    opacity: u8,
) -> Result<(), BufferError> {
    blit(&RGBA8, dst, src, op, opacity)
}

pub fn blit_rgba16(
    dst: &mut [Rgba<u16>],
    src: &[Rgba<u16>],
    op: CompositeOp,
    opacity: u8,
) -> Result<(), BufferError> {
    blit(&RGBA16, dst, src, op, opacity)
}

pub fn blit_rgbaf32(
    dst: &mut [Rgba<f32>],
    src: &[Rgba<f32>],
    op: CompositeOp,
    opacity: u8,
) -> Result<(), BufferError> {
    blit(&RGBAF32, dst, src, op, opacity)
}

pub fn blit_gray_alpha8(
    dst: &mut [GrayAlpha<u8>],
    src: &[GrayAlpha<u8>],
    op: CompositeOp,
    opacity: u8,
) -> Result<(), BufferError> {
    blit(&GRAYA8, dst, src, op, opacity)
}

/// Alpha-weighted average of BGRA pixels.
pub fn mix_bgra8(pixels: &[Bgra<u8>], weights: &[u8]) -> Result<Bgra<u8>, BufferError> {
    let refs: alloc::vec::Vec<&[u8]> = pixels.iter().map(bytemuck::bytes_of).collect();
    let mut out = Bgra::default();
    RGBA8.mix_colors(&refs, weights, bytemuck::bytes_of_mut(&mut out))?;
    Ok(out)
}

/// Straight RGBA copies of BGRA pixels.
pub fn bgra8_to_rgba8(src: &[Bgra<u8>], dst: &mut [Rgba<u8>]) -> Result<(), BufferError> {
    RGBA8.to_rgba8_row(
        bytemuck::cast_slice(src),
        bytemuck::cast_slice_mut(dst),
        src.len(),
    )
}

#[cfg(test)]
mod tests {
    extern crate alloc;
    use super::*;
    use alloc::vec;

    #[test]
    fn over_on_bgra() {
        let src = vec![Bgra::new_bgra(0u8, 0, 0, 255); 3];
        let mut dst = vec![Bgra::new_bgra(0u8, 0, 255, 255); 3];
        blit_bgra8(&mut dst, &src, CompositeOp::Over, 128).unwrap();
        assert!(dst.iter().all(|p| *p == Bgra::new_bgra(0u8, 0, 127, 255)));
    }

    #[test]
    fn darken_on_rgba16() {
        let src = vec![Rgba::new(100u16, 60000, 5, 65535)];
        let mut dst = vec![Rgba::new(200u16, 10, 5, 65535)];
        blit_rgba16(&mut dst, &src, CompositeOp::Darken, 255).unwrap();
        assert_eq!(dst[0], Rgba::new(100, 10, 5, 65535));
    }

    #[test]
    fn copy_on_float_and_gray() {
        let src = vec![Rgba::new(0.25f32, 0.5, 0.75, 0.5)];
        let mut dst = vec![Rgba::new(1.0f32, 1.0, 1.0, 1.0)];
        blit_rgbaf32(&mut dst, &src, CompositeOp::Copy, 255).unwrap();
        assert_eq!(dst, src);

        let src = vec![GrayAlpha::new(10u8, 255)];
        let mut dst = vec![GrayAlpha::new(200u8, 255)];
        blit_gray_alpha8(&mut dst, &src, CompositeOp::Lighten, 255).unwrap();
        assert_eq!(dst[0], GrayAlpha::new(200, 255));
    }

    #[test]
    fn size_checks() {
        let src = vec![Rgba::new(1u8, 2, 3, 4); 3];
        let mut dst = vec![Rgba::new(0u8, 0, 0, 0); 2];
        assert_eq!(
            blit(&RGBA8, &mut dst, &src[..2], CompositeOp::Over, 255),
            Ok(())
        );
        assert_eq!(
            blit(&RGBA8, &mut dst, &src, CompositeOp::Over, 255),
            Err(BufferError::PixelCountMismatch)
        );
        assert_eq!(
            blit(&RGBA16, &mut dst, &src[..2], CompositeOp::Over, 255),
            Err(BufferError::PixelSizeMismatch)
        );
    }

    #[test]
    fn mix_and_convert() {
        let red: Bgra<u8> = Bgra { b: 0, g: 0, r: 255, a: 255 };
        let blue: Bgra<u8> = Bgra { b: 255, g: 0, r: 0, a: 255 };
        let mixed = mix_bgra8(&[red, blue], &[128, 127]).unwrap();
        assert_eq!(mixed, Bgra::new_bgra(127u8, 0, 128, 255));

        let mut rgba = vec![Rgba::new(0u8, 0, 0, 0); 2];
        bgra8_to_rgba8(&[red, blue], &mut rgba).unwrap();
        assert_eq!(rgba, [Rgba::new(255, 0, 0, 255), Rgba::new(0, 0, 255, 255)]);
    }
}
