//! Whole-image blits and convolution on [`imgref`] types.
//!
//! Images keep their stride; pixel rows are passed to the byte-level entry
//! points in one call, so SIMD dispatch happens once per image.
//!
//! ```rust
//! use impasto::colorspace::builtin::RGBA8;
//! use impasto::{img, CompositeOp};
//! use imgref::ImgVec;
//! use rgb::Bgra;
//!
//! let src = ImgVec::new(vec![Bgra::new_bgra(255u8, 0, 0, 255); 16], 4, 4);
//! let mut dst = ImgVec::new(vec![Bgra::new_bgra(0u8, 0, 0, 0); 16], 4, 4);
//! img::blit(&RGBA8, dst.as_mut(), src.as_ref(), CompositeOp::Over, 255).unwrap();
//! assert_eq!(dst.buf()[5], Bgra::new_bgra(255u8, 0, 0, 255));
//! ```

use alloc::vec;

use bytemuck::Pod;
use imgref::{ImgRef, ImgRefMut, ImgVec};

use crate::convolve::{self, Convolver, PixelBuf, PixelBufMut, Progress};
use crate::error::BufferError;
use crate::kernel::ConvolutionKernel;
use crate::{BlitOptions, Colorspace, CompositeOp};

fn check_dims(sw: usize, sh: usize, dw: usize, dh: usize) -> Result<(), BufferError> {
    if sw != dw || sh != dh {
        Err(BufferError::DimensionMismatch)
    } else {
        Ok(())
    }
}

fn check_pixel<T>(colorspace: &Colorspace) -> Result<(), BufferError> {
    if size_of::<T>() != colorspace.pixel_size() {
        Err(BufferError::PixelSizeMismatch)
    } else {
        Ok(())
    }
}

fn view<T: Pod>(img: ImgRef<'_, T>) -> PixelBuf<'_> {
    let (w, h, stride) = (img.width(), img.height(), img.stride() * size_of::<T>());
    PixelBuf::new(bytemuck::cast_slice(img.into_buf()), w, h, stride)
}

fn view_mut<T: Pod>(img: ImgRefMut<'_, T>) -> PixelBufMut<'_> {
    let (w, h, stride) = (img.width(), img.height(), img.stride() * size_of::<T>());
    PixelBufMut::new(bytemuck::cast_slice_mut(img.into_buf()), w, h, stride)
}

/// Composite `src` onto `dst` with `op`. Both images must be the same size.
pub fn blit<T: Pod>(
    colorspace: &Colorspace,
    dst: ImgRefMut<'_, T>,
    src: ImgRef<'_, T>,
    op: CompositeOp,
    opacity: u8,
) -> Result<(), BufferError> {
    check_pixel::<T>(colorspace)?;
    check_dims(src.width(), src.height(), dst.width(), dst.height())?;
    let s = view(src);
    let d = view_mut(dst);
    let opts = BlitOptions::new(op, s.height, s.width).with_opacity(opacity);
    colorspace.bit_blt(d.data, d.stride, s.data, s.stride, None, &opts)
}

/// Convolve `src` into `dst` with `convolver`'s settings.
pub fn convolve<T: Pod, P: Progress + ?Sized>(
    convolver: &Convolver<'_>,
    kernel: &ConvolutionKernel,
    src: ImgRef<'_, T>,
    dst: ImgRefMut<'_, T>,
    progress: &mut P,
) -> Result<(), BufferError> {
    check_pixel::<T>(convolver.colorspace())?;
    check_dims(src.width(), src.height(), dst.width(), dst.height())?;
    convolver.apply_matrix(kernel, view(src), view_mut(dst), progress)
}

/// Gaussian-blurred copy of `src`, packed.
pub fn gaussian_blur<T: Pod>(
    colorspace: &Colorspace,
    src: ImgRef<'_, T>,
    radius: f64,
) -> Result<ImgVec<T>, BufferError> {
    check_pixel::<T>(colorspace)?;
    let (w, h) = (src.width(), src.height());
    let mut out = ImgVec::new(vec![bytemuck::Zeroable::zeroed(); w * h], w, h);
    convolve::gaussian_blur(colorspace, view(src), view_mut(out.as_mut()), radius)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    extern crate alloc;
    use super::*;
    use crate::colorspace::builtin::{GRAYA8, RGBA8};
    use crate::kernel;
    use alloc::vec;
    use rgb::{Bgra, GrayAlpha};

    #[test]
    fn blit_keeps_stride_padding() {
        // 2x2 image inside a stride of 3 pixels.
        let pad: Bgra<u8> = Bgra { b: 9, g: 9, r: 9, a: 9 };
        let white: Bgra<u8> = Bgra { b: 255, g: 255, r: 255, a: 255 };
        let black: Bgra<u8> = Bgra { b: 0, g: 0, r: 0, a: 255 };
        let src_buf = vec![black, black, pad, black, black];
        let mut dst_buf = vec![white, white, pad, white, white];
        let src = ImgRef::new_stride(&src_buf, 2, 2, 3);
        let dst = ImgRefMut::new_stride(&mut dst_buf, 2, 2, 3);
        blit(&RGBA8, dst, src, CompositeOp::Multiply, 255).unwrap();
        assert_eq!(dst_buf, [black, black, pad, black, black]);
    }

    #[test]
    fn blit_checks() {
        let src_buf = vec![GrayAlpha::new(0u8, 255); 4];
        let mut dst_buf = vec![GrayAlpha::new(0u8, 255); 6];
        assert_eq!(
            blit(
                &GRAYA8,
                ImgRefMut::new(&mut dst_buf, 3, 2),
                ImgRef::new(&src_buf, 2, 2),
                CompositeOp::Over,
                255
            ),
            Err(BufferError::DimensionMismatch)
        );
        assert_eq!(
            blit(
                &RGBA8,
                ImgRefMut::new(&mut dst_buf[..4], 2, 2),
                ImgRef::new(&src_buf, 2, 2),
                CompositeOp::Over,
                255
            ),
            Err(BufferError::PixelSizeMismatch)
        );
    }

    #[test]
    fn blur_of_flat_image_is_flat() {
        let px: Bgra<u8> = Bgra { b: 10, g: 20, r: 30, a: 255 };
        let src = ImgVec::new(vec![px; 6 * 5], 6, 5);
        let out = gaussian_blur(&RGBA8, src.as_ref(), 2.0).unwrap();
        assert_eq!((out.width(), out.height()), (6, 5));
        assert!(out.buf().iter().all(|p| *p == px));
    }

    #[test]
    fn convolve_reports_progress() {
        let src = ImgVec::new(vec![GrayAlpha::new(50u8, 255); 12], 4, 3);
        let mut dst = ImgVec::new(vec![GrayAlpha::new(0u8, 0); 12], 4, 3);
        let mut last = 0usize;
        convolve(
            &Convolver::new(&GRAYA8),
            &kernel::dilate(1.0),
            src.as_ref(),
            dst.as_mut(),
            &mut |rows: usize| last = rows,
        )
        .unwrap();
        assert_eq!(last, 3);
        assert_eq!(dst.buf()[7], GrayAlpha::new(50, 255));
    }
}
