//! End-to-end checks through the public API only.

use impasto::colorspace::builtin::{ALPHA8, RGBA8};
use impasto::{
    BlitOptions, BorderPolicy, ChannelFlags, ChannelInfo, ColorModel, Colorspace,
    ColorspaceRegistry, CompositeOp, Convolver, NumericKind, PixelBuf, PixelBufMut, PixelFormat,
    RegistryError, kernel,
};
use rayon::prelude::*;

#[test_log::test]
fn registry_lookup_and_blit() {
    let registry = ColorspaceRegistry::with_builtins();
    let rgba = registry.get("RGBA").unwrap();
    assert_eq!(rgba.pixel_size(), 4);
    assert!(registry.get("XYZ").is_none());

    // Black at half opacity over opaque red.
    let src = [0u8, 0, 0, 255].repeat(4);
    let mut dst = [0u8, 0, 255, 255].repeat(4);
    let opts = BlitOptions::new("normal".parse().unwrap(), 2, 2).with_opacity(128);
    rgba.bit_blt(&mut dst, 8, &src, 8, None, &opts).unwrap();
    assert_eq!(dst, [0u8, 0, 127, 255].repeat(4));
}

#[test_log::test]
fn custom_colorspace_registration() {
    let format = PixelFormat::new(vec![
        ChannelInfo::color("Gray", 0, NumericKind::U16, [128, 128, 128]),
        ChannelInfo::alpha("Alpha", 2, NumericKind::U16),
    ])
    .unwrap();
    let ops = vec![CompositeOp::Over, CompositeOp::Copy];
    let cs = Colorspace::new("GRAYA16", "Gray/Alpha 16", ColorModel::Gray, format, ops).unwrap();

    let mut registry = ColorspaceRegistry::with_builtins();
    let before = registry.len();
    registry.register(cs.clone()).unwrap();
    assert_eq!(
        registry.register(cs),
        Err(RegistryError::Duplicate { id: "GRAYA16" })
    );
    assert_eq!(registry.len(), before + 1);

    let gray = registry.get("GRAYA16").unwrap();
    assert!(gray.supports(CompositeOp::Over));
    assert!(!gray.supports(CompositeOp::Multiply));

    let src: Vec<u8> = [1000u16, 65535].iter().flat_map(|v| v.to_ne_bytes()).collect();
    let mut dst = vec![0u8; 4];
    gray.bit_blt(&mut dst, 4, &src, 4, None, &BlitOptions::new(CompositeOp::Copy, 1, 1))
        .unwrap();
    assert_eq!(dst, src);
}

#[test_log::test]
fn blur_then_threshold_alpha() {
    let (w, h) = (16, 16);
    let mut mask = vec![0u8; w * h];
    mask[8 * w + 8] = 255;

    impasto::convolve::dilate_alpha(&mut mask, w, h, w, 2.0).unwrap();
    assert_eq!(mask[8 * w + 9], 255);
    assert_eq!(mask[0], 0);

    let mut blurred = vec![0u8; w * h];
    let conv = Convolver::new(&ALPHA8)
        .with_channels(ChannelFlags::ALPHA)
        .with_border(BorderPolicy::Transparent);
    let mut rows_seen = Vec::new();
    conv.apply_matrix(
        &kernel::dilate(1.0),
        PixelBuf::new(&mask, w, h, w),
        PixelBufMut::new(&mut blurred, w, h, w),
        &mut |rows: usize| rows_seen.push(rows),
    )
    .unwrap();
    assert_eq!(rows_seen.last(), Some(&h));
    assert!(blurred.iter().zip(&mask).all(|(b, m)| b >= m));
}

#[test]
fn disjoint_rows_in_parallel() {
    let (w, h) = (37, 64);
    let row = w * 4;
    let src: Vec<u8> = (0..row * h).map(|i| (i * 13 % 256) as u8).collect();
    let base: Vec<u8> = (0..row * h).map(|i| (i * 7 % 256) as u8).collect();

    let mut serial = base.clone();
    let opts = BlitOptions::new(CompositeOp::Overlay, h, w).with_opacity(180);
    RGBA8.bit_blt(&mut serial, row, &src, row, None, &opts).unwrap();

    // Shared colorspace, one band of rows per task.
    let band = 8;
    let mut parallel = base;
    parallel
        .par_chunks_mut(row * band)
        .zip(src.par_chunks(row * band))
        .for_each(|(d, s)| {
            let opts = BlitOptions::new(CompositeOp::Overlay, d.len() / row, w).with_opacity(180);
            RGBA8.bit_blt(d, row, s, row, None, &opts).unwrap();
        });
    assert_eq!(parallel, serial);
}

#[cfg(feature = "imgref")]
#[test]
fn blur_typed_image() {
    use imgref::ImgVec;
    use rgb::Bgra;

    let px: Bgra<u8> = Bgra { b: 40, g: 80, r: 120, a: 255 };
    let img = ImgVec::new(vec![px; 9 * 7], 9, 7);
    let out = impasto::img::gaussian_blur(&RGBA8, img.as_ref(), 1.5).unwrap();
    assert!(out.as_ref().pixels().all(|p| p == px));
}
