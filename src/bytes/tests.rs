extern crate alloc;
extern crate std;
use super::*;
use crate::colorspace::builtin::{RGBA8, RGBA16};
use crate::{BlitMask, BlitOptions, CompositeOp};
use alloc::{vec, vec::Vec};
use archmage::testing::{CompileTimePolicy, for_each_token_permutation};

fn policy() -> CompileTimePolicy {
    if std::env::var_os("CI").is_some() {
        CompileTimePolicy::Fail
    } else {
        CompileTimePolicy::WarnStderr
    }
}

// --- Helpers to generate test data ---

fn make_bytes(len: usize, seed: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 7 + seed) % 251) as u8).collect()
}

fn make_u16(n: usize, seed: usize) -> Vec<u8> {
    (0..n)
        .flat_map(|i| (((i * 4099 + seed * 31) % 65536) as u16).to_ne_bytes())
        .collect()
}

// --- Reference (scalar-only) implementations for comparison ---

fn mul(a: u32, b: u32) -> u32 {
    (2 * a * b + 255) / 510
}

/// Over on BGRA8 written out per pixel.
fn ref_over_bgra8(dst: &mut [u8], src: &[u8], mask: Option<&[u8]>, opacity: u8) {
    for (i, (d, s)) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)).enumerate() {
        let mut sa = s[3] as u32;
        if let Some(m) = mask {
            sa = mul(sa, m[i] as u32);
        }
        if sa == 0 {
            continue;
        }
        if opacity != 255 {
            sa = mul(sa, opacity as u32);
        }
        let da = d[3] as u32;
        let w = if da == 255 {
            sa
        } else {
            let na = (da + mul(255 - da, sa)).min(255);
            d[3] = na as u8;
            if na == 0 { sa } else { ((sa * 255 + na / 2) / na).min(255) }
        };
        for c in 0..3 {
            d[c] = ((s[c] as u32 * w + d[c] as u32 * (255 - w) + 127) / 255) as u8;
        }
    }
}

fn ref_invert_rgb(data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    for px in out.chunks_exact_mut(4) {
        px[0] = 255 - px[0];
        px[1] = 255 - px[1];
        px[2] = 255 - px[2];
    }
    out
}

fn ref_copy_swap_br(src: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; src.len()];
    for (s, d) in src.chunks_exact(4).zip(out.chunks_exact_mut(4)) {
        d[0] = s[2];
        d[1] = s[1];
        d[2] = s[0];
        d[3] = s[3];
    }
    out
}

// Test sizes: small (remainder only), medium (SIMD + remainder), large (multiple SIMD chunks)
const TEST_PIXEL_COUNTS: &[usize] = &[1, 2, 3, 7, 8, 15, 16, 31, 32, 33, 63, 64, 65, 100];

// -----------------------------------------------------------------------
// Compositing walker against per-pixel references
// -----------------------------------------------------------------------

#[test]
fn over_u8_matches_reference() {
    for &n in TEST_PIXEL_COUNTS {
        let src = make_bytes(n * 4, 3);
        let mask = make_bytes(n, 11);
        for opacity in [255u8, 128, 1] {
            let mut dst = make_bytes(n * 4, 5);
            let mut expected = dst.clone();
            ref_over_bgra8(&mut expected, &src, None, opacity);
            let opts = BlitOptions::new(CompositeOp::Over, 1, n).with_opacity(opacity);
            RGBA8.bit_blt(&mut dst, n * 4, &src, n * 4, None, &opts).unwrap();
            assert_eq!(dst, expected, "over n={n} opacity={opacity}");

            let mut dst = make_bytes(n * 4, 5);
            let mut expected = dst.clone();
            ref_over_bgra8(&mut expected, &src, Some(&mask), opacity);
            let m = BlitMask {
                data: &mask,
                stride: n,
            };
            RGBA8
                .bit_blt(&mut dst, n * 4, &src, n * 4, Some(m), &opts)
                .unwrap();
            assert_eq!(dst, expected, "masked over n={n} opacity={opacity}");
        }
    }
}

#[test]
fn multiply_u16_opaque_matches_reference() {
    for &n in TEST_PIXEL_COUNTS {
        let mut src = make_u16(n * 4, 1);
        let mut dst = make_u16(n * 4, 2);
        for px in src.chunks_exact_mut(8).chain(dst.chunks_exact_mut(8)) {
            px[6..8].copy_from_slice(&u16::MAX.to_ne_bytes());
        }
        let mut expected = dst.clone();
        for (d, s) in expected.chunks_exact_mut(2).zip(src.chunks_exact(2)) {
            let (a, b) = (
                u16::from_ne_bytes([s[0], s[1]]) as u64,
                u16::from_ne_bytes([d[0], d[1]]) as u64,
            );
            let v = ((a * b * 2 + 65535) / (2 * 65535)) as u16;
            d.copy_from_slice(&v.to_ne_bytes());
        }
        let opts = BlitOptions::new(CompositeOp::Multiply, 1, n);
        RGBA16.bit_blt(&mut dst, n * 8, &src, n * 8, None, &opts).unwrap();
        assert_eq!(dst, expected, "multiply_u16 n={n}");
    }
}

// -----------------------------------------------------------------------
// SIMD-dispatched operations, tested at every capability tier
// -----------------------------------------------------------------------

#[test]
fn permutation_copy_swap_br() {
    let report = for_each_token_permutation(policy(), |perm| {
        for &n in TEST_PIXEL_COUNTS {
            let src = make_bytes(n * 4, 0);
            let expected = ref_copy_swap_br(&src);
            let mut dst = vec![0u8; n * 4];
            copy_swap_br(&src, &mut dst).unwrap();
            assert_eq!(dst, expected, "copy_swap_br n={n} tier={perm}");
        }
    });
    std::eprintln!("copy_swap_br: {report}");
}

#[test]
fn permutation_invert_rgb() {
    let report = for_each_token_permutation(policy(), |perm| {
        for &n in TEST_PIXEL_COUNTS {
            let mut data = make_bytes(n * 4, 1);
            let expected = ref_invert_rgb(&data);
            invert_rgb8(&mut data).unwrap();
            assert_eq!(data, expected, "invert_rgb n={n} tier={perm}");
        }
    });
    std::eprintln!("invert_rgb: {report}");
}

#[test]
fn permutation_unaligned_rows() {
    // SIMD loads must not assume the row starts on a pixel-aligned address.
    let report = for_each_token_permutation(policy(), |perm| {
        for &n in &[8usize, 16, 33] {
            let backing = make_bytes(n * 4 + 1, 6);
            let src = &backing[1..];
            let mut out = vec![0u8; n * 4 + 3];
            copy_swap_br(src, &mut out[3..]).unwrap();
            assert_eq!(&out[3..], &ref_copy_swap_br(src)[..], "swap n={n} tier={perm}");

            let mut data = make_bytes(n * 4 + 1, 7);
            let expected = ref_invert_rgb(&data[1..]);
            invert_rgb8(&mut data[1..]).unwrap();
            assert_eq!(&data[1..], &expected[..], "invert n={n} tier={perm}");
        }
    });
    std::eprintln!("unaligned_rows: {report}");
}

#[test]
fn permutation_invert_strided() {
    let report = for_each_token_permutation(policy(), |perm| {
        for &(w, h, stride) in &[(1usize, 1usize, 1usize), (7, 3, 9), (33, 4, 40), (64, 2, 64), (100, 3, 101)] {
            let original = make_bytes(stride * h, 2);
            let mut data = original.clone();
            invert_bytes_strided(&mut data, w, h, stride).unwrap();
            for y in 0..h {
                for x in 0..stride {
                    let i = y * stride + x;
                    let want = if x < w { !original[i] } else { original[i] };
                    assert_eq!(data[i], want, "invert_strided {w}x{h}/{stride} at {i} tier={perm}");
                }
            }
        }
    });
    std::eprintln!("invert_strided: {report}");
}

// -----------------------------------------------------------------------
// Validation
// -----------------------------------------------------------------------

#[test]
fn strided_geometry() {
    assert_eq!(check_strided(0, 0, 5, 0, 4), Ok(()));
    assert_eq!(check_strided(16, 2, 2, 8, 4), Ok(()));
    // Last row needs no padding.
    assert_eq!(check_strided(14, 2, 2, 10, 4), Err(BufferError::InvalidStride));
    assert_eq!(check_strided(18, 2, 2, 10, 4), Ok(()));
    assert_eq!(check_strided(64, 3, 1, 8, 4), Err(BufferError::InvalidStride));
    assert_eq!(
        check_strided(usize::MAX, usize::MAX, 2, usize::MAX, 4),
        Err(BufferError::InvalidStride)
    );
}

#[test]
fn pixel_counts() {
    assert_eq!(check_pixels(8, 2, 4), Ok(()));
    assert_eq!(check_pixels(7, 2, 4), Err(BufferError::PixelCountMismatch));
    assert_eq!(
        check_pixels(8, usize::MAX, 4),
        Err(BufferError::PixelCountMismatch)
    );
}

#[test]
fn swap_rejects_partial_pixels() {
    let mut dst = [0u8; 8];
    assert_eq!(
        copy_swap_br(&[0u8; 7], &mut dst),
        Err(BufferError::NotPixelAligned)
    );
    assert_eq!(
        copy_swap_br(&[0u8; 12], &mut dst),
        Err(BufferError::PixelCountMismatch)
    );
    assert_eq!(invert_rgb8(&mut [0u8; 5]), Err(BufferError::NotPixelAligned));
}
