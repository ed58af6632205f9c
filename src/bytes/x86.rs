use archmage::prelude::*;
use safe_unaligned_simd::x86_64::{_mm256_loadu_si256, _mm256_storeu_si256};

use super::{copy_swap_br_row, invert_bytes_row, invert_rgb_row};

// ===========================================================================
// SIMD constants
// ===========================================================================

const BR_SHUF_MASK_AVX: [i8; 32] = [
    2, 1, 0, 3, 6, 5, 4, 7, 10, 9, 8, 11, 14, 13, 12, 15, 2, 1, 0, 3, 6, 5, 4, 7, 10, 9, 8, 11, 14,
    13, 12, 15,
];

// Bytes 0..3 of every pixel flipped, byte 3 kept.
const RGB_XOR_MASK_AVX: [i8; 32] = [
    -1, -1, -1, 0, -1, -1, -1, 0, -1, -1, -1, 0, -1, -1, -1, 0, -1, -1, -1, 0, -1, -1, -1, 0, -1,
    -1, -1, 0, -1, -1, -1, 0,
];

const ALL_ONES_AVX: [i8; 32] = [-1; 32];

// ===========================================================================
// x86-64 AVX2 rite row implementations
// ===========================================================================

#[rite]
pub(super) fn copy_swap_br_row_v3(_token: X64V3Token, src: &[u8], dst: &mut [u8]) {
    let mask = _mm256_loadu_si256(&BR_SHUF_MASK_AVX);
    let n = src.len().min(dst.len());
    let mut i = 0;
    while i + 32 <= n {
        let Ok(s) = <&[u8; 32]>::try_from(&src[i..i + 32]) else {
            break;
        };
        let v = _mm256_loadu_si256(s);
        let shuffled = _mm256_shuffle_epi8(v, mask);
        let Ok(d) = <&mut [u8; 32]>::try_from(&mut dst[i..i + 32]) else {
            break;
        };
        _mm256_storeu_si256(d, shuffled);
        i += 32;
    }
    copy_swap_br_row(&src[i..n], &mut dst[i..n]);
}

#[rite]
pub(super) fn xor_row_v3(_token: X64V3Token, row: &mut [u8], mask: &[i8; 32]) -> usize {
    let mask = _mm256_loadu_si256(mask);
    let n = row.len();
    let mut i = 0;
    while i + 32 <= n {
        let Ok(arr) = <&mut [u8; 32]>::try_from(&mut row[i..i + 32]) else {
            break;
        };
        let v = _mm256_loadu_si256(&*arr);
        _mm256_storeu_si256(arr, _mm256_xor_si256(v, mask));
        i += 32;
    }
    i
}

// ===========================================================================
// x86-64 arcane wrappers
// ===========================================================================

#[arcane]
pub(super) fn copy_swap_br_impl_v3(t: X64V3Token, s: &[u8], d: &mut [u8]) {
    copy_swap_br_row_v3(t, s, d);
}
#[arcane]
pub(super) fn invert_rgb_impl_v3(t: X64V3Token, b: &mut [u8]) {
    let done = xor_row_v3(t, b, &RGB_XOR_MASK_AVX);
    invert_rgb_row(&mut b[done..]);
}
#[arcane]
pub(super) fn invert_bytes_strided_impl_v3(
    t: X64V3Token,
    buf: &mut [u8],
    w: usize,
    h: usize,
    stride: usize,
) {
    for y in 0..h {
        let row = &mut buf[y * stride..][..w];
        let done = xor_row_v3(t, row, &ALL_ONES_AVX);
        invert_bytes_row(&mut row[done..]);
    }
}
