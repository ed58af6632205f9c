use archmage::prelude::*;

use super::{copy_swap_br_row, invert_bytes_row, invert_rgb_row};

const BR_SHUF_MASK: [u8; 16] = [2, 1, 0, 3, 6, 5, 4, 7, 10, 9, 8, 11, 14, 13, 12, 15];

// Bytes 0..3 of every pixel flipped, byte 3 kept.
const RGB_XOR_MASK: [u8; 16] = [
    0xFF, 0xFF, 0xFF, 0, 0xFF, 0xFF, 0xFF, 0, 0xFF, 0xFF, 0xFF, 0, 0xFF, 0xFF, 0xFF, 0,
];

const ALL_ONES: [u8; 16] = [0xFF; 16];

// ===========================================================================
// AArch64 NEON rite row implementations
// ===========================================================================

#[rite]
pub(super) fn copy_swap_br_row_neon(_token: NeonToken, src: &[u8], dst: &mut [u8]) {
    use core::arch::aarch64::vqtbl1q_u8;
    let mask = safe_unaligned_simd::aarch64::vld1q_u8(&BR_SHUF_MASK);
    let n = src.len().min(dst.len());
    let mut i = 0;
    while i + 16 <= n {
        let Ok(s) = <&[u8; 16]>::try_from(&src[i..i + 16]) else {
            break;
        };
        let v = safe_unaligned_simd::aarch64::vld1q_u8(s);
        let shuffled = vqtbl1q_u8(v, mask);
        let Ok(d) = <&mut [u8; 16]>::try_from(&mut dst[i..i + 16]) else {
            break;
        };
        safe_unaligned_simd::aarch64::vst1q_u8(d, shuffled);
        i += 16;
    }
    copy_swap_br_row(&src[i..n], &mut dst[i..n]);
}

#[rite]
pub(super) fn xor_row_neon(_token: NeonToken, row: &mut [u8], mask: &[u8; 16]) -> usize {
    use core::arch::aarch64::veorq_u8;
    let mask = safe_unaligned_simd::aarch64::vld1q_u8(mask);
    let n = row.len();
    let mut i = 0;
    while i + 16 <= n {
        let Ok(arr) = <&mut [u8; 16]>::try_from(&mut row[i..i + 16]) else {
            break;
        };
        let v = safe_unaligned_simd::aarch64::vld1q_u8(&*arr);
        safe_unaligned_simd::aarch64::vst1q_u8(arr, veorq_u8(v, mask));
        i += 16;
    }
    i
}

// ===========================================================================
// AArch64 arcane wrappers
// ===========================================================================

#[arcane]
pub(super) fn copy_swap_br_impl_neon(t: NeonToken, s: &[u8], d: &mut [u8]) {
    copy_swap_br_row_neon(t, s, d);
}
#[arcane]
pub(super) fn invert_rgb_impl_neon(t: NeonToken, b: &mut [u8]) {
    let done = xor_row_neon(t, b, &RGB_XOR_MASK);
    invert_rgb_row(&mut b[done..]);
}
#[arcane]
pub(super) fn invert_bytes_strided_impl_neon(
    t: NeonToken,
    buf: &mut [u8],
    w: usize,
    h: usize,
    stride: usize,
) {
    for y in 0..h {
        let row = &mut buf[y * stride..][..w];
        let done = xor_row_neon(t, row, &ALL_ONES);
        invert_bytes_row(&mut row[done..]);
    }
}
