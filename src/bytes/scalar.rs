use archmage::prelude::*;

use super::{copy_swap_br_row, invert_bytes_row, invert_rgb_row};

// ===========================================================================
// Scalar wrappers (dispatch targets for incant!)
// ===========================================================================

pub(super) fn copy_swap_br_impl_scalar(_t: ScalarToken, s: &[u8], d: &mut [u8]) {
    copy_swap_br_row(s, d);
}
pub(super) fn invert_rgb_impl_scalar(_t: ScalarToken, b: &mut [u8]) {
    invert_rgb_row(b);
}
pub(super) fn invert_bytes_strided_impl_scalar(
    _t: ScalarToken,
    buf: &mut [u8],
    w: usize,
    h: usize,
    stride: usize,
) {
    for y in 0..h {
        invert_bytes_row(&mut buf[y * stride..][..w]);
    }
}
