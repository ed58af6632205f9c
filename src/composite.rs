// ---------------------------------------------------------------------------
// Compositing row walker.
//
// Every blend mode shares one alpha prologue: mask folds into source alpha,
// transparent pixels are skipped, global opacity folds in, and the blend
// fraction is derived from source and destination alpha. Only the per-pixel
// color step differs, so each operator is the walker plus a closure.
// ---------------------------------------------------------------------------

use crate::format::{Layout, MAX_CHANNELS};
use crate::math::Channel;
use crate::op::CompositeOp;

/// Channels a blit may write, resolved against one format.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Targets {
    color: [usize; MAX_CHANNELS],
    color_len: usize,
    pub write_alpha: bool,
    /// Every channel selected; whole-pixel copies are allowed.
    pub all: bool,
    /// Byte offsets of red, green and blue for the HSV/HSL operators.
    pub rgb: Option<[usize; 3]>,
}

impl Targets {
    pub fn new(color: &[usize], write_alpha: bool, all: bool, rgb: Option<[usize; 3]>) -> Self {
        let mut buf = [0; MAX_CHANNELS];
        buf[..color.len()].copy_from_slice(color);
        Self {
            color: buf,
            color_len: color.len(),
            write_alpha,
            all,
            rgb,
        }
    }

    #[inline(always)]
    pub fn color(&self) -> &[usize] {
        &self.color[..self.color_len]
    }
}

/// One validated blit. Slices are guaranteed to cover `rows × cols` pixels
/// at their strides.
pub(crate) struct BlitJob<'a> {
    pub dst: &'a mut [u8],
    pub dst_stride: usize,
    pub src: &'a [u8],
    pub src_stride: usize,
    pub mask: Option<(&'a [u8], usize)>,
    pub rows: usize,
    pub cols: usize,
    pub opacity: u8,
    pub op: CompositeOp,
    pub layout: Layout,
    pub targets: Targets,
}

/// Run `job.op` over the rectangle with channel type `K`.
#[inline(always)]
pub(crate) fn composite<K: Channel>(mut job: BlitJob<'_>) {
    let t = job.targets;
    match job.op {
        CompositeOp::Over => channelwise::<K>(&mut job, t, |s, _| s),
        CompositeOp::Multiply => channelwise::<K>(&mut job, t, K::mul_frac),
        CompositeOp::Screen => channelwise::<K>(&mut job, t, K::screen),
        CompositeOp::Divide => channelwise::<K>(&mut job, t, K::divide),
        CompositeOp::Overlay => channelwise::<K>(&mut job, t, K::overlay),
        CompositeOp::Dodge => channelwise::<K>(&mut job, t, K::dodge),
        CompositeOp::Burn => channelwise::<K>(&mut job, t, K::burn),
        CompositeOp::Darken => channelwise::<K>(&mut job, t, K::darken),
        CompositeOp::Lighten => channelwise::<K>(&mut job, t, K::lighten),
        CompositeOp::Add => channelwise::<K>(&mut job, t, K::add_sat),
        CompositeOp::Subtract => channelwise::<K>(&mut job, t, K::subtract),
        CompositeOp::Difference => channelwise::<K>(&mut job, t, K::difference),
        CompositeOp::Hue => rgbwise::<K>(&mut job, t, hsv::hue),
        CompositeOp::Saturation => rgbwise::<K>(&mut job, t, hsv::saturation),
        CompositeOp::Value => rgbwise::<K>(&mut job, t, hsv::value),
        CompositeOp::Color => rgbwise::<K>(&mut job, t, hsv::color),
        CompositeOp::Erase => erase::<K>(&mut job),
        CompositeOp::Copy => copy::<K>(&mut job),
        CompositeOp::Clear => clear::<K>(&mut job),
        CompositeOp::NoComposition | CompositeOp::Undefined => {}
    }
}

// ===========================================================================
// Walker
// ===========================================================================

/// Shared alpha prologue. Calls `apply(src_px, dst_px, src_blend)` for every
/// pixel that is not skipped.
#[inline(always)]
fn walk<K: Channel>(job: &mut BlitJob<'_>, mut apply: impl FnMut(&[u8], &mut [u8], K)) {
    let ps = job.layout.pixel_size;
    let alpha = job.layout.alpha_offset;
    let write_alpha = job.targets.write_alpha;
    let opacity = K::from_u8(job.opacity);
    let row_bytes = job.cols * ps;

    for y in 0..job.rows {
        let src_row = &job.src[y * job.src_stride..][..row_bytes];
        let dst_row = &mut job.dst[y * job.dst_stride..][..row_bytes];
        let mask_row = job.mask.map(|(m, stride)| &m[y * stride..][..job.cols]);

        for (x, (s, d)) in src_row
            .chunks_exact(ps)
            .zip(dst_row.chunks_exact_mut(ps))
            .enumerate()
        {
            let mut src_alpha = match alpha {
                Some(a) => K::read(&s[a..]),
                None => K::MAX,
            };
            if let Some(m) = mask_row {
                src_alpha = src_alpha.mul_frac(K::from_u8(m[x]));
            }
            if src_alpha.is_transparent() {
                continue;
            }
            if !opacity.is_opaque() {
                src_alpha = src_alpha.mul_frac(opacity);
            }

            let src_blend = match alpha {
                Some(a) => {
                    let dst_alpha = K::read(&d[a..]);
                    if dst_alpha.is_opaque() {
                        src_alpha
                    } else {
                        let new_alpha =
                            K::add_sat(dst_alpha, dst_alpha.invert().mul_frac(src_alpha));
                        if write_alpha {
                            new_alpha.write(&mut d[a..]);
                        }
                        if new_alpha.is_transparent() {
                            src_alpha
                        } else {
                            src_alpha.div_frac(new_alpha)
                        }
                    }
                }
                None => src_alpha,
            };

            apply(s, d, src_blend);
        }
    }
}

#[inline(always)]
fn channelwise<K: Channel>(job: &mut BlitJob<'_>, t: Targets, f: impl Fn(K, K) -> K) {
    walk::<K>(job, |s, d, w| {
        for &off in t.color() {
            let sv = K::read(&s[off..]);
            let dv = K::read(&d[off..]);
            K::blend(f(sv, dv), dv, w).write(&mut d[off..]);
        }
    });
}

#[inline(always)]
fn rgbwise<K: Channel>(job: &mut BlitJob<'_>, t: Targets, f: fn([f32; 3], [f32; 3]) -> [f32; 3]) {
    let Some(rgb) = t.rgb else {
        return;
    };
    let selected = rgb.map(|off| t.color().contains(&off));
    walk::<K>(job, |s, d, w| {
        let sv = rgb.map(|off| K::read(&s[off..]).to_f32());
        let dv = rgb.map(|off| K::read(&d[off..]).to_f32());
        let out = f(sv, dv);
        for i in 0..3 {
            if selected[i] {
                let off = rgb[i];
                let dk = K::read(&d[off..]);
                K::blend(K::from_f32(out[i]), dk, w).write(&mut d[off..]);
            }
        }
    });
}

// ===========================================================================
// Special-cased operators
// ===========================================================================

/// Destination alpha scaled by source alpha. The mask pulls the source alpha
/// toward opaque, so a zero mask leaves the destination as is. Opacity is
/// ignored.
#[inline(always)]
fn erase<K: Channel>(job: &mut BlitJob<'_>) {
    let Some(a) = job.layout.alpha_offset else {
        return;
    };
    if !job.targets.write_alpha {
        return;
    }
    let ps = job.layout.pixel_size;
    let row_bytes = job.cols * ps;

    for y in 0..job.rows {
        let src_row = &job.src[y * job.src_stride..][..row_bytes];
        let dst_row = &mut job.dst[y * job.dst_stride..][..row_bytes];
        let mask_row = job.mask.map(|(m, stride)| &m[y * stride..][..job.cols]);

        for (x, (s, d)) in src_row
            .chunks_exact(ps)
            .zip(dst_row.chunks_exact_mut(ps))
            .enumerate()
        {
            let mut src_alpha = K::read(&s[a..]);
            if let Some(m) = mask_row {
                src_alpha = K::blend(src_alpha, K::MAX, K::from_u8(m[x]));
            }
            let dst_alpha = K::read(&d[a..]);
            src_alpha.mul_frac(dst_alpha).write(&mut d[a..]);
        }
    }
}

/// Straight byte copy of the selected channels.
#[inline(always)]
fn copy<K: Channel>(job: &mut BlitJob<'_>) {
    let ps = job.layout.pixel_size;
    let row_bytes = job.cols * ps;
    let t = job.targets;
    let size = core::mem::size_of::<K>();

    for y in 0..job.rows {
        let src_row = &job.src[y * job.src_stride..][..row_bytes];
        let dst_row = &mut job.dst[y * job.dst_stride..][..row_bytes];
        if t.all {
            dst_row.copy_from_slice(src_row);
            continue;
        }
        for (s, d) in src_row.chunks_exact(ps).zip(dst_row.chunks_exact_mut(ps)) {
            for &off in t.color() {
                d[off..off + size].copy_from_slice(&s[off..off + size]);
            }
            if let (true, Some(a)) = (t.write_alpha, job.layout.alpha_offset) {
                d[a..a + size].copy_from_slice(&s[a..a + size]);
            }
        }
    }
}

/// Zero the selected channels of every destination pixel.
#[inline(always)]
fn clear<K: Channel>(job: &mut BlitJob<'_>) {
    let ps = job.layout.pixel_size;
    let row_bytes = job.cols * ps;
    let t = job.targets;

    for y in 0..job.rows {
        let dst_row = &mut job.dst[y * job.dst_stride..][..row_bytes];
        if t.all {
            dst_row.fill(0);
            continue;
        }
        for d in dst_row.chunks_exact_mut(ps) {
            for &off in t.color() {
                K::ZERO.write(&mut d[off..]);
            }
            if let (true, Some(a)) = (t.write_alpha, job.layout.alpha_offset) {
                K::ZERO.write(&mut d[a..]);
            }
        }
    }
}

// ===========================================================================
// HSV / HSL component swaps
// ===========================================================================

mod hsv {
    fn max3(v: [f32; 3]) -> f32 {
        v[0].max(v[1]).max(v[2])
    }

    fn min3(v: [f32; 3]) -> f32 {
        v[0].min(v[1]).min(v[2])
    }

    /// Hue in 0..6, 0 for greys.
    fn hue_of(v: [f32; 3], max: f32, delta: f32) -> f32 {
        if delta <= 0.0 {
            0.0
        } else if max == v[0] {
            let h = (v[1] - v[2]) / delta;
            if h < 0.0 { h + 6.0 } else { h }
        } else if max == v[1] {
            (v[2] - v[0]) / delta + 2.0
        } else {
            (v[0] - v[1]) / delta + 4.0
        }
    }

    fn to_hsv(v: [f32; 3]) -> [f32; 3] {
        let max = max3(v);
        let delta = max - min3(v);
        let s = if max > 0.0 { delta / max } else { 0.0 };
        [hue_of(v, max, delta), s, max]
    }

    /// Chroma, hue (0..6) and an offset added to every component.
    fn from_chroma(c: f32, h: f32, m: f32) -> [f32; 3] {
        let x = c * (1.0 - libm::fabsf((h % 2.0) - 1.0));
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        [r + m, g + m, b + m]
    }

    fn from_hsv([h, s, v]: [f32; 3]) -> [f32; 3] {
        let c = v * s;
        from_chroma(c, h, v - c)
    }

    fn to_hsl(v: [f32; 3]) -> [f32; 3] {
        let max = max3(v);
        let min = min3(v);
        let delta = max - min;
        let l = (max + min) / 2.0;
        let s = if delta <= 0.0 {
            0.0
        } else {
            delta / (1.0 - libm::fabsf(2.0 * l - 1.0))
        };
        [hue_of(v, max, delta), s, l]
    }

    fn from_hsl([h, s, l]: [f32; 3]) -> [f32; 3] {
        let c = (1.0 - libm::fabsf(2.0 * l - 1.0)) * s;
        from_chroma(c, h, l - c / 2.0)
    }

    pub(super) fn hue(s: [f32; 3], d: [f32; 3]) -> [f32; 3] {
        let (src, dst) = (to_hsv(s), to_hsv(d));
        from_hsv([src[0], dst[1], dst[2]])
    }

    pub(super) fn saturation(s: [f32; 3], d: [f32; 3]) -> [f32; 3] {
        let (src, dst) = (to_hsv(s), to_hsv(d));
        from_hsv([dst[0], src[1], dst[2]])
    }

    pub(super) fn value(s: [f32; 3], d: [f32; 3]) -> [f32; 3] {
        let (src, dst) = (to_hsv(s), to_hsv(d));
        from_hsv([dst[0], dst[1], src[2]])
    }

    pub(super) fn color(s: [f32; 3], d: [f32; 3]) -> [f32; 3] {
        let (src, dst) = (to_hsl(s), to_hsl(d));
        from_hsl([src[0], src[1], dst[2]])
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn close(a: [f32; 3], b: [f32; 3]) -> bool {
            a.iter().zip(b).all(|(x, y)| libm::fabsf(x - y) < 1e-5)
        }

        #[test]
        fn hsv_round_trip() {
            for v in [[1.0, 0.0, 0.0], [0.2, 0.4, 0.6], [0.9, 0.9, 0.1], [0.5, 0.5, 0.5]] {
                assert!(close(from_hsv(to_hsv(v)), v), "{v:?}");
                assert!(close(from_hsl(to_hsl(v)), v), "{v:?}");
            }
        }

        #[test]
        fn hue_takes_source_hue() {
            let out = hue([0.0, 0.0, 1.0], [1.0, 0.0, 0.0]);
            assert!(close(out, [0.0, 0.0, 1.0]));
        }

        #[test]
        fn value_takes_source_brightness() {
            let out = value([0.5, 0.5, 0.5], [1.0, 0.0, 0.0]);
            assert!(close(out, [0.5, 0.0, 0.0]));
        }
    }
}
