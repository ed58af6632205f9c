//! Per-pixel operations, generic over the channel kind.
//!
//! Callers validate slice lengths; these loops index freely.

use super::ColorModel;
use crate::format::{ChannelFlags, Layout, MAX_CHANNELS, NumericKind};
use crate::math::{Channel, EPSILON};

#[inline(always)]
fn alpha_of<K: Channel>(layout: &Layout, px: &[u8]) -> K {
    match layout.alpha_offset {
        Some(a) => K::read(&px[a..]),
        None => K::MAX,
    }
}

/// Alpha-weighted average of `pixels`.
pub(super) fn mix<K: Channel>(layout: &Layout, pixels: &[&[u8]], weights: &[u8], dst: &mut [u8]) {
    let colors = layout.color_offsets();
    let mut totals = [0f64; MAX_CHANNELS];
    let mut total_alpha = 0f64;

    for (px, &w) in pixels.iter().zip(weights) {
        let alpha_times_weight = alpha_of::<K>(layout, px).mul_frac(K::from_u8(w)).to_wide();
        for (total, &off) in totals.iter_mut().zip(colors) {
            *total += K::read(&px[off..]).to_wide() * alpha_times_weight;
        }
        total_alpha += alpha_times_weight;
    }

    let transparent = match K::KIND {
        NumericKind::F32 => total_alpha <= EPSILON as f64,
        _ => total_alpha <= 0.0,
    };
    for (total, &off) in totals.iter().zip(colors) {
        let v = if transparent {
            K::ZERO
        } else {
            K::from_wide(total / total_alpha)
        };
        v.write(&mut dst[off..]);
    }
    if let Some(a) = layout.alpha_offset {
        K::from_wide(total_alpha).write(&mut dst[a..]);
    }
}

/// Weighted sum of `pixels`, `/ factor + offset`, clamped. `offset` is a
/// fraction of the channel range. A zero factor contributes nothing but the offset.
pub(crate) fn convolve<K: Channel>(
    layout: &Layout,
    pixels: &[&[u8]],
    weights: &[f64],
    flags: ChannelFlags,
    factor: f64,
    offset: f64,
    dst: &mut [u8],
) {
    let colors = layout.color_offsets();
    let mut totals = [0f64; MAX_CHANNELS];
    let mut total_alpha = 0f64;

    for (px, &w) in pixels.iter().zip(weights) {
        if w == 0.0 {
            continue;
        }
        for (total, &off) in totals.iter_mut().zip(colors) {
            *total += K::read(&px[off..]).to_wide() * w;
        }
        if let Some(a) = layout.alpha_offset {
            total_alpha += K::read(&px[a..]).to_wide() * w;
        }
    }

    let bias = offset * K::MAX.to_wide();
    let finish = |t: f64| {
        if factor == 0.0 {
            K::from_wide(bias)
        } else {
            K::from_wide(t / factor + bias)
        }
    };
    if flags.contains(ChannelFlags::COLOR) {
        for (&total, &off) in totals.iter().zip(colors) {
            finish(total).write(&mut dst[off..]);
        }
    }
    if let (true, Some(a)) = (flags.contains(ChannelFlags::ALPHA), layout.alpha_offset) {
        finish(total_alpha).write(&mut dst[a..]);
    }
}

pub(super) fn invert<K: Channel>(layout: &Layout, pixels: &mut [u8], count: usize) {
    for px in pixels.chunks_exact_mut(layout.pixel_size).take(count) {
        for &off in layout.color_offsets() {
            K::read(&px[off..]).invert().write(&mut px[off..]);
        }
    }
}

pub(super) fn channel_f32<K: Channel>(px: &[u8], offset: usize) -> f32 {
    K::read(&px[offset..]).to_f32()
}

pub(super) fn set_channel_f32<K: Channel>(px: &mut [u8], offset: usize, v: f32) {
    K::from_f32(v).write(&mut px[offset..]);
}

pub(super) fn opacity<K: Channel>(layout: &Layout, px: &[u8]) -> u8 {
    alpha_of::<K>(layout, px).to_u8()
}

pub(super) fn set_opacity<K: Channel>(layout: &Layout, pixels: &mut [u8], value: u8, count: usize) {
    let Some(a) = layout.alpha_offset else {
        return;
    };
    let v = K::from_u8(value);
    for px in pixels.chunks_exact_mut(layout.pixel_size).take(count) {
        v.write(&mut px[a..]);
    }
}

// ===========================================================================
// Color model conversions
// ===========================================================================

const RGB_TO_LMS: [[f32; 3]; 3] = [
    [0.3811, 0.5783, 0.0402],
    [0.1967, 0.7244, 0.0782],
    [0.0241, 0.1288, 0.8444],
];

const LMS_TO_RGB: [[f32; 3]; 3] = [
    [4.4679, -3.5873, 0.1193],
    [-1.2186, 2.3809, -0.1624],
    [0.0497, -0.2439, 1.2045],
];

fn apply3(m: &[[f32; 3]; 3], v: [f32; 3]) -> [f32; 3] {
    m.map(|row| row[0] * v[0] + row[1] * v[1] + row[2] * v[2])
}

/// Luma with the classic 30/59/11 weights, rounded.
pub(super) fn luma8(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 30 + g as u32 * 59 + b as u32 * 11 + 50) / 100) as u8
}

/// Straight (non-premultiplied) sRGB bytes in R, G, B, A order.
pub(super) fn to_rgba8<K: Channel>(model: ColorModel, layout: &Layout, px: &[u8]) -> [u8; 4] {
    let c = |i: usize| K::read(&px[layout.color_offset[i]..]);
    let a = alpha_of::<K>(layout, px).to_u8();
    match model {
        ColorModel::Rgb => [c(0).to_u8(), c(1).to_u8(), c(2).to_u8(), a],
        ColorModel::Gray => {
            let g = c(0).to_u8();
            [g, g, g, a]
        }
        ColorModel::Cmyk => {
            let k = 1.0 - c(3).to_f32();
            let rgb = [0, 1, 2].map(|i| ((1.0 - c(i).to_f32()) * k).to_u8());
            [rgb[0], rgb[1], rgb[2], a]
        }
        ColorModel::Lms => {
            let lms = [c(0).to_f32(), c(1).to_f32(), c(2).to_f32()];
            let rgb = apply3(&LMS_TO_RGB, lms).map(|v| v.to_u8());
            [rgb[0], rgb[1], rgb[2], a]
        }
        ColorModel::Alpha => [255, 255, 255, a],
    }
}

pub(super) fn from_rgba8<K: Channel>(model: ColorModel, layout: &Layout, rgba: [u8; 4], px: &mut [u8]) {
    let off = layout.color_offset;
    let [r, g, b, a] = rgba;
    match model {
        ColorModel::Rgb => {
            K::from_u8(r).write(&mut px[off[0]..]);
            K::from_u8(g).write(&mut px[off[1]..]);
            K::from_u8(b).write(&mut px[off[2]..]);
        }
        ColorModel::Gray => K::from_u8(luma8(r, g, b)).write(&mut px[off[0]..]),
        ColorModel::Cmyk => {
            let rgb = [r, g, b].map(f32::from_u8);
            let k = 1.0 - rgb[0].max(rgb[1]).max(rgb[2]);
            for i in 0..3 {
                let v = if k >= 1.0 { 0.0 } else { (1.0 - rgb[i] - k) / (1.0 - k) };
                K::from_f32(v).write(&mut px[off[i]..]);
            }
            K::from_f32(k).write(&mut px[off[3]..]);
        }
        ColorModel::Lms => {
            let lms = apply3(&RGB_TO_LMS, [r, g, b].map(f32::from_u8));
            for i in 0..3 {
                K::from_f32(lms[i]).write(&mut px[off[i]..]);
            }
        }
        ColorModel::Alpha => {}
    }
    if let Some(ao) = layout.alpha_offset {
        K::from_u8(a).write(&mut px[ao..]);
    }
}
