//! The built-in colorspaces.

use super::{ColorModel, Colorspace};
use crate::format::{ChannelInfo, NumericKind, PixelFormat};
use crate::op::CompositeOp;

const RED: [u8; 3] = [255, 0, 0];
const GREEN: [u8; 3] = [0, 255, 0];
const BLUE: [u8; 3] = [0, 0, 255];
const GRAY: [u8; 3] = [128, 128, 128];

const BASE_OPS: &[CompositeOp] = &[
    CompositeOp::Over,
    CompositeOp::Copy,
    CompositeOp::Erase,
    CompositeOp::Clear,
    CompositeOp::Multiply,
    CompositeOp::Screen,
    CompositeOp::Divide,
    CompositeOp::Overlay,
    CompositeOp::Dodge,
    CompositeOp::Burn,
    CompositeOp::Darken,
    CompositeOp::Lighten,
    CompositeOp::Add,
    CompositeOp::Subtract,
    CompositeOp::Difference,
];

const RGB_OPS: &[CompositeOp] = &[
    CompositeOp::Over,
    CompositeOp::Copy,
    CompositeOp::Erase,
    CompositeOp::Clear,
    CompositeOp::Multiply,
    CompositeOp::Screen,
    CompositeOp::Divide,
    CompositeOp::Overlay,
    CompositeOp::Dodge,
    CompositeOp::Burn,
    CompositeOp::Darken,
    CompositeOp::Lighten,
    CompositeOp::Add,
    CompositeOp::Subtract,
    CompositeOp::Difference,
    CompositeOp::Hue,
    CompositeOp::Saturation,
    CompositeOp::Value,
    CompositeOp::Color,
];

const MASK_OPS: &[CompositeOp] = &[
    CompositeOp::Over,
    CompositeOp::Copy,
    CompositeOp::Erase,
    CompositeOp::Clear,
    CompositeOp::Darken,
    CompositeOp::Lighten,
];

// ---------------------------------------------------------------------------
// Channel tables. Descriptor order is the serialized order.
// ---------------------------------------------------------------------------

const RGBA8_CHANNELS: [ChannelInfo; 4] = [
    ChannelInfo::color("Red", 2, NumericKind::U8, RED),
    ChannelInfo::color("Green", 1, NumericKind::U8, GREEN),
    ChannelInfo::color("Blue", 0, NumericKind::U8, BLUE),
    ChannelInfo::alpha("Alpha", 3, NumericKind::U8),
];

const RGBA16_CHANNELS: [ChannelInfo; 4] = [
    ChannelInfo::color("Red", 0, NumericKind::U16, RED),
    ChannelInfo::color("Green", 2, NumericKind::U16, GREEN),
    ChannelInfo::color("Blue", 4, NumericKind::U16, BLUE),
    ChannelInfo::alpha("Alpha", 6, NumericKind::U16),
];

const RGBAF32_CHANNELS: [ChannelInfo; 4] = [
    ChannelInfo::color("Red", 0, NumericKind::F32, RED),
    ChannelInfo::color("Green", 4, NumericKind::F32, GREEN),
    ChannelInfo::color("Blue", 8, NumericKind::F32, BLUE),
    ChannelInfo::alpha("Alpha", 12, NumericKind::F32),
];

const GRAYA8_CHANNELS: [ChannelInfo; 2] = [
    ChannelInfo::color("Gray", 0, NumericKind::U8, GRAY),
    ChannelInfo::alpha("Alpha", 1, NumericKind::U8),
];

const CMYKA16_CHANNELS: [ChannelInfo; 5] = [
    ChannelInfo::color("Cyan", 0, NumericKind::U16, [0, 255, 255]),
    ChannelInfo::color("Magenta", 2, NumericKind::U16, [255, 0, 255]),
    ChannelInfo::color("Yellow", 4, NumericKind::U16, [255, 255, 0]),
    ChannelInfo::color("Black", 6, NumericKind::U16, [0, 0, 0]),
    ChannelInfo::alpha("Alpha", 8, NumericKind::U16),
];

const LMSAF32_CHANNELS: [ChannelInfo; 4] = [
    ChannelInfo::color("Long", 0, NumericKind::F32, RED),
    ChannelInfo::color("Middle", 4, NumericKind::F32, GREEN),
    ChannelInfo::color("Short", 8, NumericKind::F32, BLUE),
    ChannelInfo::alpha("Alpha", 12, NumericKind::F32),
];

const ALPHA8_CHANNELS: [ChannelInfo; 1] = [ChannelInfo::alpha("Alpha", 0, NumericKind::U8)];

// ---------------------------------------------------------------------------
// Colorspaces
// ---------------------------------------------------------------------------

/// 8-bit RGBA, stored B, G, R, A in memory.
pub static RGBA8: Colorspace = Colorspace::from_static(
    "RGBA",
    "RGB/Alpha (8-bit integer/channel)",
    ColorModel::Rgb,
    PixelFormat::from_static(&RGBA8_CHANNELS),
    RGB_OPS,
);

pub static RGBA16: Colorspace = Colorspace::from_static(
    "RGBA16",
    "RGB/Alpha (16-bit integer/channel)",
    ColorModel::Rgb,
    PixelFormat::from_static(&RGBA16_CHANNELS),
    RGB_OPS,
);

pub static RGBAF32: Colorspace = Colorspace::from_static(
    "RGBAF32",
    "RGB/Alpha (32-bit float/channel)",
    ColorModel::Rgb,
    PixelFormat::from_static(&RGBAF32_CHANNELS),
    RGB_OPS,
);

pub static GRAYA8: Colorspace = Colorspace::from_static(
    "GRAYA",
    "Grayscale/Alpha (8-bit integer/channel)",
    ColorModel::Gray,
    PixelFormat::from_static(&GRAYA8_CHANNELS),
    BASE_OPS,
);

pub static CMYKA16: Colorspace = Colorspace::from_static(
    "CMYKA16",
    "CMYK/Alpha (16-bit integer/channel)",
    ColorModel::Cmyk,
    PixelFormat::from_static(&CMYKA16_CHANNELS),
    BASE_OPS,
);

pub static LMSAF32: Colorspace = Colorspace::from_static(
    "LMSAF32",
    "LMS/Alpha (32-bit float/channel)",
    ColorModel::Lms,
    PixelFormat::from_static(&LMSAF32_CHANNELS),
    BASE_OPS,
);

/// Single 8-bit alpha channel, used for selection masks.
pub static ALPHA8: Colorspace = Colorspace::from_static(
    "ALPHA",
    "Alpha mask (8-bit integer)",
    ColorModel::Alpha,
    PixelFormat::from_static(&ALPHA8_CHANNELS),
    MASK_OPS,
);

/// Every built-in colorspace, in registration order.
pub fn all() -> [&'static Colorspace; 7] {
    [&RGBA8, &RGBA16, &RGBAF32, &GRAYA8, &CMYKA16, &LMSAF32, &ALPHA8]
}
