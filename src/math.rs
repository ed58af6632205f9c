//! Channel arithmetic shared by every colorspace.
//!
//! A [`Channel`] is one scalar component stored natively as `u8`, `u16` or
//! `f32`. Integer kinds treat their maximum as 1.0 and do fixed-point fraction
//! math in a wide integer domain; `f32` uses real arithmetic on 0.0..=1.0.
//!
//! Rounding is round-half-up everywhere, and every result saturates at the
//! domain boundary instead of wrapping.
//!
//! ```rust
//! use impasto::math::Channel;
//!
//! assert_eq!(u8::blend(200, 10, 0), 10);
//! assert_eq!(u8::blend(200, 10, 255), 200);
//! assert_eq!(255u8.mul_frac(128), 128);
//! assert_eq!(0xABu8.to_u16(), 0xABAB);
//! ```

use crate::format::NumericKind;

/// Tolerance used by float channels for "transparent", "opaque" and safe division.
pub const EPSILON: f32 = 1e-6;

/// One channel value in its native numeric domain.
pub trait Channel: Copy + PartialOrd + bytemuck::Pod + core::fmt::Debug + 'static {
    const KIND: NumericKind;
    /// Fully transparent / black.
    const ZERO: Self;
    /// Fully opaque / full intensity.
    const MAX: Self;

    /// Read one value from the start of `bytes` (any alignment).
    #[inline(always)]
    fn read(bytes: &[u8]) -> Self {
        bytemuck::pod_read_unaligned(&bytes[..core::mem::size_of::<Self>()])
    }

    /// Write this value to the start of `bytes` (any alignment).
    #[inline(always)]
    fn write(self, bytes: &mut [u8]) {
        bytes[..core::mem::size_of::<Self>()].copy_from_slice(bytemuck::bytes_of(&self));
    }

    fn to_u8(self) -> u8;
    fn to_u16(self) -> u16;
    /// Normalized to 0.0..=1.0.
    fn to_f32(self) -> f32;
    fn from_u8(v: u8) -> Self;
    fn from_u16(v: u16) -> Self;
    /// From a normalized value. Out-of-range input saturates, NaN maps to zero.
    fn from_f32(v: f32) -> Self;

    /// The value in native units, widened for accumulation.
    fn to_wide(self) -> f64;
    /// Round half up and clamp a native-unit value back into range.
    fn from_wide(v: f64) -> Self;

    /// `a * b / max`, rounded.
    fn mul_frac(self, b: Self) -> Self;
    /// `a * max / b`, rounded and saturated. A zero divisor saturates to max.
    fn div_frac(self, b: Self) -> Self;
    /// `a * w + b * (max - w)`, exact at both ends of `w`.
    fn blend(a: Self, b: Self, w: Self) -> Self;
    fn invert(self) -> Self;

    fn is_transparent(self) -> bool;
    fn is_opaque(self) -> bool;

    // Per-channel blend-mode formulas, `s` = source, `d` = destination.

    fn screen(s: Self, d: Self) -> Self;
    fn divide(s: Self, d: Self) -> Self;
    fn overlay(s: Self, d: Self) -> Self;
    fn dodge(s: Self, d: Self) -> Self;
    fn burn(s: Self, d: Self) -> Self;
    fn add_sat(s: Self, d: Self) -> Self;
    /// `d - s`, saturated at zero.
    fn subtract(s: Self, d: Self) -> Self;
    fn difference(s: Self, d: Self) -> Self;

    #[inline(always)]
    fn darken(s: Self, d: Self) -> Self {
        if s < d { s } else { d }
    }

    #[inline(always)]
    fn lighten(s: Self, d: Self) -> Self {
        if s > d { s } else { d }
    }
}

/// Convert a value between any two channel kinds.
#[inline]
pub fn convert<A: Channel, B: Channel>(v: A) -> B {
    match A::KIND {
        NumericKind::U8 => B::from_u8(v.to_u8()),
        NumericKind::U16 => B::from_u16(v.to_u16()),
        NumericKind::F32 => B::from_f32(v.to_f32()),
    }
}

#[inline(always)]
fn round_half_up(v: f64) -> f64 {
    libm::floor(v + 0.5)
}

// ===========================================================================
// Integer kinds
// ===========================================================================

macro_rules! int_channel {
    ($t:ty, $kind:expr) => {
        impl Channel for $t {
            const KIND: NumericKind = $kind;
            const ZERO: Self = 0;
            const MAX: Self = <$t>::MAX;

            #[inline(always)]
            fn to_u8(self) -> u8 {
                const M: u32 = <$t>::MAX as u32;
                ((self as u32 * 255 + M / 2) / M) as u8
            }
            #[inline(always)]
            fn to_u16(self) -> u16 {
                const M: u32 = <$t>::MAX as u32;
                ((self as u32 * 65535 + M / 2) / M) as u16
            }
            #[inline(always)]
            fn to_f32(self) -> f32 {
                self as f32 / <$t>::MAX as f32
            }
            #[inline(always)]
            fn from_u8(v: u8) -> Self {
                (v as u32 * (<$t>::MAX as u32 / 255)) as $t
            }
            #[inline(always)]
            fn from_u16(v: u16) -> Self {
                const M: u32 = <$t>::MAX as u32;
                ((v as u32 * M + 32767) / 65535) as $t
            }
            #[inline(always)]
            fn from_f32(v: f32) -> Self {
                let v = v.clamp(0.0, 1.0);
                // NaN survives clamp; the saturating cast maps it to 0.
                libm::floorf(v * <$t>::MAX as f32 + 0.5) as $t
            }

            #[inline(always)]
            fn to_wide(self) -> f64 {
                self as f64
            }
            #[inline(always)]
            fn from_wide(v: f64) -> Self {
                round_half_up(v).clamp(0.0, <$t>::MAX as f64) as $t
            }

            #[inline(always)]
            fn mul_frac(self, b: Self) -> Self {
                const M: i64 = <$t>::MAX as i64;
                ((2 * self as i64 * b as i64 + M) / (2 * M)) as $t
            }
            #[inline(always)]
            fn div_frac(self, b: Self) -> Self {
                const M: i64 = <$t>::MAX as i64;
                if b == 0 {
                    return <$t>::MAX;
                }
                let b = b as i64;
                ((self as i64 * M + b / 2) / b).min(M) as $t
            }
            #[inline(always)]
            fn blend(a: Self, b: Self, w: Self) -> Self {
                const M: i64 = <$t>::MAX as i64;
                let w = w as i64;
                ((a as i64 * w + b as i64 * (M - w) + M / 2) / M) as $t
            }
            #[inline(always)]
            fn invert(self) -> Self {
                <$t>::MAX - self
            }

            #[inline(always)]
            fn is_transparent(self) -> bool {
                self == 0
            }
            #[inline(always)]
            fn is_opaque(self) -> bool {
                self == <$t>::MAX
            }

            #[inline(always)]
            fn screen(s: Self, d: Self) -> Self {
                <$t>::MAX - (<$t>::MAX - s).mul_frac(<$t>::MAX - d)
            }
            #[inline(always)]
            fn divide(s: Self, d: Self) -> Self {
                const M: i64 = <$t>::MAX as i64;
                let (s, d) = (s as i64, d as i64);
                ((d * (M + 1) + s / 2) / (1 + s)).min(M) as $t
            }
            #[inline(always)]
            fn overlay(s: Self, d: Self) -> Self {
                const M: i64 = <$t>::MAX as i64;
                let d = d as i64;
                let inner = d + 2 * s.mul_frac(<$t>::MAX - d as $t) as i64;
                ((2 * d * inner + M) / (2 * M)).min(M) as $t
            }
            #[inline(always)]
            fn dodge(s: Self, d: Self) -> Self {
                const M: i64 = <$t>::MAX as i64;
                let (s, d) = (s as i64, d as i64);
                (d * (M + 1) / (M + 1 - s)).min(M) as $t
            }
            #[inline(always)]
            fn burn(s: Self, d: Self) -> Self {
                const M: i64 = <$t>::MAX as i64;
                let (s, d) = (s as i64, d as i64);
                let r = ((M - d) * (M + 1) / (s + 1)).min(M);
                if r > M - r { M as $t } else { r as $t }
            }
            #[inline(always)]
            fn add_sat(s: Self, d: Self) -> Self {
                s.saturating_add(d)
            }
            #[inline(always)]
            fn subtract(s: Self, d: Self) -> Self {
                d.saturating_sub(s)
            }
            #[inline(always)]
            fn difference(s: Self, d: Self) -> Self {
                s.abs_diff(d)
            }
        }
    };
}

int_channel!(u8, NumericKind::U8);
int_channel!(u16, NumericKind::U16);

// ===========================================================================
// Float kind
// ===========================================================================

impl Channel for f32 {
    const KIND: NumericKind = NumericKind::F32;
    const ZERO: Self = 0.0;
    const MAX: Self = 1.0;

    #[inline(always)]
    fn to_u8(self) -> u8 {
        libm::floorf(self.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
    }
    #[inline(always)]
    fn to_u16(self) -> u16 {
        libm::floorf(self.clamp(0.0, 1.0) * 65535.0 + 0.5) as u16
    }
    #[inline(always)]
    fn to_f32(self) -> f32 {
        self
    }
    #[inline(always)]
    fn from_u8(v: u8) -> Self {
        v as f32 / 255.0
    }
    #[inline(always)]
    fn from_u16(v: u16) -> Self {
        v as f32 / 65535.0
    }
    #[inline(always)]
    fn from_f32(v: f32) -> Self {
        if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
    }

    #[inline(always)]
    fn to_wide(self) -> f64 {
        self as f64
    }
    #[inline(always)]
    fn from_wide(v: f64) -> Self {
        if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) as f32 }
    }

    #[inline(always)]
    fn mul_frac(self, b: Self) -> Self {
        self * b
    }
    #[inline(always)]
    fn div_frac(self, b: Self) -> Self {
        if b > EPSILON { (self / b).min(1.0) } else { 1.0 }
    }
    #[inline(always)]
    fn blend(a: Self, b: Self, w: Self) -> Self {
        a * w + b * (1.0 - w)
    }
    #[inline(always)]
    fn invert(self) -> Self {
        1.0 - self
    }

    #[inline(always)]
    fn is_transparent(self) -> bool {
        self <= EPSILON
    }
    #[inline(always)]
    fn is_opaque(self) -> bool {
        self >= 1.0 - EPSILON
    }

    #[inline(always)]
    fn screen(s: Self, d: Self) -> Self {
        1.0 - (1.0 - s) * (1.0 - d)
    }
    #[inline(always)]
    fn divide(s: Self, d: Self) -> Self {
        (d / (s + EPSILON)).min(1.0)
    }
    #[inline(always)]
    fn overlay(s: Self, d: Self) -> Self {
        (d * (d + 2.0 * s * (1.0 - d))).min(1.0)
    }
    #[inline(always)]
    fn dodge(s: Self, d: Self) -> Self {
        (d / (1.0 + EPSILON - s)).min(1.0)
    }
    #[inline(always)]
    fn burn(s: Self, d: Self) -> Self {
        let r = ((1.0 - d) / (s + EPSILON)).min(1.0);
        if r > 1.0 - r { 1.0 } else { r }
    }
    #[inline(always)]
    fn add_sat(s: Self, d: Self) -> Self {
        (s + d).min(1.0)
    }
    #[inline(always)]
    fn subtract(s: Self, d: Self) -> Self {
        (d - s).max(0.0)
    }
    #[inline(always)]
    fn difference(s: Self, d: Self) -> Self {
        libm::fabsf(s - d)
    }
}
