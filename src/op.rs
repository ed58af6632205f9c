//! The catalog of compositing operators.

use core::fmt;
use core::str::FromStr;

use crate::error::UnknownCompositeOp;

/// A named blend algorithm.
///
/// Every variant has a stable string id, used when operators are stored in
/// documents or picked by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CompositeOp {
    /// Source-over alpha compositing.
    Over,
    /// Straight copy of source bytes.
    Copy,
    Multiply,
    Screen,
    Divide,
    Overlay,
    Dodge,
    Burn,
    Darken,
    Lighten,
    /// Scales destination alpha by source alpha; color is untouched.
    Erase,
    Add,
    Subtract,
    Difference,
    Hue,
    Saturation,
    Value,
    Color,
    /// Zero every destination pixel in the rectangle.
    Clear,
    /// Explicit no-op.
    NoComposition,
    /// Unknown operator; blits with it leave buffers unchanged.
    Undefined,
}

impl CompositeOp {
    /// Every operator, in catalog order.
    pub const ALL: &'static [CompositeOp] = &[
        CompositeOp::Over,
        CompositeOp::Copy,
        CompositeOp::Multiply,
        CompositeOp::Screen,
        CompositeOp::Divide,
        CompositeOp::Overlay,
        CompositeOp::Dodge,
        CompositeOp::Burn,
        CompositeOp::Darken,
        CompositeOp::Lighten,
        CompositeOp::Erase,
        CompositeOp::Add,
        CompositeOp::Subtract,
        CompositeOp::Difference,
        CompositeOp::Hue,
        CompositeOp::Saturation,
        CompositeOp::Value,
        CompositeOp::Color,
        CompositeOp::Clear,
        CompositeOp::NoComposition,
        CompositeOp::Undefined,
    ];

    pub const fn id(self) -> &'static str {
        match self {
            CompositeOp::Over => "normal",
            CompositeOp::Copy => "copy",
            CompositeOp::Multiply => "multiply",
            CompositeOp::Screen => "screen",
            CompositeOp::Divide => "divide",
            CompositeOp::Overlay => "overlay",
            CompositeOp::Dodge => "dodge",
            CompositeOp::Burn => "burn",
            CompositeOp::Darken => "darken",
            CompositeOp::Lighten => "lighten",
            CompositeOp::Erase => "erase",
            CompositeOp::Add => "add",
            CompositeOp::Subtract => "subtract",
            CompositeOp::Difference => "diff",
            CompositeOp::Hue => "hue",
            CompositeOp::Saturation => "saturation",
            CompositeOp::Value => "value",
            CompositeOp::Color => "color",
            CompositeOp::Clear => "clear",
            CompositeOp::NoComposition => "nocomposition",
            CompositeOp::Undefined => "undefined",
        }
    }

    /// Look up an operator by id, mapping anything unknown to [`Undefined`](Self::Undefined).
    pub fn from_id(id: &str) -> Self {
        id.parse().unwrap_or(CompositeOp::Undefined)
    }

    /// Operators that need red, green and blue channels.
    pub const fn needs_rgb(self) -> bool {
        matches!(
            self,
            CompositeOp::Hue | CompositeOp::Saturation | CompositeOp::Value | CompositeOp::Color
        )
    }

    /// Operators that never modify a buffer.
    pub const fn is_noop(self) -> bool {
        matches!(self, CompositeOp::NoComposition | CompositeOp::Undefined)
    }
}

impl fmt::Display for CompositeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for CompositeOp {
    type Err = UnknownCompositeOp;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CompositeOp::ALL
            .iter()
            .copied()
            .find(|op| op.id() == s)
            .ok_or_else(|| UnknownCompositeOp(s.into()))
    }
}
