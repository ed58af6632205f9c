//! Error types.
//!
//! Geometry problems are reported once, at the entry point of a call.
//! Per-pixel conditions never produce errors.

/// Buffer geometry rejected before any pixel was touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum BufferError {
    /// Buffer length is empty or not a multiple of the pixel size.
    #[error("buffer length is not a multiple of the pixel size")]
    NotPixelAligned,
    /// Stride is smaller than one row, or the buffer is too short for the rows requested.
    #[error("stride or buffer length does not cover the requested rows")]
    InvalidStride,
    /// Destination holds fewer pixels than the operation writes.
    #[error("destination is smaller than the pixel count requested")]
    PixelCountMismatch,
    /// Mask buffer does not cover `rows × cols` bytes at its stride.
    #[error("mask does not cover the requested rectangle")]
    MaskTooSmall,
    /// A typed pixel's size differs from the colorspace pixel size.
    #[error("pixel type size does not match the colorspace pixel size")]
    PixelSizeMismatch,
    /// Source and destination rectangles differ in width or height.
    #[error("source and destination dimensions differ")]
    DimensionMismatch,
}

/// Invalid convolution kernel construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum KernelError {
    #[error("kernel has zero width or height")]
    Empty,
    #[error("kernel dimensions {width}x{height} must both be odd")]
    EvenDimensions { width: usize, height: usize },
    #[error("kernel expects {expected} weights, got {actual}")]
    ElementCount { expected: usize, actual: usize },
    #[error("kernel weight, factor or offset is not finite")]
    NonFiniteWeight,
}

/// Invalid pixel format description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum FormatError {
    #[error("pixel format has no channels")]
    NoChannels,
    #[error("pixel format has more than {max} channels")]
    TooManyChannels { max: usize },
    #[error("all channels of a pixel format must share one numeric kind")]
    MixedNumericKinds,
    #[error("pixel format declares more than one alpha channel")]
    MultipleAlpha,
    #[error("channel {index} overlaps another channel")]
    ChannelOverlap { index: usize },
    #[error("channel {index} element size does not match its numeric kind")]
    ElementSizeMismatch { index: usize },
    #[error("color model needs {needed} color channels, format has {found}")]
    ModelMismatch { needed: usize, found: usize },
    #[error("composite op `{op}` needs an RGB color model")]
    OpNeedsRgb { op: crate::op::CompositeOp },
}

/// Colorspace registration failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum RegistryError {
    #[error("colorspace `{id}` is already registered")]
    Duplicate { id: &'static str },
}

/// Returned by strict parsing of a composite operator id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown composite operator `{0}`")]
pub struct UnknownCompositeOp(pub alloc::string::String);
