//! # impasto
//!
//! *Pixels, layered thick.*
//!
//! The per-pixel core of a raster paint engine: channel layouts, blend
//! modes, color mixing and convolution over raw strided byte buffers, with
//! runtime SIMD dispatch for the hot row loops.
//!
//! ## Core pieces (always available)
//!
//! - [`PixelFormat`] describes where each channel of a pixel lives.
//! - [`Colorspace`] pairs a format with a color model and the
//!   [`CompositeOp`]s it supports. [`colorspace::builtin`] has the standard
//!   ones; [`ColorspaceRegistry`] looks them up by id.
//! - [`Colorspace::bit_blt`] composites rectangles with optional mask,
//!   global opacity and per-channel write selection.
//! - [`ConvolutionKernel`] and the generators in [`kernel`] build blur,
//!   edge and morphology kernels; a [`Convolver`] applies them.
//!
//! ```rust
//! use impasto::colorspace::builtin::RGBA8;
//! use impasto::{BlitOptions, CompositeOp};
//!
//! // Two BGRA pixels: multiply a grey source onto white.
//! let src = [128u8, 128, 128, 255, 128, 128, 128, 255];
//! let mut dst = [255u8; 8];
//! let opts = BlitOptions::new(CompositeOp::Multiply, 1, 2);
//! RGBA8.bit_blt(&mut dst, 8, &src, 8, None, &opts).unwrap();
//! assert_eq!(dst, [128, 128, 128, 255, 128, 128, 128, 255]);
//! ```
//!
//! ## Feature flags
//!
//! - **`std`** (default): runtime CPU feature detection.
//! - **`rgb`**: compositing on [`rgb`] crate pixel slices
//!   (`Bgra<u8>`, `Rgba<u16>`, `Rgba<f32>`, `GrayAlpha<u8>`) via bytemuck.
//! - **`imgref`**: whole-image blits and convolution on [`imgref`] types.
//!   Implies `rgb`.

#![no_std]
#![forbid(unsafe_code)]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

mod bytes;
mod composite;

pub mod colorspace;
pub mod convolve;
pub mod error;
pub mod format;
pub mod kernel;
pub mod math;
pub mod op;

pub use colorspace::{BlitMask, BlitOptions, ColorModel, Colorspace, ColorspaceRegistry};
pub use convolve::{BorderPolicy, Convolver, PixelBuf, PixelBufMut, Progress};
pub use error::{BufferError, FormatError, KernelError, RegistryError, UnknownCompositeOp};
pub use format::{
    ChannelFlags, ChannelInfo, ChannelRole, ChannelSelection, NumericKind, PixelFormat,
};
pub use kernel::{ConvolutionKernel, EdgeKind};
pub use op::CompositeOp;

#[cfg(feature = "rgb")]
pub mod typed;

#[cfg(feature = "imgref")]
pub mod img;
