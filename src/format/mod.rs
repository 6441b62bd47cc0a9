//! Pixel-format descriptors and bulk conversion.
//!
//! The descriptor is a value type answering byte-layout questions
//! (components, widths, offsets); [`Converter`] performs whole-buffer
//! format conversion. Colorimetry beyond channel names is out of scope.

mod convert;
mod descriptor;

pub use convert::{Converter, converter};
pub use descriptor::{Channels, ComponentType, PixelFormat};

pub(crate) use convert::{read_component, write_component};
