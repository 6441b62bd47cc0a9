use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{LumatileError, LumatileResult};

/// Channel layout of a pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channels {
    /// Single luminance channel.
    Y,
    /// Red, green, blue.
    Rgb,
    /// Blue, green, red.
    Bgr,
    /// Red, green, blue, alpha.
    Rgba,
    /// Blue, green, red, alpha.
    Bgra,
}

impl Channels {
    /// Number of components per pixel.
    pub const fn count(self) -> usize {
        match self {
            Channels::Y => 1,
            Channels::Rgb | Channels::Bgr => 3,
            Channels::Rgba | Channels::Bgra => 4,
        }
    }

    /// Canonical channel-layout name as used in format strings.
    pub const fn name(self) -> &'static str {
        match self {
            Channels::Y => "Y",
            Channels::Rgb => "RGB",
            Channels::Bgr => "BGR",
            Channels::Rgba => "RGBA",
            Channels::Bgra => "BGRA",
        }
    }
}

/// Storage type shared by every component of a pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentType {
    /// 8-bit unsigned.
    U8,
    /// 16-bit unsigned.
    U16,
    /// 24-bit unsigned, packed low-byte first.
    U24,
    /// 32-bit unsigned.
    U32,
    /// 64-bit unsigned.
    U64,
}

impl ComponentType {
    /// Width of one component in bytes.
    pub const fn width(self) -> usize {
        match self {
            ComponentType::U8 => 1,
            ComponentType::U16 => 2,
            ComponentType::U24 => 3,
            ComponentType::U32 => 4,
            ComponentType::U64 => 8,
        }
    }

    /// Canonical type name as used in format strings.
    pub const fn name(self) -> &'static str {
        match self {
            ComponentType::U8 => "u8",
            ComponentType::U16 => "u16",
            ComponentType::U24 => "u24",
            ComponentType::U32 => "u32",
            ComponentType::U64 => "u64",
        }
    }

    /// Largest value representable by this component type.
    pub const fn max_value(self) -> u64 {
        match self {
            ComponentType::U8 => u8::MAX as u64,
            ComponentType::U16 => u16::MAX as u64,
            ComponentType::U24 => 0x00FF_FFFF,
            ComponentType::U32 => u32::MAX as u64,
            ComponentType::U64 => u64::MAX,
        }
    }
}

/// Pixel-format descriptor: a channel layout stored with one component type.
///
/// This is the byte-layout capability the chain and frame modules query; it
/// deliberately knows nothing about colorimetry beyond channel names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelFormat {
    channels: Channels,
    component: ComponentType,
}

impl PixelFormat {
    /// Descriptor for the given channel layout and component type.
    pub const fn new(channels: Channels, component: ComponentType) -> Self {
        Self {
            channels,
            component,
        }
    }

    /// Channel layout.
    pub const fn channels(self) -> Channels {
        self.channels
    }

    /// Component storage type.
    pub const fn component(self) -> ComponentType {
        self.component
    }

    /// Components per pixel.
    pub const fn component_count(self) -> usize {
        self.channels.count()
    }

    /// Width of one component in bytes.
    pub const fn component_width(self) -> usize {
        self.component.width()
    }

    /// Name of the component type (`"u8"`, `"u16"`, ...).
    pub const fn component_type_name(self) -> &'static str {
        self.component.name()
    }

    /// Bytes occupied by one whole pixel.
    pub const fn bytes_per_pixel(self) -> usize {
        self.component_count() * self.component_width()
    }

    /// Bytes required for a buffer of `n_pixels` whole pixels.
    pub const fn buffer_size(self, n_pixels: usize) -> usize {
        n_pixels * self.bytes_per_pixel()
    }

    /// Byte offset of a linear component index, spanning pixel boundaries.
    ///
    /// Index `i` addresses component `i % component_count` of pixel
    /// `i / component_count`.
    pub const fn component_offset(self, index: usize) -> usize {
        let pixel = index / self.component_count();
        let comp = index % self.component_count();
        pixel * self.bytes_per_pixel() + comp * self.component_width()
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.channels.name(), self.component.name())
    }
}

impl FromStr for PixelFormat {
    type Err = LumatileError;

    fn from_str(s: &str) -> LumatileResult<Self> {
        let mut parts = s.split_whitespace();
        let (Some(ch), Some(ty), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(LumatileError::format(format!(
                "expected \"<channels> <type>\", got {s:?}"
            )));
        };
        let channels = match ch {
            "Y" => Channels::Y,
            "RGB" => Channels::Rgb,
            "BGR" => Channels::Bgr,
            "RGBA" => Channels::Rgba,
            "BGRA" => Channels::Bgra,
            other => {
                return Err(LumatileError::format(format!(
                    "unknown channel layout {other:?}"
                )));
            }
        };
        let component = match ty {
            "u8" => ComponentType::U8,
            "u16" => ComponentType::U16,
            "u24" => ComponentType::U24,
            "u32" => ComponentType::U32,
            "u64" => ComponentType::U64,
            other => {
                return Err(LumatileError::format(format!(
                    "unknown component type {other:?}"
                )));
            }
        };
        Ok(PixelFormat::new(channels, component))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/format/descriptor.rs"]
mod tests;
