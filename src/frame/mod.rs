//! Independent 2D raster buffer in one pixel format.

use tracing::warn;

use crate::{
    foundation::error::{LumatileError, LumatileResult},
    format::PixelFormat,
};

/// Width × height raster of raw pixel bytes in a single format.
///
/// A frame is the source side of chain projection: chains cache byte
/// offsets into a frame and later copy samples out of it. The endianness
/// flag records the byte order of multi-byte components in the buffer.
#[derive(Clone, Debug)]
pub struct Frame {
    width: usize,
    height: usize,
    format: PixelFormat,
    buffer: Vec<u8>,
    big_endian: bool,
}

/// Whether the host stores multi-byte integers big-endian.
pub const fn host_big_endian() -> bool {
    cfg!(target_endian = "big")
}

impl Frame {
    /// Zero-initialized frame in host byte order.
    pub fn new(width: usize, height: usize, format: PixelFormat) -> LumatileResult<Self> {
        if width == 0 || height == 0 {
            return Err(LumatileError::validation(format!(
                "frame dimensions must be positive, got {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            format,
            buffer: vec![0; format.buffer_size(width * height)],
            big_endian: host_big_endian(),
        })
    }

    /// Frame over a caller-supplied buffer.
    ///
    /// The buffer must hold at least `width * height * bytes_per_pixel`
    /// bytes; `big_endian` declares the byte order of its components.
    pub fn with_buffer(
        width: usize,
        height: usize,
        format: PixelFormat,
        buffer: Vec<u8>,
        big_endian: bool,
    ) -> LumatileResult<Self> {
        let mut frame = Self::new(width, height, format)?;
        frame.set_buffer(buffer)?;
        frame.big_endian = big_endian;
        Ok(frame)
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel format of the buffer.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Bytes required by this frame's dimensions and format.
    pub fn required_size(&self) -> usize {
        self.format.buffer_size(self.width * self.height)
    }

    /// Raw pixel bytes.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Mutable raw pixel bytes.
    pub fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    /// Replace the pixel buffer, rejecting one smaller than required.
    pub fn set_buffer(&mut self, buffer: Vec<u8>) -> LumatileResult<()> {
        let need = self.required_size();
        if buffer.len() < need {
            return Err(LumatileError::validation(format!(
                "replacement buffer holds {} bytes, {need} required",
                buffer.len()
            )));
        }
        self.buffer = buffer;
        Ok(())
    }

    /// Whether multi-byte components are stored big-endian.
    pub fn is_big_endian(&self) -> bool {
        self.big_endian
    }

    /// Declare the byte order of the buffer without touching its contents.
    pub fn set_big_endian(&mut self, big_endian: bool) {
        self.big_endian = big_endian;
    }

    /// Byte-swap every component in place and flip the endianness flag.
    ///
    /// Only 2- and 4-byte components are swapped; other widths are left
    /// unmodified with a warning, and the flag keeps its old value.
    pub fn convert_endianness(&mut self) {
        let width = self.format.component_width();
        match width {
            2 => {
                for c in self.buffer.chunks_exact_mut(2) {
                    c.swap(0, 1);
                }
            }
            4 => {
                for c in self.buffer.chunks_exact_mut(4) {
                    c.swap(0, 3);
                    c.swap(1, 2);
                }
            }
            _ => {
                warn!(
                    format = %self.format,
                    width,
                    "endianness conversion only supports 2- and 4-byte components, buffer left as-is"
                );
                return;
            }
        }
        self.big_endian = !self.big_endian;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frame/frame.rs"]
mod tests;
