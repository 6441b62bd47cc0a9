//! Ordered element chains backed by a raw sample buffer.
//!
//! A chain is the flat, wiring-ordered form of an installation: N elements
//! sharing one pixel format, a sample buffer holding one component slot per
//! element, and an offset cache produced by [`Chain::map_from_frame`] that
//! lets [`Chain::fill_from_frame`] copy samples out of a raster without
//! re-deriving geometry per frame.

use std::fmt;

use tracing::{debug, warn};

use crate::{
    format,
    format::{Converter, PixelFormat, read_component, write_component},
    foundation::error::{LumatileError, LumatileResult},
    frame::{Frame, host_big_endian},
};

mod element;

pub use element::Element;

/// Who currently owns a chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChainOwner {
    /// Held directly by the caller.
    #[default]
    Free,
    /// Owned by a tile in a [`TileSet`](crate::tile::TileSet).
    Tile,
    /// Owned by a device slot on behalf of a hardware driver.
    Device,
}

/// Fixed-length ordered array of [`Element`]s sharing one pixel format.
pub struct Chain {
    format: PixelFormat,
    elements: Vec<Element>,
    buffer: Vec<u8>,
    map_offsets: Vec<Option<usize>>,
    owner: ChainOwner,
    scratch: Option<Frame>,
    converter: Option<Converter>,
}

impl Chain {
    /// Chain of `count` elements in `format`.
    ///
    /// The sample buffer is sized in whole pixels (`count` divided by the
    /// format's component count, rounded down). A count that is not a whole
    /// multiple of the component count is accepted with a warning; a count
    /// yielding zero whole pixels is rejected.
    pub fn new(count: usize, format: PixelFormat) -> LumatileResult<Self> {
        let components = format.component_count();
        if count % components != 0 {
            warn!(
                count,
                components,
                %format,
                "element count is not a whole multiple of the format's components"
            );
        }
        let pixels = count / components;
        if pixels == 0 {
            return Err(LumatileError::validation(format!(
                "{count} elements yield zero whole {format} pixels"
            )));
        }
        Ok(Self {
            format,
            elements: vec![Element::default(); count],
            buffer: vec![0; format.buffer_size(pixels)],
            map_offsets: vec![None; count],
            owner: ChainOwner::Free,
            scratch: None,
            converter: None,
        })
    }

    /// Number of elements ("ledcount").
    pub fn led_count(&self) -> usize {
        self.elements.len()
    }

    /// Number of whole pixels backing the sample buffer.
    pub fn pixel_count(&self) -> usize {
        self.buffer.len() / self.format.bytes_per_pixel()
    }

    /// Pixel format of the sample buffer.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Raw sample bytes.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Mutable raw sample bytes.
    pub fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    /// Borrow one element.
    pub fn element(&self, pos: usize) -> Option<&Element> {
        self.elements.get(pos)
    }

    /// Mutably borrow one element.
    pub fn element_mut(&mut self, pos: usize) -> Option<&mut Element> {
        self.elements.get_mut(pos)
    }

    /// All elements in chain order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// All elements, mutably.
    pub fn elements_mut(&mut self) -> &mut [Element] {
        &mut self.elements
    }

    /// Cached frame byte offset of one element, if it has been mapped.
    pub fn map_offset(&self, pos: usize) -> Option<usize> {
        self.map_offsets.get(pos).copied().flatten()
    }

    /// Current owner tag.
    pub fn owner(&self) -> ChainOwner {
        self.owner
    }

    /// Whether a tile owns this chain.
    pub fn is_tile_child(&self) -> bool {
        self.owner == ChainOwner::Tile
    }

    /// Whether a device slot owns this chain.
    pub fn is_device_child(&self) -> bool {
        self.owner == ChainOwner::Device
    }

    pub(crate) fn set_owner(&mut self, owner: ChainOwner) {
        self.owner = owner;
    }

    /// Read the sample slot of element `pos` as a zero-extended value.
    pub fn sample(&self, pos: usize) -> LumatileResult<i64> {
        let offset = self.slot_offset(pos)?;
        Ok(read_component(&self.buffer[offset..], self.format.component()) as i64)
    }

    /// Write the sample slot of element `pos` from the low bytes of `value`.
    pub fn set_sample(&mut self, pos: usize, value: i64) -> LumatileResult<()> {
        let offset = self.slot_offset(pos)?;
        write_component(&mut self.buffer[offset..], self.format.component(), value as u64);
        Ok(())
    }

    /// Resize to `count` elements, preserving the overlapping prefix of
    /// elements, samples, and mapped offsets, and zero-filling growth.
    ///
    /// The new state is fully constructed before any live state is
    /// replaced; on error the chain is unchanged.
    pub fn resize(&mut self, count: usize) -> LumatileResult<()> {
        if count == self.led_count() {
            return Ok(());
        }
        let components = self.format.component_count();
        if count % components != 0 {
            warn!(
                count,
                components,
                format = %self.format,
                "resized element count is not a whole multiple of the format's components"
            );
        }
        let pixels = count / components;
        if pixels == 0 {
            return Err(LumatileError::validation(format!(
                "{count} elements yield zero whole {} pixels",
                self.format
            )));
        }

        let mut elements = vec![Element::default(); count];
        let keep = self.elements.len().min(count);
        elements[..keep].copy_from_slice(&self.elements[..keep]);

        let mut buffer = vec![0u8; self.format.buffer_size(pixels)];
        let keep_bytes = self.buffer.len().min(buffer.len());
        buffer[..keep_bytes].copy_from_slice(&self.buffer[..keep_bytes]);

        let mut map_offsets = vec![None; count];
        map_offsets[..keep].copy_from_slice(&self.map_offsets[..keep]);

        self.elements = elements;
        self.buffer = buffer;
        self.map_offsets = map_offsets;
        Ok(())
    }

    /// Precompute each element's byte offset into `frame`'s buffer.
    ///
    /// Elements whose position or channel falls outside the frame are
    /// marked unmapped with a warning; [`Chain::fill_from_frame`] skips
    /// them. Offsets are resolved in this chain's format, the format the
    /// source buffer will have at fill time. Returns the number of
    /// elements mapped.
    pub fn map_from_frame(&mut self, frame: &Frame) -> LumatileResult<usize> {
        let components = self.format.component_count();
        let width = frame.width();
        let height = frame.height();
        let limit = self.format.buffer_size(width * height);
        let mut mapped = 0;

        for (pos, element) in self.elements.iter().enumerate() {
            let in_bounds = element.x >= 0
                && element.y >= 0
                && (element.x as usize) < width
                && (element.y as usize) < height
                && (element.channel as usize) < components;
            if !in_bounds {
                warn!(
                    pos,
                    x = element.x,
                    y = element.y,
                    channel = element.channel,
                    frame_width = width,
                    frame_height = height,
                    "element falls outside the frame, leaving it unmapped"
                );
                self.map_offsets[pos] = None;
                continue;
            }
            let linear =
                (width * element.y as usize + element.x as usize) * components
                    + element.channel as usize;
            let offset = self.format.component_offset(linear);
            if offset + self.format.component_width() > limit {
                warn!(pos, offset, limit, "element offset past the frame buffer");
                self.map_offsets[pos] = None;
                continue;
            }
            self.map_offsets[pos] = Some(offset);
            mapped += 1;
        }
        debug!(mapped, total = self.led_count(), "mapped chain onto frame");
        Ok(mapped)
    }

    /// Copy one sample per mapped element out of `frame` into this chain's
    /// buffer, in element order.
    ///
    /// The frame is first normalized to host byte order if its endianness
    /// flag disagrees. If its format differs from the chain's, the whole
    /// frame is bulk-converted once through a cached scratch frame and
    /// converter (recreated only when dimensions or source format change).
    /// Requires [`Chain::map_from_frame`] to have populated offsets;
    /// unmapped elements keep their previous sample.
    pub fn fill_from_frame(&mut self, frame: &mut Frame) -> LumatileResult<()> {
        if frame.is_big_endian() != host_big_endian() {
            frame.convert_endianness();
        }

        let needs_conversion = frame.format() != self.format;
        if needs_conversion {
            let dims_changed = match &self.scratch {
                Some(s) => s.width() != frame.width() || s.height() != frame.height(),
                None => true,
            };
            if dims_changed {
                self.scratch = Some(Frame::new(frame.width(), frame.height(), self.format)?);
            }
            let converter_stale = match &self.converter {
                Some(c) => c.src() != frame.format(),
                None => true,
            };
            if converter_stale {
                self.converter = Some(format::converter(frame.format(), self.format)?);
            }
            let converter = self.converter.as_ref().expect("converter just ensured");
            let scratch = self.scratch.as_mut().expect("scratch just ensured");
            converter.apply(
                frame.buffer(),
                scratch.buffer_mut(),
                frame.width() * frame.height(),
            )?;
        }

        let source: &[u8] = if needs_conversion {
            self.scratch.as_ref().expect("scratch just ensured").buffer()
        } else {
            frame.buffer()
        };

        let width = self.format.component_width();
        for (pos, offset) in self.map_offsets.iter().enumerate() {
            let Some(offset) = offset else {
                continue;
            };
            let slot = self.format.component_offset(pos);
            if offset + width > source.len() || slot + width > self.buffer.len() {
                warn!(pos, offset, "mapped offset no longer fits its buffer, skipping");
                continue;
            }
            self.buffer[slot..slot + width].copy_from_slice(&source[*offset..*offset + width]);
        }
        Ok(())
    }

    /// Reorder elements from `offset` onward into serpentine stripe order.
    ///
    /// Destination `offset + i` takes the element, sample, and mapped
    /// offset from a source cursor that starts at `offset`, advances by
    /// `stride`, and on reaching the end restarts one past the previous
    /// base. A stride of zero is a no-op. Returns the number of elements
    /// processed.
    pub fn stride_map(&mut self, stride: usize, offset: usize) -> LumatileResult<usize> {
        self.stride_apply(stride, offset, false)
    }

    /// Exact inverse of [`Chain::stride_map`] with the same arguments.
    pub fn stride_unmap(&mut self, stride: usize, offset: usize) -> LumatileResult<usize> {
        self.stride_apply(stride, offset, true)
    }

    fn stride_apply(
        &mut self,
        stride: usize,
        offset: usize,
        inverse: bool,
    ) -> LumatileResult<usize> {
        let count = self.led_count();
        if offset >= count {
            return Err(LumatileError::validation(format!(
                "stride offset {offset} is past the chain's {count} elements"
            )));
        }
        let affected = count - offset;
        if stride == 0 {
            return Ok(affected);
        }

        let elements = self.elements.clone();
        let buffer = self.buffer.clone();
        let map_offsets = self.map_offsets.clone();
        let width = self.format.component_width();

        let mut src = offset;
        let mut base = offset;
        for i in 0..affected {
            let (from, to) = if inverse {
                (offset + i, src)
            } else {
                (src, offset + i)
            };
            self.elements[to] = elements[from];
            self.map_offsets[to] = map_offsets[from];
            let from_slot = self.format.component_offset(from);
            let to_slot = self.format.component_offset(to);
            if from_slot + width <= buffer.len() && to_slot + width <= self.buffer.len() {
                self.buffer[to_slot..to_slot + width]
                    .copy_from_slice(&buffer[from_slot..from_slot + width]);
            }
            src += stride;
            if src >= count {
                base += 1;
                src = base;
            }
        }
        Ok(affected)
    }

    /// Deep copy of elements, samples, and mapped offsets.
    ///
    /// The duplicate is always free-standing: any owner link is cleared.
    pub fn duplicate(&self) -> Chain {
        Chain {
            format: self.format,
            elements: self.elements.clone(),
            buffer: self.buffer.clone(),
            map_offsets: self.map_offsets.clone(),
            owner: ChainOwner::Free,
            scratch: None,
            converter: None,
        }
    }

    fn slot_offset(&self, pos: usize) -> LumatileResult<usize> {
        if pos >= self.led_count() {
            return Err(LumatileError::validation(format!(
                "element position {pos} is past the chain's {} elements",
                self.led_count()
            )));
        }
        let offset = self.format.component_offset(pos);
        let width = self.format.component_width();
        if offset + width > self.buffer.len() {
            return Err(LumatileError::validation(format!(
                "element position {pos} lies in the partial trailing pixel"
            )));
        }
        Ok(offset)
    }
}

impl Clone for Chain {
    /// Clones are always free-standing, exactly like [`Chain::duplicate`]:
    /// the owner tag is cleared and the projection caches are dropped.
    fn clone(&self) -> Self {
        self.duplicate()
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mapped = self.map_offsets.iter().filter(|o| o.is_some()).count();
        f.debug_struct("Chain")
            .field("format", &self.format.to_string())
            .field("led_count", &self.led_count())
            .field("pixel_count", &self.pixel_count())
            .field("owner", &self.owner)
            .field("mapped", &mapped)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/chain/chain.rs"]
mod tests;

#[cfg(test)]
#[path = "../../tests/unit/chain/mapping.rs"]
mod mapping_tests;
