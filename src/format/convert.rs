use tracing::debug;

use crate::{
    foundation::error::{LumatileError, LumatileResult},
    format::descriptor::{Channels, ComponentType, PixelFormat},
};

/// Bulk pixel converter between two formats.
///
/// Conversion goes through a canonical RGBA working pixel held at full
/// component precision: channels are reordered by name, luminance fans out
/// to RGB, a missing alpha reads as fully opaque, and component values are
/// rescaled so that the maximum of the source type maps to the maximum of
/// the destination type.
#[derive(Clone, Copy, Debug)]
pub struct Converter {
    src: PixelFormat,
    dst: PixelFormat,
}

/// Fetch a converter from `src` to `dst`.
pub fn converter(src: PixelFormat, dst: PixelFormat) -> LumatileResult<Converter> {
    debug!(%src, %dst, "fetching pixel converter");
    Ok(Converter { src, dst })
}

impl Converter {
    /// Source format this converter reads.
    pub fn src(&self) -> PixelFormat {
        self.src
    }

    /// Destination format this converter writes.
    pub fn dst(&self) -> PixelFormat {
        self.dst
    }

    /// Convert `n_pixels` whole pixels from `src` into `dst`.
    ///
    /// Fails if either buffer is smaller than the pixel count requires.
    pub fn apply(&self, src: &[u8], dst: &mut [u8], n_pixels: usize) -> LumatileResult<()> {
        let need_src = self.src.buffer_size(n_pixels);
        let need_dst = self.dst.buffer_size(n_pixels);
        if src.len() < need_src {
            return Err(LumatileError::validation(format!(
                "conversion source holds {} bytes, {need_src} required",
                src.len()
            )));
        }
        if dst.len() < need_dst {
            return Err(LumatileError::validation(format!(
                "conversion destination holds {} bytes, {need_dst} required",
                dst.len()
            )));
        }

        let src_bpp = self.src.bytes_per_pixel();
        let dst_bpp = self.dst.bytes_per_pixel();
        for i in 0..n_pixels {
            let px = decode_pixel(self.src, &src[i * src_bpp..]);
            encode_pixel(self.dst, px, &mut dst[i * dst_bpp..]);
        }
        Ok(())
    }
}

/// Canonical working pixel, components in the source type's value domain.
#[derive(Clone, Copy, Debug)]
struct WorkPixel {
    r: u64,
    g: u64,
    b: u64,
    a: u64,
    domain: ComponentType,
}

fn decode_pixel(fmt: PixelFormat, bytes: &[u8]) -> WorkPixel {
    let ty = fmt.component();
    let w = ty.width();
    let c = |idx: usize| read_component(&bytes[idx * w..], ty);
    let (r, g, b, a) = match fmt.channels() {
        Channels::Y => {
            let y = c(0);
            (y, y, y, ty.max_value())
        }
        Channels::Rgb => (c(0), c(1), c(2), ty.max_value()),
        Channels::Bgr => (c(2), c(1), c(0), ty.max_value()),
        Channels::Rgba => (c(0), c(1), c(2), c(3)),
        Channels::Bgra => (c(2), c(1), c(0), c(3)),
    };
    WorkPixel {
        r,
        g,
        b,
        a,
        domain: ty,
    }
}

fn encode_pixel(fmt: PixelFormat, px: WorkPixel, bytes: &mut [u8]) {
    let ty = fmt.component();
    let w = ty.width();
    let r = rescale(px.r, px.domain, ty);
    let g = rescale(px.g, px.domain, ty);
    let b = rescale(px.b, px.domain, ty);
    let a = rescale(px.a, px.domain, ty);
    let values: [u64; 4] = match fmt.channels() {
        Channels::Y => [(r + g + b) / 3, 0, 0, 0],
        Channels::Rgb => [r, g, b, 0],
        Channels::Bgr => [b, g, r, 0],
        Channels::Rgba => [r, g, b, a],
        Channels::Bgra => [b, g, r, a],
    };
    for (idx, v) in values.iter().take(fmt.component_count()).enumerate() {
        write_component(&mut bytes[idx * w..], ty, *v);
    }
}

/// Rescale a component so the source maximum maps to the destination maximum.
fn rescale(v: u64, src: ComponentType, dst: ComponentType) -> u64 {
    if src == dst {
        return v;
    }
    ((u128::from(v) * u128::from(dst.max_value())) / u128::from(src.max_value())) as u64
}

pub(crate) fn read_component(bytes: &[u8], ty: ComponentType) -> u64 {
    match ty {
        ComponentType::U8 => u64::from(bytes[0]),
        ComponentType::U16 => u64::from(u16::from_ne_bytes([bytes[0], bytes[1]])),
        ComponentType::U24 => {
            u64::from(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]))
        }
        ComponentType::U32 => {
            u64::from(u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        }
        ComponentType::U64 => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&bytes[..8]);
            u64::from_ne_bytes(raw)
        }
    }
}

pub(crate) fn write_component(bytes: &mut [u8], ty: ComponentType, v: u64) {
    match ty {
        ComponentType::U8 => bytes[0] = v as u8,
        ComponentType::U16 => bytes[..2].copy_from_slice(&(v as u16).to_ne_bytes()),
        ComponentType::U24 => bytes[..3].copy_from_slice(&(v as u32).to_le_bytes()[..3]),
        ComponentType::U32 => bytes[..4].copy_from_slice(&(v as u32).to_ne_bytes()),
        ComponentType::U64 => bytes[..8].copy_from_slice(&v.to_ne_bytes()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/format/convert.rs"]
mod tests;
