//! Lumatile models physical arrangements of individually addressable LEDs
//! and translates between a geometric description (hierarchical tiles with
//! offset, rotation, and pivot) and flat per-device sample buffers in an
//! arbitrary pixel layout.
//!
//! # Pipeline overview
//!
//! 1. **Describe**: build a [`TileSet`] of tiles, each optionally owning a
//!    [`Chain`] of elements in local coordinates
//! 2. **Flatten**: [`TileSet::flatten`] walks a subtree depth-first and
//!    writes every element into one destination chain with absolute,
//!    transform-applied positions
//! 3. **Project**: [`Chain::map_from_frame`] precomputes per-element byte
//!    offsets into a [`Frame`]; [`Chain::fill_from_frame`] copies converted
//!    samples each frame
//! 4. **Rewire**: [`Chain::stride_map`] / [`Chain::stride_unmap`] reorder
//!    the logical scan order into the physical wiring order
//! 5. **Transmit**: a [`DeviceSlot`] hands the finished buffer to a
//!    [`LedTransmit`] driver (drivers themselves are external)
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single-threaded core**: no locking, no interior mutability; all
//!   mutation goes through `&mut`.
//! - **Tree-shaped ownership**: a chain belongs to the caller, one tile, or
//!   one device slot; a tile subtree belongs to whatever holds its root.
//! - **Best-effort projection**: a single out-of-range element is skipped
//!   with a warning, never failing the whole operation.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod chain;
pub mod driver;
pub mod format;
pub mod foundation;
pub mod frame;
pub mod prefs;
pub mod relation;
pub mod tile;

pub use chain::{Chain, ChainOwner, Element};
pub use driver::{DeviceSlot, LedTransmit};
pub use format::{Channels, ComponentType, Converter, PixelFormat, converter};
pub use foundation::error::{LumatileError, LumatileResult};
pub use frame::Frame;
pub use relation::{Forest, NodeId};
pub use tile::{TileId, TileOwner, TileSet};
