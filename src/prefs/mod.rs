//! Preferences codec: tiles, chains, and elements as a generic
//! named-property tree.
//!
//! Snapshots carry geometry and wiring, not sample data. Rotation is
//! persisted in degrees and converted to and from radians exactly at this
//! boundary, nowhere else in the crate.

use serde::{Deserialize, Serialize};

use crate::{
    chain::{Chain, Element},
    foundation::error::{LumatileError, LumatileResult},
    tile::{TileId, TileSet},
};

/// Persisted form of one [`Element`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementPrefs {
    /// Horizontal grid position.
    pub x: i32,
    /// Vertical grid position.
    pub y: i32,
    /// Component index within a source pixel.
    pub channel: u32,
    /// Brightness scaling.
    pub gain: u16,
}

/// Persisted form of one [`Chain`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainPrefs {
    /// Number of elements.
    pub ledcount: usize,
    /// Pixel-format name, e.g. `"RGB u8"`.
    pub format: String,
    /// Per-element fields in chain order.
    pub elements: Vec<ElementPrefs>,
}

/// Persisted form of one tile subtree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TilePrefs {
    /// Horizontal offset.
    pub x: f64,
    /// Vertical offset.
    pub y: f64,
    /// Pivot x.
    pub pivot_x: f64,
    /// Pivot y.
    pub pivot_y: f64,
    /// Rotation in degrees (radians everywhere else in the crate).
    pub rotation: f64,
    /// The tile's own chain, if it has one.
    pub chain: Option<ChainPrefs>,
    /// Child subtrees in sibling order.
    pub tiles: Vec<TilePrefs>,
}

/// Snapshot a chain's wiring into its persisted form.
pub fn snapshot_chain(chain: &Chain) -> ChainPrefs {
    ChainPrefs {
        ledcount: chain.led_count(),
        format: chain.format().to_string(),
        elements: chain
            .elements()
            .iter()
            .map(|e| ElementPrefs {
                x: e.x,
                y: e.y,
                channel: e.channel,
                gain: e.gain,
            })
            .collect(),
    }
}

/// Rebuild a chain from its persisted form.
pub fn restore_chain(prefs: &ChainPrefs) -> LumatileResult<Chain> {
    let format = prefs.format.parse()?;
    let mut chain = Chain::new(prefs.ledcount, format)?;
    for (pos, e) in prefs.elements.iter().take(prefs.ledcount).enumerate() {
        let element = chain.element_mut(pos).expect("pos < ledcount");
        *element = Element {
            x: e.x,
            y: e.y,
            channel: e.channel,
            gain: e.gain,
        };
    }
    Ok(chain)
}

/// Snapshot a tile subtree into its persisted form.
pub fn snapshot_tile(set: &TileSet, id: TileId) -> LumatileResult<TilePrefs> {
    let (x, y) = set
        .pos(id)
        .ok_or_else(|| LumatileError::validation("unknown tile"))?;
    let (pivot_x, pivot_y) = set.pivot(id).expect("tile exists");
    let rotation = set.rotation(id).expect("tile exists").to_degrees();
    let chain = set.chain(id).map(snapshot_chain);
    let mut tiles = Vec::new();
    for child in set.children(id) {
        tiles.push(snapshot_tile(set, child)?);
    }
    Ok(TilePrefs {
        x,
        y,
        pivot_x,
        pivot_y,
        rotation,
        chain,
        tiles,
    })
}

/// Rebuild a tile subtree from its persisted form as a new free root.
pub fn restore_tile(set: &mut TileSet, prefs: &TilePrefs) -> LumatileResult<TileId> {
    let id = set.create();
    set.set_pos(id, prefs.x, prefs.y)?;
    set.set_pivot(id, prefs.pivot_x, prefs.pivot_y)?;
    set.set_rotation(id, prefs.rotation.to_radians())?;
    if let Some(chain) = &prefs.chain {
        set.set_chain(id, restore_chain(chain)?)?;
    }
    for child in &prefs.tiles {
        let child_id = restore_tile(set, child)?;
        set.append_child(id, child_id)?;
    }
    Ok(id)
}

/// Encode a persisted tile subtree as a generic property-tree value.
pub fn to_value(prefs: &TilePrefs) -> LumatileResult<serde_json::Value> {
    serde_json::to_value(prefs).map_err(|e| LumatileError::serde(e.to_string()))
}

/// Decode a persisted tile subtree from a generic property-tree value.
pub fn from_value(value: serde_json::Value) -> LumatileResult<TilePrefs> {
    serde_json::from_value(value).map_err(|e| LumatileError::serde(e.to_string()))
}

#[cfg(test)]
#[path = "../../tests/unit/prefs/prefs.rs"]
mod tests;
