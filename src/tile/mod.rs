//! Tile trees: hierarchical geometry over owned chains.
//!
//! A tile carries an offset, a rotation, and a pivot, plus at most one
//! owned [`Chain`] and ordered child tiles. Tiles live in a [`TileSet`]
//! arena and are addressed by [`TileId`]; tree structure is delegated to
//! [`Forest`](crate::relation::Forest). Flattening walks a subtree
//! depth-first and writes every element into one destination chain with
//! absolute, transform-applied positions.

use std::f64::consts::TAU;

use tracing::warn;

use crate::{
    chain::{Chain, ChainOwner},
    foundation::error::{LumatileError, LumatileResult},
    foundation::geometry::{Affine, Point, Rect, Vec2, snap_cell},
    relation::{Forest, NodeId},
};

/// Handle to a tile in a [`TileSet`].
pub type TileId = NodeId;

/// Who currently holds a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TileOwner {
    /// A detached root held by the caller.
    #[default]
    Free,
    /// Child of another tile.
    Tile(TileId),
    /// Root attached to a device.
    Device,
}

#[derive(Clone, Debug)]
struct Tile {
    x: f64,
    y: f64,
    rotation: f64,
    pivot_x: f64,
    pivot_y: f64,
    transform: Affine,
    chain: Option<Chain>,
    owner: TileOwner,
}

impl Default for Tile {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            pivot_x: 0.0,
            pivot_y: 0.0,
            transform: Affine::IDENTITY,
            chain: None,
            owner: TileOwner::Free,
        }
    }
}

impl Tile {
    /// Pivot-centered rotation applied first, offset applied last.
    fn recompute_transform(&mut self) {
        let translate = Affine::translate((self.x, self.y));
        let pivot = Affine::translate((self.pivot_x, self.pivot_y));
        let unpivot = Affine::translate((-self.pivot_x, -self.pivot_y));
        let rotate = Affine::rotate(self.rotation);
        self.transform = translate * pivot * rotate * unpivot;
    }
}

/// Arena of tiles forming an ordered forest.
#[derive(Debug, Default)]
pub struct TileSet {
    tiles: Forest<Tile>,
}

impl TileSet {
    /// Empty tile set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the set holds no tiles.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Create an empty tile as a detached root.
    pub fn create(&mut self) -> TileId {
        self.tiles.insert(Tile::default())
    }

    /// Set the offset of a tile and recompute its transform.
    pub fn set_pos(&mut self, id: TileId, x: f64, y: f64) -> LumatileResult<()> {
        let tile = self.tile_mut(id)?;
        tile.x = x;
        tile.y = y;
        tile.recompute_transform();
        Ok(())
    }

    /// Offset of a tile.
    pub fn pos(&self, id: TileId) -> Option<(f64, f64)> {
        self.tiles.get(id).map(|t| (t.x, t.y))
    }

    /// Set the rotation of a tile in radians and recompute its transform.
    ///
    /// The stored angle is normalized to `[0, 2π)`.
    pub fn set_rotation(&mut self, id: TileId, radians: f64) -> LumatileResult<()> {
        let tile = self.tile_mut(id)?;
        tile.rotation = radians.rem_euclid(TAU);
        tile.recompute_transform();
        Ok(())
    }

    /// Rotation of a tile in radians, normalized to `[0, 2π)`.
    pub fn rotation(&self, id: TileId) -> Option<f64> {
        self.tiles.get(id).map(|t| t.rotation)
    }

    /// Set the pivot of a tile and recompute its transform.
    pub fn set_pivot(&mut self, id: TileId, pivot_x: f64, pivot_y: f64) -> LumatileResult<()> {
        let tile = self.tile_mut(id)?;
        tile.pivot_x = pivot_x;
        tile.pivot_y = pivot_y;
        tile.recompute_transform();
        Ok(())
    }

    /// Pivot of a tile.
    pub fn pivot(&self, id: TileId) -> Option<(f64, f64)> {
        self.tiles.get(id).map(|t| (t.pivot_x, t.pivot_y))
    }

    /// Cached local transform of a tile.
    pub fn transform(&self, id: TileId) -> Option<Affine> {
        self.tiles.get(id).map(|t| t.transform)
    }

    /// Current owner of a tile.
    pub fn owner(&self, id: TileId) -> Option<TileOwner> {
        self.tiles.get(id).map(|t| t.owner)
    }

    /// Attach `chain` to a tile, returning any previously owned chain.
    ///
    /// The chain must be free; a chain owned by another tile or a device
    /// is rejected.
    pub fn set_chain(&mut self, id: TileId, mut chain: Chain) -> LumatileResult<Option<Chain>> {
        if chain.owner() != ChainOwner::Free {
            return Err(LumatileError::ownership(
                "chain is already owned by a tile or device",
            ));
        }
        let tile = self.tile_mut(id)?;
        chain.set_owner(ChainOwner::Tile);
        let mut previous = tile.chain.replace(chain);
        if let Some(prev) = &mut previous {
            prev.set_owner(ChainOwner::Free);
        }
        Ok(previous)
    }

    /// Detach and return a tile's chain, if it has one.
    pub fn take_chain(&mut self, id: TileId) -> Option<Chain> {
        let tile = self.tiles.get_mut(id)?;
        let mut chain = tile.chain.take()?;
        chain.set_owner(ChainOwner::Free);
        Some(chain)
    }

    /// Borrow a tile's chain.
    pub fn chain(&self, id: TileId) -> Option<&Chain> {
        self.tiles.get(id)?.chain.as_ref()
    }

    /// Mutably borrow a tile's chain.
    pub fn chain_mut(&mut self, id: TileId) -> Option<&mut Chain> {
        self.tiles.get_mut(id)?.chain.as_mut()
    }

    /// Attach `child` under `parent` at the children's tail.
    ///
    /// The child must be a free root; device-attached or already-parented
    /// tiles are rejected.
    pub fn append_child(&mut self, parent: TileId, child: TileId) -> LumatileResult<()> {
        self.check_free_root(child)?;
        self.tiles.append_child(parent, child)?;
        self.tile_mut(child)?.owner = TileOwner::Tile(parent);
        Ok(())
    }

    /// Attach `new` at the tail of the sibling list containing `node`,
    /// inheriting the tail's parent.
    pub fn append_sibling(&mut self, node: TileId, new: TileId) -> LumatileResult<()> {
        self.check_free_root(new)?;
        self.tiles.append_sibling(node, new)?;
        let owner = match self.tiles.parent(new) {
            Some(parent) => TileOwner::Tile(parent),
            None => TileOwner::Free,
        };
        self.tile_mut(new)?.owner = owner;
        Ok(())
    }

    /// Parent tile, if any.
    pub fn parent(&self, id: TileId) -> Option<TileId> {
        self.tiles.parent(id)
    }

    /// Children of a tile in sibling order.
    pub fn children(&self, id: TileId) -> impl Iterator<Item = TileId> + '_ {
        self.tiles.children(id)
    }

    /// The `n`-th sibling after `id` (`n == 0` is `id`).
    pub fn nth_sibling(&self, id: TileId, n: usize) -> Option<TileId> {
        self.tiles.nth_sibling(id, n)
    }

    /// Next sibling of a tile.
    pub fn next_sibling(&self, id: TileId) -> Option<TileId> {
        self.tiles.next_sibling(id)
    }

    /// Previous sibling of a tile.
    pub fn prev_sibling(&self, id: TileId) -> Option<TileId> {
        self.tiles.prev_sibling(id)
    }

    /// Length of the sibling list containing `id`, including `id`.
    pub fn sibling_count(&self, id: TileId) -> usize {
        self.tiles.sibling_count(id)
    }

    /// Mark a free root tile as attached to a device.
    pub fn attach_to_device(&mut self, id: TileId) -> LumatileResult<()> {
        self.check_free_root(id)?;
        self.tile_mut(id)?.owner = TileOwner::Device;
        Ok(())
    }

    /// Clear a tile's device attachment.
    pub fn detach_from_device(&mut self, id: TileId) -> LumatileResult<()> {
        let tile = self.tile_mut(id)?;
        if tile.owner != TileOwner::Device {
            return Err(LumatileError::ownership("tile is not attached to a device"));
        }
        tile.owner = TileOwner::Free;
        Ok(())
    }

    /// Destroy a subtree: children recursively, then the tile's own chain,
    /// then the tile itself is unlinked and removed.
    pub fn destroy(&mut self, id: TileId) {
        let children: Vec<TileId> = self.tiles.children(id).collect();
        for child in children {
            self.destroy(child);
        }
        self.tiles.remove(id);
    }

    /// Deep-copy a subtree. The copy is always a free-standing root with
    /// parent and sibling links cleared.
    pub fn dup(&mut self, id: TileId) -> LumatileResult<TileId> {
        let mut tile = self
            .tiles
            .get(id)
            .cloned()
            .ok_or_else(|| LumatileError::validation("unknown tile"))?;
        tile.owner = TileOwner::Free;
        if let Some(chain) = tile.chain.take() {
            let mut copy = chain.duplicate();
            copy.set_owner(ChainOwner::Tile);
            tile.chain = Some(copy);
        }
        let copy = self.tiles.insert(tile);
        let children: Vec<TileId> = self.tiles.children(id).collect();
        for child in children {
            let child_copy = self.dup(child)?;
            self.append_child(copy, child_copy)?;
        }
        Ok(copy)
    }

    /// Untransformed bounding box: the running min/max of the own chain's
    /// element positions, merged with each child's bounding box shifted by
    /// that child's offset. A tile with no chain and no children yields
    /// the degenerate `(0,0)-(0,0)` box.
    pub fn bounding_box(&self, id: TileId) -> Rect {
        self.box_of(id, false)
    }

    /// Like [`TileSet::bounding_box`], but child boxes are taken through
    /// their transforms and the merged box is passed through this tile's
    /// own transform.
    pub fn transformed_bounding_box(&self, id: TileId) -> Rect {
        self.box_of(id, true)
    }

    fn box_of(&self, id: TileId, transformed: bool) -> Rect {
        let Some(tile) = self.tiles.get(id) else {
            return Rect::ZERO;
        };
        let mut bounds: Option<Rect> = None;
        let mut merge = |r: Rect| {
            bounds = Some(match bounds {
                Some(b) => b.union(r),
                None => r,
            });
        };
        if let Some(chain) = &tile.chain {
            for element in chain.elements() {
                let p = Point::new(f64::from(element.x), f64::from(element.y));
                merge(Rect::from_points(p, p));
            }
        }
        for child in self.tiles.children(id) {
            let child_box = self.box_of(child, transformed);
            if transformed {
                merge(child_box);
            } else {
                let (cx, cy) = self.pos(child).unwrap_or((0.0, 0.0));
                merge(child_box + Vec2::new(cx, cy));
            }
        }
        let merged = bounds.unwrap_or(Rect::ZERO);
        if transformed {
            tile.transform.transform_rect_bbox(merged)
        } else {
            merged
        }
    }

    /// Flatten a subtree into `dst` starting at element `offset`.
    ///
    /// Children are flattened first, depth-first, each claiming the
    /// contiguous range after the previous child's total; the tile's own
    /// chain follows. Element positions are taken at the cell center
    /// (`x + 0.5`), pushed through the cumulative root-to-node transform,
    /// and snapped back to the grid. Source elements in a partial trailing
    /// pixel have no sample behind them and are skipped with a warning;
    /// when `dst` runs out of capacity the remaining elements are dropped
    /// with a warning. Returns the number of elements written.
    #[tracing::instrument(skip(self, dst))]
    pub fn flatten(&self, id: TileId, dst: &mut Chain, offset: usize) -> LumatileResult<usize> {
        if self.tiles.get(id).is_none() {
            return Err(LumatileError::validation("unknown tile"));
        }
        let upstream = self.ancestor_transform(id);
        self.flatten_rec(id, dst, offset, upstream)
    }

    fn flatten_rec(
        &self,
        id: TileId,
        dst: &mut Chain,
        offset: usize,
        upstream: Affine,
    ) -> LumatileResult<usize> {
        let tile = self
            .tiles
            .get(id)
            .ok_or_else(|| LumatileError::validation("unknown tile"))?;
        let cumulative = upstream * tile.transform;

        let mut total = 0;
        let children: Vec<TileId> = self.tiles.children(id).collect();
        for child in children {
            total += self.flatten_rec(child, dst, offset + total, cumulative)?;
        }

        let Some(chain) = &self.tiles.get(id).expect("checked above").chain else {
            return Ok(total);
        };
        for pos in 0..chain.led_count() {
            let target = offset + total;
            if target >= dst.led_count() {
                warn!(
                    dropped = chain.led_count() - pos,
                    capacity = dst.led_count(),
                    "destination chain is full, dropping remaining elements"
                );
                return Ok(total);
            }
            let element = *chain.element(pos).expect("pos < led_count");
            let Ok(sample) = chain.sample(pos) else {
                // element in the partial trailing pixel, no backing storage
                warn!(pos, "element has no backing sample storage, skipping");
                continue;
            };
            if dst.set_sample(target, sample).is_err() {
                warn!(
                    dropped = chain.led_count() - pos,
                    "destination sample storage is exhausted, dropping remaining elements"
                );
                return Ok(total);
            }
            let center = cumulative * Point::new(f64::from(element.x) + 0.5, f64::from(element.y) + 0.5);
            let out = dst.element_mut(target).expect("target < led_count");
            out.x = snap_cell(center.x);
            out.y = snap_cell(center.y);
            out.channel = element.channel;
            out.gain = element.gain;
            total += 1;
        }
        Ok(total)
    }

    /// Composition of every ancestor's transform, root first, excluding
    /// the tile itself.
    fn ancestor_transform(&self, id: TileId) -> Affine {
        let mut ancestors = Vec::new();
        let mut cur = self.tiles.parent(id);
        while let Some(p) = cur {
            ancestors.push(p);
            cur = self.tiles.parent(p);
        }
        ancestors
            .iter()
            .rev()
            .fold(Affine::IDENTITY, |acc, &a| {
                acc * self.tiles.get(a).map(|t| t.transform).unwrap_or(Affine::IDENTITY)
            })
    }

    fn check_free_root(&self, id: TileId) -> LumatileResult<()> {
        let Some(tile) = self.tiles.get(id) else {
            return Err(LumatileError::validation("unknown tile"));
        };
        if tile.owner != TileOwner::Free || self.tiles.parent(id).is_some() {
            return Err(LumatileError::ownership(
                "tile is already held by a parent tile or device",
            ));
        }
        Ok(())
    }

    fn tile_mut(&mut self, id: TileId) -> LumatileResult<&mut Tile> {
        self.tiles
            .get_mut(id)
            .ok_or_else(|| LumatileError::validation("unknown tile"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tile/tile.rs"]
mod tests;
