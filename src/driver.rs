//! Device boundary: the capability a hardware driver implements and the
//! slot that owns a chain on a driver's behalf.
//!
//! No protocol lives here; drivers are external. The slot exists so chain
//! ownership by a device is a real, enforced state rather than a tag with
//! no holder.

use crate::{
    chain::{Chain, ChainOwner},
    foundation::error::{LumatileError, LumatileResult},
};

/// Transmit capability implemented by a hardware driver.
pub trait LedTransmit {
    /// Hand `count` elements of a finished chain buffer, starting at
    /// element `offset`, to the hardware.
    fn send(&mut self, buffer: &[u8], count: usize, offset: usize) -> LumatileResult<()>;

    /// Latch previously sent data onto the outputs.
    fn latch(&mut self) -> LumatileResult<()>;
}

/// Owner of at most one chain on behalf of a device driver.
#[derive(Debug, Default)]
pub struct DeviceSlot {
    chain: Option<Chain>,
}

impl DeviceSlot {
    /// Empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a free chain to this slot.
    ///
    /// A chain owned by a tile or another device is rejected.
    pub fn attach_chain(&mut self, mut chain: Chain) -> LumatileResult<()> {
        if chain.owner() != ChainOwner::Free {
            return Err(LumatileError::ownership(
                "chain is already owned by a tile or device",
            ));
        }
        if self.chain.is_some() {
            return Err(LumatileError::ownership("device slot already holds a chain"));
        }
        chain.set_owner(ChainOwner::Device);
        self.chain = Some(chain);
        Ok(())
    }

    /// Detach and return the held chain, if any.
    pub fn take_chain(&mut self) -> Option<Chain> {
        let mut chain = self.chain.take()?;
        chain.set_owner(ChainOwner::Free);
        Some(chain)
    }

    /// Borrow the held chain.
    pub fn chain(&self) -> Option<&Chain> {
        self.chain.as_ref()
    }

    /// Mutably borrow the held chain.
    pub fn chain_mut(&mut self) -> Option<&mut Chain> {
        self.chain.as_mut()
    }

    /// Send the held chain's buffer through `driver` and trigger one latch.
    pub fn transmit<T: LedTransmit>(&mut self, driver: &mut T) -> LumatileResult<()> {
        let chain = self
            .chain
            .as_ref()
            .ok_or_else(|| LumatileError::validation("device slot holds no chain"))?;
        driver.send(chain.buffer(), chain.led_count(), 0)?;
        driver.latch()
    }
}
