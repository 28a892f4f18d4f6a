//! One-shot memoization of the located minimap box
//!
//! The minimap does not move once it is on screen, so the first successful
//! detection is reused for the rest of the session. Only an explicit reset,
//! driven by a blackout transition or a caller action, reopens the search.

use crate::Result;
use crate::bbox::BBox;

#[derive(Debug, Default)]
pub struct LockedRegionCache {
    locked: Option<BBox>,
}

impl LockedRegionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the locked box, invoking `locate` only while the cache is
    /// empty. The first non-empty result is stored and every later call
    /// returns it without re-invoking the locator.
    pub fn get_or_locate<F>(&mut self, locate: F) -> Result<Option<BBox>>
    where
        F: FnOnce() -> Result<Option<BBox>>,
    {
        if let Some(locked) = self.locked {
            return Ok(Some(locked));
        }
        let found = locate()?;
        if let Some(found) = found {
            self.locked = Some(found);
        }
        Ok(found)
    }

    pub fn locked(&self) -> Option<BBox> {
        self.locked
    }

    pub fn is_locked(&self) -> bool {
        self.locked.is_some()
    }

    /// Forget the locked position and reopen the per-frame search
    pub fn reset(&mut self) {
        self.locked = None;
    }
}
