//! Sampler handle management

use spindle_core::SamplerHandle;
use std::collections::BTreeSet;

/// Hands out sampler handles with a no-live-reuse guarantee.
///
/// Acquire returns the smallest value not currently live, so handles stay
/// small, but a handle is never reissued while its association exists.
#[derive(Debug, Default)]
pub struct HandleSet {
    live: BTreeSet<u32>,
}

impl HandleSet {
    /// Create an empty handle set
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire a fresh handle
    pub fn acquire(&mut self) -> SamplerHandle {
        let mut candidate = 0u32;
        for &live in &self.live {
            if live == candidate {
                candidate += 1;
            } else {
                break;
            }
        }
        self.live.insert(candidate);
        SamplerHandle::new(candidate)
    }

    /// Release a handle, allowing later reuse
    pub fn release(&mut self, handle: SamplerHandle) {
        self.live.remove(&handle.raw());
    }

    /// Release every handle
    pub fn clear(&mut self) {
        self.live.clear();
    }

    /// Number of live handles
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether no handles are live
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_never_reissues_live_handles() {
        let mut handles = HandleSet::new();
        let a = handles.acquire();
        let b = handles.acquire();
        let c = handles.acquire();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(handles.len(), 3);
    }

    #[test]
    fn test_released_handles_are_reused() {
        let mut handles = HandleSet::new();
        let a = handles.acquire();
        let _b = handles.acquire();
        handles.release(a);
        // The smallest free slot is the one just released.
        assert_eq!(handles.acquire(), a);
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut handles = HandleSet::new();
        handles.acquire();
        handles.acquire();
        handles.clear();
        assert!(handles.is_empty());
        assert_eq!(handles.acquire().raw(), 0);
    }
}
