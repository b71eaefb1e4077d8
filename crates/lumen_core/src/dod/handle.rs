//! Component handle with generational index
//!
//! Refs are lightweight handles (8 bytes) that address one slot in every
//! column of a component manager. The generation counter prevents
//! use-after-destroy bugs.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Handle to a component record (generation-indexed for safety)
///
/// Format: [32-bit index | 32-bit generation]
/// - Index: Slot position in the manager's columns
/// - Generation: Incremented when the slot is destroyed
///
/// The type parameter is the component's column set. It only tags the
/// handle, so a probe ref cannot be handed to another component's manager.
///
/// Example:
/// ```ignore
/// let probe = probes.create_irradiance_probe(owner)?;
/// probes.destroy_irradiance_probe(probe)?;
/// // probe is now stale (generation mismatch)
/// assert!(probes.radius(probe).is_err());
/// ```
pub struct Ref<D> {
    index: u32,
    generation: u32,
    _kind: PhantomData<fn() -> D>,
}

impl<D> Ref<D> {
    /// Handle that never resolves to a record.
    pub const INVALID: Self = Self::new(u32::MAX, 0);

    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _kind: PhantomData,
        }
    }

    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// False only for [`Ref::INVALID`]. A valid-looking ref may still be stale.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.index != u32::MAX
    }

    /// Serialize to 64-bit integer (for save files and debug overlays)
    pub fn to_bits(&self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }

    /// Deserialize from 64-bit integer
    pub fn from_bits(bits: u64) -> Self {
        Self::new(bits as u32, (bits >> 32) as u32)
    }
}

impl<D> Clone for Ref<D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D> Copy for Ref<D> {}

impl<D> PartialEq for Ref<D> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<D> Eq for Ref<D> {}

impl<D> Hash for Ref<D> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_bits().hash(state);
    }
}

impl<D> Default for Ref<D> {
    fn default() -> Self {
        Self::INVALID
    }
}

impl<D> fmt::Debug for Ref<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ref")
            .field("index", &self.index)
            .field("generation", &self.generation)
            .finish()
    }
}

impl<D> fmt::Display for Ref<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}v{}", self.index, self.generation)
        } else {
            f.write_str("invalid")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    #[test]
    fn bits_round_trip() {
        let r = Ref::<Marker>::new(17, 3);
        let bits = r.to_bits();
        assert_eq!(bits, (3u64 << 32) | 17);
        assert_eq!(Ref::<Marker>::from_bits(bits), r);
    }

    #[test]
    fn invalid_sentinel() {
        let r = Ref::<Marker>::default();
        assert!(!r.is_valid());
        assert_eq!(r, Ref::INVALID);
        assert_eq!(r.to_string(), "invalid");
        assert!(Ref::<Marker>::new(0, 0).is_valid());
    }

    #[test]
    fn equality_includes_generation() {
        assert_ne!(Ref::<Marker>::new(4, 0), Ref::<Marker>::new(4, 1));
        assert_eq!(Ref::<Marker>::new(4, 1).to_string(), "4v1");
    }
}
