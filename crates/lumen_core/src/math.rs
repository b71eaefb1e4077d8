//! Math types shared by components
//!
//! Re-exports glam, plus the spherical-harmonics coefficient block stored
//! by irradiance probes and a small deterministic RNG for tools and tests.

pub use glam::*;

/// Number of coefficients in an L2 spherical-harmonics expansion.
pub const SH_COEFFICIENT_COUNT: usize = 9;

/// RGB spherical-harmonics coefficients (bands 0..=2).
///
/// Stored and serialized as an opaque block; projection and evaluation
/// happen in the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ShCoeffs {
    coefficients: [Vec3; SH_COEFFICIENT_COUNT],
}

impl ShCoeffs {
    pub const ZERO: Self = Self {
        coefficients: [Vec3::ZERO; SH_COEFFICIENT_COUNT],
    };

    pub const fn from_coefficients(coefficients: [Vec3; SH_COEFFICIENT_COUNT]) -> Self {
        Self { coefficients }
    }

    pub fn from_arrays(arrays: [[f32; 3]; SH_COEFFICIENT_COUNT]) -> Self {
        Self {
            coefficients: arrays.map(Vec3::from_array),
        }
    }

    #[inline]
    pub fn coefficients(&self) -> &[Vec3; SH_COEFFICIENT_COUNT] {
        &self.coefficients
    }

    #[inline]
    pub fn coefficients_mut(&mut self) -> &mut [Vec3; SH_COEFFICIENT_COUNT] {
        &mut self.coefficients
    }

    pub fn to_arrays(&self) -> [[f32; 3]; SH_COEFFICIENT_COUNT] {
        self.coefficients.map(|c| c.to_array())
    }

    /// Bitwise equality, distinguishing `-0.0` from `0.0` and comparing NaNs.
    pub fn bits_eq(&self, other: &Self) -> bool {
        self.to_arrays()
            .iter()
            .flatten()
            .zip(other.to_arrays().iter().flatten())
            .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

/// Deterministic random number generator (LCG; not for anything statistical)
pub struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        // Numerical Recipes LCG constants, modulo 2^32
        const A: u64 = 1664525;
        const C: u64 = 1013904223;
        const M: u64 = 1u64 << 32;

        self.state = (A.wrapping_mul(self.state).wrapping_add(C)) % M;
        self.state as u32
    }

    /// Uniform-ish value in `0..bound`. `bound` must be non-zero.
    pub fn next_below(&mut self, bound: u32) -> u32 {
        debug_assert!(bound > 0);
        self.next_u32() % bound
    }

    /// Value in `[0, 1]`.
    pub fn next_f32(&mut self) -> f32 {
        self.next_u32() as f32 / u32::MAX as f32
    }
}
