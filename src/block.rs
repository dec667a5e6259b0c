//! Fixed-width 16-lane blocks for packed inputs and literal weights.
//!
//! Inputs are packed into one [`LaneMask`] per block of 16 features, literal
//! weights into one [`WeightBlock`] per block. When the feature count is not
//! a multiple of [`LANES`] the last block carries padding lanes; every
//! operation that touches it must go through [`valid_mask`] so that padding
//! never votes and never learns.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lanes per block.
pub const LANES: usize = 16;

/// One bit per lane of a block.
pub type LaneMask = u16;

/// Mask with every lane set.
pub const FULL_MASK: LaneMask = LaneMask::MAX;

/// # Overview
///
/// Number of blocks needed for `len` features.
#[inline]
#[must_use]
pub const fn block_count(len: usize) -> usize {
    len.div_ceil(LANES)
}

/// # Overview
///
/// Mask of the valid lanes in the last block: exactly `len % 16` bits,
/// or all 16 when `len` fills the block.
#[inline]
#[must_use]
pub const fn boundary_mask(len: usize) -> LaneMask {
    match len % LANES {
        0 => FULL_MASK,
        r => ((1u32 << r) - 1) as LaneMask
    }
}

/// # Overview
///
/// Mask of the valid lanes of block `block` for `len` features.
#[inline]
#[must_use]
pub const fn valid_mask(len: usize, block: usize) -> LaneMask {
    if block + 1 == block_count(len) {
        boundary_mask(len)
    } else {
        FULL_MASK
    }
}

/// # Overview
///
/// Sixteen signed literal weights. A lane is included when its weight is
/// non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(align(64))]
pub struct WeightBlock([i32; LANES]);

impl WeightBlock {
    pub const ZERO: Self = Self([0; LANES]);

    #[inline(always)]
    #[must_use]
    pub const fn lanes(&self) -> &[i32; LANES] {
        &self.0
    }

    #[inline(always)]
    pub fn lanes_mut(&mut self) -> &mut [i32; LANES] {
        &mut self.0
    }

    /// # Overview
    ///
    /// Lanes whose weight is `>= 0`.
    #[inline]
    #[must_use]
    pub fn inclusion_mask(&self) -> LaneMask {
        let mut mask = 0;
        for (lane, &w) in self.0.iter().enumerate() {
            if w >= 0 {
                mask |= 1 << lane;
            }
        }
        mask
    }

    /// # Overview
    ///
    /// Adds `delta` to every lane in `mask`, saturating at the `i32` range.
    #[inline]
    pub fn add_masked(&mut self, mask: LaneMask, delta: i32) {
        if mask == 0 {
            return;
        }
        for (lane, w) in self.0.iter_mut().enumerate() {
            if mask & (1 << lane) != 0 {
                *w = w.saturating_add(delta);
            }
        }
    }
}

/// # Overview
///
/// Flattens weight blocks to the first `len` lanes.
#[must_use]
pub fn unpack_weights(blocks: &[WeightBlock], len: usize) -> Vec<i32> {
    blocks.iter().flat_map(|b| b.0).take(len).collect()
}

/// # Overview
///
/// Packs plain weights into zero-padded blocks.
#[must_use]
pub fn pack_weights(weights: &[i32]) -> Vec<WeightBlock> {
    weights
        .chunks(LANES)
        .map(|chunk| {
            let mut block = WeightBlock::ZERO;
            block.0[..chunk.len()].copy_from_slice(chunk);
            block
        })
        .collect()
}

/// # Overview
///
/// A binary input vector packed into one activation mask per block.
///
/// Bit `k % 16` of block `k / 16` is set when feature `k` is active.
///
/// # Examples
///
/// ```
/// use granular_tsetlin::PackedSample;
///
/// let sample = PackedSample::pack(&[1, 0, 1, 1]);
/// assert_eq!(sample.len(), 4);
/// assert_eq!(sample.activations(), &[0b1101]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackedSample {
    activations: Vec<LaneMask>,
    len:         usize
}

impl PackedSample {
    /// # Overview
    ///
    /// Packs a raw vector; any value `> 0` is active.
    #[must_use]
    pub fn pack(x: &[u8]) -> Self {
        let mut activations = vec![0; block_count(x.len())];
        for (k, &xk) in x.iter().enumerate() {
            if xk > 0 {
                activations[k / LANES] |= 1 << (k % LANES);
            }
        }
        Self {
            activations,
            len: x.len()
        }
    }

    /// # Overview
    ///
    /// Wraps pre-packed activation masks.
    ///
    /// Padding bits beyond `len` are kept as given; clause evaluation masks
    /// them out.
    #[must_use]
    pub fn from_masks(activations: Vec<LaneMask>, len: usize) -> Self {
        debug_assert_eq!(activations.len(), block_count(len));
        Self { activations, len }
    }

    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    #[must_use]
    pub fn activations(&self) -> &[LaneMask] {
        &self.activations
    }

    /// # Overview
    ///
    /// Whether feature `k` is active.
    #[inline]
    #[must_use]
    pub fn is_active(&self, k: usize) -> bool {
        k < self.len && self.activations[k / LANES] & (1 << (k % LANES)) != 0
    }
}

/// # Overview
///
/// Packs binary input into 16-lane blocks.
#[inline]
#[must_use]
pub fn pack_input(x: &[u8]) -> PackedSample {
    PackedSample::pack(x)
}

/// # Overview
///
/// Packs multiple inputs for batch processing.
#[inline]
#[must_use]
pub fn pack_batch(xs: &[Vec<u8>]) -> Vec<PackedSample> {
    xs.iter().map(|x| PackedSample::pack(x)).collect()
}
