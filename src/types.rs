use crate::error::{LouvainError, Result};

/// Dense vertex index inside one graph level.
pub type VInt = u32;

slotmap::new_key_type! {
    /// Key of a live community inside one partition. Keys of removed communities are never
    /// handed out again.
    pub struct CommId;
}

/// A community at the current level, given as its ordered members.
pub type Members = Vec<VInt>;

/// Dense vertex ids `0..count`, without casting.
#[inline]
pub(crate) fn vint_range(count: usize) -> impl Iterator<Item = VInt> {
    (0..=VInt::MAX).take(count)
}

/// Turn a dense index into a `VInt`, refusing indices that do not fit.
#[inline]
pub(crate) fn to_vint(index: usize) -> Result<VInt> {
    VInt::try_from(index).map_err(|_| LouvainError::VertexOverflow { index })
}
