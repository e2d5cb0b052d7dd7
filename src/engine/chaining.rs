//! Chaining strategy
//!
//! Draws one box uniformly and drops the ball into it. Boxes have no capacity
//! limit, so collisions simply stack.

use super::{CancelToken, Placement};
use crate::bins::{Bin, BinOps};
use crate::distribution::IndexSource;
use crate::error::EngineError;

pub(crate) fn place(
    bins: &mut [Bin],
    source: &mut dyn IndexSource,
    _cancel: &CancelToken,
) -> Result<Option<Placement>, EngineError> {
    let index = source.next_index(bins.len());
    bins[index].place(None)?;

    Ok(Some(Placement {
        index,
        probes: 1,
        first_choice: true,
    }))
}
