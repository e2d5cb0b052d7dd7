//! Double-choice strategy (power of two choices)
//!
//! Draws two boxes independently and drops the ball into the less filled one.
//! The first draw wins when both indices are equal or when its box holds no
//! more balls than the second; the second draw only wins on a strictly lower
//! count.

use super::{CancelToken, Placement};
use crate::bins::{Bin, BinOps};
use crate::distribution::IndexSource;
use crate::error::EngineError;

pub(crate) fn place(
    bins: &mut [Bin],
    source: &mut dyn IndexSource,
    _cancel: &CancelToken,
) -> Result<Option<Placement>, EngineError> {
    let first = source.next_index(bins.len());
    let second = source.next_index(bins.len());

    let index = if first == second || bins[first].balls() <= bins[second].balls() {
        first
    } else {
        second
    };
    bins[index].place(None)?;

    Ok(Some(Placement {
        index,
        probes: 2,
        first_choice: index == first,
    }))
}
