//! Quadratic open-addressing strategy
//!
//! Each box holds at most one ball. A draw picks a random start `s` and probes
//! `(s + delta^2) mod boxes` for `delta = 0..=MAX_TRY`. If every probed box is
//! occupied, a new start is drawn, up to `MAX_COMPUTE` starts per draw. Only a
//! ball placed at the very first probe of the very first start is green.
//!
//! Unlike linear probing, the quadratic sequence does not visit every box, so
//! a draw can legitimately fail. That failure is reported as
//! [`EngineError::CannotComputeIndex`] with all the starts that were tried.

use super::{CancelToken, Placement};
use crate::bins::{Bin, BinColor, BinOps};
use crate::distribution::IndexSource;
use crate::error::EngineError;

/// Largest quadratic offset tried from one start
pub const MAX_TRY: usize = 50;

/// Starts drawn before giving up on a ball
pub const MAX_COMPUTE: usize = 3;

pub(crate) fn place(
    bins: &mut [Bin],
    source: &mut dyn IndexSource,
    cancel: &CancelToken,
) -> Result<Option<Placement>, EngineError> {
    let boxes = bins.len();
    let mut attempted_starts = Vec::with_capacity(MAX_COMPUTE);
    let mut probes = 0u64;

    for retry in 0..MAX_COMPUTE {
        if cancel.is_cancelled() {
            return Ok(None);
        }

        let start = source.next_index(boxes);
        attempted_starts.push(start);

        for delta in 0..=MAX_TRY {
            if cancel.is_cancelled() {
                return Ok(None);
            }

            let index = (start + delta * delta) % boxes;
            probes += 1;

            if bins[index].is_empty() {
                let first_choice = retry == 0 && delta == 0;
                let color = if first_choice { BinColor::Green } else { BinColor::Red };
                bins[index].place(Some(color))?;

                return Ok(Some(Placement {
                    index,
                    probes,
                    first_choice,
                }));
            }
        }
    }

    Err(EngineError::CannotComputeIndex {
        attempted_starts,
        max_try: MAX_TRY,
    })
}
