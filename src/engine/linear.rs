//! Linear open-addressing strategy
//!
//! Each box holds at most one ball. A draw starts at a random box and walks
//! forward one box at a time, wrapping at the end, until it finds an empty
//! one. A ball placed at its start box is colored green, a ball that had to
//! walk is colored red.
//!
//! Because the number of draws never exceeds the number of boxes, an empty box
//! always exists. Walking all the way back to the start box means that
//! guarantee was broken, and the run fails with
//! [`EngineError::ProbeCycleDetected`].

use super::{CancelToken, Placement};
use crate::bins::{Bin, BinColor, BinOps};
use crate::distribution::IndexSource;
use crate::error::EngineError;

pub(crate) fn place(
    bins: &mut [Bin],
    source: &mut dyn IndexSource,
    cancel: &CancelToken,
) -> Result<Option<Placement>, EngineError> {
    let boxes = bins.len();
    let start = source.next_index(boxes);

    let mut index = start;
    let mut probes = 1u64;
    while !bins[index].is_empty() {
        if cancel.is_cancelled() {
            return Ok(None);
        }

        index = (index + 1) % boxes;
        probes += 1;

        if index == start {
            return Err(EngineError::ProbeCycleDetected { start, boxes });
        }
    }

    let first_choice = index == start;
    let color = if first_choice { BinColor::Green } else { BinColor::Red };
    bins[index].place(Some(color))?;

    Ok(Some(Placement {
        index,
        probes,
        first_choice,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::scripted::ScriptedDistribution;

    fn open_bins(n: usize) -> Vec<Bin> {
        (0..n).map(Bin::single_ball).collect()
    }

    #[test]
    fn test_empty_start_is_green() {
        let mut bins = open_bins(2);
        let mut source = ScriptedDistribution::new(vec![0]);
        let placement = place(&mut bins, &mut source, &CancelToken::new()).unwrap().unwrap();

        assert_eq!(placement.index, 0);
        assert_eq!(bins[0].balls(), 1);
        assert_eq!(bins[0].color(), Some(BinColor::Green));
        assert_eq!(bins[1].balls(), 0);
    }

    #[test]
    fn test_collision_wraps_and_is_red() {
        let mut bins = open_bins(3);
        let mut source = ScriptedDistribution::new(vec![2, 2]);
        let cancel = CancelToken::new();

        place(&mut bins, &mut source, &cancel).unwrap().unwrap();
        let placement = place(&mut bins, &mut source, &cancel).unwrap().unwrap();

        assert_eq!(placement.index, 0);
        assert_eq!(placement.probes, 2);
        assert!(!placement.first_choice);
        assert_eq!(bins[0].color(), Some(BinColor::Red));
    }

    #[test]
    fn test_full_table_detects_cycle() {
        let mut bins = open_bins(2);
        for bin in bins.iter_mut() {
            bin.place(Some(BinColor::Green)).unwrap();
        }
        let mut source = ScriptedDistribution::new(vec![1]);

        let err = place(&mut bins, &mut source, &CancelToken::new()).unwrap_err();
        assert_eq!(err, EngineError::ProbeCycleDetected { start: 1, boxes: 2 });
    }

    #[test]
    fn test_cancel_during_probe() {
        let mut bins = open_bins(3);
        bins[0].place(Some(BinColor::Green)).unwrap();
        let mut source = ScriptedDistribution::new(vec![0]);
        let cancel = CancelToken::new();
        cancel.cancel();

        assert_eq!(place(&mut bins, &mut source, &cancel), Ok(None));
        assert_eq!(bins[1].balls(), 0);
    }
}
