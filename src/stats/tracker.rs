//! Most-filled box bookkeeping
//!
//! Every strategy reports each placement to a [`MaxFillTracker`], which keeps
//! the highest ball count seen so far and the set of boxes holding it.

use crate::error::format_indices;
use std::collections::BTreeSet;

/// Running maximum fill and the boxes that reach it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaxFillTracker {
    current_max: u32,
    indices_at_max: BTreeSet<usize>,
}

impl MaxFillTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that box `index` now holds `balls` balls
    ///
    /// A strictly larger count replaces the whole set; an equal count joins it.
    pub fn record(&mut self, index: usize, balls: u32) {
        if balls > self.current_max {
            self.current_max = balls;
            self.indices_at_max.clear();
        }

        if balls == self.current_max {
            self.indices_at_max.insert(index);
        }
    }

    pub fn current_max(&self) -> u32 {
        self.current_max
    }

    /// Box indices at the maximum, ascending
    pub fn indices(&self) -> Vec<usize> {
        self.indices_at_max.iter().copied().collect()
    }

    /// `"Most filled box(es) (k balls): i1, i2, ..."`
    pub fn summary(&self) -> String {
        format!(
            "Most filled box(es) ({} balls): {}",
            self.current_max,
            format_indices(&self.indices())
        )
    }
}
