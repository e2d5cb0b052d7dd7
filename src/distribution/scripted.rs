//! Scripted box indices
//!
//! Replays a fixed list of indices, wrapping back to the start when the list is
//! exhausted. Each index is reduced modulo the number of boxes.

use crate::distribution::IndexSource;

/// Replays a fixed sequence of indices
#[derive(Debug, Clone)]
pub struct ScriptedDistribution {
    indices: Vec<usize>,
    position: usize,
}

impl ScriptedDistribution {
    pub fn new(indices: impl Into<Vec<usize>>) -> Self {
        Self {
            indices: indices.into(),
            position: 0,
        }
    }

    /// Number of indices handed out so far
    pub fn consumed(&self) -> usize {
        self.position
    }
}

impl IndexSource for ScriptedDistribution {
    fn next_index(&mut self, num_boxes: usize) -> usize {
        if num_boxes == 0 || self.indices.is_empty() {
            return 0;
        }

        let index = self.indices[self.position % self.indices.len()];
        self.position += 1;

        index % num_boxes
    }
}
