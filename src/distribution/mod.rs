//! Box index sources
//!
//! Every strategy draws box indices from an [`IndexSource`]. Production runs use
//! [`uniform::UniformDistribution`]; tests force exact sequences with
//! [`scripted::ScriptedDistribution`] so that tie-breaks, probe sequences and
//! exhaustion paths can be reproduced.
//!
//! # Example
//!
//! ```
//! use hashsim::distribution::{IndexSource, uniform::UniformDistribution};
//!
//! let mut dist = UniformDistribution::with_seed(7);
//! let index = dist.next_index(16); // Random box in range [0, 16)
//! assert!(index < 16);
//! ```

/// Source of box indices
///
/// # Thread Safety
///
/// Sources must be `Send` so a run can be moved onto its worker thread. Each run
/// owns its own source; nothing is shared between runs.
pub trait IndexSource: Send {
    /// Next box index in the range `[0, num_boxes)`
    ///
    /// Returns 0 when `num_boxes` is 0.
    fn next_index(&mut self, num_boxes: usize) -> usize;
}

impl<S: IndexSource + ?Sized> IndexSource for Box<S> {
    fn next_index(&mut self, num_boxes: usize) -> usize {
        (**self).next_index(num_boxes)
    }
}

pub mod scripted;
pub mod uniform;
