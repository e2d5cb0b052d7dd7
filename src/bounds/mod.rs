//! Validated box and draw counts
//!
//! Every run is parameterized by a number of boxes and a number of draws. The
//! number of boxes must be at least 2, and the number of draws must lie in the
//! closed interval `[boxes / 2, boxes]`. Capping the draws at the number of
//! boxes is what guarantees the open-addressing strategies always find an
//! empty box.
//!
//! # Example
//!
//! ```
//! use hashsim::bounds::{BoxCount, DrawRange};
//!
//! let boxes = BoxCount::new(10)?;
//! let range = DrawRange::new(boxes);
//! assert_eq!((range.min(), range.max()), (5, 10));
//! assert!(range.contains(7));
//! assert!(!range.contains(4));
//! # Ok::<(), hashsim::error::BoundsError>(())
//! ```

use crate::error::BoundsError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest accepted number of boxes
pub const MIN_BOXES: usize = 2;

/// Largest number of boxes the application surface accepts
///
/// The engine itself has no upper bound; this limit only applies to
/// configuration validation.
pub const MAX_BOXES: usize = 10_000;

/// A number of boxes, at least [`MIN_BOXES`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct BoxCount(usize);

impl BoxCount {
    /// Validate a raw number of boxes
    pub fn new(value: i64) -> Result<Self, BoundsError> {
        if value < MIN_BOXES as i64 {
            return Err(BoundsError::InvalidBoxCount { value });
        }
        let boxes = usize::try_from(value).map_err(|_| BoundsError::InvalidBoxCount { value })?;
        Ok(Self(boxes))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl TryFrom<i64> for BoxCount {
    type Error = BoundsError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for BoxCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed interval of valid draw counts for a given number of boxes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawRange {
    min: usize,
    max: usize,
}

impl DrawRange {
    pub fn new(boxes: BoxCount) -> Self {
        Self {
            min: boxes.get() / 2,
            max: boxes.get(),
        }
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn contains(&self, draws: i64) -> bool {
        draws >= self.min as i64 && draws <= self.max as i64
    }

    /// Check a raw draw count against this range
    pub fn check(&self, draws: i64) -> Result<usize, BoundsError> {
        if !self.contains(draws) {
            return Err(BoundsError::InvalidDrawCount {
                value: draws,
                min: self.min,
                max: self.max,
            });
        }
        // contains() guarantees 0 <= draws <= max
        Ok(draws as usize)
    }
}

impl fmt::Display for DrawRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Box limits accepted by the application surface: `[MIN_BOXES, MAX_BOXES]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxesRange {
    min: usize,
    max: usize,
}

impl BoxesRange {
    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn contains(&self, boxes: i64) -> bool {
        boxes >= self.min as i64 && boxes <= self.max as i64
    }

    pub fn check(&self, boxes: i64) -> Result<BoxCount, BoundsError> {
        if !self.contains(boxes) {
            return Err(BoundsError::BoxCountOutOfRange {
                value: boxes,
                min: self.min,
                max: self.max,
            });
        }
        BoxCount::new(boxes)
    }
}

impl Default for BoxesRange {
    fn default() -> Self {
        Self {
            min: MIN_BOXES,
            max: MAX_BOXES,
        }
    }
}

/// Validated parameters of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunBounds {
    pub boxes: BoxCount,
    pub draws: usize,
}

impl RunBounds {
    /// Validate a raw box count and draw count together
    ///
    /// An invalid box count is reported as an invalid draw count whose source
    /// is the box count error, since the draw range cannot be derived.
    pub fn new(boxes: i64, draws: i64) -> Result<Self, BoundsError> {
        let boxes = BoxCount::new(boxes).map_err(|e| BoundsError::InvalidDrawCountForBoxes {
            value: draws,
            source: Box::new(e),
        })?;
        let draws = DrawRange::new(boxes).check(draws)?;
        Ok(Self { boxes, draws })
    }

    pub fn draw_range(&self) -> DrawRange {
        DrawRange::new(self.boxes)
    }
}
