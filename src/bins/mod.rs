//! Boxes that receive balls
//!
//! Two flavors of box exist:
//!
//! - [`CountingBin`]: holds any number of balls. Used by the chaining and
//!   double-choice strategies.
//! - [`SingleBallBin`]: holds zero or one ball and remembers whether the ball
//!   landed at its first probed position ([`BinColor::Green`]) or was displaced
//!   there by probing ([`BinColor::Red`]). Used by the open-addressing
//!   strategies.
//!
//! Both are wrapped in the closed [`Bin`] enum and share the [`BinOps`]
//! capability trait, which is all the strategies need.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Contract violation on a single bin
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BinError {
    #[error("Box {id} already holds a ball and cannot receive another one")]
    AlreadyFull { id: usize },

    #[error("Box {id} cannot hold {balls} balls, the maximum is 1")]
    TooManyBalls { id: usize, balls: u32 },

    #[error("Box {id} ball counter overflowed")]
    Overflow { id: usize },

    #[error("Box {id} does not match the placement: colored placements need a single-ball box")]
    WrongKind { id: usize },
}

/// Placement tag of an open-addressing box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinColor {
    /// The ball landed at the first probed position
    Green,
    /// The ball was displaced by probing
    Red,
}

impl Default for BinColor {
    fn default() -> Self {
        Self::Green
    }
}

impl fmt::Display for BinColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Green => write!(f, "green"),
            Self::Red => write!(f, "red"),
        }
    }
}

/// Capabilities shared by every box flavor
pub trait BinOps {
    fn id(&self) -> usize;

    fn balls(&self) -> u32;

    /// Add one ball, returning the new count
    fn increment(&mut self) -> Result<u32, BinError>;

    fn clear(&mut self);

    fn is_empty(&self) -> bool {
        self.balls() == 0
    }
}

/// Box with an unbounded ball count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountingBin {
    id: usize,
    balls: u32,
    /// Largest count any box reached in the run that filled this one
    max_balls: u32,
}

impl CountingBin {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            balls: 0,
            max_balls: 0,
        }
    }

    pub fn set_balls(&mut self, balls: u32) {
        self.balls = balls;
    }

    /// Remove one ball; does nothing on an empty box
    pub fn decrement(&mut self) {
        if self.balls > 0 {
            self.balls -= 1;
        }
    }

    pub fn max_balls(&self) -> u32 {
        self.max_balls
    }

    pub fn set_max_balls(&mut self, max_balls: u32) {
        self.max_balls = max_balls;
    }
}

impl BinOps for CountingBin {
    fn id(&self) -> usize {
        self.id
    }

    fn balls(&self) -> u32 {
        self.balls
    }

    fn increment(&mut self) -> Result<u32, BinError> {
        self.balls = self
            .balls
            .checked_add(1)
            .ok_or(BinError::Overflow { id: self.id })?;
        Ok(self.balls)
    }

    fn clear(&mut self) {
        self.balls = 0;
    }
}

/// Box holding at most one ball
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleBallBin {
    id: usize,
    balls: u32,
    color: BinColor,
}

impl SingleBallBin {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            balls: 0,
            color: BinColor::default(),
        }
    }

    pub fn color(&self) -> BinColor {
        self.color
    }

    pub fn set_color(&mut self, color: BinColor) {
        self.color = color;
    }

    pub fn set_balls(&mut self, balls: u32) -> Result<(), BinError> {
        if balls > 1 {
            return Err(BinError::TooManyBalls { id: self.id, balls });
        }
        self.balls = balls;
        Ok(())
    }

    /// Put the ball in this box with the given color
    pub fn place(&mut self, color: BinColor) -> Result<(), BinError> {
        self.increment()?;
        self.color = color;
        Ok(())
    }

    /// True when the box holds a ball that landed at its first probe
    pub fn is_first_choice(&self) -> bool {
        self.balls == 1 && self.color == BinColor::Green
    }
}

impl BinOps for SingleBallBin {
    fn id(&self) -> usize {
        self.id
    }

    fn balls(&self) -> u32 {
        self.balls
    }

    fn increment(&mut self) -> Result<u32, BinError> {
        if self.balls >= 1 {
            return Err(BinError::AlreadyFull { id: self.id });
        }
        self.balls = 1;
        Ok(self.balls)
    }

    fn clear(&mut self) {
        self.balls = 0;
        self.color = BinColor::default();
    }
}

/// A box of either flavor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Bin {
    Counting(CountingBin),
    SingleBall(SingleBallBin),
}

impl Bin {
    pub fn counting(id: usize) -> Self {
        Self::Counting(CountingBin::new(id))
    }

    pub fn single_ball(id: usize) -> Self {
        Self::SingleBall(SingleBallBin::new(id))
    }

    /// Color of an open-addressing box, `None` for counting boxes
    pub fn color(&self) -> Option<BinColor> {
        match self {
            Self::Counting(_) => None,
            Self::SingleBall(bin) => Some(bin.color()),
        }
    }

    /// Add one ball, returning the new count
    ///
    /// Counting boxes take uncolored balls, single-ball boxes take colored ones.
    pub fn place(&mut self, color: Option<BinColor>) -> Result<u32, BinError> {
        match (self, color) {
            (Self::Counting(bin), None) => bin.increment(),
            (Self::SingleBall(bin), Some(color)) => {
                bin.place(color)?;
                Ok(bin.balls())
            }
            (bin, _) => Err(BinError::WrongKind { id: bin.id() }),
        }
    }

    pub fn as_single_ball_mut(&mut self) -> Option<&mut SingleBallBin> {
        match self {
            Self::SingleBall(bin) => Some(bin),
            Self::Counting(_) => None,
        }
    }

    pub fn as_counting_mut(&mut self) -> Option<&mut CountingBin> {
        match self {
            Self::Counting(bin) => Some(bin),
            Self::SingleBall(_) => None,
        }
    }
}

impl BinOps for Bin {
    fn id(&self) -> usize {
        match self {
            Self::Counting(bin) => bin.id(),
            Self::SingleBall(bin) => bin.id(),
        }
    }

    fn balls(&self) -> u32 {
        match self {
            Self::Counting(bin) => bin.balls(),
            Self::SingleBall(bin) => bin.balls(),
        }
    }

    fn increment(&mut self) -> Result<u32, BinError> {
        match self {
            Self::Counting(bin) => bin.increment(),
            Self::SingleBall(bin) => bin.increment(),
        }
    }

    fn clear(&mut self) {
        match self {
            Self::Counting(bin) => bin.clear(),
            Self::SingleBall(bin) => bin.clear(),
        }
    }
}

impl fmt::Display for Bin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.color() {
            Some(color) => write!(f, "box {}: {} ball(s) [{}]", self.id(), self.balls(), color),
            None => write!(f, "box {}: {} ball(s)", self.id(), self.balls()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting_bin_increment() {
        let mut bin = CountingBin::new(3);
        assert_eq!(bin.increment(), Ok(1));
        assert_eq!(bin.increment(), Ok(2));
        assert_eq!(bin.balls(), 2);
        assert_eq!(bin.id(), 3);
    }

    #[test]
    fn test_counting_bin_overflow() {
        let mut bin = CountingBin::new(0);
        bin.set_balls(u32::MAX);
        assert_eq!(bin.increment(), Err(BinError::Overflow { id: 0 }));
        assert_eq!(bin.balls(), u32::MAX);
    }

    #[test]
    fn test_counting_bin_decrement_at_zero() {
        let mut bin = CountingBin::new(0);
        bin.decrement();
        assert_eq!(bin.balls(), 0);
        bin.set_balls(2);
        bin.decrement();
        assert_eq!(bin.balls(), 1);
        bin.clear();
        assert!(bin.is_empty());
    }

    #[test]
    fn test_single_ball_bin_rejects_second_ball() {
        let mut bin = SingleBallBin::new(5);
        bin.place(BinColor::Red).unwrap();
        assert_eq!(bin.balls(), 1);
        assert_eq!(bin.color(), BinColor::Red);
        assert!(!bin.is_first_choice());

        assert_eq!(bin.place(BinColor::Green), Err(BinError::AlreadyFull { id: 5 }));
        // Failed placement leaves the box untouched
        assert_eq!(bin.color(), BinColor::Red);
        assert_eq!(bin.balls(), 1);
    }

    #[test]
    fn test_single_ball_bin_set_balls() {
        let mut bin = SingleBallBin::new(1);
        assert!(bin.set_balls(1).is_ok());
        assert_eq!(bin.set_balls(2), Err(BinError::TooManyBalls { id: 1, balls: 2 }));
        bin.clear();
        assert_eq!(bin.balls(), 0);
    }

    #[test]
    fn test_first_choice_flag() {
        let mut bin = SingleBallBin::new(0);
        assert!(!bin.is_first_choice());
        bin.place(BinColor::Green).unwrap();
        assert!(bin.is_first_choice());
    }

    #[test]
    fn test_bin_enum_dispatch() {
        let mut counting = Bin::counting(0);
        let mut single = Bin::single_ball(1);
        assert_eq!(counting.color(), None);
        assert_eq!(single.color(), Some(BinColor::Green));

        counting.increment().unwrap();
        counting.increment().unwrap();
        single.increment().unwrap();
        assert_eq!(counting.balls(), 2);
        assert!(single.increment().is_err());
        assert!(counting.as_single_ball_mut().is_none());
        assert!(single.as_single_ball_mut().is_some());
    }

    #[test]
    fn test_bin_place_checks_kind() {
        let mut counting = Bin::counting(0);
        let mut single = Bin::single_ball(1);
        assert_eq!(counting.place(None), Ok(1));
        assert_eq!(single.place(Some(BinColor::Red)), Ok(1));
        assert_eq!(single.color(), Some(BinColor::Red));

        assert_eq!(counting.place(Some(BinColor::Green)), Err(BinError::WrongKind { id: 0 }));
        assert_eq!(Bin::single_ball(2).place(None), Err(BinError::WrongKind { id: 2 }));
    }

    #[test]
    fn test_bin_display() {
        let mut bin = Bin::single_ball(2);
        bin.as_single_ball_mut().unwrap().place(BinColor::Red).unwrap();
        assert_eq!(bin.to_string(), "box 2: 1 ball(s) [red]");
        assert_eq!(Bin::counting(4).to_string(), "box 4: 0 ball(s)");
    }
}
