//! Committed board change

use serde::{Deserialize, Serialize};

use crate::palette::ColorIndex;

/// One committed pixel mutation, fanned out to every push subscriber
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeEvent {
    pub x: usize,
    pub y: usize,
    pub color: ColorIndex,
}

impl ChangeEvent {
    /// Create change event
    pub fn new(x: usize, y: usize, color: ColorIndex) -> Self {
        Self { x, y, color }
    }
}
