//! Placement strategies.

use core::fmt;
use core::str::FromStr;

use crate::error::HeapError;

/// Decides which free block serves an allocation request.
///
/// All strategies scan the free set in its current order (ascending address
/// after every public heap operation) and only consider blocks at least as long as the request.
/// Ties are always resolved in favour of the block scanned first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// The first block that is long enough, regardless of the leftover.
    #[default]
    FirstFit,
    /// The block leaving the smallest leftover.
    BestFit,
    /// The block leaving the largest leftover.
    WorstFit,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::FirstFit, Strategy::BestFit, Strategy::WorstFit];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::FirstFit => "first-fit",
            Strategy::BestFit => "best-fit",
            Strategy::WorstFit => "worst-fit",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = HeapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "first-fit" | "firstfit" | "first" => Ok(Strategy::FirstFit),
            "best-fit" | "bestfit" | "best" => Ok(Strategy::BestFit),
            "worst-fit" | "worstfit" | "worst" => Ok(Strategy::WorstFit),
            _ => Err(HeapError::UnknownStrategy(s.to_owned())),
        }
    }
}
