//! Data access port trait.

use crate::domain::bar::Bar;
use crate::domain::error::RulebtError;

pub trait DataPort {
    /// Load the full bar sequence, sorted by date.
    fn load_bars(&self) -> Result<Vec<Bar>, RulebtError>;
}
