pub mod constraints;
pub mod executor;
pub mod intent;

pub use constraints::{extract, ConstraintSet, TimeWindow};
pub use executor::execute;
pub use intent::{classify, Intent};
