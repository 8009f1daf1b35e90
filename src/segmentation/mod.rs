pub mod criteria;
pub mod engine;

pub use criteria::{AmountRange, CountRange, SegmentCriteria};
pub use engine::{assign_segment, recalculate_all};
