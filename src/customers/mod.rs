pub mod stats;

pub use stats::recalculate;
