//! Whole-sound benchmarks through the engine and the offline host.

mod catalog;
mod overlap;

pub use catalog::bench_catalog;
pub use overlap::bench_overlap;
