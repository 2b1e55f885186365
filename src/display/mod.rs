//! Plain-text renderings of a funnel report.
pub mod summary;
pub mod trace;

pub use summary::format_summary;
pub use trace::format_trace;
