//! Domain models for the medscan system.

mod comparison;
mod finding;
mod report;
mod scan;
pub mod severity;

pub use comparison::*;
pub use finding::*;
pub use report::*;
pub use scan::*;
pub use severity::SeverityLevel;
