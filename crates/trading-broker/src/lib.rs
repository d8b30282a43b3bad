//! Execution and balance collaborators.

mod paper;

pub use paper::PaperLedger;
