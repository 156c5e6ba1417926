pub mod impact;
pub mod insights;
pub mod metrics;
