//! Stage implementations, one module per pipeline step

pub mod segment_revenue;
pub mod segment_pl;
pub mod consolidated_pl;
pub mod balance_sheet;
pub mod cash_flow;
pub mod dcf;
pub mod sensitivity;
pub mod ratios;

pub use dcf::{DcfInputs, DcfValuation};
pub use sensitivity::{SensitivityConfig, SensitivityGrid};
