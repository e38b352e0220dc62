//! IB Model - deterministic three-statement financial model engine
//!
//! This library provides:
//! - A scenario-scoped assumption table (built-in defaults or CSV files)
//! - Segment revenue and P&L, consolidated P&L, balance sheet and cash flow
//! - DCF valuation with a WACC x terminal growth sensitivity grid
//! - Ratio analysis and cross-statement consistency checks
//! - Markdown, CSV and JSON renderers for a completed run

pub mod assumptions;
pub mod error;
pub mod model;
pub mod render;
pub mod scenario;

// Re-export commonly used types
pub use assumptions::{AssumptionTable, ResolvedAssumptions};
pub use error::{ModelError, ModelResult};
pub use model::{CheckResult, ModelConfig, ModelEngine, ModelRun, Stage};
pub use render::{renderer_for, Renderer, RendererRegistry};
pub use scenario::{Scenario, ScenarioRunner};
