//! Three-statement model: line items, stages, consistency checks and the engine

mod checks;
mod engine;
mod line_item;
pub mod names;
mod run;
pub mod series;
mod stage;
pub mod stages;
mod state;

pub use checks::{run_consistency_checks, CheckResult, ConsistencyCheck, DEFAULT_TOLERANCE};
pub use engine::{ModelConfig, ModelEngine};
pub use line_item::{LineItem, Scalar, Unit, Value, NOT_MEANINGFUL};
pub use run::{ModelRun, RunSummary};
pub use stage::{Stage, StageOutput};
pub use stages::{DcfInputs, DcfValuation, SensitivityConfig, SensitivityGrid};
pub use state::{ModelState, StageInputs};
