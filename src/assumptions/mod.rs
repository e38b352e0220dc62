//! Model assumptions: the static table, its built-in defaults and CSV loader,
//! and per-scenario resolution

mod defaults;
mod periods;
mod resolved;
mod table;
pub mod loader;

pub use periods::{Period, PeriodKind, PeriodRange};
pub use resolved::{ResolvedAssumption, ResolvedAssumptions};
pub use table::{Assumption, AssumptionTable, ScenarioValues, Schedule, Segment};
pub use loader::DEFAULT_ASSUMPTIONS_PATH;
