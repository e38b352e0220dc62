//! Assumptions resolved for a single scenario

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::periods::PeriodRange;
use super::table::Segment;
use crate::model::{Unit, Value};
use crate::scenario::Scenario;

/// One assumption as a series aligned to the run's periods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAssumption {
    pub name: String,
    pub unit: Unit,
    pub note: Option<String>,
    pub values: Vec<Value>,
}

/// Every assumption of the table, resolved for one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAssumptions {
    pub scenario: Scenario,
    pub unit_label: String,
    pub periods: PeriodRange,
    pub segments: Vec<Segment>,
    pub(crate) values: BTreeMap<String, ResolvedAssumption>,
}

impl ResolvedAssumptions {
    pub fn get(&self, name: &str) -> Option<&ResolvedAssumption> {
        self.values.get(name)
    }

    pub fn values(&self, name: &str) -> Option<&[Value]> {
        self.values.get(name).map(|a| a.values.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedAssumption> {
        self.values.values()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}
