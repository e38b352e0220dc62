//! JSON dump of the complete run

use super::{RenderOutput, Renderer};
use crate::error::{ModelError, ModelResult};
use crate::model::ModelRun;

#[derive(Debug, Clone, Copy)]
pub struct JsonRenderer {
    pub pretty: bool,
}

impl Default for JsonRenderer {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl Renderer for JsonRenderer {
    fn format(&self) -> &'static str {
        "json"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn render(&self, run: &ModelRun) -> ModelResult<RenderOutput> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(run)
        } else {
            serde_json::to_vec(run)
        }
        .map_err(|e| ModelError::Render(format!("json: {}", e)))?;

        Ok(RenderOutput {
            format: self.format(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelEngine;
    use crate::scenario::Scenario;

    #[test]
    fn test_undefined_values_are_null() {
        let run = ModelEngine::default().run_model(Scenario::Base).unwrap();
        let out = JsonRenderer { pretty: false }.render(&run).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out.bytes).unwrap();

        assert_eq!(value["scenario"], "Base");
        let items = value["line_items"].as_array().unwrap();
        let ending_cash = items.iter().find(|i| i["name"] == "cf.ending_cash").unwrap();
        assert!(ending_cash["values"][0].is_null());
        assert_eq!(value["checks"].as_array().unwrap().len(), 4);
    }
}
