//! Output collaborators for a completed run
//!
//! A renderer turns a `ModelRun` into bytes in one format. Renderers are
//! picked by format name or file extension; the engine never depends on them.

mod csv_renderer;
mod json_renderer;
mod markdown_renderer;

use std::path::Path;

use crate::error::{ModelError, ModelResult};
use crate::model::ModelRun;

pub use csv_renderer::CsvRenderer;
pub use json_renderer::JsonRenderer;
pub use markdown_renderer::MarkdownRenderer;

/// Rendered document
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutput {
    /// Format name, e.g. "md"
    pub format: &'static str,
    pub bytes: Vec<u8>,
}

impl RenderOutput {
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

/// Writes a run in one output format
pub trait Renderer: Send + Sync {
    /// Canonical format name
    fn format(&self) -> &'static str;

    /// Format names and extensions this renderer handles
    fn extensions(&self) -> &'static [&'static str];

    /// Whether this renderer handles `format` (a name or extension, with or
    /// without the leading dot, any case)
    fn accepts(&self, format: &str) -> bool {
        let format = format.trim().trim_start_matches('.').to_ascii_lowercase();
        self.extensions().iter().any(|e| *e == format)
    }

    fn render(&self, run: &ModelRun) -> ModelResult<RenderOutput>;
}

/// Every built-in renderer
pub fn renderers() -> Vec<Box<dyn Renderer>> {
    vec![
        Box::new(MarkdownRenderer),
        Box::new(CsvRenderer),
        Box::new(JsonRenderer::default()),
    ]
}

fn no_renderer(format: &str, available: &[&str]) -> ModelError {
    ModelError::Render(format!(
        "no renderer for format {:?} (available: {})",
        format,
        available.join(", ")
    ))
}

fn path_extension(path: &Path) -> ModelResult<&str> {
    path.extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| ModelError::Render(format!("{} has no file extension", path.display())))
}

/// Renderer for a format name or extension
pub fn renderer_for(format: &str) -> ModelResult<Box<dyn Renderer>> {
    let all = renderers();
    let available: Vec<&'static str> = all.iter().map(|r| r.format()).collect();
    all.into_iter()
        .find(|r| r.accepts(format))
        .ok_or_else(|| no_renderer(format, &available))
}

/// Renderer chosen from a path's extension
pub fn renderer_for_path(path: &Path) -> ModelResult<Box<dyn Renderer>> {
    renderer_for(path_extension(path)?)
}

struct Registration {
    renderer: Box<dyn Renderer>,
    priority: f64,
}

/// Renderers tried in priority order when looking up a format
///
/// Lower priority values are tried first; equal priorities keep registration
/// order. The default registry holds the built-in renderers at priority 0.0,
/// so a renderer registered below that overrides a built-in format.
pub struct RendererRegistry {
    entries: Vec<Registration>,
}

impl RendererRegistry {
    /// Registry with no renderers
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn register(&mut self, renderer: Box<dyn Renderer>, priority: f64) {
        let at = self
            .entries
            .iter()
            .position(|e| e.priority > priority)
            .unwrap_or(self.entries.len());
        self.entries.insert(at, Registration { renderer, priority });
    }

    /// Canonical format names in lookup order
    pub fn formats(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.renderer.format()).collect()
    }

    pub fn find(&self, format: &str) -> ModelResult<&dyn Renderer> {
        self.entries
            .iter()
            .find(|e| e.renderer.accepts(format))
            .map(|e| e.renderer.as_ref())
            .ok_or_else(|| no_renderer(format, &self.formats()))
    }

    pub fn find_for_path(&self, path: &Path) -> ModelResult<&dyn Renderer> {
        self.find(path_extension(path)?)
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for renderer in renderers() {
            registry.register(renderer, 0.0);
        }
        registry
    }
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("formats", &self.formats())
            .finish()
    }
}
