use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::layout_engine::{LayoutChild, LayoutContainer, RequestMode, Size};

/// A container described in a file: its children in stacking order and,
/// optionally, the axis it wants negotiated first.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    #[serde(default)]
    pub request_mode: Option<RequestMode>,
    #[serde(default)]
    pub children: Vec<SceneChild>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SceneChild {
    #[serde(default)]
    pub name: String,
    pub width: f64,
    pub height: f64,
    #[serde(default = "yes")]
    pub visible: bool,
}

fn yes() -> bool { true }

impl SceneChild {
    pub fn new(name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            visible: true,
        }
    }
}

impl LayoutChild for SceneChild {
    fn is_visible(&self) -> bool { self.visible }

    fn natural_size(&self) -> Size { Size::new(self.width.max(0.0), self.height.max(0.0)) }
}

impl LayoutContainer for Scene {
    type Child = SceneChild;

    fn children(&self) -> &[SceneChild] { &self.children }

    fn request_mode(&self) -> RequestMode { self.request_mode.unwrap_or_default() }
}

impl Scene {
    pub fn read(path: &Path) -> anyhow::Result<Scene> {
        let buf = std::fs::read_to_string(path)
            .with_context(|| format!("reading scene from {}", path.display()))?;
        Self::parse(&buf).with_context(|| format!("parsing scene {}", path.display()))
    }

    pub fn parse(buf: &str) -> anyhow::Result<Scene> { Ok(ron::from_str(buf)?) }

    /// Fills in the request mode when the scene does not name one.
    pub fn with_default_request_mode(mut self, request_mode: RequestMode) -> Self {
        self.request_mode.get_or_insert(request_mode);
        self
    }

    pub fn child_name(&self, index: usize) -> Option<&str> {
        self.children.get(index).map(|child| child.name.as_str())
    }
}
