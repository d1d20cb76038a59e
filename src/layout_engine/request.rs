use serde::{Deserialize, Serialize};

/// Which axis a container prefers to be negotiated first. Only consulted when
/// both width and height are constrained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestMode {
    #[default]
    HeightForWidth,
    WidthForHeight,
}

/// How rows and columns are derived for one layout pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SizingMode {
    /// No constraint on either axis: a single row holding every child.
    Strip,
    /// The width is fixed, columns are fitted into it.
    HeightForWidth(f64),
    /// The height is fixed, rows are fitted into it.
    WidthForHeight(f64),
}

impl SizingMode {
    pub fn resolve(width: Option<f64>, height: Option<f64>, request_mode: RequestMode) -> Self {
        match (width, height) {
            (None, None) => SizingMode::Strip,
            (Some(width), None) => SizingMode::HeightForWidth(width),
            (None, Some(height)) => SizingMode::WidthForHeight(height),
            (Some(width), Some(height)) => match request_mode {
                RequestMode::HeightForWidth => SizingMode::HeightForWidth(width),
                RequestMode::WidthForHeight => SizingMode::WidthForHeight(height),
            },
        }
    }
}
