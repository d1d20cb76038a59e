use thiserror::Error;
use tracing::{debug, warn};

use crate::common::config::TableSettings;
use crate::layout_engine::EventSender;
use crate::layout_engine::container::{LayoutContainer, visible_children};
use crate::layout_engine::geometry::{Rect, SizeRequest, constraint};
use crate::layout_engine::notify::{Notifier, Property, PropertyValue};
use crate::layout_engine::request::SizingMode;

mod compute;
pub use compute::{GridMetrics, compute_grid};

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("{property} must be a non-negative finite number, got {value}")]
    InvalidSpacing { property: Property, value: f64 },
    #[error("row-spacing and column-spacing must be non-negative finite numbers, got {0}")]
    InvalidSharedSpacing(f64),
    #[error("property {0} is read-only")]
    ReadOnlyProperty(Property),
}

/// Arranges the visible children of a container in a table whose rows and
/// columns grow and shrink with the number of children.
///
/// Every column shares one width, every row is as tall as its tallest child.
/// The grid is recomputed on each measurement and allocation pass; changes to
/// the child count, row count or column count are reported as
/// [`LayoutEvent::PropertyChanged`](crate::layout_engine::LayoutEvent) once
/// the pass completes.
pub struct DynamicTableLayout {
    row_spacing: f64,
    column_spacing: f64,
    metrics: GridMetrics,
    stale: bool,
    notifier: Notifier,
}

impl Default for DynamicTableLayout {
    fn default() -> Self { Self::new(None) }
}

impl DynamicTableLayout {
    pub fn new(events: Option<EventSender>) -> Self {
        Self {
            row_spacing: 0.0,
            column_spacing: 0.0,
            metrics: GridMetrics::empty(0.0, 0.0),
            stale: true,
            notifier: Notifier::new(events),
        }
    }

    pub fn with_settings(
        settings: &TableSettings,
        events: Option<EventSender>,
    ) -> Result<Self, LayoutError> {
        check_spacing(Property::RowSpacing, settings.row_spacing)?;
        check_spacing(Property::ColumnSpacing, settings.column_spacing)?;

        let mut layout = Self::new(events);
        layout.row_spacing = settings.row_spacing;
        layout.column_spacing = settings.column_spacing;
        layout.metrics = GridMetrics::empty(layout.row_spacing, layout.column_spacing);
        Ok(layout)
    }

    pub fn number_children(&self) -> usize { self.metrics.number_children }

    pub fn rows(&self) -> usize { self.metrics.rows }

    pub fn columns(&self) -> usize { self.metrics.columns }

    pub fn row_spacing(&self) -> f64 { self.row_spacing }

    pub fn column_spacing(&self) -> f64 { self.column_spacing }

    pub fn column_coords(&self) -> &[f64] { &self.metrics.column_coords }

    pub fn row_coords(&self) -> &[f64] { &self.metrics.row_coords }

    /// Grid computed by the most recent pass.
    pub fn metrics(&self) -> &GridMetrics { &self.metrics }

    /// True when a spacing changed since the last pass.
    pub fn needs_layout(&self) -> bool { self.stale }

    pub fn set_row_spacing(&mut self, spacing: f64) -> Result<(), LayoutError> {
        check_spacing(Property::RowSpacing, spacing)?;
        if self.row_spacing != spacing {
            self.row_spacing = spacing;
            self.notifier.notify(Property::RowSpacing);
            self.invalidate();
        }
        Ok(())
    }

    pub fn set_column_spacing(&mut self, spacing: f64) -> Result<(), LayoutError> {
        check_spacing(Property::ColumnSpacing, spacing)?;
        if self.column_spacing != spacing {
            self.column_spacing = spacing;
            self.notifier.notify(Property::ColumnSpacing);
            self.invalidate();
        }
        Ok(())
    }

    /// Sets row and column spacing to the same value. Both properties are
    /// reported together if either of them changed.
    pub fn set_spacing(&mut self, spacing: f64) -> Result<(), LayoutError> {
        if !valid_spacing(spacing) {
            warn!("rejecting shared spacing of {spacing}");
            return Err(LayoutError::InvalidSharedSpacing(spacing));
        }
        if self.row_spacing != spacing || self.column_spacing != spacing {
            self.notifier.freeze();
            self.row_spacing = spacing;
            self.notifier.notify(Property::RowSpacing);
            self.column_spacing = spacing;
            self.notifier.notify(Property::ColumnSpacing);
            self.notifier.thaw();
            self.invalidate();
        }
        Ok(())
    }

    pub fn property(&self, property: Property) -> PropertyValue {
        match property {
            Property::RowSpacing => PropertyValue::Spacing(self.row_spacing),
            Property::ColumnSpacing => PropertyValue::Spacing(self.column_spacing),
            Property::NumberChildren => PropertyValue::Count(self.metrics.number_children),
            Property::Rows => PropertyValue::Count(self.metrics.rows),
            Property::Columns => PropertyValue::Count(self.metrics.columns),
        }
    }

    pub fn set_property(&mut self, property: Property, value: f64) -> Result<(), LayoutError> {
        if !property.is_writable() {
            warn!("refusing to write {property}");
            return Err(LayoutError::ReadOnlyProperty(property));
        }
        match property {
            Property::RowSpacing => self.set_row_spacing(value),
            Property::ColumnSpacing => self.set_column_spacing(value),
            Property::NumberChildren | Property::Rows | Property::Columns => {
                Err(LayoutError::ReadOnlyProperty(property))
            }
        }
    }

    /// Minimum and natural width of the table when its height is `for_height`
    /// (or unconstrained).
    pub fn preferred_width<T: LayoutContainer>(
        &mut self,
        container: &T,
        for_height: Option<f64>,
    ) -> SizeRequest {
        let metrics = self.update_layout_data(container, None, for_height.and_then(constraint));
        SizeRequest {
            min: metrics.min_width(),
            natural: metrics.natural_width(),
        }
    }

    /// Minimum and natural height of the table when its width is `for_width`
    /// (or unconstrained).
    pub fn preferred_height<T: LayoutContainer>(
        &mut self,
        container: &T,
        for_width: Option<f64>,
    ) -> SizeRequest {
        let metrics = self.update_layout_data(container, for_width.and_then(constraint), None);
        SizeRequest {
            min: metrics.min_height(),
            natural: metrics.natural_height(),
        }
    }

    /// Places every visible child of `container` inside `allocation`. Returns
    /// the index of each placed child in `children()` with its rectangle,
    /// relative to the container's own origin.
    pub fn allocate<T: LayoutContainer>(
        &mut self,
        container: &T,
        allocation: Rect,
    ) -> Vec<(usize, Rect)> {
        let width = constraint(allocation.width());
        let height = constraint(allocation.height());
        let metrics = self.update_layout_data(container, width, height);

        visible_children(container.children())
            .enumerate()
            .filter_map(|(position, (index, _))| {
                metrics.cell_rect(position).map(|rect| (index, rect))
            })
            .collect()
    }

    fn update_layout_data<T: LayoutContainer>(
        &mut self,
        container: &T,
        width: Option<f64>,
        height: Option<f64>,
    ) -> &GridMetrics {
        let mode = SizingMode::resolve(width, height, container.request_mode());
        let metrics =
            compute_grid(container.children(), mode, self.row_spacing, self.column_spacing);

        self.notifier.freeze();
        if metrics.number_children != self.metrics.number_children {
            self.notifier.notify(Property::NumberChildren);
        }
        if metrics.rows != self.metrics.rows {
            self.notifier.notify(Property::Rows);
        }
        if metrics.columns != self.metrics.columns {
            self.notifier.notify(Property::Columns);
        }
        debug!(
            ?mode,
            children = metrics.number_children,
            rows = metrics.rows,
            columns = metrics.columns,
            "updated table layout"
        );
        self.metrics = metrics;
        self.stale = false;
        self.notifier.thaw();

        &self.metrics
    }

    fn invalidate(&mut self) {
        self.stale = true;
        self.notifier.layout_changed();
    }
}

fn valid_spacing(value: f64) -> bool { value.is_finite() && value >= 0.0 }

fn check_spacing(property: Property, value: f64) -> Result<(), LayoutError> {
    if valid_spacing(value) {
        Ok(())
    } else {
        warn!("rejecting {property} of {value}");
        Err(LayoutError::InvalidSpacing { property, value })
    }
}
