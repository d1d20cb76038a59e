use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use tracing::{Span, trace};

use crate::layout_engine::EventSender;

/// Observable quantities of a table layout. Names are the kebab-case strings
/// used by `Property::from_str` and `Display`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Property {
    RowSpacing,
    ColumnSpacing,
    NumberChildren,
    Rows,
    Columns,
}

impl Property {
    pub fn is_writable(self) -> bool {
        matches!(self, Property::RowSpacing | Property::ColumnSpacing)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Count(usize),
    Spacing(f64),
}

impl PropertyValue {
    pub fn as_f64(self) -> f64 {
        match self {
            PropertyValue::Count(count) => count as f64,
            PropertyValue::Spacing(spacing) => spacing,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[serde(tag = "type", content = "property")]
pub enum LayoutEvent {
    /// The value of a property changed.
    PropertyChanged(Property),
    /// The layout must be recomputed before the next allocation is trusted.
    LayoutChanged,
}

/// Delivers layout events, holding property notifications back while frozen.
///
/// Freezing nests. Notifications raised while frozen are delivered once the
/// outermost `thaw` runs, each property at most once, in the order they were
/// first raised.
#[derive(Default)]
pub struct Notifier {
    events: Option<EventSender>,
    freeze_count: u32,
    pending: Vec<Property>,
}

impl Notifier {
    pub fn new(events: Option<EventSender>) -> Self {
        Self {
            events,
            freeze_count: 0,
            pending: Vec::new(),
        }
    }

    pub fn is_frozen(&self) -> bool { self.freeze_count > 0 }

    pub fn freeze(&mut self) { self.freeze_count += 1; }

    pub fn thaw(&mut self) {
        debug_assert!(self.freeze_count > 0, "thaw without matching freeze");
        self.freeze_count = self.freeze_count.saturating_sub(1);
        if self.freeze_count == 0 {
            for property in std::mem::take(&mut self.pending) {
                self.emit(LayoutEvent::PropertyChanged(property));
            }
        }
    }

    pub fn notify(&mut self, property: Property) {
        if self.is_frozen() {
            if !self.pending.contains(&property) {
                self.pending.push(property);
            }
        } else {
            self.emit(LayoutEvent::PropertyChanged(property));
        }
    }

    pub fn layout_changed(&mut self) { self.emit(LayoutEvent::LayoutChanged); }

    fn emit(&self, event: LayoutEvent) {
        trace!(?event, "layout event");
        if let Some(events) = &self.events {
            // A closed receiver only means nobody listens for changes anymore.
            _ = events.send((Span::current(), event));
        }
    }
}
