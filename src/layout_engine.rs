use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::Span;

pub mod container;
pub mod dynamic_table;
pub mod geometry;
pub mod notify;
pub mod request;

pub use container::{LayoutChild, LayoutContainer};
pub use dynamic_table::{DynamicTableLayout, GridMetrics, LayoutError, compute_grid};
pub use geometry::{Point, Rect, Size, SizeRequest, constraint};
pub use notify::{LayoutEvent, Notifier, Property, PropertyValue};
pub use request::{RequestMode, SizingMode};

/// Layout events travel with the span that was current when they were raised.
pub type EventSender = UnboundedSender<(Span, LayoutEvent)>;
pub type EventReceiver = UnboundedReceiver<(Span, LayoutEvent)>;

pub fn event_channel() -> (EventSender, EventReceiver) { unbounded_channel() }
