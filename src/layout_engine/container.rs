use crate::layout_engine::geometry::Size;
use crate::layout_engine::request::RequestMode;

/// A child element as seen by the layout: whether it takes part, and how
/// large it would like to be when unconstrained.
pub trait LayoutChild {
    fn is_visible(&self) -> bool;
    fn natural_size(&self) -> Size;
}

/// The host element whose children are arranged. Children are visited in
/// `children()` order and allocations refer back to indices of that slice.
pub trait LayoutContainer {
    type Child: LayoutChild;

    fn children(&self) -> &[Self::Child];

    fn request_mode(&self) -> RequestMode { RequestMode::default() }
}

impl<T: LayoutChild + ?Sized> LayoutChild for &T {
    fn is_visible(&self) -> bool { (**self).is_visible() }

    fn natural_size(&self) -> Size { (**self).natural_size() }
}

impl<T: LayoutChild + ?Sized> LayoutChild for Box<T> {
    fn is_visible(&self) -> bool { (**self).is_visible() }

    fn natural_size(&self) -> Size { (**self).natural_size() }
}

/// Iterates the visible children together with their index in the container.
pub(crate) fn visible_children<C: LayoutChild>(
    children: &[C],
) -> impl Iterator<Item = (usize, &C)> + '_ {
    children.iter().enumerate().filter(|(_, child)| child.is_visible())
}
