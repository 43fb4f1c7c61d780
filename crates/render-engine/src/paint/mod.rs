//! Per-kind painters. Each draws in the element's local box, with the
//! origin at its top-left corner and `(w, h)` at the bottom-right.

pub mod chart;
pub mod shapes;
pub mod text;
pub mod widgets;

use instavid_project_model::{Element, ElementContent};

use crate::animation::AnimationFrame;
use crate::surface::Surface;

/// Draw `element` as resolved in `frame`. The curve transform is applied
/// around the element centre, then the content is painted.
pub fn paint_element(surface: &mut dyn Surface, element: &Element, frame: &AnimationFrame) {
    let v = frame.transform;
    let (w, h) = (element.width, element.height);
    let (cx, cy) = element.center();

    surface.save();
    surface.multiply_alpha(v.opacity);
    if v.blur > 0.0 {
        surface.set_blur(v.blur);
    }
    surface.translate(cx + v.offset_x, cy + v.offset_y);
    if v.rotation != 0.0 {
        surface.rotate(v.rotation);
    }
    if v.scale != 1.0 {
        surface.scale(v.scale, v.scale);
    }
    surface.translate(-w / 2.0, -h / 2.0);

    match &element.content {
        ElementContent::Text(t) => text::paint_text(surface, t, element.animation, frame, w, h),
        ElementContent::Chart(c) => chart::paint_chart(surface, c, frame.eased, w, h),
        ElementContent::Counter(c) => widgets::paint_counter(surface, c, frame.eased, w, h),
        ElementContent::Progress(p) => widgets::paint_progress(surface, p, frame.eased, w, h),
        ElementContent::Shape(s) => shapes::paint_shape(surface, s, frame.eased, w, h),
    }

    surface.restore();
}
