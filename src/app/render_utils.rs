use eframe::egui::{Color32, Painter, Pos2, Rect, Vec2};

use crate::graph::NodeKind;
use crate::util::stable_pair;

const STAR_COUNT: u32 = 240;

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn kind_color(kind: NodeKind) -> Color32 {
    let (r, g, b) = kind.rgb();
    Color32::from_rgb(r, g, b)
}

/// World-space radius of a node: `2 + importance * 2`.
pub(super) fn node_world_radius(importance: f32) -> f32 {
    2.0 + importance.clamp(0.0, 1.0) * 2.0
}

/// Screen radius for a node of `importance` seen at `scale` pixels per unit.
pub(super) fn node_radius(importance: f32, scale: f32, emphasis: f32) -> f32 {
    (node_world_radius(importance) * scale * emphasis).clamp(2.0, 40.0)
}

/// Dark backdrop with a fixed star field that drifts slowly with the camera yaw.
pub(super) fn draw_background(painter: &Painter, rect: Rect, yaw: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(10, 12, 18));

    let drift = yaw * 60.0;
    for star in 0..STAR_COUNT {
        let (sx, sy) = stable_pair(star);
        let (brightness, size) = stable_pair(star.wrapping_mul(7919));
        let x = rect.left() + (((sx + 1.0) * 0.5 * rect.width()) + drift).rem_euclid(rect.width());
        let y = rect.top() + ((sy + 1.0) * 0.5 * rect.height());
        let alpha = (40.0 + (brightness + 1.0) * 60.0) as u8;
        painter.circle_filled(
            Pos2::new(x, y),
            0.6 + (size + 1.0) * 0.4,
            Color32::from_rgba_unmultiplied(200, 210, 230, alpha),
        );
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    if max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom() {
        return false;
    }

    if rect.contains(start) || rect.contains(end) {
        return true;
    }

    let top_left = rect.left_top();
    let top_right = rect.right_top();
    let bottom_left = rect.left_bottom();
    let bottom_right = rect.right_bottom();

    segments_intersect(start, end, top_left, top_right)
        || segments_intersect(start, end, top_right, bottom_right)
        || segments_intersect(start, end, bottom_right, bottom_left)
        || segments_intersect(start, end, bottom_left, top_left)
}

fn segments_intersect(a1: Pos2, a2: Pos2, b1: Pos2, b2: Pos2) -> bool {
    fn cross(o: Pos2, a: Pos2, b: Pos2) -> f32 {
        let oa: Vec2 = a - o;
        let ob: Vec2 = b - o;
        (oa.x * ob.y) - (oa.y * ob.x)
    }

    let c1 = cross(a1, a2, b1);
    let c2 = cross(a1, a2, b2);
    let c3 = cross(b1, b2, a1);
    let c4 = cross(b1, b2, a2);

    (c1 <= 0.0 && c2 >= 0.0 || c1 >= 0.0 && c2 <= 0.0)
        && (c3 <= 0.0 && c4 >= 0.0 || c3 >= 0.0 && c4 <= 0.0)
}
