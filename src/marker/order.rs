use std::cmp::Ordering;

use nalgebra::Point2;

/// Whether `a` comes before `b` when walking around `center`.
///
/// Points right of (or on) the vertical through `center` come first. Two points
/// on that vertical are ordered by `y`, descending when either lies at or below
/// the center row, ascending otherwise. Everything else follows the sign of the
/// cross product `(center→a) × (center→b)`, negative first, and collinear points
/// are ordered nearest first.
pub fn precedes(center: Point2<f32>, a: Point2<f32>, b: Point2<f32>) -> bool {
    let a_offset = a - center;
    let b_offset = b - center;

    if a_offset.x >= 0.0 && b_offset.x < 0.0 {
        return true;
    }

    if a_offset.x < 0.0 && b_offset.x >= 0.0 {
        return false;
    }

    if a_offset.x == 0.0 && b_offset.x == 0.0 {
        if a_offset.y >= 0.0 || b_offset.y >= 0.0 {
            return a.y > b.y;
        }

        return b.y > a.y;
    }

    let det = a_offset.perp(&b_offset);

    if det < 0.0 {
        return true;
    }

    if det > 0.0 {
        return false;
    }

    a_offset.norm_squared() < b_offset.norm_squared()
}

pub fn compare(center: Point2<f32>, a: Point2<f32>, b: Point2<f32>) -> Ordering {
    if precedes(center, a, b) {
        Ordering::Less
    } else if precedes(center, b, a) {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

/// Sort `points` around `center` so consecutive cross products, loop closed,
/// are never positive. Sorting an already ordered set leaves it untouched.
pub fn order_around(points: &mut [Point2<f32>], center: Point2<f32>) {
    points.sort_by(|a, b| compare(center, *a, *b));
}

/// Cross products of consecutive corners seen from `center`, last one closing the loop.
pub fn winding(points: &[Point2<f32>], center: Point2<f32>) -> Vec<f32> {
    (0..points.len())
        .map(|index| {
            let a = points[index] - center;
            let b = points[(index + 1) % points.len()] - center;

            a.perp(&b)
        })
        .collect()
}
