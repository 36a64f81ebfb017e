//! Pointer hit-testing
//!
//! Cup paths are recorded in canvas (CSS pixel) space with their rotation
//! already applied, so pointer offsets can be tested directly.

use glam::Vec2;

use crate::renderer::Path;

/// Even-odd point-in-polygon test. No path (nothing rendered yet) is a miss.
pub fn is_point_in_shape(x: f32, y: f32, path: Option<&Path>) -> bool {
    let Some(path) = path else {
        return false;
    };
    let points = path.points();
    if points.len() < 3 {
        return false;
    }

    let p = Vec2::new(x, y);
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let cross_x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < cross_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::shapes::cup_path;

    #[test]
    fn test_no_path_is_a_miss() {
        assert!(!is_point_in_shape(0.0, 0.0, None));
        assert!(!is_point_in_shape(f32::NAN, 1e9, None));
    }

    #[test]
    fn test_square() {
        let square = Path::from_points(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ]);
        assert!(is_point_in_shape(5.0, 5.0, Some(&square)));
        assert!(!is_point_in_shape(15.0, 5.0, Some(&square)));
        assert!(!is_point_in_shape(5.0, -1.0, Some(&square)));
    }

    #[test]
    fn test_flush_cup() {
        let path = cup_path(Vec2::new(100.0, 300.0), 0.0);
        // Middle of the cup body
        assert!(is_point_in_shape(150.0, 240.0, Some(&path)));
        // Just above the rim and beside the base
        assert!(!is_point_in_shape(150.0, 160.0, Some(&path)));
        assert!(!is_point_in_shape(95.0, 295.0, Some(&path)));
        assert!(!is_point_in_shape(210.0, 240.0, Some(&path)));
    }

    #[test]
    fn test_lifted_cup_uses_rotated_outline() {
        let base = Vec2::new(100.0, 300.0);
        let flush = cup_path(base, 0.0);
        let lifted = cup_path(base, 60.0);
        // Lower-right of the flush body swings away when lifted
        assert!(is_point_in_shape(190.0, 290.0, Some(&flush)));
        assert!(!is_point_in_shape(190.0, 290.0, Some(&lifted)));
        // The lifted cup leans over to the upper-left of its pivot
        assert!(is_point_in_shape(70.0, 250.0, Some(&lifted)));
        assert!(!is_point_in_shape(70.0, 250.0, Some(&flush)));
    }
}
