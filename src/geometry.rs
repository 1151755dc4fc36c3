//! Vertex generation for the shape variants. All functions fill a caller-owned buffer so the
//! allocation made at shape construction is reused on every update.

use std::f32::consts::PI;

use crate::command::Point;

/// Number of triangles in an ellipse fan.
pub const ELLIPSE_SEGMENTS: usize = 80;

pub const LINE_VERTICES: usize = 2;
pub const QUAD_VERTICES: usize = 6;
pub const ELLIPSE_VERTICES: usize = ELLIPSE_SEGMENTS * 3;

/// Texture coordinates for the two quad triangles, in the same corner order as
/// [`centered_quad`]. `v` is flipped so row zero of the image lands on the top edge.
pub const QUAD_TEX_COORDS: [[f32; 2]; QUAD_VERTICES] = [
    [0.0, 1.0],
    [1.0, 1.0],
    [0.0, 0.0],
    [1.0, 1.0],
    [0.0, 0.0],
    [1.0, 0.0],
];

/// Two endpoints: the start point and the end point.
pub fn line(vertices: &mut Vec<[f32; 2]>, start: Point, end: Point) {
    vertices.clear();
    vertices.push([start.x, start.y]);
    vertices.push([end.x, end.y]);
}

fn quad_corners(center: Point, size: Point) -> [[f32; 2]; QUAD_VERTICES] {
    let half_width = size.x / 2.0;
    let half_height = size.y / 2.0;
    let (left, right) = (center.x - half_width, center.x + half_width);
    let (bottom, top) = (center.y - half_height, center.y + half_height);
    [
        [left, bottom],
        [right, bottom],
        [left, top],
        [right, bottom],
        [left, top],
        [right, top],
    ]
}

/// Two triangles covering the axis-aligned box of `size` centred on `center`.
pub fn centered_quad(vertices: &mut Vec<[f32; 2]>, center: Point, size: Point) {
    vertices.clear();
    vertices.extend_from_slice(&quad_corners(center, size));
}

/// Same box as [`centered_quad`], with each position followed by its texture coordinate.
pub fn textured_quad(vertices: &mut Vec<[f32; 2]>, center: Point, size: Point) {
    vertices.clear();
    for (position, tex_coord) in quad_corners(center, size).iter().zip(QUAD_TEX_COORDS) {
        vertices.push(*position);
        vertices.push(tex_coord);
    }
}

/// A fan of [`ELLIPSE_SEGMENTS`] triangles approximating the ellipse inscribed in the box of
/// `size` centred on `center`. Always recomputed in full.
pub fn ellipse_fan(vertices: &mut Vec<[f32; 2]>, center: Point, size: Point) {
    vertices.clear();
    let radius_x = size.x * 0.5;
    let radius_y = size.y * 0.5;
    let boundary = |segment: usize| {
        let theta = segment as f32 / ELLIPSE_SEGMENTS as f32 * 2.0 * PI;
        [
            center.x + radius_x * theta.cos(),
            center.y + radius_y * theta.sin(),
        ]
    };
    for segment in 0..ELLIPSE_SEGMENTS {
        vertices.push([center.x, center.y]);
        vertices.push(boundary(segment));
        vertices.push(boundary(segment + 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn bounds(points: &[[f32; 2]]) -> ([f32; 2], [f32; 2]) {
        let mut min = [f32::MAX; 2];
        let mut max = [f32::MIN; 2];
        for point in points {
            for axis in 0..2 {
                min[axis] = min[axis].min(point[axis]);
                max[axis] = max[axis].max(point[axis]);
            }
        }
        (min, max)
    }

    #[test]
    fn quad_is_centered_box() {
        let mut vertices = Vec::new();
        centered_quad(&mut vertices, Point::new(2.0, -1.0), Point::new(4.0, 2.0));
        assert_eq!(vertices.len(), QUAD_VERTICES);
        assert_eq!(bounds(&vertices), ([0.0, -2.0], [4.0, 0.0]));
    }

    #[test]
    fn textured_quad_interleaves_positions_and_unit_square() {
        let mut vertices = Vec::new();
        textured_quad(&mut vertices, Point::new(0.0, 0.0), Point::new(2.0, 2.0));
        assert_eq!(vertices.len(), QUAD_VERTICES * 2);
        let positions: Vec<_> = vertices.iter().step_by(2).copied().collect();
        let tex_coords: Vec<_> = vertices.iter().skip(1).step_by(2).copied().collect();
        assert_eq!(bounds(&positions), ([-1.0, -1.0], [1.0, 1.0]));
        assert_eq!(tex_coords, QUAD_TEX_COORDS.to_vec());
        // Bottom-left corner samples the last image row.
        assert_eq!(vertices[0], [-1.0, -1.0]);
        assert_eq!(vertices[1], [0.0, 1.0]);
    }

    #[test]
    fn ellipse_has_fixed_segment_count() {
        let mut vertices = Vec::new();
        for size in [1.0, 10.0, 0.0] {
            ellipse_fan(&mut vertices, Point::new(1.0, 1.0), Point::new(size, size * 2.0));
            assert_eq!(vertices.len(), ELLIPSE_VERTICES);
        }
    }

    #[test]
    fn ellipse_touches_its_bounding_box() {
        let mut vertices = Vec::new();
        ellipse_fan(&mut vertices, Point::new(1.0, 2.0), Point::new(4.0, 2.0));
        let (min, max) = bounds(&vertices);
        assert!((min[0] + 1.0).abs() < EPSILON);
        assert!((max[0] - 3.0).abs() < EPSILON);
        assert!((min[1] - 1.0).abs() < EPSILON);
        assert!((max[1] - 3.0).abs() < EPSILON);
        for triangle in vertices.chunks(3) {
            assert_eq!(triangle[0], [1.0, 2.0]);
        }
    }

    #[test]
    fn line_is_start_and_end() {
        let mut vertices = Vec::new();
        line(&mut vertices, Point::new(0.0, 1.0), Point::new(3.0, 4.0));
        assert_eq!(vertices, vec![[0.0, 1.0], [3.0, 4.0]]);
    }
}
