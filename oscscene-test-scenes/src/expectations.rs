use oscscene::{Backend, Registry, ShapeKind};

/// What the registry should hold for one object id after a scene has been applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Expected {
    /// The id must not be registered.
    Absent,
    /// The id must be registered as `kind`, with its geometry positions spanning `min..max`.
    Shape {
        kind: ShapeKind,
        min: [f32; 2],
        max: [f32; 2],
        color: [f32; 4],
        /// Number of stored points, including texture coordinates for images.
        points: usize,
    },
}

/// A single registry expectation to validate after draining a scene.
pub struct GeometryExpectation {
    pub object_id: &'static str,
    pub expected: Expected,
    /// Absolute tolerance for bounds and color comparisons (default 1e-4).
    pub tolerance: f32,
    /// Human-readable label for failure messages.
    pub label: &'static str,
}

impl GeometryExpectation {
    pub fn absent(object_id: &'static str, label: &'static str) -> Self {
        Self {
            object_id,
            expected: Expected::Absent,
            tolerance: 1e-4,
            label,
        }
    }

    /// Expect a shape whose positions span the box of `size` centred on `center`.
    pub fn centered(
        object_id: &'static str,
        kind: ShapeKind,
        center: [f32; 2],
        size: [f32; 2],
        color: [f32; 4],
        label: &'static str,
    ) -> Self {
        let half = [size[0].abs() / 2.0, size[1].abs() / 2.0];
        let points = match kind {
            ShapeKind::Line => 2,
            ShapeKind::Rect => 6,
            ShapeKind::Ellipse => 240,
            ShapeKind::Image => 12,
        };
        Self {
            object_id,
            expected: Expected::Shape {
                kind,
                min: [center[0] - half[0], center[1] - half[1]],
                max: [center[0] + half[0], center[1] + half[1]],
                color,
                points,
            },
            tolerance: 1e-4,
            label,
        }
    }

    /// Expect a line from `start` to `end`.
    pub fn line(
        object_id: &'static str,
        start: [f32; 2],
        end: [f32; 2],
        color: [f32; 4],
        label: &'static str,
    ) -> Self {
        Self {
            object_id,
            expected: Expected::Shape {
                kind: ShapeKind::Line,
                min: [start[0].min(end[0]), start[1].min(end[1])],
                max: [start[0].max(end[0]), start[1].max(end[1])],
                color,
                points: 2,
            },
            tolerance: 1e-4,
            label,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Validates registry expectations.
///
/// Returns a list of human-readable failure descriptions. An empty list means all
/// expectations passed.
pub fn check_geometry<B: Backend>(
    registry: &Registry<B>,
    expectations: &[GeometryExpectation],
) -> Vec<String> {
    let mut failures = Vec::new();

    for expectation in expectations {
        let shape = registry.get(expectation.object_id);
        let (shape, kind, min, max, color, points) = match (&expectation.expected, shape) {
            (Expected::Absent, None) => continue,
            (Expected::Absent, Some(shape)) => {
                failures.push(format!(
                    "[{}] {:?} should be absent but is a {:?}",
                    expectation.label,
                    expectation.object_id,
                    shape.kind(),
                ));
                continue;
            }
            (Expected::Shape { .. }, None) => {
                failures.push(format!(
                    "[{}] {:?} is not registered",
                    expectation.label, expectation.object_id,
                ));
                continue;
            }
            (
                Expected::Shape {
                    kind,
                    min,
                    max,
                    color,
                    points,
                },
                Some(shape),
            ) => (shape, *kind, *min, *max, *color, *points),
        };

        if shape.kind() != kind {
            failures.push(format!(
                "[{}] {:?} expected a {:?} but got a {:?}",
                expectation.label,
                expectation.object_id,
                kind,
                shape.kind(),
            ));
            continue;
        }

        if shape.vertices().len() != points {
            failures.push(format!(
                "[{}] {:?} expected {} points but got {}",
                expectation.label,
                expectation.object_id,
                points,
                shape.vertices().len(),
            ));
            continue;
        }

        let step = if kind == ShapeKind::Image { 2 } else { 1 };
        let (actual_min, actual_max) = bounds(shape.vertices().iter().step_by(step));
        let tolerance = expectation.tolerance;
        if !close(&actual_min, &min, tolerance) || !close(&actual_max, &max, tolerance) {
            failures.push(format!(
                "[{}] {:?} expected bounds {:?}..{:?} ±{} but got {:?}..{:?}",
                expectation.label,
                expectation.object_id,
                min,
                max,
                tolerance,
                actual_min,
                actual_max,
            ));
        }

        let actual_color = shape.color().to_array();
        if !close(&actual_color, &color, tolerance) {
            failures.push(format!(
                "[{}] {:?} expected color {:?} ±{} but got {:?}",
                expectation.label, expectation.object_id, color, tolerance, actual_color,
            ));
        }
    }

    failures
}

fn bounds<'a>(points: impl Iterator<Item = &'a [f32; 2]>) -> ([f32; 2], [f32; 2]) {
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

fn close(actual: &[f32], expected: &[f32], tolerance: f32) -> bool {
    actual
        .iter()
        .zip(expected)
        .all(|(actual, expected)| (actual - expected).abs() <= tolerance)
}
