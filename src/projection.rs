/// Orthographic projection for the shared scene space.
///
/// The scene is one unit tall and centred on the origin: `y` spans `[-0.5, 0.5]` and `x` spans
/// `[-aspect / 2, aspect / 2]`. Depth is scaled by `1 / (far - near)`.
///
/// The matrix is stored column-major, ready to be uploaded as a `mat4x4<f32>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection([f32; 16]);

impl Projection {
    pub const NEAR: f32 = 0.0;
    pub const FAR: f32 = 100.0;

    /// Builds the projection for a surface of the given physical size.
    ///
    /// # Examples
    ///
    /// ```
    /// use oscscene::Projection;
    ///
    /// let projection = Projection::orthographic(640, 480);
    /// // The top edge of the scene maps to the top of clip space.
    /// assert_eq!(projection.apply(0.0, 0.5), (0.0, 1.0));
    /// ```
    pub fn orthographic(width: u32, height: u32) -> Self {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let depth = 1.0 / (Self::FAR - Self::NEAR);
        Self([
            2.0 / aspect,
            0.0,
            0.0,
            0.0,
            // column 1
            0.0,
            2.0,
            0.0,
            0.0,
            // column 2
            0.0,
            0.0,
            depth,
            0.0,
            // column 3
            0.0,
            0.0,
            -Self::NEAR * depth,
            1.0,
        ])
    }

    pub fn to_cols_array(&self) -> [f32; 16] {
        self.0
    }

    /// Projects a scene point into clip space.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        let m = &self.0;
        (m[0] * x + m[4] * y + m[12], m[1] * x + m[5] * y + m[13])
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::orthographic(1, 1)
    }
}
