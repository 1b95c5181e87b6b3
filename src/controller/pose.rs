//! Controller pose to transform conversion.

/// Pose of a source relative to the reference space: a column-major 4x4
/// transform matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub matrix: [f32; 16],
}

// Position, rotation (quaternion x, y, z, w) and scale of an object
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: [f32; 3],
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0; 3],
        }
    }
}

impl Pose {
    pub const IDENTITY: Self = Self {
        matrix: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub fn from_matrix(matrix: [f32; 16]) -> Self {
        Self { matrix }
    }

    pub fn from_translation(x: f32, y: f32, z: f32) -> Self {
        let mut pose = Self::IDENTITY;
        pose.matrix[12] = x;
        pose.matrix[13] = y;
        pose.matrix[14] = z;
        pose
    }

    /// Splits the matrix into position, rotation and scale.
    pub fn decompose(&self) -> Transform {
        let m = &self.matrix;
        let length = |c: usize| (m[c] * m[c] + m[c + 1] * m[c + 1] + m[c + 2] * m[c + 2]).sqrt();

        let mut sx = length(0);
        let sy = length(4);
        let sz = length(8);

        // A negative determinant means one axis is mirrored; fold it into x.
        let det = m[0] * (m[5] * m[10] - m[9] * m[6]) - m[4] * (m[1] * m[10] - m[9] * m[2])
            + m[8] * (m[1] * m[6] - m[5] * m[2]);
        if det < 0.0 {
            sx = -sx;
        }

        let safe = |s: f32| if s == 0.0 { 1.0 } else { s };
        let (ix, iy, iz) = (1.0 / safe(sx), 1.0 / safe(sy), 1.0 / safe(sz));

        // Row/column naming: rRC
        let r11 = m[0] * ix;
        let r21 = m[1] * ix;
        let r31 = m[2] * ix;
        let r12 = m[4] * iy;
        let r22 = m[5] * iy;
        let r32 = m[6] * iy;
        let r13 = m[8] * iz;
        let r23 = m[9] * iz;
        let r33 = m[10] * iz;

        let trace = r11 + r22 + r33;
        let rotation = if trace > 0.0 {
            let s = 0.5 / (trace + 1.0).sqrt();
            [(r32 - r23) * s, (r13 - r31) * s, (r21 - r12) * s, 0.25 / s]
        } else if r11 > r22 && r11 > r33 {
            let s = 2.0 * (1.0 + r11 - r22 - r33).sqrt();
            [0.25 * s, (r12 + r21) / s, (r13 + r31) / s, (r32 - r23) / s]
        } else if r22 > r33 {
            let s = 2.0 * (1.0 + r22 - r11 - r33).sqrt();
            [(r12 + r21) / s, 0.25 * s, (r23 + r32) / s, (r13 - r31) / s]
        } else {
            let s = 2.0 * (1.0 + r33 - r11 - r22).sqrt();
            [(r13 + r31) / s, (r23 + r32) / s, 0.25 * s, (r21 - r12) / s]
        };

        Transform {
            position: [m[12], m[13], m[14]],
            rotation,
            scale: [sx, sy, sz],
        }
    }
}
