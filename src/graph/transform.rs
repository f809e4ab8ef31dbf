//! Parent-relative node transform.
//!
//! Rotation is stored as Euler angles in degrees and applied in fixed
//! Z-Y-X order; the local matrix is recomposed lazily when a property
//! changed during the tick.

use nalgebra_glm as glm;

use crate::component::property::Property;

/// Composes translation * Rz * Ry * Rx * scale, angles in degrees.
pub fn compose_matrix(position: [f32; 3], rotation_deg: [f32; 3], scale: [f32; 3]) -> glm::Mat4 {
    let t = glm::translation(&glm::Vec3::from(position));
    let rz = glm::rotation(rotation_deg[2].to_radians(), &glm::vec3(0.0, 0.0, 1.0));
    let ry = glm::rotation(rotation_deg[1].to_radians(), &glm::vec3(0.0, 1.0, 0.0));
    let rx = glm::rotation(rotation_deg[0].to_radians(), &glm::vec3(1.0, 0.0, 0.0));
    let s = glm::scaling(&glm::Vec3::from(scale));
    t * rz * ry * rx * s
}

/// Splits a TRS matrix back into position, Z-Y-X Euler degrees and scale.
/// Assumes no shear (the document schema cannot express it).
pub fn decompose_matrix(m: &glm::Mat4) -> ([f32; 3], [f32; 3], [f32; 3]) {
    let position = [m[(0, 3)], m[(1, 3)], m[(2, 3)]];

    let mut cols = [
        glm::vec3(m[(0, 0)], m[(1, 0)], m[(2, 0)]),
        glm::vec3(m[(0, 1)], m[(1, 1)], m[(2, 1)]),
        glm::vec3(m[(0, 2)], m[(1, 2)], m[(2, 2)]),
    ];
    let mut scale = [cols[0].norm(), cols[1].norm(), cols[2].norm()];

    // A negative determinant means one axis is mirrored.
    if glm::determinant(m) < 0.0 {
        scale[0] = -scale[0];
    }
    for i in 0..3 {
        if scale[i] != 0.0 {
            cols[i] /= scale[i];
        }
    }

    // R = Rz * Ry * Rx, so r20 = -sin(y)
    let sy = (-cols[0].z).clamp(-1.0, 1.0);
    let y = sy.asin();
    let (x, z) = if sy.abs() < 0.9999 {
        (cols[1].z.atan2(cols[2].z), cols[0].y.atan2(cols[0].x))
    } else {
        // Gimbal lock: fold roll into yaw
        (0.0, (-cols[1].x).atan2(cols[1].y))
    };

    let rotation = [x.to_degrees(), y.to_degrees(), z.to_degrees()];
    (position, rotation, scale)
}

pub fn matrix_is_identity(m: &glm::Mat4) -> bool {
    let identity = glm::Mat4::identity();
    m.iter()
        .zip(identity.iter())
        .all(|(a, b)| (a - b).abs() < 1e-5)
}

pub fn matrix_to_array(m: &glm::Mat4) -> [f32; 16] {
    let mut out = [0.0f32; 16];
    out.copy_from_slice(m.as_slice());
    out
}

pub fn matrix_from_array(values: &[f32; 16]) -> glm::Mat4 {
    glm::Mat4::from_column_slice(values)
}

pub struct Transform {
    pub position: Property<[f32; 3]>,
    pub rotation: Property<[f32; 3]>,
    pub scale: Property<[f32; 3]>,
    matrix: glm::Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Property::new([0.0; 3]),
            rotation: Property::new([0.0; 3]),
            scale: Property::new([1.0; 3]),
            matrix: glm::Mat4::identity(),
        }
    }
}

impl Transform {
    pub fn from_matrix(m: &glm::Mat4) -> Self {
        let (position, rotation, scale) = decompose_matrix(m);
        Self {
            position: Property::new(position),
            rotation: Property::new(rotation),
            scale: Property::new(scale),
            matrix: *m,
        }
    }

    pub fn from_trs(
        position: Option<[f32; 3]>,
        rotation: Option<[f32; 3]>,
        scale: Option<[f32; 3]>,
    ) -> Self {
        let position = position.unwrap_or([0.0; 3]);
        let rotation = rotation.unwrap_or([0.0; 3]);
        let scale = scale.unwrap_or([1.0; 3]);
        Self {
            position: Property::new(position),
            rotation: Property::new(rotation),
            scale: Property::new(scale),
            matrix: compose_matrix(position, rotation, scale),
        }
    }

    /// Recomposes the local matrix if any property changed this tick.
    /// Returns true if the matrix was updated.
    pub fn update(&mut self) -> bool {
        let changed = self.position.take_changed()
            | self.rotation.take_changed()
            | self.scale.take_changed();
        if changed {
            self.matrix =
                compose_matrix(self.position.value(), self.rotation.value(), self.scale.value());
        }
        changed
    }

    pub fn local_matrix(&self) -> &glm::Mat4 {
        &self.matrix
    }

    pub fn is_identity(&self) -> bool {
        matrix_is_identity(&self.matrix)
    }
}
