use glam::Vec4;

/// Light source intensities (ambient, diffuse, specular).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ia: Vec4,
    pub id: Vec4,
    pub is: Vec4,
}

impl Default for Lighting {
    fn default() -> Self {
        Self { ia: Vec4::ONE, id: Vec4::ONE, is: Vec4::ONE }
    }
}

/// Surface reflectivity, republished from the mesh on every load.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ka: Vec4,
    pub kd: Vec4,
    pub ks: Vec4,
    pub shininess: f32,
}

impl Material {
    pub const MAX_SHININESS: f32 = 500.0;

    /// Takes whatever the MTL entry defines and keeps the defaults for the rest.
    pub fn from_mtl(mtl: &tobj::Material) -> Self {
        let defaults = Self::default();
        let rgb = |c: Option<[f32; 3]>, fallback: Vec4| {
            c.map(|[r, g, b]| Vec4::new(r, g, b, 1.0).clamp(Vec4::ZERO, Vec4::ONE))
                .unwrap_or(fallback)
        };
        Self {
            ka: rgb(mtl.ambient, defaults.ka),
            kd: rgb(mtl.diffuse, defaults.kd),
            ks: rgb(mtl.specular, defaults.ks),
            shininess: mtl
                .shininess
                .map(|s| s.clamp(0.0, Self::MAX_SHININESS))
                .unwrap_or(defaults.shininess),
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ka: Vec4::new(0.1, 0.1, 0.1, 1.0),
            kd: Vec4::new(0.7, 0.7, 0.7, 1.0),
            ks: Vec4::ONE,
            shininess: 25.0,
        }
    }
}

/// How the texture shader derives UV coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MappingMode {
    #[default]
    Triplanar = 0,
    Cylindrical = 1,
    Spherical = 2,
    FromMesh = 3,
}

impl MappingMode {
    pub const ALL: [MappingMode; 4] = [
        MappingMode::Triplanar,
        MappingMode::Cylindrical,
        MappingMode::Spherical,
        MappingMode::FromMesh,
    ];

    /// Mesh texture coordinates when the mesh has them, triplanar otherwise.
    pub fn for_mesh(has_uv: bool) -> Self {
        if has_uv {
            MappingMode::FromMesh
        } else {
            MappingMode::Triplanar
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MappingMode::Triplanar => "Triplanar",
            MappingMode::Cylindrical => "Cylindrical",
            MappingMode::Spherical => "Spherical",
            MappingMode::FromMesh => "From mesh",
        }
    }

    /// Modes offered by the GUI; "From mesh" needs texture coordinates.
    pub fn available(has_uv: bool) -> &'static [MappingMode] {
        if has_uv {
            &Self::ALL
        } else {
            &Self::ALL[..3]
        }
    }

    pub fn as_uniform(self) -> i32 {
        self as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_mode_for_mesh() {
        assert_eq!(MappingMode::for_mesh(true), MappingMode::FromMesh);
        assert_eq!(MappingMode::for_mesh(false), MappingMode::Triplanar);
        assert_eq!(MappingMode::FromMesh.as_uniform(), 3);
        assert!(!MappingMode::available(false).contains(&MappingMode::FromMesh));
    }

    #[test]
    fn test_material_from_partial_mtl() {
        let mtl = tobj::Material {
            diffuse: Some([0.5, 0.25, 2.0]),
            shininess: Some(900.0),
            ..Default::default()
        };
        let material = Material::from_mtl(&mtl);
        assert_eq!(material.ka, Material::default().ka);
        assert_eq!(material.kd, Vec4::new(0.5, 0.25, 1.0, 1.0));
        assert_eq!(material.shininess, Material::MAX_SHININESS);
    }
}
