use std::path::{Path, PathBuf};

use super::{AssetError, Material};
use crate::utils::{Mesh, Vertex};

/// What the rest of the viewer needs to know about the loaded mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    pub path: PathBuf,
    pub triangles: u32,
    pub has_uv: bool,
    pub material: Material,
}

/// A parsed, standardized mesh together with its material constants.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub mesh: Mesh,
    pub has_uv: bool,
    pub material: Material,
    pub path: PathBuf,
}

impl MeshData {
    /// Loads an OBJ file, resolving `mtllib` references next to it.
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let source = std::fs::read_to_string(path).map_err(|e| AssetError::io(path, e))?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::parse(&source, path, |mtl| tobj::load_mtl(base_dir.join(mtl)))
    }

    /// Parses OBJ text. `path` is only used for error messages and `ModelInfo`.
    pub fn parse<F>(source: &str, path: &Path, material_loader: F) -> Result<Self, AssetError>
    where
        F: Fn(&Path) -> tobj::MTLLoadResult,
    {
        let load_opts = tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        };
        let (models, materials) = tobj::load_obj_buf(&mut source.as_bytes(), &load_opts, material_loader)
            .map_err(|source| AssetError::Obj { path: path.to_path_buf(), source })?;

        let materials = materials.unwrap_or_else(|e| {
            tracing::warn!("Ignoring materials of {}: {}", path.display(), e);
            Vec::new()
        });

        let has_uv = !models.is_empty() && models.iter().all(|m| !m.mesh.texcoords.is_empty());
        let has_normals = !models.is_empty() && models.iter().all(|m| !m.mesh.normals.is_empty());

        let mut mesh = Mesh::default();
        for model in &models {
            let m = &model.mesh;
            let start = mesh.vertices.len() as u32;
            for i in 0..m.positions.len() / 3 {
                let normal = m.normals.get(3 * i..3 * i + 3).map_or([0.0; 3], |n| [n[0], n[1], n[2]]);
                let uv = m.texcoords.get(2 * i..2 * i + 2).map_or([0.0; 2], |t| [t[0], t[1]]);
                mesh.vertices.push(Vertex {
                    pos: [m.positions[3 * i], m.positions[3 * i + 1], m.positions[3 * i + 2]],
                    normal,
                    uv,
                });
            }
            mesh.indices.extend(m.indices.iter().map(|&idx| start + idx));
        }

        if mesh.is_empty() {
            return Err(AssetError::EmptyMesh(path.to_path_buf()));
        }

        mesh.standardize();
        if !has_normals {
            mesh.compute_normals();
        }

        let material = models
            .iter()
            .find_map(|m| m.mesh.material_id)
            .and_then(|id| materials.get(id))
            .map(Material::from_mtl)
            .unwrap_or_default();

        Ok(Self { mesh, has_uv, material, path: path.to_path_buf() })
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            path: self.path.clone(),
            triangles: self.mesh.triangle_count(),
            has_uv: self.has_uv,
            material: self.material,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    const QUAD_OBJ: &str = "\
mtllib quad.mtl
v 0 0 0
v 4 0 0
v 4 2 0
v 0 2 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
usemtl fur
f 1/1 2/2 3/3 4/4
";

    const QUAD_MTL: &str = "\
newmtl fur
Ka 0.2 0.2 0.2
Kd 0.9 0.5 0.1
Ks 0.3 0.3 0.3
Ns 64
";

    fn no_materials(_: &Path) -> tobj::MTLLoadResult {
        Ok(Default::default())
    }

    #[test]
    fn test_parse_quad_with_material() {
        let data = MeshData::parse(QUAD_OBJ, Path::new("quad.obj"), |_| {
            tobj::load_mtl_buf(&mut QUAD_MTL.as_bytes())
        })
        .unwrap();

        assert!(data.has_uv);
        assert_eq!(data.mesh.triangle_count(), 2, "Quad should be triangulated");
        assert_eq!(data.material.kd, Vec4::new(0.9, 0.5, 0.1, 1.0));
        assert_eq!(data.material.shininess, 64.0);

        // Normals computed facing +Z, positions centered
        for v in &data.mesh.vertices {
            assert!((v.normal[2] - 1.0).abs() < 1e-5);
        }
        let (min, max) = data.mesh.bounds().unwrap();
        assert!((min + max).length() < 1e-5);
    }

    #[test]
    fn test_parse_without_uv_or_mtl() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n";
        let data = MeshData::parse(obj, Path::new("tri.obj"), no_materials).unwrap();

        assert!(!data.has_uv);
        assert_eq!(data.material, Material::default());
        let info = data.info();
        assert_eq!(info.triangles, 1);
        assert_eq!(info.path, PathBuf::from("tri.obj"));
    }

    #[test]
    fn test_parse_rejects_empty_mesh() {
        let err = MeshData::parse("# nothing here\n", Path::new("empty.obj"), no_materials).unwrap_err();
        assert!(matches!(err, AssetError::EmptyMesh(_)));
    }

    #[test]
    fn test_load_from_disk_resolves_mtl() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("quad.obj"), QUAD_OBJ).unwrap();
        std::fs::write(dir.path().join("quad.mtl"), QUAD_MTL).unwrap();

        let data = MeshData::load(&dir.path().join("quad.obj")).unwrap();
        assert_eq!(data.material.ka, Vec4::new(0.2, 0.2, 0.2, 1.0));
    }

    #[test]
    fn test_load_missing_file() {
        let err = MeshData::load(Path::new("/definitely/not/here.obj")).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }
}
