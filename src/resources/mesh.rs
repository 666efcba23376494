use std::io::{BufReader, Cursor};

use cgmath::{InnerSpace, Vector3, Zero};
use wgpu::util::DeviceExt;

use crate::data_structures::model;

/// Parses OBJ text into triangulated, single-index models.
///
/// Material libraries are ignored: materials are assigned per entity, not
/// per file.
pub async fn parse_obj(obj_text: &str) -> Result<Vec<tobj::Model>, tobj::LoadError> {
    let mut obj_reader = BufReader::new(Cursor::new(obj_text));
    let (models, _) = tobj::load_obj_buf_async(
        &mut obj_reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_| async { tobj::MTLLoadResult::Err(tobj::LoadError::OpenFileFailed) },
    )
    .await?;
    Ok(models)
}

/**
 * Obj files may contain several objects. They are concatenated into one vertex/index
 * list so that one model file always becomes one mesh; indices of later objects are
 * offset by the vertices that precede them.
 */
pub fn merge_models(models: &[tobj::Model]) -> (Vec<model::ModelVertex>, Vec<u32>) {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for m in models {
        let base = vertices.len() as u32;
        vertices.extend((0..m.mesh.positions.len() / 3).map(|i| model::ModelVertex {
            position: [
                m.mesh.positions[i * 3],
                m.mesh.positions[i * 3 + 1],
                m.mesh.positions[i * 3 + 2],
            ],
            normal: [
                m.mesh.normals.get(i * 3).map_or(0.0, |f| *f),
                m.mesh.normals.get(i * 3 + 1).map_or(0.0, |f| *f),
                m.mesh.normals.get(i * 3 + 2).map_or(0.0, |f| *f),
            ],
            // OBJ puts the v origin at the bottom, wgpu at the top
            tex_coords: [
                m.mesh.texcoords.get(i * 2).map_or(0.0, |f| *f),
                1.0 - m.mesh.texcoords.get(i * 2 + 1).map_or(0.0, |f| *f),
            ],
        }));
        indices.extend(m.mesh.indices.iter().map(|index| index + base));
        if m.mesh.normals.is_empty() && !m.mesh.indices.is_empty() {
            log::warn!("{:?} has no normals, using smoothed face normals", m.name);
            smooth_normals(&mut vertices[base as usize..], &m.mesh.indices);
        }
    }

    (vertices, indices)
}

/// Averages the normals of the faces around each vertex. `indices` are
/// relative to the start of `vertices`.
fn smooth_normals(vertices: &mut [model::ModelVertex], indices: &[u32]) {
    let mut sums = vec![Vector3::zero(); vertices.len()];
    for face in indices.chunks_exact(3) {
        let [a, b, c] = [face[0], face[1], face[2]].map(|i| Vector3::from(vertices[i as usize].position));
        // Area weighted, counter-clockwise faces point towards the viewer
        let normal = (b - a).cross(c - a);
        for &i in face {
            sums[i as usize] += normal;
        }
    }
    for (vertex, sum) in vertices.iter_mut().zip(sums) {
        if sum.magnitude2() > 0.0 {
            vertex.normal = sum.normalize().into();
        }
    }
}

pub fn upload(
    device: &wgpu::Device,
    name: &str,
    vertices: &[model::ModelVertex],
    indices: &[u32],
) -> model::Mesh {
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{:?} Vertex Buffer", name)),
        contents: bytemuck::cast_slice(vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });

    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{:?} Index Buffer", name)),
        contents: bytemuck::cast_slice(indices),
        usage: wgpu::BufferUsages::INDEX,
    });

    model::Mesh {
        name: name.to_string(),
        vertex_buffer,
        index_buffer,
        num_elements: indices.len() as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_QUADS: &str = "\
o first
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
o second
v 0 0 1
v 1 0 1
v 1 1 1
vt 0 0
vt 1 0
vt 1 1
vn 0 0 1
f 5/5/2 6/6/2 7/7/2
";

    #[test]
    fn quads_are_triangulated() {
        let models = futures::executor::block_on(parse_obj(TWO_QUADS)).unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].mesh.indices.len(), 6);
        assert_eq!(models[1].mesh.indices.len(), 3);
    }

    #[test]
    fn merged_indices_point_into_their_own_object() {
        let models = futures::executor::block_on(parse_obj(TWO_QUADS)).unwrap();
        let (vertices, indices) = merge_models(&models);

        let first_len = models[0].mesh.positions.len() as u32 / 3;
        assert_eq!(vertices.len() as u32, first_len + models[1].mesh.positions.len() as u32 / 3);
        assert_eq!(indices.len(), 9);
        assert!(indices[..6].iter().all(|&i| i < first_len));
        assert!(indices[6..].iter().all(|&i| i >= first_len && (i as usize) < vertices.len()));
        // Every vertex of the second object sits on z = 1
        assert!(indices[6..].iter().all(|&i| vertices[i as usize].position[2] == 1.0));
    }

    #[test]
    fn texture_v_is_flipped() {
        let models = futures::executor::block_on(parse_obj(TWO_QUADS)).unwrap();
        let (vertices, _) = merge_models(&models);
        let bottom_left = vertices
            .iter()
            .find(|v| v.position == [0.0, 0.0, 0.0])
            .unwrap();
        assert_eq!(bottom_left.tex_coords, [0.0, 1.0]);
        assert_eq!(bottom_left.normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn missing_normals_are_generated_from_faces() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 -1\nf 1 2 3\nf 1 4 2\n";
        let models = futures::executor::block_on(parse_obj(obj)).unwrap();
        let (vertices, _) = merge_models(&models);

        let at = |p: [f32; 3]| vertices.iter().find(|v| v.position == p).unwrap().normal;
        assert_eq!(at([0.0, 1.0, 0.0]), [0.0, 0.0, 1.0]);
        assert_eq!(at([0.0, 0.0, -1.0]), [0.0, -1.0, 0.0]);
        let shared = at([0.0, 0.0, 0.0]);
        let expected = std::f32::consts::FRAC_1_SQRT_2;
        assert!((shared[0]).abs() < 1e-6);
        assert!((shared[1] + expected).abs() < 1e-6);
        assert!((shared[2] - expected).abs() < 1e-6);
        assert!(vertices.iter().all(|v| v.normal.iter().all(|n| n.is_finite())));
    }

    #[test]
    fn empty_obj_merges_to_nothing() {
        let models = futures::executor::block_on(parse_obj("# nothing here\n")).unwrap();
        let (vertices, indices) = merge_models(&models);
        assert!(vertices.is_empty());
        assert!(indices.is_empty());
    }
}
