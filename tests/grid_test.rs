use mesh_ngin::{
    error::GeometryError,
    resources::{GridConfig, PlaneVertex, grid::INDEX_STRIDE, make_plane},
};

use crate::common::test_utils::{read_indices, read_plane_vertices};

mod common;

fn generate(config: &GridConfig) -> (Vec<PlaneVertex>, Vec<u16>) {
    let mut vertices = vec![0u8; config.vertex_count() * PlaneVertex::STRIDE];
    let mut indices = vec![0u8; config.index_count() * INDEX_STRIDE];
    make_plane(config, &mut vertices, PlaneVertex::STRIDE, &mut indices).unwrap();
    (
        read_plane_vertices(&vertices, PlaneVertex::STRIDE),
        read_indices(&indices),
    )
}

const SIZES: [(u32, u32); 7] = [(1, 1), (2, 2), (3, 1), (1, 5), (7, 3), (10, 10), (32, 17)];

#[test]
fn should_match_count_formulas() {
    for (width, height) in SIZES {
        let config = GridConfig::new(width, height);
        let (vertices, indices) = generate(&config);
        let (w, h) = (width as usize, height as usize);

        assert_eq!(vertices.len(), (w + 1) * (h + 1));
        assert_eq!(config.vertex_count(), (w + 1) * (h + 1));
        assert_eq!(indices.len(), 2 * (w + 1) * h + 2 * (h - 1));
        assert_eq!(config.index_count(), indices.len());
    }
}

#[test]
fn should_only_reference_existing_vertices() {
    for (width, height) in SIZES {
        let config = GridConfig::new(width, height);
        let (vertices, indices) = generate(&config);
        assert!(
            indices.iter().all(|&index| (index as usize) < vertices.len()),
            "{width}x{height} grid references a missing vertex"
        );
    }
}

#[test]
fn should_generate_two_by_two_grid() {
    let config = GridConfig::new(2, 2);
    let (vertices, indices) = generate(&config);

    assert_eq!(vertices.len(), 9);
    assert_eq!(indices.len(), 14);
    assert_eq!(vertices[0].position, [0.0, 0.0, 0.0]);
    assert_eq!(vertices[2 * 3 + 2].position, [200.0, 0.0, 200.0]);
    assert_eq!(vertices[1].position, [100.0, 0.0, 0.0]);
    assert_eq!(vertices[3].position, [0.0, 0.0, 100.0]);
    assert_eq!(indices, vec![0, 3, 1, 4, 2, 5, 5, 3, 3, 6, 4, 7, 5, 8]);
}

#[test]
fn should_stitch_rows_with_degenerate_pairs_only() {
    for (width, height) in SIZES {
        let config = GridConfig::new(width, height);
        let (_, indices) = generate(&config);
        let vertex_width = width as usize + 1;
        let per_row = 2 * vertex_width;

        let mut cursor = 0;
        let mut degenerate = 0;
        for row in 0..height as usize {
            let zig_zag = &indices[cursor..cursor + per_row];
            for (column, pair) in zig_zag.chunks_exact(2).enumerate() {
                assert_eq!(pair[0] as usize, row * vertex_width + column);
                assert_eq!(pair[1] as usize, (row + 1) * vertex_width + column);
            }
            // Every triangle inside a row covers area.
            for triangle in zig_zag.windows(3) {
                assert!(triangle[0] != triangle[1] && triangle[1] != triangle[2] && triangle[0] != triangle[2]);
            }
            cursor += per_row;

            if row + 1 < height as usize {
                let next_row = (row + 1) * vertex_width;
                assert_eq!(indices[cursor] as usize, next_row + vertex_width - 1);
                assert_eq!(indices[cursor + 1] as usize, next_row);
                // The stitch repeats the strip's last vertex, then the next
                // row's first vertex.
                assert_eq!(indices[cursor], indices[cursor - 1]);
                assert_eq!(indices[cursor + 1], indices[cursor + 2]);
                cursor += 2;
                degenerate += 2;
            }
        }

        assert_eq!(cursor, indices.len());
        assert_eq!(degenerate, 2 * (height as usize - 1));
    }
}

#[test]
fn should_keep_uvs_short_of_one() {
    let config = GridConfig::new(4, 3);
    let (vertices, _) = generate(&config);

    let far_corner = vertices.last().unwrap();
    assert_eq!(far_corner.tex_coords, [4.0 / 5.0, 3.0 / 4.0]);
    assert!(
        vertices
            .iter()
            .all(|vertex| vertex.tex_coords.iter().all(|&uv| (0.0..1.0).contains(&uv)))
    );
    assert_eq!(vertices[6].tex_coords, [1.0 / 5.0, 1.0 / 4.0]);
}

#[test]
fn should_apply_configured_scale() {
    let config = GridConfig::new(3, 2).with_scale(0.5);
    let (vertices, _) = generate(&config);

    assert_eq!(vertices.last().unwrap().position, [1.5, 0.0, 1.0]);
    assert!(vertices.iter().all(|vertex| vertex.position[1] == 0.0));
}

#[test]
fn should_default_to_ten_by_ten_cells() {
    let config = GridConfig::default();

    assert_eq!((config.width, config.height), (10, 10));
    assert_eq!(config.scale, 100.0);
    assert_eq!(config.vertex_count(), 121);
    assert_eq!(config.index_count(), 238);
}

#[test]
fn should_leave_record_tail_untouched_with_wide_stride() {
    let config = GridConfig::new(2, 1);
    let stride = PlaneVertex::STRIDE + 8;
    let mut vertices = vec![0xAB; config.vertex_count() * stride];
    let mut indices = vec![0u8; config.index_count() * INDEX_STRIDE];

    make_plane(&config, &mut vertices, stride, &mut indices).unwrap();

    for record in vertices.chunks_exact(stride) {
        assert!(record[PlaneVertex::STRIDE..].iter().all(|&byte| byte == 0xAB));
    }
    let positions: Vec<_> = read_plane_vertices(&vertices, stride)
        .iter()
        .map(|vertex| vertex.position)
        .collect();
    assert_eq!(positions[5], [200.0, 0.0, 100.0]);
}

#[test]
fn should_reject_grids_without_quads() {
    assert_eq!(
        GridConfig::new(0, 3).validate(),
        Err(GeometryError::GridTooSmall { width: 0, height: 3 })
    );
    assert_eq!(
        GridConfig::new(5, 0).validate(),
        Err(GeometryError::GridTooSmall { width: 5, height: 0 })
    );
}

#[test]
fn should_enforce_sixteen_bit_index_range() {
    // 256 * 256 vertices: the last index is exactly u16::MAX.
    assert_eq!(GridConfig::new(255, 255).validate(), Ok(()));
    assert_eq!(
        GridConfig::new(256, 255).validate(),
        Err(GeometryError::IndexOverflow { vertex_count: 257 * 256 })
    );

    assert_eq!(
        GridConfig::new(u32::MAX, 1).validate(),
        Err(GeometryError::IndexOverflow { vertex_count: (u32::MAX as u64 + 1) * 2 })
    );
    assert_eq!(
        GridConfig::new(u32::MAX, u32::MAX).validate(),
        Err(GeometryError::IndexOverflow { vertex_count: u64::MAX })
    );

    let config = GridConfig::new(255, 255);
    let (_, indices) = generate(&config);
    assert_eq!(indices.iter().copied().max(), Some(u16::MAX));
}

#[test]
fn should_reject_undersized_destinations() {
    let config = GridConfig::new(2, 2);
    let mut vertices = vec![0u8; config.vertex_count() * PlaneVertex::STRIDE];
    let mut indices = vec![0u8; config.index_count() * INDEX_STRIDE];

    assert_eq!(
        make_plane(&config, &mut vertices, 16, &mut indices),
        Err(GeometryError::StrideTooSmall { stride: 16, required: 20 })
    );
    assert_eq!(
        make_plane(&config, &mut vertices, PlaneVertex::STRIDE, &mut indices[..26]),
        Err(GeometryError::BufferTooSmall { needed: 28, len: 26 })
    );
    assert_eq!(
        make_plane(&config, &mut vertices[..100], PlaneVertex::STRIDE, &mut indices),
        Err(GeometryError::BufferTooSmall { needed: 180, len: 100 })
    );
}

#[test]
fn should_reject_strides_too_large_to_address() {
    let config = GridConfig::new(2, 2);
    let mut vertices = [0u8; 4];
    let mut indices = [0u8; 28];

    assert_eq!(
        make_plane(&config, &mut vertices, usize::MAX / 2, &mut indices),
        Err(GeometryError::BufferTooSmall { needed: usize::MAX, len: 4 })
    );
    assert_eq!(indices, [0u8; 28]);
}
