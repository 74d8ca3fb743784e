//! End-to-end rendering tests through the public rasterizer API

use nalgebra::{Matrix4, Point3, Vector3};
use softrast_core::assembler::{assemble_triangle, Viewport};
use softrast_core::raster::{barycentric_2d, inside_triangle};
use softrast_core::transform::{rotation_matrix, view_matrix};
use softrast_core::{
    Buffers, Camera, ColorHandle, DepthRange, IndexHandle, Mesh, Perspective, PositionHandle,
    Primitive, RasterConfig, Rasterizer, Sampling, Transform,
};

const SIZE: usize = 700;

fn green() -> Vector3<f32> {
    Vector3::new(217.0, 238.0, 185.0)
}

fn reference_transform(model: Matrix4<f32>) -> Transform {
    Transform::new(
        model,
        view_matrix(&Point3::new(0.0, 0.0, 5.0)),
        Perspective::new(45.0, 1.0, 0.1, 50.0).matrix(),
    )
}

fn load_reference(rasterizer: &mut Rasterizer) -> (PositionHandle, IndexHandle, ColorHandle) {
    let mesh = Mesh::reference_triangle();
    let colors = mesh.uniform_colors(green());
    (
        rasterizer.load_positions(mesh.positions),
        rasterizer.load_indices(mesh.indices),
        rasterizer.load_colors(colors),
    )
}

#[test]
fn test_reference_triangle_golden_anchor() {
    let mut rasterizer = Rasterizer::new(SIZE, SIZE);
    let (p, i, c) = load_reference(&mut rasterizer);
    rasterizer.clear(Buffers::COLOR | Buffers::DEPTH);

    rasterizer
        .draw(p, i, c, Primitive::Triangle, &reference_transform(Matrix4::identity()))
        .unwrap();

    // Screen vertices land at (591.42, 350), (350, 591.42), (108.58, 350)
    let frame = rasterizer.frame();
    assert_eq!(frame.color_at(350, 430), Some(green()));
    let depth = frame.depth_at(350, 430).unwrap();
    assert!((depth - 49.3857).abs() < 1e-3, "depth {depth}");

    // Below the base and above the apex
    assert_eq!(frame.depth_at(350, 349), Some(f32::INFINITY));
    assert_eq!(frame.depth_at(350, 592), Some(f32::INFINITY));
    assert_eq!(frame.color_at(100, 350), Some(Vector3::zeros()));

    // Screen y = 430 sits on row 700 - 1 - 430 of the backing array
    let idx = (SIZE - 1 - 430) * SIZE + 350;
    assert_eq!(rasterizer.get_index(350, 430), Some(idx));
    assert_eq!(rasterizer.frame_buffer()[idx], green());
}

#[test]
fn test_reference_triangle_rotated_half_turn() {
    let mut rasterizer = Rasterizer::new(SIZE, SIZE);
    let (p, i, c) = load_reference(&mut rasterizer);

    let model = rotation_matrix(&Vector3::new(0.0, 0.0, 1.0), 180.0);
    rasterizer
        .draw(p, i, c, Primitive::Triangle, &reference_transform(model))
        .unwrap();

    let frame = rasterizer.frame();
    assert_eq!(frame.color_at(350, 269), Some(green()));
    assert_eq!(frame.color_at(350, 430), Some(Vector3::zeros()));
}

#[test]
fn test_single_sample_depth_matches_interpolation() {
    let config = RasterConfig::new(SIZE, SIZE).with_sampling(Sampling::Single);
    let mut rasterizer = Rasterizer::with_config(config);
    let (p, i, c) = load_reference(&mut rasterizer);
    let transform = reference_transform(Matrix4::identity());
    rasterizer.draw(p, i, c, Primitive::Triangle, &transform).unwrap();

    let mesh = Mesh::reference_triangle();
    let colors = mesh.uniform_colors(green());
    let viewport = Viewport::new(SIZE, SIZE, transform.depth_range);
    let triangle = assemble_triangle(0, &mesh.indices[0], &mesh.positions, &colors, &transform.mvp(), &viewport)
        .unwrap();
    let xy = triangle.screen_xy();
    let v = triangle.v;

    let frame = rasterizer.frame();
    for y in 340..600 {
        for x in 100..600 {
            let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
            let stored = frame.depth_at(x, y).unwrap();
            if !inside_triangle(px, py, &xy) {
                assert_eq!(stored, f32::INFINITY, "pixel ({x}, {y})");
                continue;
            }
            let (a, b, g) = barycentric_2d(px, py, &xy).unwrap();
            let w_reciprocal = 1.0 / (a / v[0].w + b / v[1].w + g / v[2].w);
            let expected =
                (a * v[0].z / v[0].w + b * v[1].z / v[1].w + g * v[2].z / v[2].w) * w_reciprocal;
            assert!((stored - expected).abs() < 1e-3, "pixel ({x}, {y})");
            assert_eq!(frame.color_at(x, y), Some(green()));
        }
    }
}

/// Two overlapping camera-facing triangles, one nearer than the other
fn draw_overlap(near_first: bool, sampling: Sampling) -> Rasterizer {
    let mut rasterizer = Rasterizer::with_config(RasterConfig::new(200, 200).with_sampling(sampling));
    let positions = rasterizer.load_positions(vec![
        // far, red
        Vector3::new(2.0, 0.0, -4.0),
        Vector3::new(0.0, 2.0, -4.0),
        Vector3::new(-2.0, 0.0, -4.0),
        // near, blue
        Vector3::new(1.5, 0.5, -1.0),
        Vector3::new(-0.5, 2.0, -1.0),
        Vector3::new(-1.5, -0.5, -1.0),
    ]);
    let mut colors = vec![Vector3::new(255.0, 0.0, 0.0); 3];
    colors.extend(vec![Vector3::new(0.0, 0.0, 255.0); 3]);
    let colors = rasterizer.load_colors(colors);
    let far = rasterizer.load_indices(vec![[0, 1, 2]]);
    let near = rasterizer.load_indices(vec![[3, 4, 5]]);

    let transform = reference_transform(Matrix4::identity());
    let order = if near_first { [near, far] } else { [far, near] };
    for indices in order {
        rasterizer
            .draw(positions, indices, colors, Primitive::Triangle, &transform)
            .unwrap();
    }
    rasterizer
}

#[test]
fn test_nearer_triangle_wins_in_any_order() {
    for sampling in [Sampling::Single, Sampling::Supersample(4)] {
        let far_first = draw_overlap(false, sampling);
        let near_first = draw_overlap(true, sampling);

        assert_eq!(far_first.frame_buffer(), near_first.frame_buffer());
        assert_eq!(far_first.depth_buffer(), near_first.depth_buffer());

        // The origin is covered by both; blue is in front
        let center = far_first.frame().color_at(100, 110).unwrap();
        assert_eq!(center, Vector3::new(0.0, 0.0, 255.0));
    }
}

#[test]
fn test_clear_is_selective() {
    let mut rasterizer = Rasterizer::new(SIZE, SIZE);
    let (p, i, c) = load_reference(&mut rasterizer);
    let transform = reference_transform(Matrix4::identity());
    rasterizer.draw(p, i, c, Primitive::Triangle, &transform).unwrap();

    rasterizer.clear(Buffers::COLOR);
    assert!(rasterizer.frame_buffer().iter().all(|c| *c == Vector3::zeros()));
    assert!(rasterizer.frame().depth_at(350, 430).unwrap().is_finite());

    rasterizer.draw(p, i, c, Primitive::Triangle, &transform).unwrap();
    // Same depth again fails the strict test, so color stays black
    assert_eq!(rasterizer.frame().color_at(350, 430), Some(Vector3::zeros()));

    rasterizer.set_pixel(350, 430, green()).unwrap();
    rasterizer.clear(Buffers::DEPTH);
    assert!(rasterizer.depth_buffer().iter().all(|d| *d == f32::INFINITY));
    assert_eq!(rasterizer.frame().color_at(350, 430), Some(green()));
}

#[test]
fn test_reused_transform_renders_identical_frames() {
    let mut rasterizer = Rasterizer::new(SIZE, SIZE);
    let (p, i, c) = load_reference(&mut rasterizer);
    let transform = reference_transform(rotation_matrix(&Vector3::new(0.0, 1.0, 1.0), 25.0));

    rasterizer.draw(p, i, c, Primitive::Triangle, &transform).unwrap();
    let first = rasterizer.frame_buffer().to_vec();

    rasterizer.clear(Buffers::COLOR | Buffers::DEPTH);
    rasterizer.draw(p, i, c, Primitive::Triangle, &transform).unwrap();
    assert_eq!(rasterizer.frame_buffer(), first.as_slice());
}

#[test]
fn test_fixed_depth_range_ignores_projection_planes() {
    let camera = Camera::new(
        Point3::new(0.0, 0.0, 5.0),
        Perspective::new(45.0, 1.0, 1.0, 10.0),
    );

    // Fixed 0.1 / 50 mapping, kept for compatibility with reference images
    let legacy = Transform::new(Matrix4::identity(), camera.view_matrix(), camera.projection_matrix());
    assert_eq!(legacy.depth_range, DepthRange::LEGACY);

    let mut rasterizer = Rasterizer::new(SIZE, SIZE);
    let (p, i, c) = load_reference(&mut rasterizer);
    rasterizer.draw(p, i, c, Primitive::Triangle, &legacy).unwrap();
    let depth = rasterizer.frame().depth_at(350, 430).unwrap();
    assert!((depth - 47.6238).abs() < 1e-3, "legacy depth {depth}");

    // Mapping matched to the camera's own near / far planes
    let matched = camera.transform(Matrix4::identity());
    rasterizer.clear(Buffers::COLOR | Buffers::DEPTH);
    rasterizer.draw(p, i, c, Primitive::Triangle, &matched).unwrap();
    let depth = rasterizer.frame().depth_at(350, 430).unwrap();
    assert!((depth - 9.5714).abs() < 1e-3, "matched depth {depth}");
}

#[test]
fn test_supersampling_softens_edges() {
    let single_config = RasterConfig::new(SIZE, SIZE).with_sampling(Sampling::Single);
    let mut single = Rasterizer::with_config(single_config);
    let mut sampled = Rasterizer::new(SIZE, SIZE);
    for rasterizer in [&mut single, &mut sampled] {
        let (p, i, c) = load_reference(rasterizer);
        rasterizer
            .draw(p, i, c, Primitive::Triangle, &reference_transform(Matrix4::identity()))
            .unwrap();
    }

    let is_partial = |c: &Vector3<f32>| *c != Vector3::zeros() && *c != green();
    assert!(!single.frame_buffer().iter().any(is_partial));
    assert!(sampled.frame_buffer().iter().any(is_partial));
}
