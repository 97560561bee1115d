use glam::UVec2;

use concord_projection::{
    CubeFace, CubemapSettings, FisheyeMethod, FisheyeSettings, FrustumMode, NonLinearKind,
    NonLinearProjection, ProjectionError, ShaderKind, SpoutChannels, SpoutMapping, SpoutSettings,
    UserRegistry,
};
use concord_test::MockRenderBackend;

fn fisheye(method: FisheyeMethod, cubemap: CubemapSettings) -> NonLinearProjection {
    let settings = FisheyeSettings {
        method,
        fov: 180.0,
        cubemap,
        ..Default::default()
    };
    NonLinearProjection::new(NonLinearKind::Fisheye(settings), UserRegistry::new().default_key())
        .unwrap()
}

#[test]
fn failed_face_allocation_names_the_face() {
    let _ = env_logger::builder().is_test(true).try_init();

    let cubemap = CubemapSettings {
        stereo: true,
        use_depth_transformation: true,
        ..Default::default()
    };
    let mut projection = fisheye(FisheyeMethod::FiveFace, cubemap);
    let mut backend = MockRenderBackend::failing_on_face(&projection, "bottom");

    let error = projection.initialize(&mut backend).unwrap_err();
    assert_eq!(error.face, "bottom");
    assert_eq!(error.resource, "color target");
    assert!(error.reason.contains("out of video memory"));
    // targets of the faces before it are released again
    assert!(backend.live.is_empty());
    assert!(!projection.is_initialized());

    let users = UserRegistry::new();
    let result = projection.render_frame(&mut backend, users.default_user(), 0.1, 100.0, &mut |_| {});
    assert!(matches!(result, Err(ProjectionError::Resource(_))));
}

#[test]
fn stereo_fisheye_renders_every_face_per_eye() {
    let users = UserRegistry::new();
    let cubemap = CubemapSettings {
        stereo: true,
        resolution: 256,
        ..Default::default()
    };
    let mut projection = fisheye(FisheyeMethod::FourFace, cubemap);
    let mut backend = MockRenderBackend::new();
    projection.initialize(&mut backend).unwrap();
    projection.update(UVec2::new(1920, 1080));
    assert_eq!(backend.live.len(), 8);
    assert!(backend.live.iter().all(|(_, desc)| desc.width == 256 && desc.height == 256));

    let mut views = Vec::new();
    let rendered = projection
        .render_frame(&mut backend, users.default_user(), 0.1, 100.0, &mut |view| {
            views.push((view.face, view.eye))
        })
        .unwrap();

    assert_eq!(rendered, 8);
    assert_eq!(views.iter().filter(|(_, eye)| *eye == FrustumMode::StereoLeft).count(), 4);
    assert_eq!(backend.warps.len(), 2);
    assert_eq!(backend.warps[0].eye, FrustumMode::StereoLeft);
    assert_eq!(backend.warps[1].eye, FrustumMode::StereoRight);
    assert_eq!(
        backend.warps[0].shader,
        ShaderKind::Fisheye {
            cubic: false,
            depth: false
        }
    );
    assert_eq!(backend.warps[0].uniforms.output_size, UVec2::new(1920, 1080));
    // each eye samples its own targets
    assert_ne!(backend.warps[0].sources[0].color, backend.warps[1].sources[0].color);

    projection.release(&mut backend);
    assert!(backend.live.is_empty());
}

#[test]
fn graphics_errors_while_rendering_are_not_fatal() {
    let users = UserRegistry::new();
    let mut projection = fisheye(FisheyeMethod::SixFace, CubemapSettings::default());
    let mut backend = MockRenderBackend::reporting_error_after_bind(2);
    projection.initialize(&mut backend).unwrap();

    let rendered = projection
        .render_frame(&mut backend, users.default_user(), 0.1, 100.0, &mut |_| {})
        .unwrap();
    assert_eq!(rendered, 6);
    assert_eq!(backend.warps.len(), 1);
}

#[test]
fn spout_renders_only_enabled_channels() {
    let users = UserRegistry::new();
    let settings = SpoutSettings {
        mapping: SpoutMapping::Equirectangular,
        channels: SpoutChannels {
            bottom: false,
            back: false,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut projection =
        NonLinearProjection::new(NonLinearKind::Spout(settings), users.default_key()).unwrap();
    let mut backend = MockRenderBackend::new();
    projection.initialize(&mut backend).unwrap();

    let mut faces = Vec::new();
    projection
        .render_frame(&mut backend, users.default_user(), 0.1, 100.0, &mut |view| {
            faces.push(view.face)
        })
        .unwrap();

    assert_eq!(faces, vec![CubeFace::Right, CubeFace::Left, CubeFace::Top, CubeFace::Front]);
    assert_eq!(backend.warps[0].shader, ShaderKind::SpoutEquirectangular);
    assert_eq!(backend.warps[0].sources.len(), 4);
}
