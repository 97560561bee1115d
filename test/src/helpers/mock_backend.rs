use glam::Vec4;

use concord_projection::{
    BackendError, FaceTarget, FrustumMode, NonLinearProjection, RenderBackend, RenderTargetDesc,
    RenderTargetId, ShaderKind, WarpPass, WarpUniforms,
};

/// A warp pass as the mock backend saw it
#[derive(Debug, Clone)]
pub struct RecordedWarp {
    pub shader: ShaderKind,
    pub eye: FrustumMode,
    pub sources: Vec<FaceTarget>,
    pub mesh_vertex_counts: Vec<usize>,
    pub uniforms: WarpUniforms,
}

/// Render backend without a GPU. Records every call and fails on request.
#[derive(Debug, Default)]
pub struct MockRenderBackend {
    next_id: u32,
    allocations: usize,
    pub live: Vec<(RenderTargetId, RenderTargetDesc)>,
    /// Fail the allocation with this index, counted from zero
    pub fail_allocation: Option<usize>,
    /// Report a graphics error after the bind with this index
    pub error_after_bind: Option<usize>,
    pending_error: Option<String>,
    pub bound: Option<RenderTargetId>,
    pub binds: Vec<(RenderTargetId, Vec4)>,
    pub warps: Vec<RecordedWarp>,
}

impl MockRenderBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose first allocation for `face` fails. Faces allocate in
    /// order, color before depth and left eye before right.
    pub fn failing_on_face(projection: &NonLinearProjection, face: &str) -> Self {
        let position = match projection.faces().position(|(name, _)| name == face) {
            Some(position) => position,
            None => panic!("projection has no {} face", face),
        };
        let cubemap = projection.cubemap();
        let eyes = if cubemap.stereo { 2 } else { 1 };
        let per_eye = if cubemap.use_depth_transformation { 2 } else { 1 };
        Self {
            fail_allocation: Some(position * eyes * per_eye),
            ..Default::default()
        }
    }

    /// A backend that reports a graphics error once, after the bind with
    /// index `bind`
    pub fn reporting_error_after_bind(bind: usize) -> Self {
        Self {
            error_after_bind: Some(bind),
            ..Default::default()
        }
    }

    pub fn is_live(&self, target: RenderTargetId) -> bool {
        self.live.iter().any(|(id, _)| *id == target)
    }
}

impl RenderBackend for MockRenderBackend {
    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> Result<RenderTargetId, BackendError> {
        let allocation = self.allocations;
        self.allocations += 1;
        if self.fail_allocation == Some(allocation) {
            return Err(BackendError::new(format!(
                "out of video memory for a {}x{} target",
                desc.width, desc.height
            )));
        }

        self.next_id += 1;
        let id = RenderTargetId(self.next_id);
        self.live.push((id, *desc));
        Ok(id)
    }

    fn release_render_target(&mut self, target: RenderTargetId) {
        self.live.retain(|(id, _)| *id != target);
    }

    fn bind_render_target(&mut self, target: RenderTargetId, clear_color: Vec4) {
        assert!(self.is_live(target), "bound a released target {:?}", target);
        if self.error_after_bind == Some(self.binds.len()) {
            self.pending_error = Some("GL_INVALID_OPERATION".to_string());
        }
        self.bound = Some(target);
        self.binds.push((target, clear_color));
    }

    fn unbind_render_target(&mut self) {
        self.bound = None;
    }

    fn error_state(&mut self) -> Option<String> {
        self.pending_error.take()
    }

    fn draw_warp(&mut self, pass: &WarpPass<'_>) {
        assert!(self.bound.is_none(), "warp drawn into an offscreen target");
        self.warps.push(RecordedWarp {
            shader: pass.shader,
            eye: pass.eye,
            sources: pass.sources.to_vec(),
            mesh_vertex_counts: pass.meshes.iter().map(|mesh| mesh.vertex_count()).collect(),
            uniforms: pass.uniforms,
        });
    }
}
