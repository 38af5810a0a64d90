use std::path::Path;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use wgpu::*;

use super::gpu_init::GpuContext;
use super::model_gpu::ModelResource;
use super::programs::{ProgramTable, DEPTH_FORMAT};
use crate::config::ViewerConfig;
use crate::controller::ViewerState;
use crate::model::{AssetError, MeshData, ModelInfo, TextureImage, TextureVariant};

/// Everything the shading programs read, laid out to match the `std140`
/// `Uniforms` block declared in every shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SceneUniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    pub light_dir: [f32; 4],
    pub ia: [f32; 4],
    pub id: [f32; 4],
    pub is: [f32; 4],
    pub ka: [f32; 4],
    pub kd: [f32; 4],
    pub ks: [f32; 4],
    pub shininess: f32,
    pub mapping_mode: i32,
    pub _pad: [f32; 2],
}

impl SceneUniforms {
    pub fn from_state(state: &ViewerState) -> Self {
        Self {
            view: state.view_matrix().to_cols_array_2d(),
            proj: state.projection_matrix().to_cols_array_2d(),
            model: state.model_matrix().to_cols_array_2d(),
            normal: state.normal_matrix().to_cols_array_2d(),
            light_dir: state.light_direction().to_array(),
            ia: state.lighting.ia.to_array(),
            id: state.lighting.id.to_array(),
            is: state.lighting.is.to_array(),
            ka: state.material.ka.to_array(),
            kd: state.material.kd.to_array(),
            ks: state.material.ks.to_array(),
            shininess: state.material.shininess,
            mapping_mode: state.mapping_mode.as_uniform(),
            _pad: [0.0; 2],
        }
    }
}

pub fn create_depth_texture(device: &Device, width: u32, height: u32) -> (Texture, TextureView) {
    let depth_texture = device.create_texture(&TextureDescriptor {
        label: Some("depth_texture"),
        size: Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

/// GPU state that exists between startup and teardown.
struct SceneResources {
    _depth_texture: Texture,
    depth_view: TextureView,
    uniform_buffer: Buffer,
    programs: ProgramTable,
    model: ModelResource,
}

/// One egui frame, already tessellated.
pub struct UiFrame<'a> {
    pub primitives: &'a [egui::ClippedPrimitive],
    pub textures_delta: &'a egui::TexturesDelta,
    pub pixels_per_point: f32,
}

pub struct Renderer {
    device: Arc<Device>,
    queue: Arc<Queue>,
    config: ViewerConfig,
    scene: Option<SceneResources>,
    egui_renderer: egui_wgpu::Renderer,
    width: u32,
    height: u32,
}

impl Renderer {
    /// Compiles every program. A missing or broken shader source is fatal.
    pub fn new(gpu: &GpuContext, config: &ViewerConfig) -> Result<Self, AssetError> {
        let device = gpu.device.clone();
        let (width, height) = (gpu.config.width, gpu.config.height);

        let programs = ProgramTable::load(&device, gpu.format, config)?;
        let (depth_texture, depth_view) = create_depth_texture(&device, width, height);
        let uniform_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("uniform_buffer"),
            size: std::mem::size_of::<SceneUniforms>() as BufferAddress,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let egui_renderer =
            egui_wgpu::Renderer::new(&device, gpu.format, egui_wgpu::RendererOptions::default());

        Ok(Self {
            device,
            queue: gpu.queue.clone(),
            config: config.clone(),
            scene: Some(SceneResources {
                _depth_texture: depth_texture,
                depth_view,
                uniform_buffer,
                programs,
                model: ModelResource::default(),
            }),
            egui_renderer,
            width,
            height,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width;
        self.height = height;
        if let Some(scene) = self.scene.as_mut() {
            let (texture, view) = create_depth_texture(&self.device, width, height);
            scene._depth_texture = texture;
            scene.depth_view = view;
        }
    }

    pub fn program_names(&self) -> Vec<String> {
        self.scene
            .as_ref()
            .map(|scene| scene.programs.names().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn program_count(&self) -> usize {
        self.scene.as_ref().map_or(0, |scene| scene.programs.len())
    }

    /// Parse the mesh and decode the texture for `variant`, then swap them in
    /// bound to `program`. On error the previous model stays loaded.
    pub fn load_model(&mut self, path: &Path, variant: TextureVariant, program: usize) -> Result<ModelInfo, AssetError> {
        let data = MeshData::load(path)?;
        let image = TextureImage::load(&self.config.texture_path(variant))?;

        let Some(scene) = self.scene.as_mut() else {
            return Ok(data.info());
        };
        let Some(shader) = scene.programs.get(program) else {
            return Ok(data.info());
        };
        scene.model.terminate();
        Ok(scene.model.load(
            &self.device,
            &self.queue,
            &data,
            &image,
            &shader.bind_group_layout,
            &scene.uniform_buffer,
        ))
    }

    /// Replace the diffuse texture of the loaded model.
    pub fn load_texture(&mut self, path: &Path, program: usize) -> Result<(), AssetError> {
        let image = TextureImage::load(path)?;
        if let Some(scene) = self.scene.as_mut() {
            if let Some(shader) = scene.programs.get(program) {
                if scene.model.load_diffuse_texture(
                    &self.device,
                    &self.queue,
                    &image,
                    &shader.bind_group_layout,
                    &scene.uniform_buffer,
                ) {
                    tracing::info!("Loaded texture {}", path.display());
                }
            }
        }
        Ok(())
    }

    /// Bind the loaded model to another program after a shader switch.
    pub fn rebind_model(&mut self, program: usize) {
        if let Some(scene) = self.scene.as_mut() {
            if let Some(shader) = scene.programs.get(program) {
                scene.model.bind_program(&self.device, &shader.bind_group_layout, &scene.uniform_buffer);
                tracing::info!("Switched to program {}", shader.name);
            }
        }
    }

    pub fn model_info(&self) -> Option<&ModelInfo> {
        self.scene.as_ref().and_then(|scene| scene.model.info())
    }

    pub fn triangles(&self) -> u32 {
        self.scene.as_ref().map_or(0, |scene| scene.model.triangles())
    }

    pub fn is_terminated(&self) -> bool {
        self.scene.is_none()
    }

    /// Scene pass followed by the egui pass. Does nothing after
    /// [`Renderer::terminate`].
    pub fn draw_frame(&mut self, gpu: &GpuContext, state: &ViewerState, ui: UiFrame<'_>) -> Result<(), SurfaceError> {
        let Some(scene) = self.scene.as_ref() else {
            return Ok(());
        };

        let frame = gpu.surface.get_current_texture()?;
        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("encoder"),
        });

        let uniforms = SceneUniforms::from_state(state);
        self.queue.write_buffer(&scene.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color::BLACK),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &scene.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(program) = scene.programs.get(state.current_program()) {
                scene.model.render(&mut rp, &program.pipeline);
            }
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.width, self.height],
            pixels_per_point: ui.pixels_per_point,
        };

        for (id, image_delta) in &ui.textures_delta.set {
            self.egui_renderer.update_texture(&self.device, &self.queue, *id, image_delta);
        }
        self.egui_renderer
            .update_buffers(&self.device, &self.queue, &mut encoder, ui.primitives, &screen_descriptor);

        {
            let egui_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("egui_render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Load,
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.egui_renderer
                .render(&mut egui_pass.forget_lifetime(), ui.primitives, &screen_descriptor);
        }

        for id in &ui.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    /// Release the model and every program. Safe to call more than once.
    pub fn terminate(&mut self) {
        if let Some(mut scene) = self.scene.take() {
            scene.model.terminate();
            scene.programs.clear();
            scene.uniform_buffer.destroy();
            tracing::info!("Renderer terminated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MappingMode;
    use glam::{Mat4, Vec4};

    #[test]
    fn test_uniform_block_is_std140_sized() {
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 384);
        assert_eq!(std::mem::size_of::<SceneUniforms>() % 16, 0);
        assert_eq!(std::mem::offset_of!(SceneUniforms, light_dir), 256);
        assert_eq!(std::mem::offset_of!(SceneUniforms, shininess), 368);
        assert_eq!(std::mem::offset_of!(SceneUniforms, mapping_mode), 372);
    }

    #[test]
    fn test_uniforms_follow_viewer_state() {
        let mut state = ViewerState::new(6, 800, 600);
        state.material.shininess = 64.0;
        state.lighting.id = Vec4::new(0.5, 0.5, 0.5, 1.0);
        state.mapping_mode = MappingMode::Spherical;
        state.update(0.016);

        let uniforms = SceneUniforms::from_state(&state);
        assert_eq!(uniforms.shininess, 64.0);
        assert_eq!(uniforms.mapping_mode, 2);
        assert_eq!(uniforms.id, [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(uniforms.view, state.view_matrix().to_cols_array_2d());
        assert_eq!(uniforms.model, state.model_matrix().to_cols_array_2d());
        assert_ne!(uniforms.proj, Mat4::IDENTITY.to_cols_array_2d());
        assert_eq!(uniforms.light_dir[3], 0.0, "Light is a direction");
    }
}
