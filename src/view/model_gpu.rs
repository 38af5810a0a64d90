use crate::model::{MeshData, ModelInfo, TextureImage};
use crate::utils::MeshBuffer;

struct DiffuseTexture {
    // Kept alive for the view.
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl DiffuseTexture {
    fn upload(device: &wgpu::Device, queue: &wgpu::Queue, image: &TextureImage) -> Self {
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("diffuse_texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("diffuse_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self { _texture: texture, view, sampler }
    }
}

struct ModelGpu {
    mesh: MeshBuffer,
    texture: DiffuseTexture,
    bind_group: wgpu::BindGroup,
    info: ModelInfo,
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    uniforms: &wgpu::Buffer,
    texture: &DiffuseTexture,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("model_bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry { binding: 0, resource: uniforms.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(&texture.view) },
            wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::Sampler(&texture.sampler) },
        ],
    })
}

/// GPU side of the displayed mesh: vertex/index buffers, diffuse texture and
/// the bind group wiring both to the active program. Empty before the first
/// load and after [`ModelResource::terminate`].
#[derive(Default)]
pub struct ModelResource {
    gpu: Option<ModelGpu>,
}

impl ModelResource {
    /// Upload a parsed mesh and its texture, replacing whatever was loaded.
    pub fn load(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &MeshData,
        image: &TextureImage,
        layout: &wgpu::BindGroupLayout,
        uniforms: &wgpu::Buffer,
    ) -> ModelInfo {
        let mesh = data.mesh.upload(device);
        let texture = DiffuseTexture::upload(device, queue, image);
        let bind_group = create_bind_group(device, layout, uniforms, &texture);
        let info = data.info();

        tracing::info!(
            "Loaded model {} ({} triangles, uv: {})",
            info.path.display(),
            info.triangles,
            info.has_uv
        );
        self.gpu = Some(ModelGpu { mesh, texture, bind_group, info: info.clone() });
        info
    }

    /// Swap the diffuse texture, keeping the mesh. No-op without a model.
    pub fn load_diffuse_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &TextureImage,
        layout: &wgpu::BindGroupLayout,
        uniforms: &wgpu::Buffer,
    ) -> bool {
        let Some(gpu) = self.gpu.as_mut() else {
            return false;
        };
        let texture = DiffuseTexture::upload(device, queue, image);
        gpu.bind_group = create_bind_group(device, layout, uniforms, &texture);
        gpu.texture = texture;
        true
    }

    /// Rebuild the bind group against another program's layout.
    pub fn bind_program(&mut self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout, uniforms: &wgpu::Buffer) {
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.bind_group = create_bind_group(device, layout, uniforms, &gpu.texture);
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.gpu.is_some()
    }

    pub fn triangles(&self) -> u32 {
        self.gpu.as_ref().map_or(0, |gpu| gpu.info.triangles)
    }

    pub fn info(&self) -> Option<&ModelInfo> {
        self.gpu.as_ref().map(|gpu| &gpu.info)
    }

    pub fn render(&self, rp: &mut wgpu::RenderPass<'_>, pipeline: &wgpu::RenderPipeline) {
        let Some(gpu) = self.gpu.as_ref() else {
            return;
        };
        if gpu.mesh.index_count == 0 {
            return;
        }
        rp.set_pipeline(pipeline);
        rp.set_bind_group(0, &gpu.bind_group, &[]);
        rp.set_vertex_buffer(0, gpu.mesh.vertex_buffer.slice(..));
        rp.set_index_buffer(gpu.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        rp.draw_indexed(0..gpu.mesh.index_count, 0, 0..1);
    }

    pub fn terminate(&mut self) {
        if let Some(gpu) = self.gpu.take() {
            tracing::debug!("Releasing model {}", gpu.info.path.display());
            gpu.mesh.vertex_buffer.destroy();
            gpu.mesh.index_buffer.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_resource_after_terminate() {
        let mut model = ModelResource::default();
        model.terminate();
        assert!(!model.is_loaded());
        assert_eq!(model.triangles(), 0);
        assert!(model.info().is_none());
    }
}
