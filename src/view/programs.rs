use std::borrow::Cow;
use std::path::Path;

use crate::config::ViewerConfig;
use crate::model::AssetError;
use crate::utils::Vertex;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// One compiled shading program: a vertex/fragment GLSL pair turned into a
/// render pipeline, plus the layout its model bind group must follow.
pub struct ShaderProgram {
    pub name: String,
    pub pipeline: wgpu::RenderPipeline,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

/// Programs in combo box order, built once at startup.
pub struct ProgramTable {
    programs: Vec<ShaderProgram>,
}

impl ProgramTable {
    pub fn load(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        config: &ViewerConfig,
    ) -> Result<Self, AssetError> {
        let programs = config
            .shader_names
            .iter()
            .map(|name| {
                let vert = read_source(&config.shader_path(name, "vert"))?;
                let frag = read_source(&config.shader_path(name, "frag"))?;
                let program = ShaderProgram::new(device, color_format, name, &vert, &frag);
                tracing::info!("Created program {}", name);
                Ok(program)
            })
            .collect::<Result<Vec<_>, AssetError>>()?;

        Ok(Self { programs })
    }

    pub fn get(&self, index: usize) -> Option<&ShaderProgram> {
        self.programs.get(index)
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.programs.iter().map(|p| p.name.as_str())
    }

    /// Drop every pipeline.
    pub fn clear(&mut self) {
        for program in self.programs.drain(..) {
            tracing::debug!("Deleting program {}", program.name);
        }
    }
}

fn read_source(path: &Path) -> Result<String, AssetError> {
    std::fs::read_to_string(path).map_err(|e| AssetError::io(path, e))
}

/// Uniform block at binding 0, diffuse texture at 1, sampler at 2.
pub fn model_bind_group_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

impl ShaderProgram {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        name: &str,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Self {
        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{name}.vert")),
            source: wgpu::ShaderSource::Glsl {
                shader: Cow::Borrowed(vertex_source),
                stage: wgpu::naga::ShaderStage::Vertex,
                defines: Default::default(),
            },
        });
        let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{name}.frag")),
            source: wgpu::ShaderSource::Glsl {
                shader: Cow::Borrowed(fragment_source),
                stage: wgpu::naga::ShaderStage::Fragment,
                defines: Default::default(),
            },
        });

        let bind_group_layout = model_bind_group_layout(device, &format!("{name}_bind_group_layout"));
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{name}_pipeline_layout")),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(name),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some("main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some("main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
            multiview: None,
            cache: None,
        });

        Self { name: name.to_string(), pipeline, bind_group_layout }
    }
}
