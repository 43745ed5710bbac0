use crate::camera::Camera3d;
use crate::color::{self, Color};
use crate::context::Context;
use crate::light::{LightCollection, LightType, MAX_LIGHTS};
use crate::resource::{
    GpuMesh, GpuTextureCache, MapSlot, PhysicalMaterial, Texture, TextureFilter, TextureImage,
    TextureWrapping,
};
use crate::scene::SceneNode;
use bytemuck::{Pod, Zeroable};
use glamx::{Mat4, Vec3};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;

/// GPU representation of a single light.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct GpuLight {
    position: [f32; 3],
    light_type: u32, // 0=point, 1=directional, 2=spot
    direction: [f32; 3],
    intensity: f32,
    color: [f32; 3],
    inner_cone_cos: f32,
    outer_cone_cos: f32,
    attenuation_radius: f32,
    _padding: [f32; 2],
}

impl Default for GpuLight {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            light_type: 0,
            direction: [0.0, 0.0, -1.0],
            intensity: 0.0,
            color: [1.0, 1.0, 1.0],
            inner_cone_cos: 1.0,
            outer_cone_cos: 0.0,
            attenuation_radius: 100.0,
            _padding: [0.0; 2],
        }
    }
}

/// Frame-level uniforms (view, projection, eye, lights).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct FrameUniforms {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    eye: [f32; 4],
    ambient: [f32; 4],
    lights: [GpuLight; MAX_LIGHTS],
    num_lights: u32,
    _padding: [u32; 3],
}

/// Object-level uniforms. Layout must match `ObjectUniforms` in `physical.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct ObjectUniforms {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 4],
    color: [f32; 4],
    params: [f32; 4], // roughness, metalness, ao intensity, displacement scale
    uv: [f32; 4],     // repeat x, repeat y, opacity, unused
}

fn linear_rgb(color: Color) -> [f32; 3] {
    let c = color::srgb_to_linear(color);
    [c.r, c.g, c.b]
}

fn gpu_light(light: &crate::light::CollectedLight) -> GpuLight {
    let rgb = linear_rgb(Color::new(light.color.x, light.color.y, light.color.z, 1.0));
    let mut gpu = GpuLight {
        position: light.world_position.to_array(),
        direction: light.world_direction.to_array(),
        intensity: light.intensity,
        color: rgb,
        ..GpuLight::default()
    };

    match light.light_type {
        LightType::Point { attenuation_radius } => {
            gpu.light_type = 0;
            gpu.attenuation_radius = attenuation_radius;
        }
        LightType::Directional => gpu.light_type = 1,
        LightType::Spot {
            inner_cone_angle,
            outer_cone_angle,
            attenuation_radius,
        } => {
            gpu.light_type = 2;
            gpu.inner_cone_cos = inner_cone_angle.cos();
            gpu.outer_cone_cos = outer_cone_angle.cos();
            gpu.attenuation_radius = attenuation_radius;
        }
    }

    gpu
}

fn frame_uniforms(camera: &dyn Camera3d, lights: &LightCollection) -> FrameUniforms {
    let (view, proj) = camera.view_transform_pair();
    let ambient = linear_rgb(Color::new(
        lights.ambient_color.x,
        lights.ambient_color.y,
        lights.ambient_color.z,
        1.0,
    ));

    let mut gpu_lights = [GpuLight::default(); MAX_LIGHTS];
    for (gpu, light) in gpu_lights.iter_mut().zip(&lights.lights) {
        *gpu = gpu_light(light);
    }

    FrameUniforms {
        view: view.to_mat4().to_cols_array_2d(),
        proj: proj.to_cols_array_2d(),
        eye: camera.eye().extend(1.0).to_array(),
        ambient: [
            ambient[0] * lights.ambient,
            ambient[1] * lights.ambient,
            ambient[2] * lights.ambient,
            1.0,
        ],
        lights: gpu_lights,
        num_lights: lights.lights.len().min(MAX_LIGHTS) as u32,
        _padding: [0; 3],
    }
}

fn object_uniforms(world: Mat4, material: &PhysicalMaterial) -> ObjectUniforms {
    let color = color::srgb_to_linear(material.color);
    let repeat = material.repeat().unwrap_or(glamx::Vec2::ONE);

    ObjectUniforms {
        model: world.to_cols_array_2d(),
        normal: world.inverse().transpose().to_cols_array_2d(),
        color: [color.r, color.g, color.b, color.a],
        params: [
            material.roughness,
            material.metalness,
            material.ao_intensity,
            material.displacement_scale,
        ],
        uv: [repeat.x, repeat.y, material.opacity, 0.0],
    }
}

/// Per-object uniforms packed at the device's dynamic offset alignment and written with
/// one `write_buffer` per frame.
struct ObjectUniformBuffer {
    buffer: wgpu::Buffer,
    stride: u64,
    staging: Vec<u8>,
}

impl ObjectUniformBuffer {
    const INITIAL_CAPACITY: u64 = 16;

    fn new(ctxt: &Context) -> Self {
        let alignment = ctxt.device.limits().min_uniform_buffer_offset_alignment as u64;
        let size = std::mem::size_of::<ObjectUniforms>() as u64;
        let stride = size.div_ceil(alignment) * alignment;

        Self {
            buffer: Self::allocate(ctxt, stride * Self::INITIAL_CAPACITY),
            stride,
            staging: Vec::new(),
        }
    }

    fn allocate(ctxt: &Context, size: u64) -> wgpu::Buffer {
        ctxt.create_buffer(&wgpu::BufferDescriptor {
            label: Some("physical_object_uniforms"),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn clear(&mut self) {
        self.staging.clear();
    }

    /// Appends `uniforms` and returns their dynamic offset.
    fn push(&mut self, uniforms: &ObjectUniforms) -> u32 {
        let offset = self.staging.len();
        self.staging.extend_from_slice(bytemuck::bytes_of(uniforms));
        self.staging.resize(offset + self.stride as usize, 0);
        offset as u32
    }

    /// Uploads the staged uniforms. Returns `true` if the buffer had to be reallocated.
    fn flush(&mut self, ctxt: &Context) -> bool {
        let needed = self.staging.len() as u64;
        let grown = needed > self.buffer.size();

        if grown {
            let capacity = (needed / self.stride).next_power_of_two();
            self.buffer = Self::allocate(ctxt, capacity * self.stride);
        }

        if !self.staging.is_empty() {
            ctxt.write_buffer(&self.buffer, 0, &self.staging);
        }

        grown
    }
}

#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
struct SlotKey {
    image: u64,
    wrapping: TextureWrapping,
    filter: TextureFilter,
    mipmaps: bool,
}

type MapsKey = [SlotKey; 6];

/// The uniforms and bindings of one object, resolved before recording.
struct PreparedDraw {
    object_offset: u32,
    maps: MapsKey,
    mesh: Rc<GpuMesh>,
    transparent: bool,
}

/// Renders [`PhysicalMaterial`] objects.
///
/// Opaque objects are drawn first, then transparent ones with depth writes disabled.
/// Texture bind groups are shared between the objects using the same maps, which is the
/// case of the objects sharing a viewer material.
pub struct PhysicalRenderer {
    opaque_pipeline: wgpu::RenderPipeline,
    transparent_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    object_bind_group_layout: wgpu::BindGroupLayout,
    object_uniforms: ObjectUniformBuffer,
    object_bind_group: wgpu::BindGroup,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    texture_bind_groups: HashMap<MapsKey, wgpu::BindGroup>,
    /// Images bound to the slots a material leaves empty.
    defaults: [Arc<TextureImage>; 6],
}

impl PhysicalRenderer {
    /// Creates the pipelines for a color target of `color_format` sampled `sample_count` times.
    pub fn new(color_format: wgpu::TextureFormat, sample_count: u32) -> PhysicalRenderer {
        let ctxt = Context::get();

        let uniform_entry = |dynamic| wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: dynamic,
                min_binding_size: None,
            },
            count: None,
        };

        let frame_bind_group_layout =
            ctxt.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("physical_frame_bind_group_layout"),
                entries: &[uniform_entry(false)],
            });
        let object_bind_group_layout =
            ctxt.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("physical_object_bind_group_layout"),
                entries: &[uniform_entry(true)],
            });

        // One texture and one sampler per slot, in `MapSlot::ALL` order.
        let texture_entries: Vec<_> = MapSlot::ALL
            .iter()
            .enumerate()
            .flat_map(|(i, slot)| {
                let visibility = if *slot == MapSlot::Height {
                    wgpu::ShaderStages::VERTEX
                } else {
                    wgpu::ShaderStages::FRAGMENT
                };
                [
                    wgpu::BindGroupLayoutEntry {
                        binding: 2 * i as u32,
                        visibility,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2 * i as u32 + 1,
                        visibility,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ]
            })
            .collect();

        let texture_bind_group_layout =
            ctxt.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("physical_texture_bind_group_layout"),
                entries: &texture_entries,
            });

        let pipeline_layout = ctxt.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("physical_pipeline_layout"),
            bind_group_layouts: &[
                &frame_bind_group_layout,
                &object_bind_group_layout,
                &texture_bind_group_layout,
            ],
            push_constant_ranges: &[],
        });

        let shader =
            ctxt.create_shader_module(Some("physical_shader"), include_str!("physical.wgsl"));

        let vertex_buffer_layouts = [
            // Buffer 0: Vertex positions
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                }],
            },
            // Buffer 1: Texture coordinates
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                }],
            },
            // Buffer 2: Normals
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                }],
            },
        ];

        let create_pipeline = |label, transparent: bool| {
            ctxt.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &vertex_buffer_layouts,
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: color_format,
                        blend: Some(if transparent {
                            wgpu::BlendState::ALPHA_BLENDING
                        } else {
                            wgpu::BlendState::REPLACE
                        }),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    // Loaded models are not guaranteed to be closed.
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: Context::depth_format(),
                    depth_write_enabled: !transparent,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState {
                    count: sample_count,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
                cache: None,
            })
        };

        let opaque_pipeline = create_pipeline("physical_opaque_pipeline", false);
        let transparent_pipeline = create_pipeline("physical_transparent_pipeline", true);

        let frame_buffer = ctxt.create_buffer(&wgpu::BufferDescriptor {
            label: Some("physical_frame_uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = ctxt.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("physical_frame_bind_group"),
            layout: &frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let object_uniforms = ObjectUniformBuffer::new(&ctxt);
        let object_bind_group =
            Self::create_object_bind_group(&ctxt, &object_bind_group_layout, &object_uniforms);

        let defaults = MapSlot::ALL.map(|slot| {
            let texel = match slot {
                MapSlot::Normal => Color::new(0.5, 0.5, 1.0, 1.0),
                MapSlot::Height => color::BLACK,
                _ => color::WHITE,
            };
            TextureImage::solid(texel)
        });

        PhysicalRenderer {
            opaque_pipeline,
            transparent_pipeline,
            frame_buffer,
            frame_bind_group,
            object_bind_group_layout,
            object_uniforms,
            object_bind_group,
            texture_bind_group_layout,
            texture_bind_groups: HashMap::new(),
            defaults,
        }
    }

    fn create_object_bind_group(
        ctxt: &Context,
        layout: &wgpu::BindGroupLayout,
        uniforms: &ObjectUniformBuffer,
    ) -> wgpu::BindGroup {
        ctxt.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("physical_object_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniforms.buffer,
                    offset: 0,
                    size: std::num::NonZeroU64::new(
                        std::mem::size_of::<ObjectUniforms>() as u64
                    ),
                }),
            }],
        })
    }

    fn maps_key(&self, material: &PhysicalMaterial) -> MapsKey {
        MapSlot::ALL.map(|slot| match material.map(slot) {
            Some(binding) => SlotKey {
                image: binding.image.id(),
                wrapping: binding.wrapping,
                filter: binding.filter,
                mipmaps: binding.mipmaps,
            },
            None => SlotKey {
                image: self.defaults[slot as usize].id(),
                wrapping: TextureWrapping::Repeat,
                filter: TextureFilter::Nearest,
                mipmaps: false,
            },
        })
    }

    /// Requests the GPU textures of every slot, falling back to the defaults.
    fn upload_maps(
        &self,
        material: &PhysicalMaterial,
        textures: &mut GpuTextureCache,
    ) -> Vec<Arc<Texture>> {
        MapSlot::ALL
            .iter()
            .map(|slot| match material.map(*slot) {
                Some(binding) => textures.get_or_upload(
                    &binding.image,
                    slot.color_space(),
                    binding.wrapping,
                    binding.filter,
                    binding.mipmaps,
                ),
                None => textures.get_or_upload(
                    &self.defaults[*slot as usize],
                    slot.color_space(),
                    TextureWrapping::Repeat,
                    TextureFilter::Nearest,
                    false,
                ),
            })
            .collect()
    }

    fn create_texture_bind_group(&self, uploads: &[Arc<Texture>]) -> wgpu::BindGroup {
        let entries: Vec<_> = uploads
            .iter()
            .enumerate()
            .flat_map(|(i, texture)| {
                [
                    wgpu::BindGroupEntry {
                        binding: 2 * i as u32,
                        resource: wgpu::BindingResource::TextureView(&texture.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2 * i as u32 + 1,
                        resource: wgpu::BindingResource::Sampler(&texture.sampler),
                    },
                ]
            })
            .collect();

        Context::get().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("physical_texture_bind_group"),
            layout: &self.texture_bind_group_layout,
            entries: &entries,
        })
    }

    /// Records the draws of every visible object under `scene` into `render_pass`.
    ///
    /// Uniforms and textures are uploaded before recording, so this must be called before
    /// the command buffer holding `render_pass` is submitted.
    pub fn render(
        &mut self,
        scene: &SceneNode,
        camera: &dyn Camera3d,
        lights: &LightCollection,
        textures: &mut GpuTextureCache,
        render_pass: &mut wgpu::RenderPass<'_>,
    ) {
        let ctxt = Context::get();

        let mut draws = Vec::new();
        scene.collect_draws(Mat4::IDENTITY, &mut draws);

        let frame = frame_uniforms(camera, lights);
        ctxt.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&frame));

        self.object_uniforms.clear();
        let mut used = HashSet::new();
        let mut prepared = Vec::with_capacity(draws.len());

        for item in &draws {
            let material = item.object.material().borrow();
            if material.opacity <= 0.0 {
                continue;
            }

            // Requested every frame so `GpuTextureCache::end_frame` keeps them.
            let uploads = self.upload_maps(&material, textures);
            let maps = self.maps_key(&material);
            if !self.texture_bind_groups.contains_key(&maps) {
                let bind_group = self.create_texture_bind_group(&uploads);
                let _ = self.texture_bind_groups.insert(maps, bind_group);
            }
            let _ = used.insert(maps);

            prepared.push(PreparedDraw {
                object_offset: self
                    .object_uniforms
                    .push(&object_uniforms(item.world, &material)),
                maps,
                mesh: item.object.gpu_mesh(),
                transparent: material.opacity < 1.0 || material.color.a < 1.0,
            });
        }

        self.texture_bind_groups.retain(|key, _| used.contains(key));

        if self.object_uniforms.flush(&ctxt) {
            self.object_bind_group = Self::create_object_bind_group(
                &ctxt,
                &self.object_bind_group_layout,
                &self.object_uniforms,
            );
        }

        render_pass.set_bind_group(0, &self.frame_bind_group, &[]);

        for transparent in [false, true] {
            let pipeline = if transparent {
                &self.transparent_pipeline
            } else {
                &self.opaque_pipeline
            };
            render_pass.set_pipeline(pipeline);

            for draw in prepared.iter().filter(|d| d.transparent == transparent) {
                let Some(texture_bind_group) = self.texture_bind_groups.get(&draw.maps) else {
                    continue;
                };

                render_pass.set_bind_group(1, &self.object_bind_group, &[draw.object_offset]);
                render_pass.set_bind_group(2, texture_bind_group, &[]);
                draw.mesh.bind(render_pass);
                render_pass.draw_indexed(0..draw.mesh.num_indices(), 0, 0..1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::{CollectedLight, Light};
    use glamx::Vec2;

    #[test]
    fn uniform_layouts_match_the_shader() {
        assert_eq!(std::mem::size_of::<GpuLight>(), 64);
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 160 + 64 * MAX_LIGHTS + 16);
        assert_eq!(std::mem::size_of::<ObjectUniforms>(), 176);
    }

    #[test]
    fn spot_lights_upload_cone_cosines() {
        let light = Light::spot(0.0, std::f32::consts::FRAC_PI_2, 20.0);
        let collected = CollectedLight {
            light_type: light.light_type,
            color: Vec3::ONE,
            intensity: 3.0,
            world_position: Vec3::new(0.0, 3.0, 0.0),
            world_direction: Vec3::NEG_Y,
        };

        let gpu = gpu_light(&collected);
        assert_eq!(gpu.light_type, 2);
        assert_eq!(gpu.inner_cone_cos, 1.0);
        assert!(gpu.outer_cone_cos.abs() < 1.0e-6);
        assert_eq!(gpu.attenuation_radius, 20.0);
        assert_eq!(gpu.color, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn object_uniforms_carry_repeat_and_opacity() {
        let mut material = PhysicalMaterial::new().with_opacity(0.4).with_roughness(0.7);
        material.set_map(
            MapSlot::Base,
            Some(
                crate::resource::TextureBinding::new(TextureImage::solid(color::WHITE))
                    .repeated(Vec2::splat(3.0)),
            ),
        );

        let uniforms = object_uniforms(Mat4::from_scale(Vec3::splat(2.0)), &material);
        assert_eq!(uniforms.uv, [3.0, 3.0, 0.4, 0.0]);
        assert_eq!(uniforms.params[0], 0.7);
        assert_eq!(uniforms.normal[0][0], 0.5);
    }
}
