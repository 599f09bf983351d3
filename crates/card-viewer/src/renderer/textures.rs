//! GPU copies of the textures held by the [`ResourceCache`].

use cardkit::{ResourceCache, ResourceId, TextureData};
use std::{collections::HashMap, sync::Arc};

struct GpuTexture {
    /// The cache entry this upload was made from.
    source: Arc<TextureData>,
    _texture: wgpu::Texture,
    bind: wgpu::BindGroup,
}

enum Binding {
    /// The cache had nothing better than the fallback last time we asked.
    Fallback,
    Uploaded(GpuTexture),
}

pub struct TextureRegistry {
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white: GpuTexture,
    fallback: GpuTexture,
    bindings: HashMap<ResourceId, Binding>,
    /// Largest side the device accepts.
    max_dimension: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plan {
    Fallback,
    Keep,
    Upload,
}

/// What to do with the texture the cache returned for an id, given the one
/// the GPU copy was last made from.
fn plan(
    data: &Arc<TextureData>,
    fallback: &Arc<TextureData>,
    uploaded_from: Option<&Arc<TextureData>>,
    max_dimension: u32,
) -> Plan {
    if Arc::ptr_eq(data, fallback) || !data.fits(max_dimension) || data.validate().is_err() {
        Plan::Fallback
    } else if uploaded_from.is_some_and(|src| Arc::ptr_eq(src, data)) {
        Plan::Keep
    } else {
        Plan::Upload
    }
}

impl TextureRegistry {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, fallback: &Arc<TextureData>) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Card Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Card Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let white_data = Arc::new(TextureData {
            width: 1,
            height: 1,
            rgba: vec![255; 4],
        });
        let white = upload(device, queue, &layout, &sampler, white_data, "white");
        let fallback = upload(device, queue, &layout, &sampler, fallback.clone(), "fallback");

        Self {
            layout,
            sampler,
            white,
            fallback,
            bindings: HashMap::new(),
            max_dimension: device.limits().max_texture_dimension_2d,
        }
    }

    /// Layout of the texture + sampler group the card pipeline binds at group 1.
    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// Brings the GPU copy of each id up to date with the cache. Uploads only
    /// happen when the cache hands back a different texture than last time.
    pub fn sync<'a, I>(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, cache: &ResourceCache, ids: I)
    where
        I: IntoIterator<Item = &'a ResourceId>,
    {
        for id in ids {
            let data = cache.get(id);
            let uploaded_from = match self.bindings.get(id) {
                Some(Binding::Uploaded(t)) => Some(&t.source),
                _ => None,
            };

            match plan(&data, cache.fallback(), uploaded_from, self.max_dimension) {
                Plan::Keep => {}
                Plan::Fallback => {
                    if !Arc::ptr_eq(&data, cache.fallback())
                        && !matches!(self.bindings.get(id), Some(Binding::Fallback))
                    {
                        log::warn!(
                            "Texture {} ({}x{}) is malformed or over the {}px device limit; using fallback",
                            id,
                            data.width,
                            data.height,
                            self.max_dimension
                        );
                    }
                    self.bindings.insert(id.clone(), Binding::Fallback);
                }
                Plan::Upload => {
                    log::debug!("Uploading texture {} ({}x{})", id, data.width, data.height);
                    let tex = upload(device, queue, &self.layout, &self.sampler, data, id.as_str());
                    self.bindings.insert(id.clone(), Binding::Uploaded(tex));
                }
            }
        }
    }

    /// Bind group for `id`; the white texture for untextured quads and the
    /// fallback for anything not uploaded yet.
    pub fn bind_group(&self, id: Option<&ResourceId>) -> &wgpu::BindGroup {
        match id {
            None => &self.white.bind,
            Some(id) => match self.bindings.get(id) {
                Some(Binding::Uploaded(t)) => &t.bind,
                _ => &self.fallback.bind,
            },
        }
    }
}

fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    data: Arc<TextureData>,
    label: &str,
) -> GpuTexture {
    let size = wgpu::Extent3d {
        width: data.width,
        height: data.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &data.rgba,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(4 * data.width),
            rows_per_image: Some(data.height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    GpuTexture {
        source: data,
        _texture: texture,
        bind,
    }
}
