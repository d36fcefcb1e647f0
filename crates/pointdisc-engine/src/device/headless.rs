use anyhow::{Context, Result};

use super::GpuInit;

/// Surface-less wgpu context for offscreen rendering.
///
/// Owns Instance/Adapter/Device/Queue. Hosts that already own a device can skip
/// this type and build a [`RenderCtx`](crate::render::RenderCtx) from their own.
pub struct HeadlessGpu {
    /// Kept alive for the lifetime of the device.
    _instance: wgpu::Instance,

    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

/// Color texture + view used as an offscreen render target.
pub struct ColorTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl HeadlessGpu {
    /// Acquires an adapter and device without a surface.
    pub async fn new(init: GpuInit) -> Result<Self> {
        let GpuInit {
            backends,
            power_preference,
            force_fallback_adapter,
            required_features,
            required_limits,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: None,
                force_fallback_adapter,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("pointdisc-engine device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        log::info!("headless gpu: {:?}", adapter.get_info().name);

        Ok(Self { _instance: instance, adapter, device, queue })
    }

    /// Blocking variant of [`new`](Self::new).
    pub fn new_blocking(init: GpuInit) -> Result<Self> {
        pollster::block_on(Self::new(init))
    }

    #[inline]
    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    #[inline]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[inline]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Creates a `width × height` color target usable as a render attachment.
    pub fn create_color_target(
        &self,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> ColorTarget {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("pointdisc offscreen color"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        ColorTarget { texture, view }
    }

    /// Copies `target` back to the CPU as tightly packed rows.
    ///
    /// Blocks until the GPU is idle.
    pub fn read_color_target(&self, target: &ColorTarget) -> Result<Vec<u8>> {
        let size = target.texture.size();
        let bytes_per_pixel = target
            .texture
            .format()
            .block_copy_size(None)
            .context("color target format has no plain copy size")?;
        let unpadded = size.width * bytes_per_pixel;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded = unpadded.div_ceil(align) * align;

        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pointdisc readback"),
            size: u64::from(padded) * u64::from(size.height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("pointdisc readback encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(size.height),
                },
            },
            size,
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device
            .poll(wgpu::PollType::Wait { submission_index: None, timeout: None })
            .context("device poll failed during readback")?;
        rx.recv()
            .context("readback callback was dropped")?
            .context("failed to map readback buffer")?;

        let mut pixels = Vec::with_capacity((unpadded * size.height) as usize);
        {
            let data = slice.get_mapped_range();
            for row in data.chunks(padded as usize) {
                pixels.extend_from_slice(&row[..unpadded as usize]);
            }
        }
        staging.unmap();
        Ok(pixels)
    }
}
