//! GPU-to-CPU readback of the rendered target.

use triad_core::image::BalanceImage;

/// Map `staging` and copy its contents into a [`BalanceImage`], stripping
/// the row padding required by `copy_texture_to_buffer`. Blocks until the
/// map completes.
pub fn download_target(
    device: &wgpu::Device,
    staging: &wgpu::Buffer,
    width: u32,
    height: u32,
    padded_bytes_per_row: u32,
) -> BalanceImage {
    staging.slice(..).map_async(wgpu::MapMode::Read, |_| {});
    device.poll(wgpu::PollType::wait_indefinitely()).unwrap();

    let data = staging.slice(..).get_mapped_range();
    let row_bytes = (width * 4) as usize;
    let mut pixels: Vec<[u8; 4]> = Vec::with_capacity((width * height) as usize);
    for row in 0..height {
        let start = (row * padded_bytes_per_row) as usize;
        let row_pixels: &[[u8; 4]] = bytemuck::cast_slice(&data[start..start + row_bytes]);
        pixels.extend_from_slice(row_pixels);
    }
    drop(data);
    staging.unmap();

    BalanceImage {
        width,
        height,
        pixels,
    }
}
