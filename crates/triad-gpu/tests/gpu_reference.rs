//! GPU integration tests. Requires a real wgpu adapter.
//!
//! Run with: `cargo test -p triad-gpu`

use std::sync::{Mutex, OnceLock};

use triad_core::balance::balance_pixel;
use triad_core::image::BalanceImage;
use triad_core::offsets::{Channel, OffsetState, TonalRange, offset_from_control};
use triad_gpu::{BalancePipeline, GpuContext};

/// Create a test pipeline. Panics if no adapter is available.
fn create_test_pipeline() -> BalancePipeline {
    let ctx = GpuContext::new(false).expect("No GPU adapter found — GPU tests require a GPU");
    BalancePipeline::new(&ctx).expect("balance pipeline should build on the test device")
}

fn gpu_test_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// A small RGB gradient with opaque alpha.
fn create_test_gradient(width: u32, height: u32) -> BalanceImage {
    let mut pixels = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let r = (x * 255 / (width - 1).max(1)) as u8;
            let g = (y * 255 / (height - 1).max(1)) as u8;
            pixels.push([r, g, 128, 255]);
        }
    }
    BalanceImage {
        width,
        height,
        pixels,
    }
}

/// The 2x1 boundary fixture: one white pixel, one black pixel.
fn black_white_pair() -> BalanceImage {
    BalanceImage {
        width: 2,
        height: 1,
        pixels: vec![[255, 255, 255, 255], [0, 0, 0, 255]],
    }
}

fn state_with(range: TonalRange, channel: Channel, raw: i32) -> OffsetState {
    let mut state = OffsetState::default();
    state.set_channel(range, channel, raw).unwrap();
    state
}

#[test]
fn test_identity_offsets_pass_through() {
    let _lock = gpu_test_lock().lock().expect("gpu test lock poisoned");
    let mut pipeline = create_test_pipeline();

    let image = create_test_gradient(8, 8);
    let result = pipeline.render(&image, &OffsetState::default());

    // Zero offsets add nothing and the clamp is a no-op, so the 8-bit
    // round trip is exact.
    assert_eq!(result.width, image.width);
    assert_eq!(result.height, image.height);
    assert_eq!(result.pixels, image.pixels, "identity render must be byte-exact");
}

#[test]
fn test_render_twice_is_byte_identical() {
    let _lock = gpu_test_lock().lock().expect("gpu test lock poisoned");
    let mut pipeline = create_test_pipeline();

    let image = create_test_gradient(16, 9);
    let state = state_with(TonalRange::Midtones, Channel::R, 200);

    let first = pipeline.render(&image, &state);
    let second = pipeline.render(&image, &state);
    assert_eq!(first.pixels, second.pixels, "render must be deterministic");
}

#[test]
fn test_alpha_passes_through() {
    let _lock = gpu_test_lock().lock().expect("gpu test lock poisoned");
    let mut pipeline = create_test_pipeline();

    let mut image = create_test_gradient(4, 4);
    for (i, px) in image.pixels.iter_mut().enumerate() {
        px[3] = (i * 255 / 15) as u8;
    }

    let state = state_with(TonalRange::Shadows, Channel::G, 255);
    let result = pipeline.render(&image, &state);

    for (i, (src, dst)) in image.pixels.iter().zip(result.pixels.iter()).enumerate() {
        assert_eq!(src[3], dst[3], "pixel {i}: alpha modified by balance pass");
    }
}

#[test]
fn test_midtones_offset_leaves_black_and_white() {
    let _lock = gpu_test_lock().lock().expect("gpu test lock poisoned");
    let mut pipeline = create_test_pipeline();

    let image = black_white_pair();
    let state = state_with(TonalRange::Midtones, Channel::R, 200);
    let result = pipeline.render(&image, &state);

    // Midtone coverage is zero at both intensity extremes.
    assert_eq!(result.pixels[0], [255, 255, 255, 255], "white pixel moved");
    assert_eq!(result.pixels[1], [0, 0, 0, 255], "black pixel moved");
}

#[test]
fn test_shadows_offset_lifts_black_only() {
    let _lock = gpu_test_lock().lock().expect("gpu test lock poisoned");
    let mut pipeline = create_test_pipeline();

    let image = black_white_pair();
    let state = state_with(TonalRange::Shadows, Channel::R, 200);
    let result = pipeline.render(&image, &state);

    // Black takes the full remapped push on red; shadow coverage at
    // white is zero.
    let expected_red = (offset_from_control(200).unwrap() * 255.0).round() as i32;
    let red = i32::from(result.pixels[1][0]);
    assert!(
        (red - expected_red).abs() <= 1,
        "black red channel {red}, expected ~{expected_red}"
    );
    assert_eq!(result.pixels[1][1], 0, "green moved with red-only offset");
    assert_eq!(result.pixels[1][2], 0, "blue moved with red-only offset");
    assert_eq!(result.pixels[0], [255, 255, 255, 255], "white pixel moved");
}

#[test]
fn test_matches_cpu_reference() {
    let _lock = gpu_test_lock().lock().expect("gpu test lock poisoned");
    let mut pipeline = create_test_pipeline();

    let image = create_test_gradient(32, 32);
    let mut state = OffsetState::default();
    state.set_channel(TonalRange::Shadows, Channel::R, 200).unwrap();
    state.set_channel(TonalRange::Midtones, Channel::G, 64).unwrap();
    state.set_channel(TonalRange::Highlights, Channel::B, 150).unwrap();

    let result = pipeline.render(&image, &state);

    let mut max_error = 0i32;
    for (i, dst) in result.pixels.iter().enumerate() {
        let expected = balance_pixel(image.rgb_at(i), &state);
        for c in 0..3 {
            let want = (expected[c] * 255.0).round() as i32;
            let got = i32::from(dst[c]);
            let err = (want - got).abs();
            max_error = max_error.max(err);
            assert!(
                err <= 1,
                "pixel {i} channel {c}: gpu={got} cpu={want}",
            );
        }
    }
    eprintln!("GPU vs CPU reference max error: {max_error}");
}

#[test]
fn test_image_swap_reuses_pipeline() {
    let _lock = gpu_test_lock().lock().expect("gpu test lock poisoned");
    let mut pipeline = create_test_pipeline();

    let large = create_test_gradient(16, 16);
    let state = OffsetState::default();
    let first = pipeline.render(&large, &state);

    // Swap to a differently-sized image and back; nothing may bleed
    // between renders.
    let small = black_white_pair();
    let swapped = pipeline.render(&small, &state);
    assert_eq!(swapped.width, 2);
    assert_eq!(swapped.height, 1);
    assert_eq!(swapped.pixels, small.pixels);

    let again = pipeline.render(&large, &state);
    assert_eq!(first.pixels, again.pixels);
}
