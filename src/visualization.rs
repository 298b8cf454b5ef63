use std::f64::consts::PI;
use std::path::Path;

use anyhow::{anyhow, Context as AnyhowContext, Result};
use ndarray as nd;

use crate::config::RenderMode;
use crate::dataset::TaskMarker;
use crate::feature::TrackedTouch;
use crate::my_types::*;

/// One pixel per degree
pub const IMAGE_WIDTH: usize = 360;
const MARKER_WIDTH: usize = 5;
const BUTTON_TINT: u8 = 100;

pub const TOUCH_COLORS: [Rgb; 5] = [
    [255, 0, 0],   // red
    [0, 255, 0],   // green
    [0, 0, 255],   // blue
    [255, 255, 0], // yellow
    [255, 0, 255], // magenta
];
const MOTOR_COLOR: Rgb = [255, 0, 0];
const START_COLOR: Rgb = [0, 255, 0];
const END_COLOR: Rgb = [0, 0, 255];
const OTHER_MARKER_COLOR: Rgb = [255, 255, 0];

pub fn touch_color(id: TouchId) -> Rgb {
    // ids are drawn as finger numbers starting at 1
    TOUCH_COLORS[(id + 1) % TOUCH_COLORS.len()]
}

/// Column of an angle in radians
pub fn angle_to_column(angle: Angle) -> usize {
    let degrees = angle.to_degrees().rem_euclid(360.);
    (degrees as usize) % IMAGE_WIDTH
}

pub fn black_image(height: usize) -> RgbArray {
    nd::Array3::zeros((height, IMAGE_WIDTH, 3))
}

fn set_pixel(image: &mut RgbArray, row: usize, col: usize, color: Rgb) {
    for (c, value) in color.iter().enumerate() {
        image[(row, col, c)] = *value;
    }
}

/// Paint the tracked touches of one sample
pub fn draw_touches(
    image: &mut RgbArray,
    row: usize,
    touches: &[TrackedTouch],
    mode: RenderMode,
    pressure_full_scale: f64,
) {
    for touch in touches {
        let (pressure, width) = match touch.pressure_and_width() {
            Some(pw) => pw,
            None => continue,
        };

        let angle = match mode {
            RenderMode::Normal => touch.position,
            RenderMode::Distance => (2. * PI - touch.position).rem_euclid(2. * PI),
        };
        let center = angle_to_column(angle) as i64;
        let half = (width.max(0.) as i64) / 2;
        let start = (center - half).max(0) as usize;
        let end = (center + half).min(IMAGE_WIDTH as i64 - 1) as usize;

        let intensity = pressure / pressure_full_scale;
        let color = touch_color(touch.id).map(|c| (c as f64 * intensity).clamp(0., 255.) as u8);
        for col in start..=end {
            set_pixel(image, row, col, color);
        }
    }
}

pub fn draw_motor(image: &mut RgbArray, row: usize, motor_angle: Option<Angle>) {
    let angle = motor_angle.filter(|a| !a.is_nan()).unwrap_or(0.);
    set_pixel(image, row, angle_to_column(angle), MOTOR_COLOR);
}

/// Purple tint over the whole row
pub fn draw_button(image: &mut RgbArray, row: usize) {
    for col in 0..IMAGE_WIDTH {
        for c in [0, 2] {
            let value = &mut image[(row, col, c)];
            *value = value.saturating_add(BUTTON_TINT);
        }
    }
}

pub fn draw_marker(image: &mut RgbArray, row: usize, marker: &TaskMarker) {
    let (cols, color) = match marker.marker.as_str() {
        "start" => (0..MARKER_WIDTH, START_COLOR),
        "end" => (IMAGE_WIDTH - MARKER_WIDTH..IMAGE_WIDTH, END_COLOR),
        _ => (0..MARKER_WIDTH, OTHER_MARKER_COLOR),
    };
    for col in cols {
        set_pixel(image, row, col, color);
    }
}

pub fn save_png(pixels: &RgbArray, path: &Path) -> Result<()> {
    let (height, width, _) = pixels.dim();
    let data: Vec<u8> = pixels.iter().copied().collect();
    let buffer = image::RgbImage::from_raw(width as u32, height as u32, data)
        .ok_or(anyhow!("image buffer does not match {width} x {height}"))?;
    buffer
        .save(path)
        .with_context(|| format!("Failed to save {}", path.display()))
}
