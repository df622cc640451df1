//! Generators for synthetic fields, streamlines and pixels.
//!
//! Everything here returns plain vectors and tuples so the generators can be
//! used from any crate in the workspace.

/// Points along a straight line starting at `start`, `n` points `step` apart
/// in direction `(dx, dy)` (normalised internally).
pub fn straight_line_points(
    start: (f64, f64),
    direction: (f64, f64),
    step: f64,
    n: usize,
) -> Vec<(f64, f64)> {
    let norm = direction.0.hypot(direction.1).max(f64::EPSILON);
    let (ux, uy) = (direction.0 / norm, direction.1 / norm);
    (0..n)
        .map(|i| {
            let d = i as f64 * step;
            (start.0 + ux * d, start.1 + uy * d)
        })
        .collect()
}

/// Points on a zigzag with 3-4-5 legs, so each leg is exactly 5 units long.
///
/// Useful for checking cumulative arc length: point `i` sits at arc length `5 * i`.
pub fn zigzag_points(n: usize) -> Vec<(f64, f64)> {
    (0..n)
        .map(|i| {
            let x = 3.0 * i as f64;
            let y = if i % 2 == 0 { 0.0 } else { 4.0 };
            (x, y)
        })
        .collect()
}

/// A vortex field `(u, v)` around `center`, row-major over a `rows x cols`
/// grid with unit spacing starting at the origin.
pub fn vortex_components(rows: usize, cols: usize, center: (f64, f64)) -> (Vec<f64>, Vec<f64>) {
    let mut u = Vec::with_capacity(rows * cols);
    let mut v = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            let x = col as f64 - center.0;
            let y = row as f64 - center.1;
            u.push(-y);
            v.push(x);
        }
    }
    (u, v)
}

/// Creates RGBA pixel data with a gradient pattern.
pub fn create_test_rgba_pixels(width: usize, height: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            let r = ((x as f32 / width as f32) * 255.0) as u8;
            let g = ((y as f32 / height as f32) * 255.0) as u8;
            pixels.extend_from_slice(&[r, g, 128, 255]);
        }
    }
    pixels
}

/// Creates opaque grey pixels, one shade per row, like a frame of dashes.
pub fn create_grey_frame_pixels(width: usize, height: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        let shade = ((y * 255) / height.max(1)) as u8;
        for _ in 0..width {
            pixels.extend_from_slice(&[shade, shade, shade, 255]);
        }
    }
    pixels
}
