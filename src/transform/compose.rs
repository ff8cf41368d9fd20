//! Crop/rotate compositor.
//!
//! Reproduces the canvas compositing of the original editor: the output is
//! exactly the crop region's size, filled with an opaque white background,
//! rotated about its own center, with the crop sub-rectangle of the source
//! mapped onto the full output. Expressed here as an inverse mapping: for
//! each output pixel we rotate back into source space and sample.
//!
//! Rotation is interpreted modulo 360. An effective rotation of 0 takes an
//! exact copy path so a plain crop is byte-exact. Non-multiple-of-90 angles
//! clip their corners against the fixed-size output; that is accepted lossy
//! behavior, not a bug.

use super::{Raster, TransformError};
use serde::Deserialize;

/// Margin fill, matching the editor's `#ffffff` canvas fill.
pub const BACKGROUND: [u8; 3] = [255, 255, 255];

/// Angles closer than this to a multiple of 360 take the exact crop path.
const ANGLE_EPSILON: f64 = 1e-9;

/// Crop rectangle in source pixel coordinates.
///
/// The compositor does not clamp: a region that extends past the source
/// bounds composites those pixels from the background color. Callers are
/// expected to pass regions within reasonable bounds.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CropRegion {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Composite a rotated crop of `source` onto a `region.width x region.height`
/// output canvas.
pub fn compose(
    source: &Raster,
    region: CropRegion,
    rotation_degrees: f64,
) -> Result<Raster, TransformError> {
    if region.width == 0 || region.height == 0 {
        return Err(TransformError::InvalidInput(
            "crop region must have non-zero width and height".into(),
        ));
    }
    if !rotation_degrees.is_finite() {
        return Err(TransformError::InvalidInput(
            "rotation must be a finite angle".into(),
        ));
    }

    let angle = rotation_degrees.rem_euclid(360.0);
    if angle < ANGLE_EPSILON || (360.0 - angle) < ANGLE_EPSILON {
        return Ok(crop_exact(source, &region));
    }

    let out_w = region.width;
    let out_h = region.height;
    let cx = out_w as f64 / 2.0;
    let cy = out_h as f64 / 2.0;
    let theta = angle.to_radians();
    let (sin, cos) = theta.sin_cos();

    let mut output = Raster::filled(out_w, out_h, BACKGROUND);
    for dst_y in 0..out_h {
        for dst_x in 0..out_w {
            // Pixel center relative to the rotation origin.
            let px = dst_x as f64 + 0.5 - cx;
            let py = dst_y as f64 + 0.5 - cy;

            // Inverse of the canvas rotate: R(-theta).
            let ux = px * cos + py * sin;
            let uy = -px * sin + py * cos;

            let src_x = ux + cx + region.x as f64 - 0.5;
            let src_y = uy + cy + region.y as f64 - 0.5;

            let rgb = sample_bilinear(source, src_x, src_y);
            let idx = (dst_y as usize * out_w as usize + dst_x as usize) * 3;
            output.pixels[idx..idx + 3].copy_from_slice(&rgb);
        }
    }

    Ok(output)
}

/// Exact crop: copy the intersection of the region with the source, fill the
/// rest with the background color.
fn crop_exact(source: &Raster, region: &CropRegion) -> Raster {
    let mut output = Raster::filled(region.width, region.height, BACKGROUND);

    let src_x0 = region.x.max(0);
    let src_y0 = region.y.max(0);
    let src_x1 = (region.x + region.width as i64).min(source.width as i64);
    let src_y1 = (region.y + region.height as i64).min(source.height as i64);
    if src_x0 >= src_x1 || src_y0 >= src_y1 {
        return output;
    }

    let copy_w = (src_x1 - src_x0) as usize;
    for src_y in src_y0..src_y1 {
        let dst_x = (src_x0 - region.x) as usize;
        let dst_y = (src_y - region.y) as usize;
        let src_idx = (src_y as usize * source.width as usize + src_x0 as usize) * 3;
        let dst_idx = (dst_y * region.width as usize + dst_x) * 3;
        output.pixels[dst_idx..dst_idx + copy_w * 3]
            .copy_from_slice(&source.pixels[src_idx..src_idx + copy_w * 3]);
    }

    output
}

/// Bilinear sample; coordinates outside the source read as the background.
///
/// In-bounds means within half a pixel of the pixel-center grid. Rotations
/// by multiples of 90 land on integer coordinates only up to floating-point
/// error (`sin(pi)` is ~1.2e-16, not 0), so a hard `[0, w-1]` bound would
/// misread the whole border as background. Taps are edge-clamped instead.
fn sample_bilinear(source: &Raster, x: f64, y: f64) -> [u8; 3] {
    let w = source.width as f64;
    let h = source.height as f64;
    if x < -0.5 || y < -0.5 || x > w - 0.5 || y > h - 0.5 {
        return BACKGROUND;
    }

    let x0f = x.floor();
    let y0f = y.floor();
    let fx = x - x0f;
    let fy = y - y0f;

    let max_x = source.width as i64 - 1;
    let max_y = source.height as i64 - 1;
    let x0 = (x0f as i64).clamp(0, max_x) as u32;
    let x1 = (x0f as i64 + 1).clamp(0, max_x) as u32;
    let y0 = (y0f as i64).clamp(0, max_y) as u32;
    let y1 = (y0f as i64 + 1).clamp(0, max_y) as u32;

    let p00 = source.pixel(x0, y0);
    let p10 = source.pixel(x1, y0);
    let p01 = source.pixel(x0, y1);
    let p11 = source.pixel(x1, y1);

    let mut result = [0u8; 3];
    for c in 0..3 {
        let v = p00[c] as f64 * (1.0 - fx) * (1.0 - fy)
            + p10[c] as f64 * fx * (1.0 - fy)
            + p01[c] as f64 * (1.0 - fx) * fy
            + p11[c] as f64 * fx * fy;
        result[c] = v.clamp(0.0, 255.0).round() as u8;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test image with a unique value per pixel position.
    fn test_image(width: u32, height: u32) -> Raster {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 256) as u8;
                pixels.push(v);
                pixels.push(v);
                pixels.push(v);
            }
        }
        Raster::new(width, height, pixels)
    }

    #[test]
    fn zero_rotation_output_matches_region_dimensions() {
        let img = test_image(100, 80);
        let region = CropRegion {
            x: 10,
            y: 10,
            width: 30,
            height: 20,
        };
        let out = compose(&img, region, 0.0).unwrap();
        assert_eq!(out.width, 30);
        assert_eq!(out.height, 20);
    }

    #[test]
    fn full_bounds_zero_rotation_is_identity() {
        let img = test_image(64, 48);
        let region = CropRegion {
            x: 0,
            y: 0,
            width: 64,
            height: 48,
        };
        let out = compose(&img, region, 0.0).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn zero_rotation_copies_exact_pixels() {
        let img = test_image(10, 10);
        let region = CropRegion {
            x: 3,
            y: 2,
            width: 4,
            height: 4,
        };
        let out = compose(&img, region, 0.0).unwrap();
        // top-left of output is source (3, 2): value (2 * 10 + 3) = 23
        assert_eq!(out.pixel(0, 0), [23, 23, 23]);
        // bottom-right is source (6, 5): value (5 * 10 + 6) = 56
        assert_eq!(out.pixel(3, 3), [56, 56, 56]);
    }

    #[test]
    fn region_outside_source_fills_background() {
        let img = test_image(10, 10);
        let region = CropRegion {
            x: 8,
            y: 8,
            width: 6,
            height: 6,
        };
        let out = compose(&img, region, 0.0).unwrap();
        assert_eq!(out.width, 6);
        assert_eq!(out.height, 6);
        // (0,0) still inside source, far corner is margin
        assert_eq!(out.pixel(0, 0), [88, 88, 88]);
        assert_eq!(out.pixel(5, 5), BACKGROUND);
    }

    #[test]
    fn negative_origin_fills_background_at_top_left() {
        let img = test_image(10, 10);
        let region = CropRegion {
            x: -2,
            y: -2,
            width: 4,
            height: 4,
        };
        let out = compose(&img, region, 0.0).unwrap();
        assert_eq!(out.pixel(0, 0), BACKGROUND);
        // (2,2) in the output maps to source (0,0)
        assert_eq!(out.pixel(2, 2), [0, 0, 0]);
    }

    #[test]
    fn full_turn_takes_exact_path() {
        let img = test_image(20, 20);
        let region = CropRegion {
            x: 0,
            y: 0,
            width: 20,
            height: 20,
        };
        let plain = compose(&img, region, 0.0).unwrap();
        let turned = compose(&img, region, 360.0).unwrap();
        let many_turns = compose(&img, region, -720.0).unwrap();
        assert_eq!(plain, turned);
        assert_eq!(plain, many_turns);
    }

    #[test]
    fn rotation_preserves_center_and_whitens_corners() {
        // Uniform mid-gray source; rotated corners clip against the canvas
        // and read the white margin.
        let img = Raster::filled(50, 50, [90, 90, 90]);
        let region = CropRegion {
            x: 0,
            y: 0,
            width: 50,
            height: 50,
        };
        let out = compose(&img, region, 45.0).unwrap();
        assert_eq!(out.width, 50);
        assert_eq!(out.height, 50);
        assert_eq!(out.pixel(25, 25), [90, 90, 90]);
        assert_eq!(out.pixel(0, 0), BACKGROUND);
        assert_eq!(out.pixel(49, 49), BACKGROUND);
    }

    #[test]
    fn rotation_180_maps_opposite_corners() {
        let img = test_image(9, 9);
        let region = CropRegion {
            x: 0,
            y: 0,
            width: 9,
            height: 9,
        };
        let out = compose(&img, region, 180.0).unwrap();
        // Center pixel is a fixed point of the rotation.
        assert_eq!(out.pixel(4, 4), img.pixel(4, 4));
        // (0,0) now shows what was at (8,8).
        assert_eq!(out.pixel(0, 0), img.pixel(8, 8));
        assert_eq!(out.pixel(8, 8), img.pixel(0, 0));
    }

    #[test]
    fn rotation_180_is_an_exact_flip_including_borders() {
        // Mapped coordinates at 180 degrees are integers only up to
        // floating-point error; the border must still read source pixels,
        // not the background.
        let img = test_image(9, 9);
        let region = CropRegion {
            x: 0,
            y: 0,
            width: 9,
            height: 9,
        };
        let out = compose(&img, region, 180.0).unwrap();
        for y in 0..9 {
            for x in 0..9 {
                assert_eq!(
                    out.pixel(x, y),
                    img.pixel(8 - x, 8 - y),
                    "mismatch at ({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn rotation_90_keeps_the_border_in_bounds() {
        let img = Raster::filled(11, 11, [40, 40, 40]);
        let region = CropRegion {
            x: 0,
            y: 0,
            width: 11,
            height: 11,
        };
        let out = compose(&img, region, 90.0).unwrap();
        // A square rotated by 90 degrees covers the whole canvas; no pixel
        // may fall back to the background fill.
        for y in 0..11 {
            for x in 0..11 {
                assert_eq!(out.pixel(x, y), [40, 40, 40], "mismatch at ({x}, {y})");
            }
        }
    }

    #[test]
    fn zero_sized_region_is_rejected() {
        let img = test_image(10, 10);
        let region = CropRegion {
            x: 0,
            y: 0,
            width: 0,
            height: 5,
        };
        assert!(matches!(
            compose(&img, region, 0.0),
            Err(TransformError::InvalidInput(_))
        ));
    }

    #[test]
    fn non_finite_rotation_is_rejected() {
        let img = test_image(10, 10);
        let region = CropRegion {
            x: 0,
            y: 0,
            width: 5,
            height: 5,
        };
        assert!(matches!(
            compose(&img, region, f64::NAN),
            Err(TransformError::InvalidInput(_))
        ));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (4u32..=60, 4u32..=60)
    }

    fn create_test_image(width: u32, height: u32) -> Raster {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 256) as u8;
                pixels.push(v);
                pixels.push(v);
                pixels.push(v);
            }
        }
        Raster::new(width, height, pixels)
    }

    proptest! {
        /// Output dimensions always equal the requested region, whatever the
        /// rotation.
        #[test]
        fn prop_output_matches_region_dimensions(
            (width, height) in dimensions_strategy(),
            (rw, rh) in (1u32..=40, 1u32..=40),
            (rx, ry) in (-10i64..=60, -10i64..=60),
            rotation in -720.0f64..=720.0,
        ) {
            let img = create_test_image(width, height);
            let region = CropRegion { x: rx, y: ry, width: rw, height: rh };
            let out = compose(&img, region, rotation).unwrap();
            prop_assert_eq!(out.width, rw);
            prop_assert_eq!(out.height, rh);
            prop_assert_eq!(out.pixels.len(), (rw * rh * 3) as usize);
        }

        /// Composing is deterministic.
        #[test]
        fn prop_compose_is_deterministic(
            (width, height) in dimensions_strategy(),
            rotation in 0.0f64..360.0,
        ) {
            let img = create_test_image(width, height);
            let region = CropRegion { x: 2, y: 2, width: width.min(16), height: height.min(16) };
            let a = compose(&img, region, rotation).unwrap();
            let b = compose(&img, region, rotation).unwrap();
            prop_assert_eq!(a, b);
        }

        /// Zero rotation on in-bounds regions copies source pixels verbatim.
        #[test]
        fn prop_pure_crop_copies_source(
            (width, height) in (10u32..=60, 10u32..=60),
        ) {
            let img = create_test_image(width, height);
            let region = CropRegion { x: 2, y: 3, width: width / 2, height: height / 2 };
            let out = compose(&img, region, 0.0).unwrap();
            for y in 0..out.height {
                for x in 0..out.width {
                    prop_assert_eq!(
                        out.pixel(x, y),
                        img.pixel(x + 2, y + 3),
                        "mismatch at ({}, {})", x, y
                    );
                }
            }
        }
    }
}
