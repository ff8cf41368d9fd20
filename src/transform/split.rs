//! Column splitter.
//!
//! Cuts a source image into N equal-width vertical slices at full height,
//! left to right, with no resampling. The original drew the whole image
//! shifted left onto an N-th-width canvas and let the canvas boundary clip
//! it; with integer column edges that is a straight band copy.
//!
//! `part_width = width / columns` is fractional in general. Column edges are
//! rounded to the nearest pixel and the last column absorbs the remainder,
//! so the column widths always sum to the source width.

use super::{Raster, TransformError};

/// Split `source` into `columns` vertical slices.
///
/// Returns exactly `columns` rasters. Every slice has the source's height;
/// each width is within one pixel of `width / columns`.
pub fn split_columns(source: &Raster, columns: u32) -> Result<Vec<Raster>, TransformError> {
    if columns == 0 {
        return Err(TransformError::InvalidInput(
            "column count must be at least 1".into(),
        ));
    }
    if columns > source.width {
        return Err(TransformError::InvalidInput(format!(
            "cannot split a {}px-wide image into {} columns",
            source.width, columns
        )));
    }

    let part_width = source.width as f64 / columns as f64;
    let mut slices = Vec::with_capacity(columns as usize);

    for i in 0..columns {
        let x0 = (i as f64 * part_width).round() as u32;
        let x1 = if i + 1 == columns {
            source.width
        } else {
            ((i + 1) as f64 * part_width).round() as u32
        };
        slices.push(copy_band(source, x0, x1));
    }

    Ok(slices)
}

/// Copy the vertical band `[x0, x1)` of `source` at full height.
fn copy_band(source: &Raster, x0: u32, x1: u32) -> Raster {
    let band_w = (x1 - x0) as usize;
    let mut pixels = Vec::with_capacity(band_w * source.height as usize * 3);
    for y in 0..source.height {
        let row_start = (y as usize * source.width as usize + x0 as usize) * 3;
        pixels.extend_from_slice(&source.pixels[row_start..row_start + band_w * 3]);
    }
    Raster::new(x1 - x0, source.height, pixels)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn create_test_image(width: u32, height: u32) -> Raster {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * 31 + x * 7) % 256) as u8;
                pixels.push(v);
                pixels.push(v);
                pixels.push(v);
            }
        }
        Raster::new(width, height, pixels)
    }

    proptest! {
        /// Exactly N slices, full height, widths summing to the source width
        /// with each within one pixel of the ideal part width.
        #[test]
        fn prop_slice_geometry(
            (width, height) in (1u32..=120, 1u32..=40),
            columns_seed in 1u32..=120,
        ) {
            let columns = columns_seed.min(width);
            let img = create_test_image(width, height);
            let slices = split_columns(&img, columns).unwrap();

            prop_assert_eq!(slices.len(), columns as usize);

            let part_width = width as f64 / columns as f64;
            let mut total = 0u32;
            for slice in &slices {
                prop_assert_eq!(slice.height, height);
                prop_assert!(
                    (slice.width as f64 - part_width).abs() <= 1.0,
                    "slice width {} too far from ideal {}",
                    slice.width,
                    part_width
                );
                total += slice.width;
            }
            prop_assert_eq!(total, width);
        }

        /// Reassembling the slices left to right reproduces the source.
        #[test]
        fn prop_slices_reassemble_to_source(
            (width, height) in (1u32..=60, 1u32..=20),
            columns_seed in 1u32..=60,
        ) {
            let columns = columns_seed.min(width);
            let img = create_test_image(width, height);
            let slices = split_columns(&img, columns).unwrap();

            let mut x_offset = 0u32;
            for slice in &slices {
                for y in 0..height {
                    for x in 0..slice.width {
                        prop_assert_eq!(slice.pixel(x, y), img.pixel(x_offset + x, y));
                    }
                }
                x_offset += slice.width;
            }
            prop_assert_eq!(x_offset, width);
        }
    }
}
