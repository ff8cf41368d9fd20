//! Zip export for image groups and multi-selections.

use crate::models::image::StoredImage;
use crate::services::gallery::{GalleryError, GalleryResult};
use crate::transform;
use std::io::{Cursor, Write};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

/// Bundle the given images into a single zip archive, one entry per image,
/// named after the image record.
pub fn zip_images(images: &[StoredImage]) -> GalleryResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for image in images {
        let (_mime, bytes) = transform::decode_data_url(&image.data_url)?;
        writer
            .start_file(image.name.as_str(), options)
            .map_err(|err| GalleryError::Backend(err.to_string()))?;
        writer
            .write_all(&bytes)
            .map_err(|err| GalleryError::Backend(err.to_string()))?;
    }

    let cursor = writer
        .finish()
        .map_err(|err| GalleryError::Backend(err.to_string()))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{JPEG_QUALITY, Raster};

    fn record(name: &str) -> StoredImage {
        let raster = Raster::filled(8, 8, [10, 20, 30]);
        let jpeg = transform::encode_jpeg(&raster, JPEG_QUALITY).unwrap();
        StoredImage::new(
            "me@example.com",
            name,
            jpeg.len() as i64,
            transform::encode_data_url("image/jpeg", &jpeg),
        )
    }

    #[test]
    fn produces_a_zip_archive() {
        let archive = zip_images(&[record("a.jpg"), record("b.jpg")]).unwrap();
        // local file header magic
        assert_eq!(&archive[..2], b"PK");
        assert!(archive.len() > 4);
    }

    #[test]
    fn empty_selection_yields_an_empty_archive() {
        let archive = zip_images(&[]).unwrap();
        // end-of-central-directory magic
        assert_eq!(&archive[..4], &[0x50, 0x4b, 0x05, 0x06]);
    }

    #[test]
    fn rejects_records_with_broken_payloads() {
        let mut broken = record("a.jpg");
        broken.data_url = "not-a-data-url".into();
        assert!(zip_images(&[broken]).is_err());
    }
}
