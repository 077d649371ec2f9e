//! Perceptual hashing of a single image file.
//!
//! Uses pHash from `image_hasher` (median threshold over DCT coefficients,
//! 8x8): visually similar images get equal or near-equal codes. The canonical string form is the
//! 64 hash bits as 16 lowercase hex characters.

use std::fmt::Write as _;
use std::path::Path;

use image::ImageReader;
use image_hasher::{HashAlg, Hasher, HasherConfig};
use tracing::debug;

/// Hash width and height in bits.
pub const HASH_SIZE: u32 = 8;

/// Build the hasher used for every fingerprint.
///
/// Workers build their own instance; hashers are not shared across threads.
#[must_use]
pub fn hasher() -> Hasher {
    HasherConfig::new()
        .hash_size(HASH_SIZE, HASH_SIZE)
        .hash_alg(HashAlg::Median)
        .preproc_dct()
        .to_hasher()
}

/// Fingerprint the image at `path`.
///
/// Returns `None` if `path` is not a regular file or cannot be decoded as an
/// image. Blobs have no extension, so the format is sniffed from content.
#[must_use]
pub fn fingerprint_file(hasher: &Hasher, path: &Path) -> Option<String> {
    if !path.is_file() {
        debug!(path = %path.display(), "No image file, fingerprint absent");
        return None;
    }

    let decoded = ImageReader::open(path)
        .and_then(ImageReader::with_guessed_format)
        .map_err(image::ImageError::IoError)
        .and_then(ImageReader::decode);

    match decoded {
        Ok(image) => Some(to_hex(hasher.hash_image(&image).as_bytes())),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Undecodable image, fingerprint absent");
            None
        }
    }
}

fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}
