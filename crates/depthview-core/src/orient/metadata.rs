//! Capture orientation from EXIF metadata.

use std::io::Cursor;

use exif::{In, Reader, Tag};

use super::Orientation;

/// Extract the EXIF orientation from an encoded image.
///
/// Returns `None` if there is no EXIF block or it has no orientation tag.
pub fn read_orientation(bytes: &[u8]) -> Option<Orientation> {
    let mut cursor = Cursor::new(bytes);
    let exif = Reader::new().read_from_container(&mut cursor).ok()?;
    let field = exif.get_field(Tag::Orientation, In::PRIMARY)?;
    field.value.get_uint(0).map(Orientation::from)
}

/// Like [`read_orientation`], falling back to `Orientation::Normal`.
pub fn orientation_or_normal(bytes: &[u8]) -> Orientation {
    read_orientation(bytes).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{encode_jpeg, gradient_image, with_exif_orientation, MINIMAL_JPEG};

    #[test]
    fn test_orientation_extraction_no_exif() {
        // The minimal JPEG has no EXIF data
        assert_eq!(read_orientation(MINIMAL_JPEG), None);
        assert_eq!(orientation_or_normal(MINIMAL_JPEG), Orientation::Normal);
    }

    #[test]
    fn test_orientation_extraction_invalid_data() {
        assert_eq!(orientation_or_normal(&[0x00, 0x01, 0x02]), Orientation::Normal);
    }

    #[test]
    fn test_orientation_extraction_with_exif() {
        let jpeg = encode_jpeg(&gradient_image(8, 4));
        let tagged = with_exif_orientation(&jpeg, 6);
        assert_eq!(read_orientation(&tagged), Some(Orientation::Rotate90CW));

        let tagged = with_exif_orientation(&jpeg, 3);
        assert_eq!(read_orientation(&tagged), Some(Orientation::Rotate180));
    }
}
