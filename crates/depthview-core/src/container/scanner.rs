//! End-of-image marker scanning.
//!
//! A container is one or more encoded images stored back to back, each
//! terminated by the two-byte end-of-image marker `FF D9`. The scanner walks
//! the buffer forward and closes a range at every marker it finds.
//!
//! Markers are matched byte for byte. A marker sequence that happens to sit
//! inside an embedded segment (for example an EXIF thumbnail) also closes a
//! range. Bytes after the last marker are not emitted as a range.

use memchr::memmem;

use super::{ContainerError, ImageBuffer, SubImageRange};

/// The end-of-image marker terminating each encoded sub-image.
pub const END_MARKER: [u8; 2] = [0xFF, 0xD9];

/// Split `buffer` into the sub-image ranges delimited by [`END_MARKER`].
///
/// Ranges are returned in buffer order. Each range runs from the end of the
/// previous one (or offset 0) up to and including the next marker.
///
/// # Errors
///
/// Returns `ContainerError::NoDelimiterFound` when the buffer is shorter than
/// a marker or contains none.
pub fn scan(buffer: &ImageBuffer) -> Result<Vec<SubImageRange>, ContainerError> {
    let ranges = scan_bytes(buffer.as_bytes());
    if ranges.is_empty() {
        return Err(ContainerError::NoDelimiterFound {
            scanned: buffer.len(),
        });
    }

    let tail = trailing_bytes(buffer, &ranges);
    if tail > 0 {
        log::warn!(
            "Dropping {} trailing bytes after the last end-of-image marker",
            tail
        );
    }
    log::debug!(
        "Found {} sub-image(s) in {} bytes",
        ranges.len(),
        buffer.len()
    );

    Ok(ranges)
}

/// Number of bytes after the final range that no range covers.
pub fn trailing_bytes(buffer: &ImageBuffer, ranges: &[SubImageRange]) -> usize {
    let covered = ranges.last().map_or(0, |r| r.end);
    buffer.len().saturating_sub(covered)
}

fn scan_bytes(bytes: &[u8]) -> Vec<SubImageRange> {
    let mut ranges = Vec::new();
    let mut start = 0;

    // find_iter yields non-overlapping matches, so each search resumes at i + 2
    for i in memmem::find_iter(bytes, &END_MARKER) {
        let end = i + END_MARKER.len();
        if let Some(range) = SubImageRange::new(start, end) {
            ranges.push(range);
        }
        start = end;
    }

    ranges
}
