//! Splits complete JPEG frames out of a raw MJPEG byte stream.
//!
//! The grabber writes concatenated JPEGs to its stdout; frames are carved
//! out on the SOI/EOI markers. Bytes before a start marker are discarded so
//! the reader resynchronizes after a torn write.

const SOI: [u8; 2] = [0xFF, 0xD8];
const EOI: [u8; 2] = [0xFF, 0xD9];

/// Removes and returns the first complete JPEG frame in `buf`, if any.
/// Leading bytes that precede a start-of-image marker are dropped.
pub(crate) fn take_frame(buf: &mut Vec<u8>) -> Option<Vec<u8>> {
    let start = match find_marker(buf, SOI, 0) {
        Some(index) => index,
        None => {
            // No start marker anywhere; keep at most one trailing byte in
            // case it is the first half of a marker split across reads.
            if buf.len() > 1 {
                buf.drain(..buf.len() - 1);
            }
            return None;
        }
    };
    if start > 0 {
        buf.drain(..start);
    }

    let end = find_marker(buf, EOI, SOI.len())?;
    let frame = buf[..end + EOI.len()].to_vec();
    buf.drain(..end + EOI.len());
    Some(frame)
}

fn find_marker(haystack: &[u8], marker: [u8; 2], from: usize) -> Option<usize> {
    if haystack.len() < from + marker.len() {
        return None;
    }
    haystack[from..]
        .windows(marker.len())
        .position(|window| window == marker)
        .map(|index| index + from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg(body: &[u8]) -> Vec<u8> {
        let mut frame = vec![0xFF, 0xD8];
        frame.extend_from_slice(body);
        frame.extend_from_slice(&[0xFF, 0xD9]);
        frame
    }

    #[test]
    fn extracts_single_frame() {
        let mut buf = jpeg(b"abc");
        let frame = take_frame(&mut buf).unwrap();
        assert_eq!(frame, jpeg(b"abc"));
        assert!(buf.is_empty());
    }

    #[test]
    fn skips_garbage_before_start_marker() {
        let mut buf = b"noise".to_vec();
        buf.extend(jpeg(b"xyz"));
        let frame = take_frame(&mut buf).unwrap();
        assert_eq!(frame, jpeg(b"xyz"));
    }

    #[test]
    fn partial_frame_waits_for_more_data() {
        let full = jpeg(b"partial");
        let mut buf = full[..full.len() - 1].to_vec();
        assert!(take_frame(&mut buf).is_none());

        buf.push(full[full.len() - 1]);
        assert_eq!(take_frame(&mut buf).unwrap(), full);
    }

    #[test]
    fn extracts_back_to_back_frames() {
        let mut buf = jpeg(b"one");
        buf.extend(jpeg(b"two"));
        assert_eq!(take_frame(&mut buf).unwrap(), jpeg(b"one"));
        assert_eq!(take_frame(&mut buf).unwrap(), jpeg(b"two"));
        assert!(take_frame(&mut buf).is_none());
    }

    #[test]
    fn pure_garbage_is_bounded() {
        let mut buf = vec![0u8; 4096];
        assert!(take_frame(&mut buf).is_none());
        assert!(buf.len() <= 1);
    }
}
