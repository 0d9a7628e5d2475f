//! Framing of the caller's associated-data list into one AEAD input.
//!
//! Each item is written as an 8-byte big-endian length followed by its
//! bytes, so `["a", "bb"]` and `["ab", "b"]` frame differently, and an
//! empty list frames differently from a list holding one empty item.

const LEN_PREFIX: usize = 8;

/// Frame an ordered list of associated-data items.
pub fn frame(extra: &[&[u8]]) -> Vec<u8> {
    let len = extra.iter().map(|item| LEN_PREFIX + item.len()).sum();
    let mut framed = Vec::with_capacity(len);
    for item in extra {
        framed.extend_from_slice(&(item.len() as u64).to_be_bytes());
        framed.extend_from_slice(item);
    }
    framed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_frames_to_nothing() {
        assert!(frame(&[]).is_empty());
    }

    #[test]
    fn single_empty_item_is_not_empty_list() {
        let extra: [&[u8]; 1] = [b""];
        assert_eq!(frame(&extra), vec![0; 8]);
    }

    #[test]
    fn split_point_matters() {
        let a: [&[u8]; 2] = [b"a", b"bb"];
        let b: [&[u8]; 2] = [b"ab", b"b"];
        assert_ne!(frame(&a), frame(&b));
    }

    #[test]
    fn order_matters() {
        let a: [&[u8]; 2] = [b"aa", b"bb"];
        let b: [&[u8]; 2] = [b"bb", b"aa"];
        assert_ne!(frame(&a), frame(&b));
    }

    #[test]
    fn layout() {
        let extra: [&[u8]; 2] = [b"aa", b"b"];
        assert_eq!(frame(&extra), vec![
            0, 0, 0, 0, 0, 0, 0, 2, b'a', b'a', 0, 0, 0, 0, 0, 0, 0, 1, b'b'
        ]);
    }
}
