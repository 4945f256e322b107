//! compression/shuffle.rs
//! Byte-shuffle filter over fixed-width items.
//!
//! Reorganizes row-oriented items into byte planes: all first bytes, then all
//! second bytes, and so on. Trailing bytes that do not fill an item are copied
//! unchanged after the planes.

/// Item width selected by the shuffle option (0 = no shuffle).
pub fn item_width(shuffle: u8) -> Option<usize> {
    match shuffle {
        1 => Some(4),
        2 => Some(8),
        _ => None,
    }
}

pub fn shuffle(input: &[u8], width: usize, out: &mut Vec<u8>) {
    out.clear();
    out.resize(input.len(), 0);
    if width <= 1 {
        out.copy_from_slice(input);
        return;
    }

    let items = input.len() / width;
    let body = items * width;
    for i in 0..width {
        for j in 0..items {
            out[i * items + j] = input[j * width + i];
        }
    }
    out[body..].copy_from_slice(&input[body..]);
}

pub fn unshuffle(input: &[u8], width: usize, out: &mut [u8]) {
    debug_assert_eq!(input.len(), out.len());
    if width <= 1 {
        out.copy_from_slice(input);
        return;
    }

    let items = input.len() / width;
    let body = items * width;
    for i in 0..width {
        for j in 0..items {
            out[j * width + i] = input[i * items + j];
        }
    }
    out[body..].copy_from_slice(&input[body..]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shuffle_groups_byte_planes() {
        let input = [1u8, 2, 3, 4, 5, 6, 7, 8, 9];
        let mut out = Vec::new();
        shuffle(&input, 4, &mut out);
        assert_eq!(out, vec![1, 5, 2, 6, 3, 7, 4, 8, 9]);

        let mut back = vec![0u8; input.len()];
        unshuffle(&out, 4, &mut back);
        assert_eq!(back, input);
    }

    #[test]
    fn short_input_is_copied() {
        let input = [7u8, 8, 9];
        let mut out = Vec::new();
        shuffle(&input, 8, &mut out);
        assert_eq!(out, input);
    }
}
