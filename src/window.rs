use crate::{MAX_LZ_LENGTH, MAX_OFFSET, MIN_LZ_LENGTH};

const TABLE_SIZE: usize = 1 << 16;
const NIL: usize = usize::MAX;

/// Chains every position to the previous one starting with the same two bytes.
///
/// The two bytes themselves are the key, so a chain never holds a position
/// that cannot start a match of the minimum length.
pub struct Window<'a> {
    data: &'a [u8],
    prev: Vec<usize>,
}

#[inline(always)]
fn key(data: &[u8], pos: usize) -> usize {
    ((data[pos] as usize) << 8) | data[pos + 1] as usize
}

impl<'a> Window<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        let mut head = vec![NIL; TABLE_SIZE];
        let mut prev = vec![NIL; data.len()];
        for pos in 0..data.len().saturating_sub(1) {
            let h = key(data, pos);
            prev[pos] = head[h];
            head[h] = pos;
        }
        Window { data, prev }
    }

    /// For each length from 2 upwards, the offset of the rightmost earlier
    /// occurrence of `data[pos..pos + length]` that ends at or before `pos`
    /// and starts at most 2047 bytes back. `offsets[k]` is the offset for
    /// length `k + 2`; the list stops at the first length without one.
    pub fn find_into(&self, pos: usize, offsets: &mut Vec<u16>) {
        offsets.clear();
        let max_len = MAX_LZ_LENGTH.min(self.data.len() - pos).min(pos);
        if max_len < MIN_LZ_LENGTH {
            return;
        }
        let lower = pos.saturating_sub(MAX_OFFSET);
        let target = &self.data[pos..pos + max_len];

        let mut best = MIN_LZ_LENGTH - 1;
        let mut candidate = self.prev[pos];
        // candidates come in decreasing order, so the first one reaching a
        // length is the rightmost occurrence of that length
        while candidate != NIL && candidate >= lower && best < max_len {
            let limit = max_len.min(pos - candidate);
            let length = self.data[candidate..candidate + limit]
                .iter()
                .zip(target)
                .take_while(|(a, b)| a == b)
                .count();
            if length > best {
                let offset = (pos - candidate) as u16;
                offsets.resize(length - MIN_LZ_LENGTH + 1, offset);
                best = length;
            }
            candidate = self.prev[candidate];
        }
        trace!("pos {pos}: {} lz lengths", offsets.len());
    }
}

#[cfg(test)]
mod tests {
    use super::Window;
    use crate::tests::setup;
    use crate::{MAX_LZ_LENGTH, MAX_OFFSET};
    use proptest::prelude::*;

    /// right to left substring search over the window, one length at a time
    fn naive(data: &[u8], pos: usize) -> Vec<u16> {
        let mut offsets = vec![];
        let max_len = MAX_LZ_LENGTH.min(data.len() - pos).min(pos);
        let lower = pos.saturating_sub(MAX_OFFSET);
        for length in 2..=max_len {
            let needle = &data[pos..pos + length];
            match data[lower..pos].windows(length).rposition(|w| w == needle) {
                Some(found) => offsets.push((pos - lower - found) as u16),
                None => break,
            }
        }
        offsets
    }

    fn check(data: &[u8]) {
        let window = Window::new(data);
        let mut offsets = vec![];
        for pos in 0..data.len() {
            window.find_into(pos, &mut offsets);
            assert_eq!(offsets, naive(data, pos), "pos {pos}");
        }
    }

    #[test]
    fn test_find_pattern() {
        setup();
        let data = hex::decode("0102030405aabb0102030405").unwrap();
        let window = Window::new(&data);
        let mut offsets = vec![];
        window.find_into(7, &mut offsets);
        assert_eq!(offsets, vec![7, 7, 7, 7]);
        window.find_into(6, &mut offsets);
        assert!(offsets.is_empty());
    }

    #[test]
    fn test_no_self_overlap() {
        setup();
        let data = [0xAA; 8];
        let window = Window::new(&data);
        let mut offsets = vec![];
        // at 4 the run before holds exactly 4 bytes: lengths 2..=4, each as close as possible
        window.find_into(4, &mut offsets);
        assert_eq!(offsets, vec![2, 3, 4]);
    }

    #[test]
    fn test_rightmost_occurrence_wins() {
        setup();
        let data = hex::decode("abcdef00abcd11abcdef").unwrap();
        let window = Window::new(&data);
        let mut offsets = vec![];
        window.find_into(7, &mut offsets);
        // "abcd" is closest 3 bytes back, "abcdef" only exists 7 bytes back
        assert_eq!(offsets, vec![3, 7]);
        check(&data);
    }

    #[test]
    fn test_window_limit() {
        setup();
        let mut data = vec![0x12, 0x34];
        data.extend((0..MAX_OFFSET as u32 + 10).map(|i| (i % 200) as u8 | 0x01));
        data.extend([0x12, 0x34]);
        let window = Window::new(&data);
        let mut offsets = vec![];
        window.find_into(data.len() - 2, &mut offsets);
        assert!(offsets.is_empty());
        check(&data);
    }

    #[test]
    fn test_matches_naive_search() {
        setup();
        let mut state = 0x2545F491u32;
        let data: Vec<u8> = (0..1200)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                // small alphabet so matches of every length show up
                (state % 3) as u8
            })
            .collect();
        check(&data);
        check(&[0; 40]);
        check(&[]);
        check(&[7]);
    }

    proptest! {
        #[test]
        fn prop_matches_naive_search(data in prop::collection::vec(any::<u8>(), 0..600)) {
            setup();
            check(&data);
        }

        #[test]
        fn prop_matches_naive_search_small_alphabet(
            alphabet in 1u8..=4,
            seed in prop::collection::vec(any::<u8>(), 0..600),
        ) {
            setup();
            let data: Vec<u8> = seed.iter().map(|b| b % alphabet).collect();
            check(&data);
        }
    }

    proptest! {
        // longer than the window, so the lower bound cuts chains short
        #![proptest_config(ProptestConfig::with_cases(12))]

        #[test]
        fn prop_matches_naive_search_past_window(
            alphabet in prop_oneof![1u8..=4, Just(255u8)],
            seed in prop::collection::vec(any::<u8>(), MAX_OFFSET + 1..3000),
        ) {
            setup();
            let data: Vec<u8> = seed.iter().map(|b| b % alphabet).collect();
            check(&data);
        }
    }
}
