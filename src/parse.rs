use crate::matches::Match;
use crate::window::Window;
use crate::{MAX_LZ_LENGTH, MAX_RAW_LENGTH, MAX_RLE_REPEATS, MAX_RLE_UNIT, MIN_LZ_LENGTH};

/// Cheapest encoding of every suffix of the input.
///
/// `cost(i)` is the smallest number of bytes that encode `data[i..]`, and
/// `choice(i)` is the instruction at `i` achieving it.
pub struct CostTable<'a> {
    cost: Vec<usize>,
    choice: Vec<Match<'a>>,
}

/// Running minimum over the candidates of one position.
///
/// Only a strictly cheaper candidate replaces the current one, so the
/// evaluation order decides ties.
struct Best<'a> {
    total: usize,
    choice: Match<'a>,
}

impl<'a> Best<'a> {
    #[inline(always)]
    fn offer(&mut self, candidate: Match<'a>, suffix_cost: usize) {
        let total = candidate.encoded_size() + suffix_cost;
        if total < self.total {
            self.total = total;
            self.choice = candidate;
        }
    }
}

impl<'a> CostTable<'a> {
    pub fn build(data: &'a [u8]) -> Self {
        let n = data.len();
        let window = Window::new(data);
        let mut cost = vec![0; n + 1];
        let mut choice = Vec::with_capacity(n);
        let mut offsets = Vec::with_capacity(MAX_LZ_LENGTH);

        for pos in (0..n).rev() {
            if pos % 128 == 0 {
                debug!("position = {pos}");
            }
            let mut best = Best {
                total: usize::MAX,
                choice: Match::Raw(&data[pos..pos + 1]),
            };

            window.find_into(pos, &mut offsets);
            for (length, &offset) in (MIN_LZ_LENGTH..).zip(offsets.iter()) {
                best.offer(
                    Match::Lz {
                        offset,
                        length: length as u8,
                    },
                    cost[pos + length],
                );
            }

            for unit_len in 1..=MAX_RLE_UNIT {
                if n - pos < unit_len * 2 {
                    break;
                }
                let unit = &data[pos..pos + unit_len];
                let mut end = pos + unit_len;
                let mut repetitions = 1;
                while repetitions < MAX_RLE_REPEATS
                    && end + unit_len <= n
                    && &data[end..end + unit_len] == unit
                {
                    end += unit_len;
                    repetitions += 1;
                    best.offer(
                        Match::Rle {
                            unit,
                            repetitions: repetitions as u16,
                        },
                        cost[end],
                    );
                }
            }

            for len in 1..=MAX_RAW_LENGTH.min(n - pos) {
                best.offer(Match::Raw(&data[pos..pos + len]), cost[pos + len]);
            }

            trace!("pos {pos}: {} costing {}", best.choice, best.total);
            cost[pos] = best.total;
            choice.push(best.choice);
        }
        choice.reverse();

        CostTable { cost, choice }
    }

    /// number of input bytes covered
    pub fn len(&self) -> usize {
        self.choice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choice.is_empty()
    }

    /// Cost of encoding `data[pos..]`, `pos` in `0..=len()`.
    pub fn cost(&self, pos: usize) -> usize {
        self.cost[pos]
    }

    /// Instruction chosen at `pos`, `pos` in `0..len()`.
    pub fn choice(&self, pos: usize) -> Match<'a> {
        self.choice[pos]
    }

    /// size of the whole compressed body
    pub fn total_cost(&self) -> usize {
        self.cost[0]
    }

    /// The chosen instructions in stream order, starting at position 0.
    pub fn parse(&self) -> impl Iterator<Item = Match<'a>> + '_ {
        let mut pos = 0;
        std::iter::from_fn(move || {
            let m = *self.choice.get(pos)?;
            pos += m.bytes_encoded();
            Some(m)
        })
    }
}
