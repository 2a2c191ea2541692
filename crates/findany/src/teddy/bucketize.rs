//! Grouping needles into at most eight Teddy buckets
//!
//! Each bucket's fingerprint accepts, per offset, every byte whose low and
//! high nibbles both occur among its members. Merging two buckets therefore
//! widens what the tables let through; the greedy pass always merges the pair
//! whose union grows the accepted footprint least.

use super::MAX_OFFSETS;

/// Buckets available in one 8-bit lane.
pub(crate) const MAX_BUCKETS: usize = 8;

/// Nibbles seen at each fingerprint offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Footprint {
    lo: [u16; MAX_OFFSETS],
    hi: [u16; MAX_OFFSETS],
    offsets: usize,
}

impl Footprint {
    /// `bytes[k]` lists the bytes accepted at offset `k`.
    pub(crate) fn new<'a>(bytes: impl IntoIterator<Item = &'a [u8]>) -> Self {
        let mut footprint = Footprint::default();
        for (k, accepted) in bytes.into_iter().enumerate().take(MAX_OFFSETS) {
            for &b in accepted {
                footprint.lo[k] |= 1 << (b & 0x0F);
                footprint.hi[k] |= 1 << (b >> 4);
            }
            footprint.offsets = k + 1;
        }
        footprint
    }

    fn union(&self, other: &Footprint) -> Footprint {
        let mut merged = *self;
        for k in 0..MAX_OFFSETS {
            merged.lo[k] |= other.lo[k];
            merged.hi[k] |= other.hi[k];
        }
        merged.offsets = self.offsets.max(other.offsets);
        merged
    }

    /// Count of byte sequences the fingerprint accepts.
    fn cost(&self) -> i64 {
        (0..self.offsets)
            .map(|k| i64::from(self.lo[k].count_ones() * self.hi[k].count_ones()))
            .product()
    }
}

/// Partition `footprints` (one per needle) into at most [`MAX_BUCKETS`]
/// groups of needle positions.
///
/// With eight or fewer needles every needle gets its own bucket. Ties
/// between equally cheap merges go to the lowest group indices.
pub(crate) fn bucketize(footprints: &[Footprint]) -> Vec<Vec<usize>> {
    let mut groups: Vec<(Footprint, Vec<usize>)> = footprints
        .iter()
        .enumerate()
        .map(|(i, f)| (*f, vec![i]))
        .collect();

    while groups.len() > MAX_BUCKETS {
        let mut best: Option<(i64, usize, usize)> = None;
        for a in 0..groups.len() {
            for b in a + 1..groups.len() {
                let merged = groups[a].0.union(&groups[b].0);
                let growth = merged.cost() - groups[a].0.cost() - groups[b].0.cost();
                if best.map_or(true, |(g, _, _)| growth < g) {
                    best = Some((growth, a, b));
                }
            }
        }
        let Some((_, a, b)) = best else {
            break;
        };
        let (footprint, members) = groups.remove(b);
        groups[a].0 = groups[a].0.union(&footprint);
        groups[a].1.extend(members);
    }

    groups.into_iter().map(|(_, members)| members).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn footprint(prefix: &[u8]) -> Footprint {
        Footprint::new(prefix.chunks(1))
    }

    #[test]
    fn test_small_sets_one_per_bucket() {
        let fps: Vec<Footprint> = [b"ab", b"cd", b"ef"].iter().map(|p| footprint(*p)).collect();
        assert_eq!(bucketize(&fps), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn test_identical_prefixes_merge_first() {
        let mut prefixes: Vec<Vec<u8>> = (0..8u8).map(|i| vec![b'a' + i, b'0' + i]).collect();
        prefixes.push(b"a0".to_vec());
        let fps: Vec<Footprint> = prefixes.iter().map(|p| footprint(p)).collect();
        let buckets = bucketize(&fps);
        assert_eq!(buckets.len(), MAX_BUCKETS);
        assert_eq!(buckets[0], vec![0, 8]);
    }

    #[test]
    fn test_many_needles_fit_in_eight_buckets() {
        let prefixes: Vec<Vec<u8>> = (0..64u8).map(|i| vec![b'!' + i, b'z' - (i % 26)]).collect();
        let fps: Vec<Footprint> = prefixes.iter().map(|p| footprint(p)).collect();
        let buckets = bucketize(&fps);
        assert_eq!(buckets.len(), MAX_BUCKETS);
        let mut all: Vec<usize> = buckets.into_iter().flatten().collect();
        all.sort_unstable();
        assert_eq!(all, (0..64).collect::<Vec<_>>());
    }

    #[test]
    fn test_cost_counts_accepted_bytes() {
        let fp = Footprint::new([&b"aA"[..], &b"b"[..]]);
        // 'a' (0x61) and 'A' (0x41) share a low nibble.
        assert_eq!(fp.cost(), 2);
    }
}
