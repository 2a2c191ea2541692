//! Character-set search over UTF-16 code units
//!
//! [`CharSearchValues`] answers "where is the first/last unit that is (or is
//! not) in this set". The representation is chosen once from the values:
//!
//! | values                         | strategy                              |
//! |--------------------------------|---------------------------------------|
//! | none                           | `Empty`                               |
//! | one                            | scalar equality                       |
//! | contiguous range               | `(u - lo) <= (hi - lo)`               |
//! | two or three                   | scalar multi-equality                 |
//! | all ASCII                      | nibble bitmap over narrowed units     |
//! | at most 64, some non-ASCII     | probabilistic map + confirmation      |
//! | anything else                  | dense bitset                          |

use std::sync::OnceLock;

use findany_match_mode::ordinal_case_class;

use crate::bitmap::{DenseBitmap, NibbleBitmap};
use crate::probabilistic::{self, ProbabilisticSet};
use crate::vector::{first_in_blocks, last_in_blocks, vector_kernel, Isa, Vector, LANES};

#[derive(Debug, Clone)]
enum Strategy {
    Empty,
    One(u16),
    Range { lo: u16, hi: u16 },
    Any2([u16; 2]),
    Any3([u16; 3]),
    Ascii(NibbleBitmap),
    Probabilistic(ProbabilisticSet),
    Dense(DenseBitmap),
}

impl Strategy {
    fn select(values: &[u16]) -> Strategy {
        match values {
            [] => Strategy::Empty,
            [one] => Strategy::One(*one),
            [lo, .., hi] if (*hi - *lo) as usize + 1 == values.len() => {
                Strategy::Range { lo: *lo, hi: *hi }
            }
            [a, b] => Strategy::Any2([*a, *b]),
            [a, b, c] => Strategy::Any3([*a, *b, *c]),
            _ if values.iter().all(|&v| v < 0x80) => {
                Strategy::Ascii(NibbleBitmap::new(values.iter().map(|&v| v as u8)))
            }
            _ if values.len() <= probabilistic::MAX_VALUES => {
                Strategy::Probabilistic(ProbabilisticSet::new(values))
            }
            _ => Strategy::Dense(DenseBitmap::new(values)),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Strategy::Empty => "empty",
            Strategy::One(_) => "one",
            Strategy::Range { .. } => "range",
            Strategy::Any2(_) => "any2",
            Strategy::Any3(_) => "any3",
            Strategy::Ascii(_) => "ascii-bitmap",
            Strategy::Probabilistic(_) => "probabilistic",
            Strategy::Dense(_) => "dense-bitmap",
        }
    }

    #[inline(always)]
    fn contains(&self, unit: u16) -> bool {
        match self {
            Strategy::Empty => false,
            Strategy::One(v) => unit == *v,
            Strategy::Range { lo, hi } => unit.wrapping_sub(*lo) <= hi - lo,
            Strategy::Any2([a, b]) => unit == *a || unit == *b,
            Strategy::Any3([a, b, c]) => unit == *a || unit == *b || unit == *c,
            Strategy::Ascii(bitmap) => unit < 0x80 && bitmap.contains(unit as u8),
            Strategy::Probabilistic(set) => set.contains(unit),
            Strategy::Dense(bitmap) => bitmap.contains(unit),
        }
    }

    fn members(&self) -> Vec<u16> {
        match self {
            Strategy::Empty => Vec::new(),
            Strategy::One(v) => vec![*v],
            Strategy::Range { lo, hi } => (*lo..=*hi).collect(),
            Strategy::Any2(values) => values.to_vec(),
            Strategy::Any3(values) => values.to_vec(),
            Strategy::Ascii(bitmap) => bitmap.members().map(u16::from).collect(),
            Strategy::Probabilistic(set) => set.values().to_vec(),
            Strategy::Dense(bitmap) => bitmap.members().collect(),
        }
    }
}

/// Immutable set of UTF-16 code units compiled for fast scanning.
///
/// # Example
///
/// ```
/// use findany::CharSearchValues;
///
/// let vowels: Vec<u16> = "aeiou".encode_utf16().collect();
/// let set = CharSearchValues::new(&vowels);
/// let haystack: Vec<u16> = "rhythm and blues".encode_utf16().collect();
/// assert_eq!(set.index_of_any(&haystack), Some(7));
/// assert_eq!(set.last_index_of_any(&haystack), Some(14));
/// ```
#[derive(Debug)]
pub struct CharSearchValues {
    strategy: Strategy,
    isa: Isa,
    values: OnceLock<Vec<u16>>,
}

impl CharSearchValues {
    /// Build a set using the best instruction set of the running CPU.
    pub fn new(values: &[u16]) -> Self {
        Self::with_isa(values, Isa::detect())
    }

    /// Build a set whose case-insensitive matches are included: every value
    /// is expanded to all units with the same ordinal uppercase.
    pub fn new_ignore_case(values: &[u16]) -> Self {
        Self::with_isa(&expand_case_classes(values), Isa::detect())
    }

    pub(crate) fn with_isa(values: &[u16], isa: Isa) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        let strategy = Strategy::select(&sorted);
        CharSearchValues {
            strategy,
            isa,
            values: OnceLock::new(),
        }
    }

    /// Name of the selected strategy, for diagnostics.
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Instruction set the vector kernels run with.
    pub fn isa(&self) -> Isa {
        self.isa
    }

    /// Whether `unit` is in the set.
    #[inline]
    pub fn contains(&self, unit: u16) -> bool {
        self.strategy.contains(unit)
    }

    /// The members of the set, sorted.
    pub fn values(&self) -> &[u16] {
        self.values.get_or_init(|| self.strategy.members())
    }

    /// Index of the first unit in the set.
    pub fn index_of_any(&self, haystack: &[u16]) -> Option<usize> {
        self.first(haystack, false)
    }

    /// Index of the first unit not in the set.
    pub fn index_of_any_except(&self, haystack: &[u16]) -> Option<usize> {
        self.first(haystack, true)
    }

    /// Index of the last unit in the set.
    pub fn last_index_of_any(&self, haystack: &[u16]) -> Option<usize> {
        self.last(haystack, false)
    }

    /// Index of the last unit not in the set.
    pub fn last_index_of_any_except(&self, haystack: &[u16]) -> Option<usize> {
        self.last(haystack, true)
    }

    /// Whether any unit of `haystack` is in the set.
    pub fn contains_any(&self, haystack: &[u16]) -> bool {
        self.index_of_any(haystack).is_some()
    }

    /// Whether some unit of `haystack` is outside the set.
    pub fn contains_any_except(&self, haystack: &[u16]) -> bool {
        self.index_of_any_except(haystack).is_some()
    }

    fn first(&self, haystack: &[u16], except: bool) -> Option<usize> {
        match &self.strategy {
            Strategy::Empty => {
                if except && !haystack.is_empty() {
                    Some(0)
                } else {
                    None
                }
            }
            Strategy::Ascii(bitmap) if haystack.len() >= LANES => {
                ascii_first(self.isa, bitmap, haystack, except)
            }
            Strategy::Probabilistic(set) => set.index_of(self.isa, haystack, except),
            strategy => haystack
                .iter()
                .position(|&u| strategy.contains(u) != except),
        }
    }

    fn last(&self, haystack: &[u16], except: bool) -> Option<usize> {
        match &self.strategy {
            Strategy::Empty => {
                if except {
                    haystack.len().checked_sub(1)
                } else {
                    None
                }
            }
            Strategy::Ascii(bitmap) if haystack.len() >= LANES => {
                ascii_last(self.isa, bitmap, haystack, except)
            }
            Strategy::Probabilistic(set) => set.last_index_of(self.isa, haystack, except),
            strategy => haystack
                .iter()
                .rposition(|&u| strategy.contains(u) != except),
        }
    }
}

/// Expand every value to its ordinal-ignore-case class.
pub(crate) fn expand_case_classes(values: &[u16]) -> Vec<u16> {
    let mut expanded: Vec<u16> = values
        .iter()
        .flat_map(|&v| ordinal_case_class(v))
        .collect();
    expanded.sort_unstable();
    expanded.dedup();
    expanded
}

unsafe fn ascii_first_kernel<V: Vector>(
    bitmap: &NibbleBitmap,
    haystack: &[u16],
    except: bool,
) -> Option<usize> {
    let tables = bitmap.tables::<V>();
    let flip = if except { 0xFFFF } else { 0 };
    let ptr = haystack.as_ptr();
    first_in_blocks!(haystack.len(), |at| tables
        .ascii_mask(V::load_narrow(ptr.add(at)))
        ^ flip)
}

unsafe fn ascii_last_kernel<V: Vector>(
    bitmap: &NibbleBitmap,
    haystack: &[u16],
    except: bool,
) -> Option<usize> {
    let tables = bitmap.tables::<V>();
    let flip = if except { 0xFFFF } else { 0 };
    let ptr = haystack.as_ptr();
    last_in_blocks!(haystack.len(), |at| tables
        .ascii_mask(V::load_narrow(ptr.add(at)))
        ^ flip)
}

vector_kernel! {
    fn ascii_first(bitmap: &NibbleBitmap, haystack: &[u16], except: bool) -> Option<usize> => ascii_first_kernel;
    fn ascii_last(bitmap: &NibbleBitmap, haystack: &[u16], except: bool) -> Option<usize> => ascii_last_kernel;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::supported_isas;

    fn utf16(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    fn naive_first(values: &[u16], haystack: &[u16], except: bool) -> Option<usize> {
        haystack.iter().position(|u| values.contains(u) != except)
    }

    fn naive_last(values: &[u16], haystack: &[u16], except: bool) -> Option<usize> {
        haystack.iter().rposition(|u| values.contains(u) != except)
    }

    fn check_all(values: &[u16], haystack: &[u16]) {
        for isa in supported_isas() {
            let set = CharSearchValues::with_isa(values, isa);
            let ctx = format!("{} / {}", set.strategy_name(), isa);
            assert_eq!(set.index_of_any(haystack), naive_first(values, haystack, false), "{}", ctx);
            assert_eq!(set.index_of_any_except(haystack), naive_first(values, haystack, true), "{}", ctx);
            assert_eq!(set.last_index_of_any(haystack), naive_last(values, haystack, false), "{}", ctx);
            assert_eq!(
                set.last_index_of_any_except(haystack),
                naive_last(values, haystack, true),
                "{}",
                ctx
            );
        }
    }

    #[test]
    fn test_strategy_selection() {
        assert_eq!(CharSearchValues::new(&[]).strategy_name(), "empty");
        assert_eq!(CharSearchValues::new(&utf16("x")).strategy_name(), "one");
        assert_eq!(CharSearchValues::new(&utf16("abcd")).strategy_name(), "range");
        assert_eq!(CharSearchValues::new(&utf16("ax")).strategy_name(), "any2");
        assert_eq!(CharSearchValues::new(&utf16("a\u{e9}x")).strategy_name(), "any3");
        assert_eq!(CharSearchValues::new(&utf16("aeiou")).strategy_name(), "ascii-bitmap");
        assert_eq!(CharSearchValues::new(&utf16("a\u{e9}x\u{430}")).strategy_name(), "probabilistic");
        let many: Vec<u16> = (0x400..0x500).step_by(2).collect();
        assert_eq!(CharSearchValues::new(&many).strategy_name(), "dense-bitmap");
    }

    #[test]
    fn test_empty_set() {
        let set = CharSearchValues::new(&[]);
        assert_eq!(set.index_of_any(&utf16("abc")), None);
        assert_eq!(set.index_of_any_except(&utf16("abc")), Some(0));
        assert_eq!(set.last_index_of_any_except(&utf16("abc")), Some(2));
        assert_eq!(set.index_of_any_except(&[]), None);
        assert!(!set.contains_any(&[]));
        assert!(set.values().is_empty());
    }

    #[test]
    fn test_ascii_bitmap_all_lengths() {
        let values = utf16("aeiou;");
        for len in 0..50 {
            let haystack: Vec<u16> = (0..len).map(|i| [b'x' as u16, 0x1E9, b'e' as u16, 0xFF65][i % 4]).collect();
            check_all(&values, &haystack);
            let mut sparse = vec![b'z' as u16; len];
            if len > 0 {
                sparse[len - 1] = b';' as u16;
            }
            check_all(&values, &sparse);
        }
    }

    #[test]
    fn test_saturated_units_never_match_ascii() {
        // 0x0161 narrows to 0xFF, 0x0141 to 0xFF; neither may look like 'A'.
        let values = utf16("ABC\u{7f}x");
        let haystack = vec![0x0141u16; 33];
        check_all(&values, &haystack);
    }

    #[test]
    fn test_probabilistic_and_dense() {
        let small = utf16("\u{430}\u{431}\u{451}z\u{3A9}");
        let many: Vec<u16> = (0x400..0x500).step_by(3).chain([b'q' as u16]).collect();
        for len in [0, 5, 15, 16, 17, 31, 64, 70] {
            let haystack: Vec<u16> = (0..len).map(|i| 0x3004 + (i as u16 % 7) * 0x100).collect();
            check_all(&small, &haystack);
            check_all(&many, &haystack);
            let mut with_hit = haystack.clone();
            if len > 3 {
                with_hit[len - 3] = 0x451;
                with_hit[1] = 0x403;
            }
            check_all(&small, &with_hit);
            check_all(&many, &with_hit);
        }
    }

    #[test]
    fn test_range_and_small_sets() {
        let haystack = utf16("Hello, World! 0123456789");
        check_all(&utf16("0123456789"), &haystack);
        check_all(&utf16("!"), &haystack);
        check_all(&utf16("lo"), &haystack);
        check_all(&utf16("W,9"), &haystack);
    }

    #[test]
    fn test_ignore_case_expansion() {
        let set = CharSearchValues::new_ignore_case(&utf16("abc\u{e9}"));
        assert!(set.contains(b'C' as u16));
        assert!(set.contains(0xC9));
        assert!(!set.contains(b'd' as u16));
        assert_eq!(set.index_of_any(&utf16("xyzC")), Some(3));
    }

    #[test]
    fn test_values_materialized_sorted() {
        let set = CharSearchValues::new(&utf16("zyxaz"));
        assert_eq!(set.values(), utf16("axyz").as_slice());
        // Cached after the first call.
        assert!(std::ptr::eq(set.values(), set.values()));
    }
}
