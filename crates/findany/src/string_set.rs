//! Multi-string search and strategy selection
//!
//! [`StringSearchValues`] picks one strategy when it is built and keeps it:
//!
//! 1. no needles: never matches
//! 2. an empty needle: matches at every position
//! 3. only single-unit needles: a [`CharSearchValues`] over those units,
//!    unless a surrogate needle meets Unicode folding
//! 4. one needle: the rare-character anchor matcher
//! 5. Teddy, when the needle set is eligible
//! 6. otherwise Aho-Corasick, with Rabin-Karp for short haystacks when the
//!    automaton is small and a start-character prefilter when every needle
//!    starts with an ASCII unit
//!
//! A strategy that turns out to be infeasible for the needles only changes
//! the selection; building never fails for that reason.
//!
//! Results follow one rule everywhere: the match with the smallest start
//! (or the greatest, for the `last_` operations); among needles matching at
//! that start the shortest wins, and among equal needles the first supplied.

use std::ops::Range;
use std::sync::OnceLock;

use findany_ac::{AhoCorasick, Direction, StartPrefilter};
use findany_match_mode::{
    is_high_surrogate, is_low_surrogate, ordinal_case_class, CaseMode, MatchMode,
};
use rustc_hash::FxHashMap;

use crate::char_set::{expand_case_classes, CharSearchValues};
use crate::error::{Result, SearchError};
use crate::options::SearchOptions;
use crate::rabin_karp::RabinKarp;
use crate::single::SingleString;
use crate::teddy::Teddy;
use crate::verify::{fold_needle, starts_with};
use crate::vector::Isa;

/// Haystacks shorter than this go to Rabin-Karp when a table exists.
const RABIN_KARP_MAX_HAYSTACK: usize = 256;
/// Automata larger than this never get a Rabin-Karp companion.
const RABIN_KARP_MAX_NEEDLES: usize = 64;
const RABIN_KARP_MAX_NODES: usize = 1024;

/// A needle occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Match {
    needle: usize,
    start: usize,
    end: usize,
}

impl Match {
    fn new(needle: usize, start: usize, len: usize) -> Self {
        Match {
            needle,
            start,
            end: start + len,
        }
    }

    /// Index of the matching needle in the slice the matcher was built from
    pub fn needle(&self) -> usize {
        self.needle
    }

    /// Start offset in code units
    pub fn start(&self) -> usize {
        self.start
    }

    /// End offset (exclusive) in code units
    pub fn end(&self) -> usize {
        self.end
    }

    /// Length in code units
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether an empty needle matched
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// `start..end`, for slicing the haystack
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Skips to the next unit that can leave the automaton's root.
#[derive(Debug)]
struct StartChars(CharSearchValues);

impl StartPrefilter for StartChars {
    fn next_candidate(&self, haystack: &[u16], from: usize) -> Option<usize> {
        self.0.index_of_any(&haystack[from..]).map(|i| from + i)
    }
}

#[derive(Debug)]
enum Strategy {
    Empty,
    /// `needle` is the first empty needle supplied
    EmptyNeedle {
        needle: usize,
    },
    Chars {
        set: CharSearchValues,
        /// First needle owning each member unit
        owners: FxHashMap<u16, usize>,
    },
    Single(SingleString),
    Teddy {
        teddy: Teddy,
        rabin_karp: Option<RabinKarp>,
        ac: AhoCorasick,
    },
    AhoCorasick {
        ac: AhoCorasick,
        rabin_karp: Option<RabinKarp>,
        prefilter: Option<StartChars>,
    },
}

impl Strategy {
    fn name(&self) -> &'static str {
        match self {
            Strategy::Empty => "empty",
            Strategy::EmptyNeedle { .. } => "empty-needle",
            Strategy::Chars { .. } => "chars",
            Strategy::Single(_) => "single",
            Strategy::Teddy { .. } => "teddy",
            Strategy::AhoCorasick { .. } => "aho-corasick",
        }
    }
}

/// Immutable set of UTF-16 needles compiled for leftmost search.
///
/// # Example
///
/// ```
/// use findany::{MatchMode, StringSearchValues};
///
/// let animals = StringSearchValues::new(&["fox", "dog", "the"], MatchMode::CaseSensitive)?;
/// let haystack: Vec<u16> = "The quick brown fox jumps over the lazy dog".encode_utf16().collect();
///
/// let m = animals.find(&haystack).unwrap();
/// assert_eq!((m.needle(), m.start(), m.end()), (0, 16, 19));
/// assert_eq!(animals.last_index_of_any(&haystack), Some(40));
/// # Ok::<(), findany::SearchError>(())
/// ```
#[derive(Debug)]
pub struct StringSearchValues {
    strategy: Strategy,
    needles: Vec<Box<[u16]>>,
    case_mode: CaseMode,
    isa: Isa,
    reverse: OnceLock<Option<AhoCorasick>>,
}

impl StringSearchValues {
    /// Build from Rust strings.
    pub fn new<S: AsRef<str>>(needles: &[S], mode: MatchMode) -> Result<Self> {
        let needles: Vec<Vec<u16>> = needles
            .iter()
            .map(|n| n.as_ref().encode_utf16().collect())
            .collect();
        Self::from_utf16(&needles, mode)
    }

    /// Build from UTF-16 needles.
    pub fn from_utf16<N: AsRef<[u16]>>(needles: &[N], mode: MatchMode) -> Result<Self> {
        let options = SearchOptions {
            ignore_case: mode.ignores_case(),
            ..Default::default()
        };
        Self::with_options(needles, &options)
    }

    /// Build with explicit options.
    pub fn with_options<N: AsRef<[u16]>>(needles: &[N], options: &SearchOptions) -> Result<Self> {
        if options.strict_utf16 {
            for (index, needle) in needles.iter().enumerate() {
                if let Some(at) = unpaired_surrogate(needle.as_ref()) {
                    return Err(SearchError::InvalidNeedle {
                        index,
                        reason: format!("unpaired surrogate at unit {}", at),
                    });
                }
            }
        }

        let isa = options.resolve_isa()?;
        let needles: Vec<Box<[u16]>> = needles.iter().map(|n| n.as_ref().into()).collect();
        let case_mode = CaseMode::analyze(needles.iter().map(|n| &n[..]), options.match_mode());
        let strategy = select(&needles, case_mode, isa)?;

        tracing::debug!(
            "selected {} strategy for {} needles ({:?}, {})",
            strategy.name(),
            needles.len(),
            case_mode,
            isa
        );

        Ok(StringSearchValues {
            strategy,
            needles,
            case_mode,
            isa,
            reverse: OnceLock::new(),
        })
    }

    /// Name of the selected strategy, for diagnostics.
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Comparison mode chosen from the needle alphabet.
    pub fn case_mode(&self) -> CaseMode {
        self.case_mode
    }

    /// Instruction set the vector kernels run with.
    pub fn isa(&self) -> Isa {
        self.isa
    }

    /// Number of needles supplied, duplicates included.
    pub fn needle_count(&self) -> usize {
        self.needles.len()
    }

    /// Needle `index` as supplied.
    pub fn needle(&self, index: usize) -> &[u16] {
        &self.needles[index]
    }

    /// Start of the leftmost occurrence of any needle.
    pub fn index_of_any(&self, haystack: &[u16]) -> Option<usize> {
        self.find(haystack).map(|m| m.start)
    }

    /// Start of the occurrence with the greatest start.
    pub fn last_index_of_any(&self, haystack: &[u16]) -> Option<usize> {
        self.rfind(haystack).map(|m| m.start)
    }

    /// Whether any needle occurs in `haystack`.
    pub fn contains_any(&self, haystack: &[u16]) -> bool {
        self.find(haystack).is_some()
    }

    /// [`contains_any`](Self::contains_any) over a Rust string.
    pub fn contains_any_str(&self, haystack: &str) -> bool {
        let haystack: Vec<u16> = haystack.encode_utf16().collect();
        self.contains_any(&haystack)
    }

    /// Leftmost occurrence, reporting which needle matched.
    pub fn find(&self, haystack: &[u16]) -> Option<Match> {
        match &self.strategy {
            Strategy::Empty => None,
            Strategy::EmptyNeedle { needle } => Some(Match::new(*needle, 0, 0)),
            Strategy::Chars { set, owners } => {
                let at = set.index_of_any(haystack)?;
                Some(Match::new(owners[&haystack[at]], at, 1))
            }
            Strategy::Single(single) => single
                .find(haystack)
                .map(|at| Match::new(0, at, single.len())),
            Strategy::Teddy {
                teddy,
                rabin_karp,
                ac,
            } => {
                let found = if haystack.len() >= teddy.min_haystack_len() {
                    teddy.find(haystack)
                } else if let Some(rk) = rabin_karp {
                    rk.find(haystack)
                } else {
                    ac.find(haystack)
                };
                found.map(|m| Match::new(m.needle, m.start, m.len))
            }
            Strategy::AhoCorasick {
                ac,
                rabin_karp,
                prefilter,
            } => {
                let found = match (rabin_karp, prefilter) {
                    (Some(rk), _) if haystack.len() < RABIN_KARP_MAX_HAYSTACK => rk.find(haystack),
                    (_, Some(prefilter)) => ac.find_with_prefilter(haystack, prefilter),
                    _ => ac.find(haystack),
                };
                found.map(|m| Match::new(m.needle, m.start, m.len))
            }
        }
    }

    /// Occurrence with the greatest start, reporting which needle matched.
    pub fn rfind(&self, haystack: &[u16]) -> Option<Match> {
        match &self.strategy {
            Strategy::Empty => None,
            Strategy::EmptyNeedle { needle } => Some(Match::new(*needle, haystack.len(), 0)),
            Strategy::Chars { set, owners } => {
                let at = set.last_index_of_any(haystack)?;
                Some(Match::new(owners[&haystack[at]], at, 1))
            }
            Strategy::Single(single) => single
                .rfind(haystack)
                .map(|at| Match::new(0, at, single.len())),
            Strategy::Teddy { .. } | Strategy::AhoCorasick { .. } => match self.reverse_automaton() {
                Some(ac) => ac.find(haystack).map(|m| Match::new(m.needle, m.start, m.len)),
                None => self.rfind_scalar(haystack),
            },
        }
    }

    /// Built on first use; `None` only if the automaton could not be built,
    /// in which case [`rfind_scalar`](Self::rfind_scalar) takes over.
    fn reverse_automaton(&self) -> Option<&AhoCorasick> {
        self.reverse
            .get_or_init(|| {
                AhoCorasick::build(&self.needles, self.case_mode, Direction::Reverse)
                    .map_err(|e| tracing::debug!("reverse automaton unavailable: {}", e))
                    .ok()
            })
            .as_ref()
    }

    fn rfind_scalar(&self, haystack: &[u16]) -> Option<Match> {
        let folded: Vec<Vec<u16>> = self
            .needles
            .iter()
            .map(|n| fold_needle(n, self.case_mode))
            .collect();
        (0..=haystack.len()).rev().find_map(|start| {
            (0..folded.len())
                .filter(|&i| starts_with(haystack, start, &folded[i], self.case_mode))
                .min_by_key(|&i| (folded[i].len(), i))
                .map(|i| Match::new(i, start, folded[i].len()))
        })
    }
}

fn select(needles: &[Box<[u16]>], case_mode: CaseMode, isa: Isa) -> Result<Strategy> {
    if needles.is_empty() {
        return Ok(Strategy::Empty);
    }
    if let Some(needle) = needles.iter().position(|n| n.is_empty()) {
        return Ok(Strategy::EmptyNeedle { needle });
    }
    if needles.iter().all(|n| n.len() == 1) {
        // A lone surrogate can change under pair folding of the haystack,
        // which a per-unit set cannot see.
        let surrogate = needles
            .iter()
            .any(|n| is_high_surrogate(n[0]) || is_low_surrogate(n[0]));
        if case_mode == CaseMode::CaseInsensitiveUnicode && surrogate {
            tracing::trace!("surrogate needle under unicode folding, skipping char set");
        } else {
            return Ok(chars_strategy(needles, case_mode, isa));
        }
    }
    if let [needle] = needles {
        match SingleString::new(needle, case_mode, isa) {
            Some(single) => return Ok(Strategy::Single(single)),
            None => tracing::trace!("single needle has fewer than two ASCII anchors"),
        }
    }

    let ac = AhoCorasick::build(needles, case_mode, Direction::Forward)?;
    let rabin_karp = || {
        let rk = RabinKarp::new(needles, case_mode);
        if rk.is_none() {
            tracing::trace!("rabin-karp table infeasible");
        }
        rk
    };

    match Teddy::new(needles, case_mode, isa, ac.unreachable_needles()) {
        Ok(teddy) => {
            tracing::trace!(
                "teddy with {} buckets over {} offsets",
                teddy.bucket_count(),
                teddy.offsets()
            );
            return Ok(Strategy::Teddy {
                teddy,
                rabin_karp: rabin_karp(),
                ac,
            });
        }
        Err(reason) => tracing::trace!("teddy rejected: {}", reason.as_str()),
    }

    let small = needles.len() <= RABIN_KARP_MAX_NEEDLES && ac.node_count() <= RABIN_KARP_MAX_NODES;
    let rabin_karp = if small {
        rabin_karp()
    } else {
        None
    };
    let prefilter = start_prefilter(&ac, isa);
    Ok(Strategy::AhoCorasick {
        ac,
        rabin_karp,
        prefilter,
    })
}

fn chars_strategy(needles: &[Box<[u16]>], case_mode: CaseMode, isa: Isa) -> Strategy {
    let mut owners = FxHashMap::default();
    for (i, needle) in needles.iter().enumerate() {
        let unit = needle[0];
        let class = if case_mode.ignores_case() {
            ordinal_case_class(unit)
        } else {
            vec![unit]
        };
        for member in class {
            owners.entry(member).or_insert(i);
        }
    }
    let values: Vec<u16> = owners.keys().copied().collect();
    Strategy::Chars {
        set: CharSearchValues::with_isa(&values, isa),
        owners,
    }
}

/// Prefilter over the units that leave the root, when all of them are ASCII.
///
/// Non-ASCII start units would have to account for surrogate pairs folding
/// together, so those automata scan without a prefilter.
fn start_prefilter(ac: &AhoCorasick, isa: Isa) -> Option<StartChars> {
    let units = ac.start_units();
    if units.iter().any(|&u| u >= 0x80) {
        return None;
    }
    let units = if ac.case_mode().ignores_case() {
        expand_case_classes(&units)
    } else {
        units
    };
    Some(StartChars(CharSearchValues::with_isa(&units, isa)))
}

/// Position of the first unpaired surrogate.
fn unpaired_surrogate(units: &[u16]) -> Option<usize> {
    let mut i = 0;
    while i < units.len() {
        let unit = units[i];
        if is_high_surrogate(unit) {
            if units.get(i + 1).is_some_and(|&next| is_low_surrogate(next)) {
                i += 2;
                continue;
            }
            return Some(i);
        }
        if is_low_surrogate(unit) {
            return Some(i);
        }
        i += 1;
    }
    None
}
