//! UTF-16 Aho-Corasick Automaton
//!
//! This crate implements the Aho-Corasick automaton findany falls back to
//! when no vectorized strategy applies. It reports the match with the
//! smallest start index (leftmost-start), not the first match to end.
//!
//! # Design
//!
//! The automaton is a trie over UTF-16 code units stored as a `Vec<Node>`:
//! - each node keeps its most frequent child inline (`fast_unit`/`fast_child`)
//!   and the rest in an `FxHashMap` overflow table
//! - suffix links are computed breadth-first, then every node inherits the
//!   match of the first terminal on its suffix chain
//! - needles that have another needle as a proper prefix can never be the
//!   leftmost-start answer and are not inserted ("unreachable")
//!
//! Because terminal nodes are leaves, their suffix links are replaced with
//! [`NO_SUFFIX`]: reaching a terminal always ends the scan.
//!
//! A [`Direction::Reverse`] automaton is built over the reversed needles and
//! scanned from the end of the haystack; its first match is the match with the
//! greatest start index.

use std::collections::VecDeque;
use std::fmt;

use rustc_hash::FxHashMap;

pub use findany_match_mode::{CaseMode, MatchMode};
use findany_match_mode::{fold_ascii, fold_into, fold_utf16, is_high_surrogate, is_low_surrogate};

pub mod frequency;
pub mod validation;

pub use validation::{validate_automaton, validate_needle_coverage, ACStats, ACValidationResult};

/// Suffix link value for the root and for terminal nodes.
pub const NO_SUFFIX: i32 = -1;

/// Upper bound on trie nodes; suffix links are stored as `i32`.
pub const MAX_NODES: usize = i32::MAX as usize;

const ROOT: usize = 0;
const NO_CHILD: u32 = u32::MAX;

/// Haystack units folded per batch in Unicode case-insensitive mode.
const FOLD_CHUNK: usize = 64;

/// Error type for AC automaton operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ACError {
    /// Invalid pattern
    InvalidPattern(String),
    /// Resource limit exceeded (e.g., too many states)
    ResourceLimitExceeded(String),
}

impl fmt::Display for ACError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ACError::InvalidPattern(msg) => write!(f, "Invalid pattern: {}", msg),
            ACError::ResourceLimitExceeded(msg) => write!(f, "Resource limit exceeded: {}", msg),
        }
    }
}

impl std::error::Error for ACError {}

/// Scan direction the automaton was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Leftmost start, scanning front to back
    Forward,
    /// Greatest start, scanning back to front over reversed needles
    Reverse,
}

/// A needle occurrence reported by the automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ACMatch {
    /// Index of the needle in the slice passed to [`AhoCorasick::build`]
    pub needle: usize,
    /// Start index in the haystack
    pub start: usize,
    /// Length in code units
    pub len: usize,
}

impl ACMatch {
    /// Exclusive end index.
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Skips the automaton ahead while it sits at the root.
///
/// Implementations return the smallest index `>= from` where a needle could
/// start, or `None` when no such index exists.
pub trait StartPrefilter {
    fn next_candidate(&self, haystack: &[u16], from: usize) -> Option<usize>;
}

/// Finalized trie node.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) fast_unit: u16,
    pub(crate) fast_child: u32,
    pub(crate) children: FxHashMap<u16, u32>,
    pub(crate) suffix_link: i32,
    pub(crate) depth: u32,
    /// Length of the inherited match, 0 when none
    pub(crate) match_len: u32,
    pub(crate) match_needle: u32,
    pub(crate) terminal: bool,
}

impl Node {
    #[inline(always)]
    fn child(&self, unit: u16) -> Option<u32> {
        if self.fast_child != NO_CHILD && self.fast_unit == unit {
            return Some(self.fast_child);
        }
        if self.children.is_empty() {
            return None;
        }
        self.children.get(&unit).copied()
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len() + usize::from(self.fast_child != NO_CHILD)
    }

    pub(crate) fn child_targets(&self) -> impl Iterator<Item = u32> + '_ {
        let fast = (self.fast_child != NO_CHILD).then_some(self.fast_child);
        fast.into_iter().chain(self.children.values().copied())
    }
}

/// Builder for constructing the automaton
///
/// Uses hash-map transitions during construction, then picks each node's
/// inline child and flattens the match information.
struct ACBuilder {
    states: Vec<BuilderState>,
    direction: Direction,
}

#[derive(Debug, Clone)]
struct BuilderState {
    transitions: FxHashMap<u16, u32>,
    failure: u32,
    depth: u32,
    output: Option<u32>,
}

impl BuilderState {
    fn new(depth: u32) -> Self {
        Self {
            transitions: FxHashMap::default(),
            failure: 0,
            depth,
            output: None,
        }
    }
}

impl ACBuilder {
    fn new(direction: Direction) -> Self {
        Self {
            states: vec![BuilderState::new(0)],
            direction,
        }
    }

    /// Insert a folded needle.
    ///
    /// Needles must arrive shortest first. Returns `false` when the needle is
    /// unreachable: a shorter needle (or an identical one) is already a
    /// prefix of it, so it can never be the leftmost-start match.
    fn add_needle(&mut self, id: u32, units: &[u16]) -> Result<bool, ACError> {
        let mut current = ROOT;

        for &unit in units {
            if self.states[current].output.is_some() {
                return Ok(false);
            }

            current = match self.states[current].transitions.get(&unit) {
                Some(&next) => next as usize,
                None => {
                    if self.states.len() >= MAX_NODES {
                        return Err(ACError::ResourceLimitExceeded(format!(
                            "more than {} trie nodes",
                            MAX_NODES
                        )));
                    }
                    let new_id = self.states.len();
                    let depth = self.states[current].depth + 1;
                    self.states.push(BuilderState::new(depth));
                    self.states[current].transitions.insert(unit, new_id as u32);
                    new_id
                }
            };
        }

        if self.states[current].output.is_some() {
            return Ok(false);
        }
        self.states[current].output = Some(id);
        Ok(true)
    }

    /// Compute suffix links breadth-first and return the BFS order.
    fn build_failure_links(&mut self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.states.len());
        let mut queue = VecDeque::new();
        order.push(ROOT);

        let root_children: Vec<u32> = self.states[ROOT].transitions.values().copied().collect();
        for child in root_children {
            self.states[child as usize].failure = ROOT as u32;
            queue.push_back(child as usize);
        }

        while let Some(state_id) = queue.pop_front() {
            order.push(state_id);

            let transitions: Vec<(u16, u32)> = self.states[state_id]
                .transitions
                .iter()
                .map(|(&unit, &next)| (unit, next))
                .collect();

            for (unit, next_state) in transitions {
                queue.push_back(next_state as usize);

                // Longest proper suffix of the child's path that is also a
                // trie path: extend the parent's suffix chain by `unit`.
                let mut fail = self.states[state_id].failure as usize;
                let target = loop {
                    if let Some(&target) = self.states[fail].transitions.get(&unit) {
                        break target;
                    }
                    if fail == ROOT {
                        break ROOT as u32;
                    }
                    fail = self.states[fail].failure as usize;
                };
                self.states[next_state as usize].failure = target;
            }
        }

        order
    }

    /// Flatten into final nodes.
    fn finish(self, order: &[usize]) -> Vec<Node> {
        // (match_len, needle) per state, filled in BFS order so a state's
        // suffix target is always resolved first.
        let mut matches: Vec<Option<(u32, u32)>> = vec![None; self.states.len()];
        for &state_id in order {
            let state = &self.states[state_id];
            let own = state.output.map(|needle| (state.depth, needle));
            let inherited = if state_id == ROOT {
                None
            } else {
                matches[state.failure as usize]
            };
            matches[state_id] = match self.direction {
                // Longest match on the chain has the smallest start.
                Direction::Forward => own.or(inherited),
                // Every match on the chain shares the start; prefer the shortest.
                Direction::Reverse => inherited.or(own),
            };
        }

        self.states
            .into_iter()
            .enumerate()
            .map(|(id, state)| {
                let mut children = state.transitions;
                let hottest = children
                    .keys()
                    .copied()
                    .max_by_key(|&unit| (frequency::frequency(unit), std::cmp::Reverse(unit)));
                let (fast_unit, fast_child) = match hottest {
                    Some(unit) => {
                        let child = children.remove(&unit).unwrap_or(NO_CHILD);
                        (unit, child)
                    }
                    None => (0, NO_CHILD),
                };
                children.shrink_to_fit();

                let terminal = state.output.is_some();
                let suffix_link = if id == ROOT || terminal {
                    NO_SUFFIX
                } else {
                    state.failure as i32
                };
                let (match_len, match_needle) = matches[id].unwrap_or((0, 0));

                Node {
                    fast_unit,
                    fast_child,
                    children,
                    suffix_link,
                    depth: state.depth,
                    match_len,
                    match_needle,
                    terminal,
                }
            })
            .collect()
    }
}

/// Source of (possibly folded) haystack units.
trait UnitSource {
    fn unit(&mut self, i: usize) -> u16;
}

struct Exact<'h>(&'h [u16]);

impl UnitSource for Exact<'_> {
    #[inline(always)]
    fn unit(&mut self, i: usize) -> u16 {
        self.0[i]
    }
}

struct AsciiFolded<'h>(&'h [u16]);

impl UnitSource for AsciiFolded<'_> {
    #[inline(always)]
    fn unit(&mut self, i: usize) -> u16 {
        fold_ascii(self.0[i])
    }
}

/// Folds the haystack in batches that never split a surrogate pair.
struct UnicodeFolded<'h> {
    haystack: &'h [u16],
    buf: [u16; FOLD_CHUNK],
    start: usize,
    end: usize,
    direction: Direction,
}

impl<'h> UnicodeFolded<'h> {
    fn new(haystack: &'h [u16], direction: Direction) -> Self {
        Self {
            haystack,
            buf: [0; FOLD_CHUNK],
            start: 0,
            end: 0,
            direction,
        }
    }

    fn refill(&mut self, i: usize) {
        let n = self.haystack.len();
        let (mut start, mut end) = match self.direction {
            Direction::Forward => (i, (i + FOLD_CHUNK).min(n)),
            Direction::Reverse => ((i + 1).saturating_sub(FOLD_CHUNK), i + 1),
        };
        match self.direction {
            Direction::Forward => {
                if end < n && end - start > 1 && is_high_surrogate(self.haystack[end - 1]) {
                    end -= 1;
                }
            }
            Direction::Reverse => {
                if start > 0 && end - start > 1 && is_low_surrogate(self.haystack[start]) {
                    start += 1;
                }
            }
        }
        fold_into(&self.haystack[start..end], &mut self.buf[..end - start]);
        self.start = start;
        self.end = end;
    }
}

impl UnitSource for UnicodeFolded<'_> {
    #[inline(always)]
    fn unit(&mut self, i: usize) -> u16 {
        if i < self.start || i >= self.end {
            self.refill(i);
        }
        self.buf[i - self.start]
    }
}

/// UTF-16 Aho-Corasick automaton
#[derive(Debug, Clone)]
pub struct AhoCorasick {
    pub(crate) nodes: Vec<Node>,
    case_mode: CaseMode,
    direction: Direction,
    needle_lens: Vec<usize>,
    unreachable: Vec<usize>,
    min_len: usize,
}

impl AhoCorasick {
    /// Build the automaton from needles.
    ///
    /// Needles are folded here according to `case_mode`; pass them as the
    /// caller supplied them. Needle indices in [`ACMatch::needle`] refer to
    /// positions in `needles`.
    pub fn build<N: AsRef<[u16]>>(
        needles: &[N],
        case_mode: CaseMode,
        direction: Direction,
    ) -> Result<Self, ACError> {
        if needles.is_empty() {
            return Err(ACError::InvalidPattern("No patterns provided".to_string()));
        }

        let mut prepared: Vec<(usize, Vec<u16>)> = Vec::with_capacity(needles.len());
        for (id, needle) in needles.iter().enumerate() {
            let needle = needle.as_ref();
            if needle.is_empty() {
                return Err(ACError::InvalidPattern(format!("Empty pattern at index {}", id)));
            }
            let mut units = match case_mode {
                CaseMode::CaseSensitive => needle.to_vec(),
                CaseMode::CaseInsensitiveUnicode => fold_utf16(needle),
                _ => needle.iter().map(|&u| fold_ascii(u)).collect(),
            };
            if direction == Direction::Reverse {
                units.reverse();
            }
            prepared.push((id, units));
        }
        // Shortest first (stable), so prefixes are in place before the
        // needles they shadow.
        prepared.sort_by_key(|(_, units)| units.len());

        let mut builder = ACBuilder::new(direction);
        let mut unreachable = Vec::new();
        let mut min_len = usize::MAX;
        for (id, units) in &prepared {
            if builder.add_needle(*id as u32, units)? {
                min_len = min_len.min(units.len());
            } else {
                unreachable.push(*id);
            }
        }
        unreachable.sort_unstable();

        let order = builder.build_failure_links();
        let nodes = builder.finish(&order);

        let ac = Self {
            nodes,
            case_mode,
            direction,
            needle_lens: needles.iter().map(|n| n.as_ref().len()).collect(),
            unreachable,
            min_len,
        };
        debug_assert!(validate_automaton(&ac).is_valid());
        Ok(ac)
    }

    /// Number of trie nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of needles the automaton was built from.
    pub fn needle_count(&self) -> usize {
        self.needle_lens.len()
    }

    /// Length of needle `id` in code units.
    pub fn needle_len(&self, id: usize) -> usize {
        self.needle_lens[id]
    }

    /// Shortest reachable needle.
    pub fn min_len(&self) -> usize {
        self.min_len
    }

    /// Needles that can never be reported, sorted by index.
    pub fn unreachable_needles(&self) -> &[usize] {
        &self.unreachable
    }

    pub fn case_mode(&self) -> CaseMode {
        self.case_mode
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Units leaving the root, already folded.
    pub fn start_units(&self) -> Vec<u16> {
        let root = &self.nodes[ROOT];
        let mut units: Vec<u16> = root.children.keys().copied().collect();
        if root.fast_child != NO_CHILD {
            units.push(root.fast_unit);
        }
        units.sort_unstable();
        units
    }

    /// Find the match with the smallest start (forward automaton) or the
    /// greatest start (reverse automaton).
    pub fn find(&self, haystack: &[u16]) -> Option<ACMatch> {
        self.dispatch(haystack, None)
    }

    /// Like [`find`](Self::find), skipping ahead with `prefilter` whenever
    /// the automaton is at the root. Only used by forward automata.
    pub fn find_with_prefilter(
        &self,
        haystack: &[u16],
        prefilter: &dyn StartPrefilter,
    ) -> Option<ACMatch> {
        self.dispatch(haystack, Some(prefilter))
    }

    fn dispatch(&self, haystack: &[u16], prefilter: Option<&dyn StartPrefilter>) -> Option<ACMatch> {
        match (self.direction, self.case_mode) {
            (Direction::Forward, CaseMode::CaseSensitive) => {
                self.scan_forward(haystack.len(), Exact(haystack), haystack, prefilter)
            }
            (Direction::Forward, CaseMode::CaseInsensitiveUnicode) => self.scan_forward(
                haystack.len(),
                UnicodeFolded::new(haystack, Direction::Forward),
                haystack,
                prefilter,
            ),
            (Direction::Forward, _) => {
                self.scan_forward(haystack.len(), AsciiFolded(haystack), haystack, prefilter)
            }
            (Direction::Reverse, CaseMode::CaseSensitive) => {
                self.scan_reverse(haystack.len(), Exact(haystack))
            }
            (Direction::Reverse, CaseMode::CaseInsensitiveUnicode) => self.scan_reverse(
                haystack.len(),
                UnicodeFolded::new(haystack, Direction::Reverse),
            ),
            (Direction::Reverse, _) => self.scan_reverse(haystack.len(), AsciiFolded(haystack)),
        }
    }

    #[inline(always)]
    fn next_state(&self, mut state: usize, unit: u16) -> usize {
        loop {
            let node = &self.nodes[state];
            if let Some(child) = node.child(unit) {
                return child as usize;
            }
            if state == ROOT || node.suffix_link < 0 {
                return ROOT;
            }
            state = node.suffix_link as usize;
        }
    }

    fn scan_forward<S: UnitSource>(
        &self,
        n: usize,
        mut units: S,
        haystack: &[u16],
        prefilter: Option<&dyn StartPrefilter>,
    ) -> Option<ACMatch> {
        let mut state = ROOT;
        let mut best: Option<ACMatch> = None;
        let mut i = 0;

        while i < n {
            if state == ROOT {
                if let Some(prefilter) = prefilter {
                    match prefilter.next_candidate(haystack, i) {
                        Some(candidate) => i = candidate,
                        None => break,
                    }
                    if i >= n {
                        break;
                    }
                }
            }

            state = self.next_state(state, units.unit(i));
            let node = &self.nodes[state];

            if node.match_len > 0 {
                let len = node.match_len as usize;
                let start = i + 1 - len;
                if best.map_or(true, |b| start < b.start) {
                    best = Some(ACMatch {
                        needle: node.match_needle as usize,
                        start,
                        len,
                    });
                }
            }

            // Nothing reachable from here starts before the current state's
            // own start.
            if let Some(b) = best {
                if i + 1 - node.depth as usize >= b.start {
                    return best;
                }
            }
            i += 1;
        }

        best
    }

    fn scan_reverse<S: UnitSource>(&self, n: usize, mut units: S) -> Option<ACMatch> {
        let mut state = ROOT;
        for i in (0..n).rev() {
            state = self.next_state(state, units.unit(i));
            let node = &self.nodes[state];
            if node.match_len > 0 {
                return Some(ACMatch {
                    needle: node.match_needle as usize,
                    start: i,
                    len: node.match_len as usize,
                });
            }
        }
        None
    }
}
