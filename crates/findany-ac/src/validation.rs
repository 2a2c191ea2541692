//! AC automaton consistency checks
//!
//! Validates the trie shape, suffix links, inherited matches and graph
//! reachability of a built automaton. Construction runs these checks under
//! `debug_assert!`; tests call them directly.

use std::collections::VecDeque;

use crate::{AhoCorasick, NO_SUFFIX};

/// Validation result for AC automaton structures
#[derive(Debug, Clone)]
pub struct ACValidationResult {
    /// Broken invariants; the automaton must not be used
    pub errors: Vec<String>,
    /// Suspicious but harmless findings
    pub warnings: Vec<String>,
    /// Statistics gathered during validation
    pub stats: ACStats,
}

/// Statistics gathered during AC automaton validation
#[derive(Debug, Clone, Default)]
pub struct ACStats {
    /// Number of AC nodes
    pub node_count: u32,
    /// Child count distribution: [0, 1, 2-8, 9+]
    pub fanout_distribution: [u32; 4],
    /// Nodes that end a needle
    pub terminal_count: u32,
    /// Deepest node
    pub max_depth: u32,
    /// Number of orphaned nodes (unreachable from root)
    pub orphaned_count: u32,
}

impl ACValidationResult {
    fn new(node_count: usize) -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            stats: ACStats {
                node_count: node_count as u32,
                ..ACStats::default()
            },
        }
    }

    /// Check if validation passed (no errors)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

fn fanout_bucket(children: usize) -> usize {
    match children {
        0 => 0,
        1 => 1,
        2..=8 => 2,
        _ => 3,
    }
}

/// Validate AC automaton structure
///
/// Validates:
/// - Child targets and depths
/// - Suffix links (root and terminals use [`NO_SUFFIX`], others point to a
///   shallower node)
/// - Terminal nodes are leaves
/// - Inherited match lengths never exceed the node depth
/// - Every node is reachable from the root
pub fn validate_automaton(ac: &AhoCorasick) -> ACValidationResult {
    let nodes = &ac.nodes;
    let mut result = ACValidationResult::new(nodes.len());

    if nodes.is_empty() {
        result.errors.push("AC automaton has no root".to_string());
        return result;
    }

    let root = &nodes[0];
    if root.suffix_link != NO_SUFFIX {
        result
            .errors
            .push(format!("AC root has suffix link {}", root.suffix_link));
    }
    if root.depth != 0 || root.match_len != 0 {
        result.errors.push("AC root carries depth or a match".to_string());
    }

    for (i, node) in nodes.iter().enumerate() {
        result.stats.fanout_distribution[fanout_bucket(node.child_count())] += 1;
        result.stats.max_depth = result.stats.max_depth.max(node.depth);

        for target in node.child_targets() {
            match nodes.get(target as usize) {
                None => result
                    .errors
                    .push(format!("AC node {} has child out of range: {}", i, target)),
                Some(child) if child.depth != node.depth + 1 => result.errors.push(format!(
                    "AC node {} child {} has depth {} (expected {})",
                    i,
                    target,
                    child.depth,
                    node.depth + 1
                )),
                Some(_) => {}
            }
        }

        if node.match_len > node.depth {
            result.errors.push(format!(
                "AC node {} match length {} exceeds depth {}",
                i, node.match_len, node.depth
            ));
        }
        if node.match_len > 0 && node.match_needle as usize >= ac.needle_count() {
            result.errors.push(format!(
                "AC node {} references needle {} (max={})",
                i,
                node.match_needle,
                ac.needle_count()
            ));
        }

        if node.terminal {
            result.stats.terminal_count += 1;
            if node.child_count() != 0 {
                result
                    .errors
                    .push(format!("AC terminal node {} has children", i));
            }
            if node.suffix_link != NO_SUFFIX {
                result
                    .errors
                    .push(format!("AC terminal node {} keeps a suffix link", i));
            }
            if node.match_len == 0 {
                result
                    .errors
                    .push(format!("AC terminal node {} carries no match", i));
            }
        } else if i != 0 {
            let link = node.suffix_link;
            if link < 0 || link as usize >= nodes.len() {
                result
                    .errors
                    .push(format!("AC node {} has invalid suffix link: {}", i, link));
            } else if nodes[link as usize].depth >= node.depth {
                result.errors.push(format!(
                    "AC node {} suffix link {} is not shallower",
                    i, link
                ));
            }
        }
    }

    // Reachability through child edges only; suffix links never create nodes.
    let mut reachable = vec![false; nodes.len()];
    let mut queue = VecDeque::new();
    reachable[0] = true;
    queue.push_back(0usize);
    while let Some(i) = queue.pop_front() {
        for target in nodes[i].child_targets() {
            let target = target as usize;
            if target < nodes.len() && !reachable[target] {
                reachable[target] = true;
                queue.push_back(target);
            }
        }
    }

    let orphaned_count = reachable.iter().filter(|&&r| !r).count();
    result.stats.orphaned_count = orphaned_count as u32;
    if orphaned_count > 0 {
        result.errors.push(format!(
            "Found {} orphaned AC nodes (not reachable from root)",
            orphaned_count
        ));
    }

    result
}

/// Validate needle references
///
/// Checks that every needle the automaton did not mark unreachable ends at
/// exactly one terminal node, and that unreachable needles end nowhere.
pub fn validate_needle_coverage(ac: &AhoCorasick) -> ACValidationResult {
    let mut result = ACValidationResult::new(ac.nodes.len());
    let mut terminals_per_needle = vec![0u32; ac.needle_count()];

    for (i, node) in ac.nodes.iter().enumerate() {
        if !node.terminal {
            continue;
        }
        match terminals_per_needle.get_mut(node.match_needle as usize) {
            Some(count) => *count += 1,
            None => result.errors.push(format!(
                "AC node {} ends unknown needle {}",
                i, node.match_needle
            )),
        }
    }

    let unreachable = ac.unreachable_needles();
    for (needle, &count) in terminals_per_needle.iter().enumerate() {
        let expected = u32::from(unreachable.binary_search(&needle).is_err());
        if count != expected {
            result.errors.push(format!(
                "Needle {} ends at {} terminal nodes (expected {})",
                needle, count, expected
            ));
        }
    }

    if !unreachable.is_empty() {
        result.warnings.push(format!(
            "{} needles are shadowed by shorter prefixes",
            unreachable.len()
        ));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CaseMode, Direction};

    fn build(needles: &[&str], direction: Direction) -> AhoCorasick {
        let needles: Vec<Vec<u16>> = needles.iter().map(|n| n.encode_utf16().collect()).collect();
        AhoCorasick::build(&needles, CaseMode::CaseSensitive, direction).unwrap()
    }

    #[test]
    fn test_fanout_bucket() {
        assert_eq!(fanout_bucket(0), 0);
        assert_eq!(fanout_bucket(1), 1);
        assert_eq!(fanout_bucket(8), 2);
        assert_eq!(fanout_bucket(9), 3);
    }

    #[test]
    fn test_valid_forward_automaton() {
        let ac = build(&["he", "she", "his", "hers"], Direction::Forward);
        let result = validate_automaton(&ac);
        assert!(result.is_valid(), "{:?}", result.errors);
        assert_eq!(result.stats.node_count as usize, ac.node_count());
        assert_eq!(result.stats.terminal_count, 3);
        assert_eq!(result.stats.orphaned_count, 0);
        assert_eq!(result.stats.max_depth, 3);
    }

    #[test]
    fn test_valid_reverse_automaton() {
        let ac = build(&["abc", "bc", "xyz"], Direction::Reverse);
        assert!(validate_automaton(&ac).is_valid());
    }

    #[test]
    fn test_needle_coverage() {
        let ac = build(&["ab", "abc", "ab", "q"], Direction::Forward);
        let result = validate_needle_coverage(&ac);
        assert!(result.is_valid(), "{:?}", result.errors);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_detects_broken_suffix_link() {
        let mut ac = build(&["abc", "bcd"], Direction::Forward);
        let victim = ac
            .nodes
            .iter()
            .position(|n| !n.terminal && n.depth == 2)
            .unwrap();
        ac.nodes[victim].suffix_link = victim as i32;
        assert!(!validate_automaton(&ac).is_valid());
    }
}
