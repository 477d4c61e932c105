//! Circular dependency detection.

use std::collections::{BTreeMap, HashSet};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    Visiting,
    Done,
}

/// Find import cycles with an iterative depth-first traversal.
///
/// Start nodes are visited in sorted order and neighbours in edge order, so
/// the result is deterministic. Each cycle is the node sequence from the
/// re-entered node back around to the node before it, in traversal order.
/// A cycle is reported once no matter where it was entered; two reports are
/// the same cycle when their minimal rotations are equal.
pub fn find_cycles(edges: &[(&str, &str)]) -> Vec<Vec<String>> {
    let mut adjacency: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for &(from, to) in edges {
        adjacency.entry(from).or_default().push(to);
        adjacency.entry(to).or_default();
    }

    let mut state: BTreeMap<&str, Visit> = BTreeMap::new();
    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut cycles = Vec::new();

    for &start in adjacency.keys() {
        if state.contains_key(start) {
            continue;
        }

        let mut stack: Vec<(&str, usize)> = vec![(start, 0)];
        let mut path: Vec<&str> = Vec::new();

        while let Some((node, idx)) = stack.last_mut() {
            let node = *node;
            if *idx == 0 && state.get(node).is_none() {
                state.insert(node, Visit::Visiting);
                path.push(node);
            }

            let neighbors = adjacency.get(node).map(Vec::as_slice).unwrap_or(&[]);
            if *idx < neighbors.len() {
                let next = neighbors[*idx];
                *idx += 1;

                match state.get(next) {
                    Some(Visit::Visiting) => {
                        if let Some(pos) = path.iter().position(|n| *n == next) {
                            let cycle: Vec<String> = path[pos..].iter().map(|n| n.to_string()).collect();
                            if seen.insert(minimal_rotation(&cycle)) {
                                cycles.push(cycle);
                            }
                        }
                    }
                    Some(Visit::Done) => {}
                    None => stack.push((next, 0)),
                }
            } else {
                state.insert(node, Visit::Done);
                path.pop();
                stack.pop();
            }
        }
    }

    cycles
}

/// Rotate a cycle so its smallest node comes first.
pub fn minimal_rotation(cycle: &[String]) -> Vec<String> {
    let Some(min_pos) = cycle
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.cmp(b.1))
        .map(|(i, _)| i)
    else {
        return Vec::new();
    };
    cycle[min_pos..]
        .iter()
        .chain(&cycle[..min_pos])
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_ring_reports_one_cycle() {
        let cycles = find_cycles(&[("a", "b"), ("b", "c"), ("c", "a")]);
        assert_eq!(cycles, vec![strings(&["a", "b", "c"])]);
    }

    #[test]
    fn test_ring_found_from_any_start_is_deduplicated() {
        // Extra entry points into the same ring.
        let cycles = find_cycles(&[("c", "a"), ("b", "c"), ("a", "b"), ("x", "b"), ("y", "c")]);
        assert_eq!(cycles.len(), 1);
        assert_eq!(minimal_rotation(&cycles[0]), strings(&["a", "b", "c"]));
    }

    #[test]
    fn test_acyclic_graph() {
        assert!(find_cycles(&[("a", "b"), ("b", "c"), ("a", "c")]).is_empty());
        assert!(find_cycles(&[]).is_empty());
    }

    #[test]
    fn test_two_distinct_cycles_in_discovery_order() {
        let cycles = find_cycles(&[("a", "b"), ("b", "a"), ("c", "d"), ("d", "c")]);
        assert_eq!(cycles, vec![strings(&["a", "b"]), strings(&["c", "d"])]);
    }

    #[test]
    fn test_cycles_sharing_a_node() {
        let cycles = find_cycles(&[("a", "b"), ("b", "a"), ("b", "c"), ("c", "b")]);
        assert_eq!(cycles, vec![strings(&["a", "b"]), strings(&["b", "c"])]);
    }

    #[test]
    fn test_minimal_rotation() {
        assert_eq!(minimal_rotation(&strings(&["c", "a", "b"])), strings(&["a", "b", "c"]));
        assert_eq!(minimal_rotation(&strings(&["b", "c", "a"])), strings(&["a", "b", "c"]));
        assert!(minimal_rotation(&[]).is_empty());
    }
}
