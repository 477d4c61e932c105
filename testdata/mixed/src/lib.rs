//! Mixed fixture crate.

pub mod parser;

use std::collections::HashMap;

/// Count words in `input`.
pub fn run(input: &str) -> usize {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for word in parser::words(input) {
        *seen.entry(word).or_insert(0) += 1;
    }
    if seen.is_empty() {
        0
    } else {
        seen.len()
    }
}
