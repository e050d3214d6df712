use std::collections::HashMap;

/// Most frequent languages, most frequent first.
///
/// Languages with equal counts keep the order in which they were first seen. Blank
/// entries are ignored.
pub fn top_languages<'a>(languages: impl IntoIterator<Item = &'a str>, limit: usize) -> Vec<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for lang in languages.into_iter().map(str::trim).filter(|l| !l.is_empty()) {
        match index.get(lang) {
            Some(&i) => counts[i].1 += 1,
            None => {
                let _ = index.insert(lang, counts.len());
                counts.push((lang, 1));
            }
        }
    }

    // sort_by is stable, so first-seen order breaks ties
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(limit).map(|(lang, _)| lang.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ties_keep_first_seen_order() {
        let langs = ["Go", "Rust", "TS", "Go", "Rust", "Go", "Rust"];
        assert_eq!(top_languages(langs, 3), vec!["Go", "Rust", "TS"]);
    }

    #[test]
    fn test_frequency_wins_over_first_seen() {
        let langs = ["C", "Rust", "Rust", "Python", "Python", "Python"];
        assert_eq!(top_languages(langs, 3), vec!["Python", "Rust", "C"]);
    }

    #[test]
    fn test_truncates_to_limit() {
        let langs = ["A", "B", "C", "D"];
        assert_eq!(top_languages(langs, 3), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_ignores_blank_entries() {
        assert!(top_languages(["", "  "], 3).is_empty());
        assert!(top_languages(core::iter::empty(), 3).is_empty());
    }
}
