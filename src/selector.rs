//! Diversity-aware selection from ranked candidates.

use hashbrown::HashSet;
use tracing::warn;

use crate::ranker::Candidate;
use crate::taxonomy::LabelTaxonomy;

/// Number of top-ranked candidates inspected by the greedy pass, independent
/// of the requested batch size.
const DIVERSITY_WINDOW: usize = 50;

/// Greedily picks up to `step_size` candidates with non-overlapping
/// minority-predicted vocabulary.
///
/// Walks the ranked list from the most uncertain candidate. A candidate
/// whose minority-predicted tokens were all unseen is accepted and registers
/// those tokens as used; a candidate reusing a token of an earlier accepted
/// candidate is set aside. If the pass ends short of `step_size`, the
/// selection is topped up from the set-aside candidates in rank order, which
/// deliberately relaxes the vocabulary constraint.
///
/// # Returns
///
/// Pool indices of the selected candidates, in acceptance order.
pub fn select_diverse(
    candidates: &[Candidate],
    step_size: usize,
    taxonomy: &LabelTaxonomy,
) -> Vec<usize> {
    let mut selected = vec![];
    let mut rejected = vec![];
    let mut used_words: HashSet<&str> = HashSet::new();

    for candidate in candidates.iter().take(DIVERSITY_WINDOW) {
        if selected.len() >= step_size {
            break;
        }
        let minority_words: Vec<&str> = candidate
            .predicted
            .iter()
            .zip(&candidate.tokens)
            .filter(|(label, _)| !taxonomy.is_majority(**label))
            .map(|(_, word)| word.as_str())
            .collect();
        if minority_words.iter().any(|word| used_words.contains(word)) {
            rejected.push(candidate.index);
        } else {
            used_words.extend(minority_words);
            selected.push(candidate.index);
        }
    }

    if selected.len() < step_size && !rejected.is_empty() {
        let missing = step_size - selected.len();
        warn!(
            missing,
            "not enough candidates with unused vocabulary, topping up from rejected ones"
        );
        selected.extend(rejected.into_iter().take(missing));
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashbrown::HashMap;

    fn taxonomy() -> LabelTaxonomy {
        let mut dict = HashMap::new();
        dict.insert("O".to_string(), 0);
        dict.insert("B-PER".to_string(), 1);
        dict.insert("I-PER".to_string(), 2);
        let minority: Vec<String> = ["B-PER", "I-PER"].iter().map(|s| s.to_string()).collect();
        LabelTaxonomy::new(&dict, &minority, "O", "B-", "I-").unwrap()
    }

    fn candidate(index: usize, predicted: Vec<usize>, tokens: &[&str]) -> Candidate {
        Candidate {
            margin: index as f64,
            index,
            predicted,
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_select_skips_reused_vocabulary() {
        let taxonomy = taxonomy();
        let candidates = vec![
            candidate(0, vec![1, 0], &["anna", "runs"]),
            candidate(1, vec![0, 1], &["sees", "anna"]),
            candidate(2, vec![1, 0], &["bob", "walks"]),
        ];
        let selected = select_diverse(&candidates, 2, &taxonomy);

        assert_eq!(vec![0, 2], selected);
    }

    #[test]
    fn test_select_stops_at_step_size() {
        let taxonomy = taxonomy();
        let candidates = vec![
            candidate(0, vec![1], &["anna"]),
            candidate(1, vec![1], &["bob"]),
            candidate(2, vec![1], &["carol"]),
        ];
        let selected = select_diverse(&candidates, 2, &taxonomy);

        assert_eq!(vec![0, 1], selected);
    }

    #[test]
    fn test_select_tops_up_from_rejected() {
        let taxonomy = taxonomy();
        let candidates = vec![
            candidate(0, vec![1], &["anna"]),
            candidate(1, vec![1], &["anna"]),
            candidate(2, vec![1], &["anna"]),
        ];
        let selected = select_diverse(&candidates, 2, &taxonomy);

        assert_eq!(vec![0, 1], selected);
    }

    #[test]
    fn test_select_only_accepted_candidates_register_vocabulary() {
        let taxonomy = taxonomy();
        // Candidate 1 is rejected for reusing "anna"; its other word "bob"
        // must not block candidate 2.
        let candidates = vec![
            candidate(0, vec![1, 0], &["anna", "runs"]),
            candidate(1, vec![1, 1], &["anna", "bob"]),
            candidate(2, vec![1, 0], &["bob", "walks"]),
        ];
        let selected = select_diverse(&candidates, 2, &taxonomy);

        assert_eq!(vec![0, 2], selected);
    }

    #[test]
    fn test_select_ignores_majority_tokens() {
        let taxonomy = taxonomy();
        // "runs" is shared but never minority-predicted, so both pass.
        let candidates = vec![
            candidate(0, vec![1, 0], &["anna", "runs"]),
            candidate(1, vec![1, 0], &["bob", "runs"]),
        ];
        let selected = select_diverse(&candidates, 2, &taxonomy);

        assert_eq!(vec![0, 1], selected);
    }

    #[test]
    fn test_select_window_is_fixed() {
        let taxonomy = taxonomy();
        let candidates: Vec<Candidate> = (0..60)
            .map(|i| Candidate {
                margin: i as f64,
                index: i,
                predicted: vec![1],
                tokens: vec![format!("w{}", i)],
            })
            .collect();
        let selected = select_diverse(&candidates, 60, &taxonomy);

        assert_eq!(DIVERSITY_WINDOW, selected.len());
        assert_eq!((0..50).collect::<Vec<_>>(), selected);
    }
}
