//! Generation of grammatically valid alternative labelings.

use crate::model::LabelSequence;
use crate::taxonomy::{LabelKind, LabelTaxonomy};

/// Number of non-majority positions above which generation falls back to the
/// single all-majority alternative instead of branching.
const MAX_FLAGGED_POSITIONS: usize = 6;

/// Enumerates valid alternative labelings of a predicted sequence.
///
/// Every alternative has the same length as `y`, differs from it in at least
/// one position, and respects the tag grammar: an inside label may only
/// follow a begin or inside label of the same base category.
///
/// Positions predicted as majority stay majority. A begin position may become
/// any begin label or revert to majority; an inside position may become
/// majority or any inside label whose base category continues the span built
/// so far. When more than [`MAX_FLAGGED_POSITIONS`] positions are flagged,
/// the only alternative returned is the all-majority sequence.
pub fn alternative_sequences(y: &[usize], taxonomy: &LabelTaxonomy) -> Vec<LabelSequence> {
    let majority = taxonomy.majority_id();
    let kinds: Vec<LabelKind> = y.iter().map(|&label| taxonomy.kind(label)).collect();
    let n_flagged = kinds
        .iter()
        .filter(|&&kind| kind != LabelKind::Majority)
        .count();

    if n_flagged > MAX_FLAGGED_POSITIONS {
        return vec![vec![majority; y.len()]];
    }

    // Arena of partial sequences, grown left to right. Non-flagged positions
    // extend every partial in place; only branching positions copy.
    let mut partials: Vec<LabelSequence> = vec![Vec::with_capacity(y.len())];
    for &kind in &kinds {
        match kind {
            LabelKind::Majority => {
                for partial in &mut partials {
                    partial.push(majority);
                }
            }
            LabelKind::Begin => {
                let mut branched = vec![];
                for label in 0..taxonomy.n_labels() {
                    if !taxonomy.is_majority(label) && !taxonomy.is_begin(label) {
                        continue;
                    }
                    for partial in &partials {
                        let mut extended = partial.clone();
                        extended.push(label);
                        branched.push(extended);
                    }
                }
                partials = branched;
            }
            LabelKind::Inside => {
                let mut branched = vec![];
                for label in 0..taxonomy.n_labels() {
                    if taxonomy.is_majority(label) {
                        for partial in &partials {
                            let mut extended = partial.clone();
                            extended.push(label);
                            branched.push(extended);
                        }
                    } else if taxonomy.is_inside(label) {
                        for partial in &partials {
                            // The span-continuity grammar: an inside label may
                            // only follow a begin/inside label of the same
                            // base category.
                            let continues = partial.last().is_some_and(|&last| {
                                !taxonomy.is_majority(last)
                                    && taxonomy.base_category(last) == taxonomy.base_category(label)
                            });
                            if continues {
                                let mut extended = partial.clone();
                                extended.push(label);
                                branched.push(extended);
                            }
                        }
                    }
                }
                partials = branched;
            }
        }
    }

    partials.retain(|alternative| alternative.as_slice() != y);
    partials
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
        dict.insert("B-LOC".to_string(), 3);
        dict.insert("I-LOC".to_string(), 4);
        let minority: Vec<String> = ["B-PER", "I-PER", "B-LOC", "I-LOC"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        LabelTaxonomy::new(&dict, &minority, "O", "B-", "I-").unwrap()
    }

    #[test]
    fn test_all_majority_has_no_alternatives() {
        let alternatives = alternative_sequences(&[0, 0, 0], &taxonomy());

        assert_eq!(Vec::<LabelSequence>::new(), alternatives);
    }

    #[test]
    fn test_begin_position_branches() {
        let alternatives = alternative_sequences(&[0, 1, 0], &taxonomy());

        assert_eq!(vec![vec![0, 0, 0], vec![0, 3, 0]], alternatives);
    }

    #[test]
    fn test_inside_follows_matching_base_category() {
        let alternatives = alternative_sequences(&[1, 2, 0], &taxonomy());

        assert_eq!(
            vec![
                vec![0, 0, 0],
                vec![1, 0, 0],
                vec![3, 0, 0],
                vec![3, 4, 0],
            ],
            alternatives
        );
    }

    #[test]
    fn test_alternatives_preserve_length_and_differ() {
        let taxonomy = taxonomy();
        let y = vec![0, 1, 2, 0, 3, 0];
        for alternative in alternative_sequences(&y, &taxonomy) {
            assert_eq!(y.len(), alternative.len());
            assert_ne!(y, alternative);
        }
    }

    #[test]
    fn test_grammar_holds_at_every_inside_position() {
        let taxonomy = taxonomy();
        let y = vec![1, 2, 0, 3, 4, 0];
        for alternative in alternative_sequences(&y, &taxonomy) {
            for pos in 0..alternative.len() {
                if taxonomy.is_inside(alternative[pos]) {
                    assert!(pos > 0);
                    let prev = alternative[pos - 1];
                    assert!(!taxonomy.is_majority(prev));
                    assert_eq!(
                        taxonomy.base_category(prev),
                        taxonomy.base_category(alternative[pos])
                    );
                }
            }
        }
    }

    #[test]
    fn test_too_many_flagged_positions() {
        let y = vec![1, 2, 0, 1, 2, 0, 1, 2, 0, 1];
        let alternatives = alternative_sequences(&y, &taxonomy());

        assert_eq!(vec![vec![0; 10]], alternatives);
    }

    #[test]
    fn test_inside_at_sequence_start_reverts_to_majority() {
        // A leading inside label cannot continue any span, so the only branch
        // left for that position is the majority label.
        let alternatives = alternative_sequences(&[2, 0], &taxonomy());

        assert_eq!(vec![vec![0, 0]], alternatives);
    }
}
