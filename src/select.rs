//! Orchestration of one active-learning selection round.

use hashbrown::{HashMap, HashSet};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::errors::{Result, SceltaError};
use crate::model::{ChainModel, FeatureSequence, LabelSequence, ModelWrapper, TokenSequence};
use crate::ranker::rank_candidates;
use crate::selector::select_diverse;
use crate::taxonomy::LabelTaxonomy;

/// Parameters of a selection round.
pub struct SelectionConfig {
    /// Number of examples to select for annotation.
    pub batch_size: usize,

    /// Size of the random subsample of the pool to examine.
    pub max_search: usize,

    /// String of the majority label.
    pub outside_label: String,

    /// Prefix marking the first token of a span.
    pub begin_prefix: String,

    /// Prefix marking continuation tokens of a span.
    pub inside_prefix: String,

    /// Seed of the subsample permutation. [`None`] draws from entropy.
    pub seed: Option<u64>,
}

impl SelectionConfig {
    /// Creates a configuration with the common BIO conventions
    /// (`O` outside, `B-`/`I-` prefixes) and an entropy-seeded permutation.
    pub fn new(batch_size: usize, max_search: usize) -> Self {
        Self {
            batch_size,
            max_search,
            outside_label: "O".to_string(),
            begin_prefix: "B-".to_string(),
            inside_prefix: "I-".to_string(),
            seed: None,
        }
    }
}

/// The labelled seed set of a round.
pub struct LabelledSet {
    /// Feature sequences, one per sentence.
    pub features: Vec<FeatureSequence>,

    /// Gold label sequences, parallel to `features`.
    pub labels: Vec<LabelSequence>,

    /// Surface tokens, parallel to `features`.
    pub text: Vec<TokenSequence>,
}

/// Result of a selection round.
pub struct SelectionRound {
    /// Feature sequences of the selected examples.
    pub selected_features: Vec<FeatureSequence>,

    /// The unlabelled feature pool with the selected examples removed.
    pub remaining_features: Vec<FeatureSequence>,

    /// Surface tokens of the selected examples.
    pub selected_text: Vec<TokenSequence>,

    /// The unlabelled text pool with the selected examples removed.
    pub remaining_text: Vec<TokenSequence>,

    /// Predicted label sequences of the selected examples.
    pub predicted_labels: Vec<LabelSequence>,
}

/// Runs one active-learning round.
///
/// Trains the given fresh engine on the labelled set, ranks a random
/// subsample of the unlabelled pool by uncertainty margin, picks a diverse
/// batch of the most uncertain examples, and removes them from the pool.
///
/// # Arguments
///
/// * `model` - A freshly constructed engine, consumed by this round.
/// * `labelled` - The labelled seed set.
/// * `unlabelled_x` - Feature sequences of the unlabelled pool.
/// * `unlabelled_text` - Surface tokens of the pool, parallel to `unlabelled_x`.
/// * `label_dict` - A mapping from label strings to dense indices.
/// * `minority_classes` - Labels of the minority categories.
/// * `config` - Round parameters.
///
/// # Errors
///
/// [`SceltaError::InvalidConfig`] will be returned for a zero batch size,
/// mismatched parallel collections, or an invalid label inventory;
/// [`SceltaError::InsufficientData`] for an empty unlabelled pool.
/// A training failure of the engine is propagated unmodified.
pub fn select_batch<M>(
    model: M,
    labelled: &LabelledSet,
    mut unlabelled_x: Vec<FeatureSequence>,
    mut unlabelled_text: Vec<TokenSequence>,
    label_dict: &HashMap<String, usize>,
    minority_classes: &[String],
    config: &SelectionConfig,
) -> Result<SelectionRound>
where
    M: ChainModel,
{
    if config.batch_size == 0 {
        return Err(SceltaError::invalid_config(
            "batch_size",
            "at least one sample must be requested per round",
        ));
    }
    if unlabelled_x.len() != unlabelled_text.len() {
        return Err(SceltaError::invalid_config(
            "unlabelled_text",
            format!(
                "{} feature sequences but {} token sequences",
                unlabelled_x.len(),
                unlabelled_text.len()
            ),
        ));
    }
    if labelled.features.len() != labelled.labels.len()
        || labelled.features.len() != labelled.text.len()
    {
        return Err(SceltaError::invalid_config(
            "labelled",
            "features, labels, and text must be parallel",
        ));
    }
    for (x, y) in labelled.features.iter().zip(&labelled.labels) {
        if x.len() != y.len() {
            return Err(SceltaError::invalid_config(
                "labelled",
                format!("{} tokens but {} labels in an example", x.len(), y.len()),
            ));
        }
    }
    for (x, tokens) in unlabelled_x.iter().zip(&unlabelled_text) {
        if x.len() != tokens.len() {
            return Err(SceltaError::invalid_config(
                "unlabelled_text",
                format!("{} tokens but {} words in an example", x.len(), tokens.len()),
            ));
        }
    }

    let taxonomy = LabelTaxonomy::new(
        label_dict,
        minority_classes,
        &config.outside_label,
        &config.begin_prefix,
        &config.inside_prefix,
    )?;

    info!(examples = labelled.features.len(), "training on the labelled data");
    let wrapper = ModelWrapper::fit(model, taxonomy, &labelled.features, &labelled.labels)?;
    info!("training finished");

    // Informational only; the selection works on the ranked subsample.
    let pool_predictions = wrapper.predict(&unlabelled_x);
    info!(
        pool = unlabelled_x.len(),
        with_minority = pool_predictions
            .iter()
            .filter(|y| wrapper.taxonomy().has_minority(y))
            .count(),
        "predicted over the unlabelled pool"
    );

    let mut rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_os_rng(),
    };
    let (candidates, step_size) = rank_candidates(
        &wrapper,
        &unlabelled_x,
        &unlabelled_text,
        config.max_search,
        config.batch_size,
        &mut rng,
    )?;
    let selected_indices = select_diverse(&candidates, step_size, wrapper.taxonomy());
    info!(selected = selected_indices.len(), "selected a batch for annotation");

    let mut selected_features = vec![];
    let mut selected_text = vec![];
    let mut predicted_labels = vec![];
    for &index in &selected_indices {
        let candidate = candidates
            .iter()
            .find(|c| c.index == index)
            .expect("selected indices come from the candidate list");
        selected_features.push(unlabelled_x[index].clone());
        selected_text.push(unlabelled_text[index].clone());
        predicted_labels.push(candidate.predicted.clone());
    }

    let selected_set: HashSet<usize> = selected_indices.iter().copied().collect();
    let mut position = 0;
    unlabelled_x.retain(|_| {
        let keep = !selected_set.contains(&position);
        position += 1;
        keep
    });
    position = 0;
    unlabelled_text.retain(|_| {
        let keep = !selected_set.contains(&position);
        position += 1;
        keep
    });

    Ok(SelectionRound {
        selected_features,
        remaining_features: unlabelled_x,
        selected_text,
        remaining_text: unlabelled_text,
        predicted_labels,
    })
}
