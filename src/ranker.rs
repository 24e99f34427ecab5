//! Ranking of unlabelled examples by uncertainty margin.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::errors::{Result, SceltaError};
use crate::margin::smallest_margin;
use crate::model::{ChainModel, FeatureSequence, LabelSequence, ModelWrapper, TokenSequence};

/// A scored unlabelled example. Never mutated after creation.
pub struct Candidate {
    /// Uncertainty margin; smaller means more uncertain.
    pub margin: f64,

    /// Index of the example in the unlabelled pool.
    pub index: usize,

    /// Predicted label sequence.
    pub predicted: LabelSequence,

    /// Surface tokens of the example.
    pub tokens: TokenSequence,
}

/// Ranks a random subsample of the unlabelled pool by increasing margin.
///
/// Draws a random permutation of pool indices, examines the first
/// `max_search` of them, and scores every example whose predicted sequence
/// contains at least one minority label. Majority-only predictions carry no
/// signal for the minority categories and are skipped.
///
/// # Returns
///
/// The ranked candidates (most uncertain first; ties broken by pool index)
/// and the effective batch size, clamped down when the pool or the candidate
/// set is smaller than requested. Every clamp is reported before it happens.
///
/// # Errors
///
/// [`SceltaError::InvalidConfig`] will be returned when `step_size` is zero,
/// and [`SceltaError::InsufficientData`] when the pool is empty.
pub fn rank_candidates<M, R>(
    wrapper: &ModelWrapper<M>,
    unlabelled_x: &[FeatureSequence],
    unlabelled_text: &[TokenSequence],
    max_search: usize,
    step_size: usize,
    rng: &mut R,
) -> Result<(Vec<Candidate>, usize)>
where
    M: ChainModel,
    R: Rng,
{
    if step_size == 0 {
        return Err(SceltaError::invalid_config(
            "batch_size",
            "at least one sample must be requested per round",
        ));
    }
    if unlabelled_x.is_empty() {
        return Err(SceltaError::insufficient_data("the unlabelled pool is empty"));
    }
    let mut step_size = step_size;
    if step_size > unlabelled_x.len() {
        warn!(
            requested = step_size,
            pool = unlabelled_x.len(),
            "more samples requested than exist in the unlabelled pool, clamping"
        );
        step_size = unlabelled_x.len();
    }

    let mut indices: Vec<usize> = (0..unlabelled_x.len()).collect();
    indices.shuffle(rng);
    indices.truncate(max_search);

    let subsample: Vec<FeatureSequence> =
        indices.iter().map(|&i| unlabelled_x[i].clone()).collect();
    let predictions = wrapper.predict(&subsample);

    info!(
        subsample = indices.len(),
        "searching for uncertain examples"
    );
    let mut candidates = vec![];
    for (searched, ((x, predicted), &index)) in subsample
        .iter()
        .zip(predictions)
        .zip(&indices)
        .enumerate()
    {
        if wrapper.taxonomy().has_minority(&predicted) {
            let margin = smallest_margin(wrapper, x, &predicted);
            candidates.push(Candidate {
                margin,
                index,
                predicted,
                tokens: unlabelled_text[index].clone(),
            });
        }
        if (searched + 1) % 100 == 0 {
            debug!(searched = searched + 1, "search progress");
        }
    }

    if candidates.len() < step_size {
        if candidates.is_empty() {
            warn!("no minority labels were predicted in the subsample, nothing to rank");
        } else {
            warn!(
                candidates = candidates.len(),
                requested = step_size,
                "fewer candidates with a minority prediction than requested, clamping"
            );
        }
        step_size = candidates.len();
    } else {
        info!(
            candidates = candidates.len(),
            "candidates contained a minority prediction"
        );
    }

    candidates.sort_by(|a, b| a.margin.total_cmp(&b.margin).then_with(|| a.index.cmp(&b.index)));
    Ok((candidates, step_size))
}
