//! Margin scoring of predicted labelings against their alternatives.

use crate::alternatives::alternative_sequences;
use crate::model::{ChainModel, FeatureSequence, LabelSequence, ModelWrapper};

/// Computes the uncertainty margin of a predicted labeling.
///
/// The margin is the smallest score gap between the prediction and any valid
/// alternative labeling, `min over y' of score(x, y) - score(x, y')`. A small
/// or negative margin means the prediction is only narrowly preferred over
/// some other labeling. When no alternative exists, [`f64::INFINITY`] is
/// returned.
pub fn smallest_margin<M>(
    wrapper: &ModelWrapper<M>,
    x: &FeatureSequence,
    y: &LabelSequence,
) -> f64
where
    M: ChainModel,
{
    let score = wrapper.score(x, y);
    let mut min_difference = f64::INFINITY;
    for alternative in alternative_sequences(y, wrapper.taxonomy()) {
        let difference = score - wrapper.score(x, &alternative);
        if difference < min_difference {
            min_difference = difference;
        }
    }
    min_difference
}
