//! Model wrapper and the chain-structured engine contract.

use crate::errors::Result;
use crate::taxonomy::LabelTaxonomy;

/// Dense feature vector of a single token.
pub type TokenFeatures = Vec<f64>;

/// Feature vectors of one sentence, one per token.
pub type FeatureSequence = Vec<TokenFeatures>;

/// Label indices of one sentence, parallel to its tokens.
pub type LabelSequence = Vec<usize>;

/// Surface tokens of one sentence.
pub type TokenSequence = Vec<String>;

/// Contract of the chain-structured classification engine.
///
/// The selection core treats the engine as an opaque service: it fits on
/// labelled sequences, predicts label sequences in batches, and scores a
/// labeling as the dot product of its weight vector with the joint feature
/// vector of the pair.
pub trait ChainModel {
    /// Trains the engine. All learned state must be reinitialized before
    /// training, so nothing carries over from an earlier fit.
    ///
    /// # Errors
    ///
    /// A training failure is propagated unmodified to the caller.
    fn fit(&mut self, xs: &[FeatureSequence], ys: &[LabelSequence]) -> Result<()>;

    /// Predicts the label sequence of every given sentence.
    fn predict(&self, xs: &[FeatureSequence]) -> Vec<LabelSequence>;

    /// Maps an (input, labeling) pair to its joint feature vector.
    /// Deterministic and free of side effects.
    fn joint_feature(&self, x: &FeatureSequence, y: &LabelSequence) -> Vec<f64>;

    /// Gets the learned weight vector. Fixed until the next [`fit`](Self::fit).
    fn weights(&self) -> &[f64];
}

/// A trained engine together with its label taxonomy.
///
/// A wrapper is constructed once per training round by [`ModelWrapper::fit`]
/// and never refit; the next round builds a new wrapper from a fresh engine
/// value.
pub struct ModelWrapper<M> {
    model: M,
    taxonomy: LabelTaxonomy,
}

impl<M> ModelWrapper<M>
where
    M: ChainModel,
{
    /// Trains the given fresh engine on the labelled data and wraps it.
    ///
    /// # Arguments
    ///
    /// * `model` - A freshly constructed engine, consumed by this call.
    /// * `taxonomy` - The validated label taxonomy.
    /// * `xs` - Labelled feature sequences.
    /// * `ys` - Gold label sequences, parallel to `xs`.
    ///
    /// # Errors
    ///
    /// A training failure of the engine is propagated unmodified.
    pub fn fit(
        mut model: M,
        taxonomy: LabelTaxonomy,
        xs: &[FeatureSequence],
        ys: &[LabelSequence],
    ) -> Result<Self> {
        model.fit(xs, ys)?;
        Ok(Self { model, taxonomy })
    }

    /// Predicts the label sequence of every given sentence.
    pub fn predict(&self, xs: &[FeatureSequence]) -> Vec<LabelSequence> {
        self.model.predict(xs)
    }

    /// Scores a labeling: `w · joint_feature(x, y)`.
    pub fn score(&self, x: &FeatureSequence, y: &LabelSequence) -> f64 {
        let joint = self.model.joint_feature(x, y);
        self.model
            .weights()
            .iter()
            .zip(&joint)
            .map(|(w, j)| w * j)
            .sum()
    }

    /// Gets the label taxonomy.
    pub fn taxonomy(&self) -> &LabelTaxonomy {
        &self.taxonomy
    }
}
