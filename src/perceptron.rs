//! Built-in chain-structured engine: a structured perceptron.
//!
//! The model factorizes a sequence score into per-position emission scores
//! (one weight block per label over the token feature dimension) and
//! label-bigram transition scores. Decoding uses the Viterbi algorithm;
//! training applies mistake-driven updates `w += phi(x, y_gold) - phi(x, y_pred)`
//! for a fixed number of epochs.

use crate::errors::{Result, SceltaError};
use crate::model::{ChainModel, FeatureSequence, LabelSequence};

/// Structured perceptron over a linear-chain factorization.
///
/// The weight vector is laid out as `n_labels` emission blocks of the token
/// feature dimension, followed by an `n_labels × n_labels` transition block
/// in row-major order (previous label × next label).
pub struct StructuredPerceptron {
    n_labels: usize,
    epochs: usize,
    n_token_features: usize,
    w: Vec<f64>,
}

impl StructuredPerceptron {
    /// Creates a new untrained engine.
    ///
    /// # Arguments
    ///
    /// * `n_labels` - The number of labels.
    /// * `epochs` - The number of passes over the training data.
    pub fn new(n_labels: usize, epochs: usize) -> Self {
        Self {
            n_labels,
            epochs,
            n_token_features: 0,
            w: vec![],
        }
    }

    fn emission(&self, x: &FeatureSequence, pos: usize, label: usize) -> f64 {
        let block = &self.w[label * self.n_token_features..(label + 1) * self.n_token_features];
        block.iter().zip(&x[pos]).map(|(w, f)| w * f).sum()
    }

    fn transition(&self, prev: usize, next: usize) -> f64 {
        self.w[self.n_labels * self.n_token_features + prev * self.n_labels + next]
    }

    fn viterbi(&self, x: &FeatureSequence) -> LabelSequence {
        if x.is_empty() {
            return vec![];
        }
        let mut scores: Vec<f64> = (0..self.n_labels).map(|l| self.emission(x, 0, l)).collect();
        let mut backptrs = vec![];
        for pos in 1..x.len() {
            let mut next_scores = vec![f64::NEG_INFINITY; self.n_labels];
            let mut backptr = vec![0; self.n_labels];
            for next in 0..self.n_labels {
                let emission = self.emission(x, pos, next);
                for prev in 0..self.n_labels {
                    let score = scores[prev] + self.transition(prev, next) + emission;
                    if score > next_scores[next] {
                        next_scores[next] = score;
                        backptr[next] = prev;
                    }
                }
            }
            scores = next_scores;
            backptrs.push(backptr);
        }

        let mut best = 0;
        for label in 1..self.n_labels {
            if scores[label] > scores[best] {
                best = label;
            }
        }
        let mut path = vec![best];
        for backptr in backptrs.iter().rev() {
            best = backptr[best];
            path.push(best);
        }
        path.reverse();
        path
    }
}

impl ChainModel for StructuredPerceptron {
    fn fit(&mut self, xs: &[FeatureSequence], ys: &[LabelSequence]) -> Result<()> {
        if xs.is_empty() {
            return Err(SceltaError::training("no training examples"));
        }
        if xs.len() != ys.len() {
            return Err(SceltaError::training(format!(
                "{} feature sequences but {} label sequences",
                xs.len(),
                ys.len()
            )));
        }
        let n_token_features = xs
            .iter()
            .find_map(|x| x.first().map(|t| t.len()))
            .ok_or_else(|| SceltaError::training("all training examples are empty"))?;
        for (x, y) in xs.iter().zip(ys) {
            if x.len() != y.len() {
                return Err(SceltaError::training(format!(
                    "{} tokens but {} labels in a training example",
                    x.len(),
                    y.len()
                )));
            }
            if x.iter().any(|t| t.len() != n_token_features) {
                return Err(SceltaError::training("inconsistent token feature dimension"));
            }
            if y.iter().any(|&l| l >= self.n_labels) {
                return Err(SceltaError::training("label index out of range"));
            }
        }

        // Fresh weights on every fit; no state carries over.
        self.n_token_features = n_token_features;
        self.w = vec![0.0; self.n_labels * n_token_features + self.n_labels * self.n_labels];

        for _ in 0..self.epochs {
            for (x, y) in xs.iter().zip(ys) {
                let predicted = self.viterbi(x);
                if &predicted != y {
                    let gold_joint = self.joint_feature(x, y);
                    let pred_joint = self.joint_feature(x, &predicted);
                    for (w, (g, p)) in self.w.iter_mut().zip(gold_joint.iter().zip(&pred_joint)) {
                        *w += g - p;
                    }
                }
            }
        }
        Ok(())
    }

    fn predict(&self, xs: &[FeatureSequence]) -> Vec<LabelSequence> {
        if self.w.is_empty() {
            // Untrained engine: every score is zero, Viterbi would pick label 0.
            return xs.iter().map(|x| vec![0; x.len()]).collect();
        }
        xs.iter().map(|x| self.viterbi(x)).collect()
    }

    fn joint_feature(&self, x: &FeatureSequence, y: &LabelSequence) -> Vec<f64> {
        let mut joint =
            vec![0.0; self.n_labels * self.n_token_features + self.n_labels * self.n_labels];
        for (pos, (token, &label)) in x.iter().zip(y).enumerate() {
            let block = label * self.n_token_features;
            for (k, f) in token.iter().enumerate() {
                joint[block + k] += f;
            }
            if pos > 0 {
                joint[self.n_labels * self.n_token_features + y[pos - 1] * self.n_labels + label] +=
                    1.0;
            }
        }
        joint
    }

    fn weights(&self) -> &[f64] {
        &self.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Tokens are one-hot over {other, name, place}.
    fn token(kind: usize) -> Vec<f64> {
        let mut t = vec![0.0; 3];
        t[kind] = 1.0;
        t
    }

    fn training_data() -> (Vec<FeatureSequence>, Vec<LabelSequence>) {
        // Labels: 0 = O, 1 = B-PER, 2 = I-PER.
        let xs = vec![
            vec![token(0), token(1), token(1), token(0)],
            vec![token(1), token(1), token(0)],
            vec![token(0), token(0), token(1)],
            vec![token(0), token(1), token(0)],
        ];
        let ys = vec![
            vec![0, 1, 2, 0],
            vec![1, 2, 0],
            vec![0, 0, 1],
            vec![0, 1, 0],
        ];
        (xs, ys)
    }

    #[test]
    fn test_fit_empty() {
        let mut engine = StructuredPerceptron::new(3, 10);
        let result = engine.fit(&[], &[]);

        assert!(result.is_err());
        assert_eq!(
            "TrainingError: no training examples",
            &result.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_fit_length_mismatch() {
        let mut engine = StructuredPerceptron::new(3, 10);
        let result = engine.fit(&[vec![token(0), token(1)]], &[vec![0]]);

        assert!(result.is_err());
        assert_eq!(
            "TrainingError: 2 tokens but 1 labels in a training example",
            &result.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_fit_then_predict() {
        let (xs, ys) = training_data();
        let mut engine = StructuredPerceptron::new(3, 50);
        engine.fit(&xs, &ys).unwrap();

        assert_eq!(ys, engine.predict(&xs));
        assert_eq!(
            vec![vec![1, 2, 0, 0]],
            engine.predict(&[vec![token(1), token(1), token(0), token(0)]])
        );
    }

    #[test]
    fn test_joint_feature_layout() {
        let (xs, ys) = training_data();
        let mut engine = StructuredPerceptron::new(3, 10);
        engine.fit(&xs, &ys).unwrap();

        let x = vec![token(0), token(1)];
        let y = vec![0, 1];
        let joint = engine.joint_feature(&x, &y);

        // 3 emission blocks of 3 features, then a 3×3 transition block.
        assert_eq!(18, joint.len());
        assert_eq!(vec![1.0, 0.0, 0.0], joint[0..3].to_vec());
        assert_eq!(vec![0.0, 1.0, 0.0], joint[3..6].to_vec());
        // One transition, O -> B-PER.
        assert_eq!(1.0, joint[9 + 1]);
        assert_eq!(1, joint[9..].iter().filter(|&&v| v != 0.0).count());
    }

    #[test]
    fn test_joint_feature_scores_match_viterbi_optimum() {
        let (xs, ys) = training_data();
        let mut engine = StructuredPerceptron::new(3, 50);
        engine.fit(&xs, &ys).unwrap();

        let x = &xs[0];
        let predicted = engine.predict(&[x.clone()]).pop().unwrap();
        let score = |y: &LabelSequence| -> f64 {
            engine
                .weights()
                .iter()
                .zip(engine.joint_feature(x, y))
                .map(|(w, j)| w * j)
                .sum()
        };
        let predicted_score = score(&predicted);

        assert!(predicted_score >= score(&vec![0; x.len()]));
        assert!(predicted_score >= score(&vec![0, 0, 1, 0]));
    }

    #[test]
    fn test_untrained_predict() {
        let engine = StructuredPerceptron::new(3, 10);

        assert_eq!(vec![vec![0, 0]], engine.predict(&[vec![token(1), token(1)]]));
    }
}
