//! # Scelta
//!
//! Scelta is an uncertainty sampling based batch selector for sequence
//! labeling. Given a small labelled sentence set and a large unlabelled pool,
//! it trains a chain-structured classifier, finds the unlabelled sentences
//! whose predicted label sequence is most uncertain (by the score margin to
//! the closest grammatically valid alternative labeling), and returns a
//! diverse batch of them for human annotation.
//!
//! ## Examples
//!
//! ```no_run
//! use hashbrown::HashMap;
//!
//! use scelta::{select_batch, LabelledSet, SelectionConfig, StructuredPerceptron};
//!
//! # let (labelled_features, labelled_labels, labelled_text) = (vec![], vec![], vec![]);
//! # let (unlabelled_features, unlabelled_text) = (vec![], vec![]);
//! let mut label_dict = HashMap::new();
//! label_dict.insert("O".to_string(), 0);
//! label_dict.insert("B-PER".to_string(), 1);
//! label_dict.insert("I-PER".to_string(), 2);
//! let minority_classes = vec!["B-PER".to_string(), "I-PER".to_string()];
//!
//! let labelled = LabelledSet {
//!     features: labelled_features,
//!     labels: labelled_labels,
//!     text: labelled_text,
//! };
//! let config = SelectionConfig::new(10, 1000);
//! let round = select_batch(
//!     StructuredPerceptron::new(label_dict.len(), 10),
//!     &labelled,
//!     unlabelled_features,
//!     unlabelled_text,
//!     &label_dict,
//!     &minority_classes,
//!     &config,
//! )
//! .unwrap();
//!
//! for (tokens, predicted) in round.selected_text.iter().zip(&round.predicted_labels) {
//!     println!("{:?} {:?}", tokens, predicted);
//! }
//! ```
//!
//! The engine behind training and scoring is pluggable through the
//! [`ChainModel`] trait; [`StructuredPerceptron`] is the built-in one.

mod alternatives;
mod errors;
mod margin;
mod model;
mod perceptron;
mod ranker;
mod select;
mod selector;
mod taxonomy;

pub use alternatives::alternative_sequences;
pub use errors::{
    InsufficientDataError, InvalidConfigError, Result, SceltaError, TrainingError,
};
pub use margin::smallest_margin;
pub use model::{
    ChainModel, FeatureSequence, LabelSequence, ModelWrapper, TokenFeatures, TokenSequence,
};
pub use perceptron::StructuredPerceptron;
pub use ranker::{rank_candidates, Candidate};
pub use select::{select_batch, LabelledSet, SelectionConfig, SelectionRound};
pub use selector::select_diverse;
pub use taxonomy::{LabelKind, LabelTaxonomy};
