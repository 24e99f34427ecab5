//! Label taxonomy for BIO-style tag sets.

use hashbrown::HashMap;

use crate::errors::{Result, SceltaError};

/// Role of a label within the tag grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelKind {
    /// The outside/majority label.
    Majority,

    /// The first token of a labeled span.
    Begin,

    /// A continuation token of a labeled span.
    Inside,
}

/// Validated label inventory.
///
/// Maps label strings to dense indices and classifies every index as the
/// majority (outside) label, a begin-prefixed minority label, or an
/// inside-prefixed minority label. All string checks happen once at
/// construction; call sites only use typed queries.
pub struct LabelTaxonomy {
    labels: Vec<String>,
    ids: HashMap<String, usize>,
    kinds: Vec<LabelKind>,
    majority: usize,
    minority: Vec<usize>,
    begin_prefix: String,
    inside_prefix: String,
}

impl LabelTaxonomy {
    /// Creates a new taxonomy.
    ///
    /// # Arguments
    ///
    /// * `label_dict` - A mapping from label strings to dense indices.
    /// * `minority_classes` - Labels of the minority categories. The single
    ///   label absent from this list is the majority label.
    /// * `outside_label` - The expected string of the majority label.
    /// * `begin_prefix` - Prefix marking the first token of a span.
    /// * `inside_prefix` - Prefix marking continuation tokens of a span.
    ///
    /// # Errors
    ///
    /// [`SceltaError::InvalidConfig`] will be returned when the indices are
    /// not dense, the majority label is not unique or does not equal
    /// `outside_label`, or a minority label matches neither prefix.
    pub fn new(
        label_dict: &HashMap<String, usize>,
        minority_classes: &[String],
        outside_label: &str,
        begin_prefix: &str,
        inside_prefix: &str,
    ) -> Result<Self> {
        let n_labels = label_dict.len();
        let mut labels = vec![String::new(); n_labels];
        for (label, &idx) in label_dict {
            if idx >= n_labels {
                return Err(SceltaError::invalid_config(
                    "label_dict",
                    format!("indices must be dense, found {} for {} labels", idx, n_labels),
                ));
            }
            if !labels[idx].is_empty() {
                return Err(SceltaError::invalid_config(
                    "label_dict",
                    format!("duplicate index {}", idx),
                ));
            }
            labels[idx] = label.clone();
        }

        let mut minority = vec![];
        for class in minority_classes {
            let &idx = label_dict.get(class).ok_or_else(|| {
                SceltaError::invalid_config(
                    "minority_classes",
                    format!("unknown label {}", class),
                )
            })?;
            minority.push(idx);
        }

        let mut majority = None;
        for idx in 0..n_labels {
            if !minority.contains(&idx) {
                if majority.is_some() {
                    return Err(SceltaError::invalid_config(
                        "minority_classes",
                        "exactly one majority label must remain",
                    ));
                }
                majority = Some(idx);
            }
        }
        let majority = majority.ok_or_else(|| {
            SceltaError::invalid_config("minority_classes", "exactly one majority label must remain")
        })?;
        if labels[majority] != outside_label {
            return Err(SceltaError::invalid_config(
                "outside_label",
                format!("majority label is {}, expected {}", labels[majority], outside_label),
            ));
        }

        let mut kinds = vec![LabelKind::Majority; n_labels];
        for &idx in &minority {
            if labels[idx].starts_with(begin_prefix) {
                kinds[idx] = LabelKind::Begin;
            } else if labels[idx].starts_with(inside_prefix) {
                kinds[idx] = LabelKind::Inside;
            } else {
                return Err(SceltaError::invalid_config(
                    "minority_classes",
                    format!("label {} matches neither prefix", labels[idx]),
                ));
            }
        }

        let ids = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.clone(), i))
            .collect();

        Ok(Self {
            labels,
            ids,
            kinds,
            majority,
            minority,
            begin_prefix: begin_prefix.to_string(),
            inside_prefix: inside_prefix.to_string(),
        })
    }

    /// Gets the number of labels.
    pub fn n_labels(&self) -> usize {
        self.labels.len()
    }

    /// Gets the label string of the given index.
    pub fn label(&self, idx: usize) -> &str {
        &self.labels[idx]
    }

    /// Gets the index of the given label string.
    pub fn label_id(&self, label: &str) -> Option<usize> {
        self.ids.get(label).copied()
    }

    /// Gets the index of the majority label.
    pub fn majority_id(&self) -> usize {
        self.majority
    }

    /// Gets the indices of the minority labels.
    pub fn minority_ids(&self) -> &[usize] {
        &self.minority
    }

    /// Gets the grammar role of the given index.
    pub fn kind(&self, idx: usize) -> LabelKind {
        self.kinds[idx]
    }

    pub fn is_majority(&self, idx: usize) -> bool {
        self.kinds[idx] == LabelKind::Majority
    }

    pub fn is_begin(&self, idx: usize) -> bool {
        self.kinds[idx] == LabelKind::Begin
    }

    pub fn is_inside(&self, idx: usize) -> bool {
        self.kinds[idx] == LabelKind::Inside
    }

    /// Gets the base category of a minority label, i.e. the suffix after the
    /// begin/inside prefix. Returns [`None`] for the majority label.
    pub fn base_category(&self, idx: usize) -> Option<&str> {
        match self.kinds[idx] {
            LabelKind::Majority => None,
            LabelKind::Begin => Some(&self.labels[idx][self.begin_prefix.len()..]),
            LabelKind::Inside => Some(&self.labels[idx][self.inside_prefix.len()..]),
        }
    }

    /// Checks whether the given label sequence contains a minority label.
    pub fn has_minority(&self, y: &[usize]) -> bool {
        y.iter().any(|&idx| !self.is_majority(idx))
    }
}
