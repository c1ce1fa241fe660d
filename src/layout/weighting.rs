//! Raw submissions to weighted labels.
//!
//! Normalization happens here rather than at the caller: trim, collapse inner
//! whitespace to single spaces, lowercase. Labels that normalize to nothing
//! are discarded.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::WeightScale;
use crate::ir::{WeightedWord, WordCount};

static WHITESPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

pub fn normalize_word(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(WHITESPACE_RUN_RE.replace_all(trimmed, " ").to_lowercase())
}

/// Groups submissions by normalized text. The result is ordered by label.
pub fn count_words<I, S>(submissions: I) -> Vec<WordCount>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: BTreeMap<String, u32> = BTreeMap::new();
    for raw in submissions {
        if let Some(text) = normalize_word(raw.as_ref()) {
            *counts.entry(text).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .map(|(text, occurrences)| WordCount { text, occurrences })
        .collect()
}

impl WeightScale {
    /// Strictly increasing in `occurrences` and positive for every valid
    /// scale (see [`WeightScale::validate`]).
    pub fn weight(&self, occurrences: u32) -> f32 {
        let count = occurrences.max(1) as f32;
        match *self {
            WeightScale::Linear { base, increment } => base + (count - 1.0) * increment,
            WeightScale::Proportional { factor } => count * factor,
            WeightScale::Logarithmic { base, factor } => base + factor * count.ln(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let ok = match *self {
            WeightScale::Linear { base, increment } => {
                base.is_finite() && increment.is_finite() && base > 0.0 && increment > 0.0
            }
            WeightScale::Proportional { factor } => factor.is_finite() && factor > 0.0,
            WeightScale::Logarithmic { base, factor } => {
                base.is_finite() && factor.is_finite() && base > 0.0 && factor > 0.0
            }
        };
        if ok {
            Ok(())
        } else {
            Err(format!(
                "weighting constants must be positive and finite, got {self:?}"
            ))
        }
    }
}

pub fn weigh(counts: &[WordCount], scale: &WeightScale) -> Vec<WeightedWord> {
    counts
        .iter()
        .map(|count| WeightedWord::new(count.text.clone(), scale.weight(count.occurrences)))
        .collect()
}

pub fn weigh_submissions<I, S>(submissions: I, scale: &WeightScale) -> Vec<WeightedWord>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    weigh(&count_words(submissions), scale)
}

/// Brings pre-weighted words under the same label rules as submissions.
/// Labels are normalized and blank ones dropped. Words sharing a label
/// collapse into one entry at its first position, keeping the largest weight;
/// an explicit color survives unless the winning entry brings its own.
pub fn merge_weighted(words: Vec<WeightedWord>) -> Vec<WeightedWord> {
    let mut positions: BTreeMap<String, usize> = BTreeMap::new();
    let mut merged: Vec<WeightedWord> = Vec::with_capacity(words.len());
    for word in words {
        let Some(text) = normalize_word(&word.text) else {
            continue;
        };
        match positions.get(&text) {
            Some(&idx) => {
                let kept = &mut merged[idx];
                if word.weight > kept.weight {
                    kept.weight = word.weight;
                    if word.color.is_some() {
                        kept.color = word.color;
                    }
                } else if kept.color.is_none() {
                    kept.color = word.color;
                }
            }
            None => {
                positions.insert(text.clone(), merged.len());
                merged.push(WeightedWord { text, ..word });
            }
        }
    }
    merged
}
