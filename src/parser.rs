use crate::ir::WeightedWord;
use crate::layout::merge_weighted;
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(#|//)").unwrap());

/// Parsed word input: either raw submissions still to be counted, or words
/// that already carry a weight.
#[derive(Debug, Clone, PartialEq)]
pub enum WordInput {
    Submissions(Vec<String>),
    Weighted(Vec<WeightedWord>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonItem {
    Text(String),
    Weighted(WeightedWord),
}

/// Accepts one submission per line (blank lines and `#`/`//` comments are
/// skipped) or a JSON array. JSON arrays hold strings, or objects with
/// `text`, `weight` and an optional `color`; mixing the two is an error.
/// Weighted labels are normalized like submissions and merged by label.
pub fn parse_words(input: &str) -> Result<WordInput> {
    let trimmed = input.trim_start_matches('\u{feff}').trim();
    if trimmed.starts_with('[') {
        return parse_json_words(trimmed);
    }
    let submissions = trimmed
        .lines()
        .filter(|line| !line.trim().is_empty() && !COMMENT_RE.is_match(line))
        .map(|line| line.trim().to_string())
        .collect();
    Ok(WordInput::Submissions(submissions))
}

fn parse_json_words(input: &str) -> Result<WordInput> {
    let items: Vec<JsonItem> = serde_json::from_str(input)?;
    let mut texts = Vec::new();
    let mut weighted = Vec::new();
    for item in items {
        match item {
            JsonItem::Text(text) => texts.push(text),
            JsonItem::Weighted(word) => weighted.push(word),
        }
    }
    match (texts.is_empty(), weighted.is_empty()) {
        (_, true) => Ok(WordInput::Submissions(texts)),
        (true, false) => Ok(WordInput::Weighted(merge_weighted(weighted))),
        (false, false) => Err(anyhow::anyhow!(
            "JSON word list mixes plain strings and weighted objects"
        )),
    }
}
