//! Frequency counting, ranking and lexical diversity.

use std::collections::HashMap;

use serde::Serialize;

use crate::annotator::Token;

/// Occurrence counts keyed by token surface form or category label.
///
/// Keys remember the order in which they were first seen. Rankings sort by
/// descending count with a stable sort, so ties keep first-seen order and the
/// result does not depend on hash iteration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    index: HashMap<String, usize>,
    entries: Vec<(String, usize)>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one occurrence of `key`.
    pub fn record(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(key.to_owned(), self.entries.len());
                self.entries.push((key.to_owned(), 1));
            }
        }
    }

    /// Count for `key`, 0 when never recorded.
    pub fn count(&self, key: &str) -> usize {
        self.index
            .get(key)
            .map(|&slot| self.entries[slot].1)
            .unwrap_or(0)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), *c))
    }

    /// All entries, most frequent first; ties in first-seen order.
    pub fn ranked(&self) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// The `n` most frequent entries, or fewer when the table is smaller.
    pub fn top(&self, n: usize) -> Vec<(&str, usize)> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }
}

/// Aggregate view of one document's alphabetic tokens.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    /// Number of alphabetic tokens.
    pub total: usize,
    /// Number of distinct surface forms.
    pub unique: usize,
    /// `unique / total`, or 0 when there are no tokens.
    pub diversity: f64,
    pub tokens: FrequencyTable,
    pub categories: FrequencyTable,
}

impl Statistics {
    /// True when the document had no alphabetic token at all.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn top_tokens(&self, n: usize) -> Vec<(&str, usize)> {
        self.tokens.top(n)
    }

    pub fn top_categories(&self, n: usize) -> Vec<(&str, usize)> {
        self.categories.top(n)
    }

    /// Serializable snapshot with fully ranked tables.
    pub fn export<'a>(&'a self, document: &'a str) -> StatisticsExport<'a> {
        StatisticsExport {
            document,
            total_tokens: self.total,
            unique_tokens: self.unique,
            lexical_diversity: self.diversity,
            tokens: to_rows(&self.tokens),
            categories: to_rows(&self.categories),
        }
    }
}

/// One `item,count` row of an exported table.
#[derive(Debug, Serialize)]
pub struct CountRow<'a> {
    pub item: &'a str,
    pub count: usize,
}

/// JSON form of [`Statistics`].
#[derive(Debug, Serialize)]
pub struct StatisticsExport<'a> {
    pub document: &'a str,
    pub total_tokens: usize,
    pub unique_tokens: usize,
    pub lexical_diversity: f64,
    pub tokens: Vec<CountRow<'a>>,
    pub categories: Vec<CountRow<'a>>,
}

pub(crate) fn to_rows(table: &FrequencyTable) -> Vec<CountRow<'_>> {
    table
        .ranked()
        .into_iter()
        .map(|(item, count)| CountRow { item, count })
        .collect()
}

/// Counts tokens and categories over the alphabetic tokens of `tokens`.
///
/// Non-alphabetic tokens are skipped here as well, so both tables always sum
/// to `total`.
///
/// # Example
/// ```
/// use corpus_stats::{Token, aggregate};
/// let tokens = vec![
///     Token::new("le", "DET"),
///     Token::new("chat", "NOUN"),
///     Token::new("le", "DET"),
///     Token::new("42", "NUM"),
/// ];
/// let stats = aggregate(&tokens);
/// assert_eq!(stats.total, 3);
/// assert_eq!(stats.unique, 2);
/// assert_eq!(stats.top_tokens(1), vec![("le", 2)]);
/// ```
pub fn aggregate(tokens: &[Token]) -> Statistics {
    let mut words = FrequencyTable::new();
    let mut categories = FrequencyTable::new();
    let mut total = 0;

    for token in tokens.iter().filter(|t| t.is_alphabetic()) {
        words.record(&token.text);
        categories.record(&token.pos);
        total += 1;
    }

    let unique = words.len();
    Statistics {
        total,
        unique,
        diversity: lexical_diversity(unique, total),
        tokens: words,
        categories,
    }
}

/// `unique / total`, defined as 0 for an empty document.
pub fn lexical_diversity(unique: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        unique as f64 / total as f64
    }
}
