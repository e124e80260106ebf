//! Quote Storage and Selection
//!
//! Loads a static list of quotes from a JSON array of strings and serves
//! uniform random picks. Construction fails on a missing, malformed, or
//! empty source; selection itself cannot fail afterwards.

use std::path::Path;

use rand::Rng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("failed to read quotes file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse quotes file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("quotes list is empty")]
    Empty,
}

/// A loaded, non-empty quote list.
pub struct QuoteBook {
    quotes: Vec<String>,
}

impl QuoteBook {
    /// Load quotes from a JSON file containing an array of strings.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, QuoteError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| QuoteError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let quotes: Vec<String> = serde_json::from_str(&data)?;
        Self::from_quotes(quotes)
    }

    pub fn from_quotes(quotes: Vec<String>) -> Result<Self, QuoteError> {
        if quotes.is_empty() {
            return Err(QuoteError::Empty);
        }
        Ok(Self { quotes })
    }

    /// Uniform random pick. The list is non-empty by construction.
    pub fn random_quote(&self) -> String {
        let index = rand::rng().random_range(0..self.quotes.len());
        self.quotes[index].clone()
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_rejected() {
        assert!(matches!(
            QuoteBook::from_quotes(Vec::new()),
            Err(QuoteError::Empty)
        ));
    }

    #[test]
    fn test_random_quote_is_a_member() {
        let book = QuoteBook::from_quotes(vec![
            "first".to_string(),
            "second".to_string(),
            "third".to_string(),
        ])
        .unwrap();
        for _ in 0..50 {
            let quote = book.random_quote();
            assert!(["first", "second", "third"].contains(&quote.as_str()));
        }
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("quotes-test-{}.json", std::process::id()));
        std::fs::write(&path, r#"["stay hungry", "stay foolish"]"#).unwrap();

        let book = QuoteBook::load(&path).unwrap();
        assert_eq!(book.len(), 2);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_rejects_missing_and_malformed() {
        assert!(matches!(
            QuoteBook::load("/nonexistent/quotes.json"),
            Err(QuoteError::Read { .. })
        ));

        let path = std::env::temp_dir().join(format!("quotes-bad-{}.json", std::process::id()));
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(QuoteBook::load(&path), Err(QuoteError::Parse(_))));
        std::fs::remove_file(&path).ok();
    }
}
