//! Corpus store: loads the source text into immutable passages.
//!
//! Passages are blank-line-delimited blocks.  Each block is kept verbatim —
//! the store never summarizes, reflows, or strips anything (verse numbers
//! included); what was written is what gets quoted.

use std::path::Path;

use vg_domain::error::{Error, Result};

/// A single fixed unit of the devotional source text.
///
/// Created once at load time; never mutated; lives for the whole process.
#[derive(Debug, Clone)]
pub struct Passage {
    /// Zero-based position in the corpus file. Also the tie-break order
    /// for retrieval.
    pub id: usize,
    /// The passage text, exactly as it appears in the source file.
    pub text: String,
    /// Embedding vector, filled in when the index is built.
    pub embedding: Option<Vec<f32>>,
}

/// Load the corpus file at `path`.
///
/// An empty file yields an empty corpus (callers degrade to context-free
/// prompts); a missing file is an error — the corpus path is validated at
/// startup, so this should not happen mid-flight.
pub fn load_corpus(path: &Path) -> Result<Vec<Passage>> {
    let raw = std::fs::read_to_string(path).map_err(Error::Io)?;

    let passages: Vec<Passage> = raw
        .split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .enumerate()
        .map(|(id, block)| Passage {
            id,
            text: block.to_string(),
            embedding: None,
        })
        .collect();

    tracing::info!(
        passages = passages.len(),
        path = %path.display(),
        "corpus loaded"
    );

    Ok(passages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_corpus(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn splits_on_blank_lines() {
        let file = write_corpus(
            "1\nO Son of Spirit! My first counsel is this.\n\n\
             2\nO Son of Being! Love Me, that I may love thee.\n\n\
             3\nO Son of Man! Veiled in My immemorial being.",
        );
        let corpus = load_corpus(file.path()).unwrap();
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus[1].id, 1);
        assert!(corpus[1].text.contains("Love Me, that I may love thee"));
    }

    #[test]
    fn text_is_kept_verbatim_including_verse_numbers() {
        let file = write_corpus("5\nO Son of Being! Thy heart is My home.");
        let corpus = load_corpus(file.path()).unwrap();
        assert_eq!(corpus[0].text, "5\nO Son of Being! Thy heart is My home.");
    }

    #[test]
    fn empty_file_yields_empty_corpus() {
        let file = write_corpus("");
        let corpus = load_corpus(file.path()).unwrap();
        assert!(corpus.is_empty());
    }

    #[test]
    fn extra_blank_lines_are_not_passages() {
        let file = write_corpus("first passage\n\n\n\n\nsecond passage\n\n");
        let corpus = load_corpus(file.path()).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus[0].text, "first passage");
        assert_eq!(corpus[1].text, "second passage");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_corpus(Path::new("/nonexistent/corpus.txt")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
