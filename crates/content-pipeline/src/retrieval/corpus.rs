//! In-memory corpus retriever
//!
//! The corpus is split into overlapping chunks and ranked by how many
//! distinct query terms each chunk contains, then by raw term frequency.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use super::Retriever;
use crate::error::Result;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Boundary pieces are split on before merging
    pub separator: String,
    /// Maximum chunk length in characters (a single oversized piece is kept whole)
    pub chunk_size: usize,
    /// Characters carried over from the end of one chunk into the next
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            separator: "\n".into(),
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Split on the separator, then merge pieces into overlapping chunks
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Vec<String> {
    let sep_len = config.separator.chars().count();
    let joined_len = |pieces: &[&str]| -> usize {
        let chars: usize = pieces.iter().map(|p| p.chars().count()).sum();
        chars + sep_len * pieces.len().saturating_sub(1)
    };

    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for piece in text.split(config.separator.as_str()).map(str::trim).filter(|p| !p.is_empty()) {
        let piece_len = piece.chars().count();

        if !current.is_empty() && joined_len(&current) + sep_len + piece_len > config.chunk_size {
            chunks.push(current.join(&config.separator));

            while !current.is_empty()
                && (joined_len(&current) > config.chunk_overlap
                    || joined_len(&current) + sep_len + piece_len > config.chunk_size)
            {
                current.remove(0);
            }
        }

        current.push(piece);
    }

    if !current.is_empty() {
        chunks.push(current.join(&config.separator));
    }

    chunks
}

/// Lowercased alphanumeric terms of at least two characters
fn terms(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_lowercase)
}

struct Chunk {
    text: String,
    term_counts: HashMap<String, usize>,
}

impl Chunk {
    fn new(text: String) -> Self {
        let mut term_counts = HashMap::new();
        for term in terms(&text) {
            *term_counts.entry(term).or_insert(0) += 1;
        }
        Self { text, term_counts }
    }

    /// (distinct query terms present, total occurrences of them)
    fn score(&self, query_terms: &[String]) -> (usize, usize) {
        query_terms
            .iter()
            .filter_map(|t| self.term_counts.get(t))
            .fold((0, 0), |(distinct, total), count| (distinct + 1, total + count))
    }
}

pub struct CorpusRetriever {
    chunking: ChunkingConfig,
    chunks: RwLock<Vec<Chunk>>,
    /// Stored posts are appended here when set
    persist_path: Option<PathBuf>,
}

impl CorpusRetriever {
    pub fn new(chunking: ChunkingConfig) -> Self {
        Self {
            chunking,
            chunks: RwLock::new(Vec::new()),
            persist_path: None,
        }
    }

    /// Build from in-memory text (not persisted)
    pub fn from_text(text: &str, chunking: ChunkingConfig) -> Self {
        let chunks = chunk_text(text, &chunking).into_iter().map(Chunk::new).collect();
        Self {
            chunking,
            chunks: RwLock::new(chunks),
            persist_path: None,
        }
    }

    /// Load a corpus file; stored posts are appended back to it.
    /// A missing file starts an empty corpus.
    pub async fn from_file(path: impl AsRef<Path>, chunking: ChunkingConfig) -> Result<Self> {
        let path = path.as_ref();
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Corpus file not found, starting empty");
                String::new()
            }
            Err(e) => return Err(e.into()),
        };

        let mut retriever = Self::from_text(&text, chunking);
        retriever.persist_path = Some(path.to_path_buf());
        tracing::info!(
            path = %path.display(),
            chunks = retriever.chunks.get_mut().len(),
            "Loaded content corpus"
        );
        Ok(retriever)
    }

    pub async fn len(&self) -> usize {
        self.chunks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.chunks.read().await.is_empty()
    }

    async fn append_to_file(path: &Path, text: &str) -> Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(format!("\n{text}").as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl Retriever for CorpusRetriever {
    async fn retrieve(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        let mut query_terms: Vec<String> = terms(query).collect();
        query_terms.sort();
        query_terms.dedup();

        if query_terms.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let chunks = self.chunks.read().await;
        let mut scored: Vec<((usize, usize), &Chunk)> = chunks
            .iter()
            .map(|c| (c.score(&query_terms), c))
            .filter(|((distinct, _), _)| *distinct > 0)
            .collect();

        // Stable sort keeps corpus order among ties
        scored.sort_by(|(a, _), (b, _)| b.cmp(a));

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(_, c)| c.text.clone())
            .collect())
    }

    async fn store(&self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        if let Some(path) = &self.persist_path {
            Self::append_to_file(path, text).await?;
        }

        let new_chunks = chunk_text(text, &self.chunking);
        self.chunks.write().await.extend(new_chunks.into_iter().map(Chunk::new));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_chunks() -> ChunkingConfig {
        ChunkingConfig {
            separator: "\n".into(),
            chunk_size: 20,
            chunk_overlap: 8,
        }
    }

    #[test]
    fn test_chunk_merges_until_size() {
        let chunks = chunk_text("aaaa\nbbbb\ncccc\ndddd\neeee", &small_chunks());
        // Each chunk holds at most 20 chars; the last piece of one chunk
        // starts the next because it fits in the 8 char overlap.
        assert_eq!(chunks, vec!["aaaa\nbbbb\ncccc\ndddd", "dddd\neeee"]);
    }

    #[test]
    fn test_oversized_piece_kept_whole() {
        let long = "x".repeat(50);
        let chunks = chunk_text(&format!("short\n{long}\ntail"), &small_chunks());
        assert_eq!(chunks, vec!["short".to_string(), long, "tail".to_string()]);
    }

    #[test]
    fn test_chunk_skips_blank_lines() {
        let chunks = chunk_text("\n\n  \nonly\n\n", &ChunkingConfig::default());
        assert_eq!(chunks, vec!["only"]);
    }

    #[tokio::test]
    async fn test_ranking() {
        let config = ChunkingConfig {
            chunk_size: 1,
            chunk_overlap: 0,
            ..ChunkingConfig::default()
        };
        let retriever = CorpusRetriever::from_text(
            "Ethereum gas fees are wild\n\
             Bitcoin and Ethereum both green today, HODL\n\
             Nothing to see here\n\
             Bitcoin bitcoin bitcoin",
            config,
        );

        let results = retriever.retrieve("Bitcoin, Ethereum", 3).await.unwrap();
        assert_eq!(
            results,
            vec![
                "Bitcoin and Ethereum both green today, HODL",
                "Bitcoin bitcoin bitcoin",
                "Ethereum gas fees are wild",
            ]
        );

        assert!(retriever.retrieve("", 3).await.unwrap().is_empty());
        assert!(retriever.retrieve("Solana", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_appends_and_persists() {
        let path = std::env::temp_dir().join(format!("corpus-{}.txt", uuid::Uuid::new_v4()));
        let retriever = CorpusRetriever::from_file(&path, ChunkingConfig::default()).await.unwrap();
        assert!(retriever.is_empty().await);

        retriever.store("Altseason is coming, DYOR").await.unwrap();
        retriever.store("   ").await.unwrap();

        assert_eq!(retriever.len().await, 1);
        assert_eq!(
            retriever.retrieve("altseason", 5).await.unwrap(),
            vec!["Altseason is coming, DYOR"]
        );

        let reloaded = CorpusRetriever::from_file(&path, ChunkingConfig::default()).await.unwrap();
        assert_eq!(reloaded.len().await, 1);

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
