//! `fastembed`-backed embedder (ONNX, all-MiniLM-L6-v2, 384 dimensions).

use super::{DEFAULT_DIMENSIONS, Embedder};
use crate::error::{IndexError, Result};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Mutex;

/// Embedder backed by a local ONNX model via `fastembed`.
pub struct FastEmbedEmbedder {
    model: Mutex<TextEmbedding>,
}

impl FastEmbedEmbedder {
    /// Initializes the model, downloading weights on first use if needed.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Unavailable`] if the model cannot be initialized.
    pub fn new() -> Result<Self> {
        let model = TextEmbedding::try_new(
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false),
        )
        .map_err(|e| IndexError::Unavailable(e.to_string()))?;
        Ok(Self {
            model: Mutex::new(model),
        })
    }
}

impl Embedder for FastEmbedEmbedder {
    fn dimensions(&self) -> usize {
        DEFAULT_DIMENSIONS
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut guard = self
            .model
            .lock()
            .map_err(|e| IndexError::Unavailable(e.to_string()))?;
        let mut out = guard
            .embed(vec![text], None)
            .map_err(|e| IndexError::Unavailable(e.to_string()))?;
        out.pop()
            .ok_or_else(|| IndexError::Unavailable("fastembed returned no vectors".to_string()).into())
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut guard = self
            .model
            .lock()
            .map_err(|e| IndexError::Unavailable(e.to_string()))?;
        guard
            .embed(texts.to_vec(), None)
            .map_err(|e| IndexError::Unavailable(e.to_string()).into())
    }
}
