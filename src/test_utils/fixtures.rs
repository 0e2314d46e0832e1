//! Test fixtures for model folders
//!
//! [`ModelFolderFixture`] describes a folder of model files and writes it to disk,
//! creating intermediate directories as needed.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// A model folder to be written under a test directory
#[derive(Clone, Debug)]
pub struct ModelFolderFixture {
    pub name: String,
    pub files: Vec<(String, Vec<u8>)>,
}

impl ModelFolderFixture {
    /// Empty folder called `name`
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            files: Vec::new(),
        }
    }

    /// A small ONNX-style model: weights, config and a tokenizer in a subfolder
    pub fn onnx_model(name: &str) -> Self {
        Self::new(name)
            .with_file("model.onnx", b"onnx-weights")
            .with_file("config.json", br#"{"model_type":"gpt2"}"#)
            .with_file("tokenizer/vocab.json", br#"{"hello":0}"#)
    }

    /// Add a file; `relative` uses forward slashes
    pub fn with_file(mut self, relative: &str, content: &[u8]) -> Self {
        self.files.push((relative.to_string(), content.to_vec()));
        self
    }

    /// Add a user-supplied manifest
    pub fn with_manifest(self, content: &str) -> Self {
        self.with_file("AppxManifest.xml", content.as_bytes())
    }

    /// Write the folder under `dir`, returning its path
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let root = dir.join(&self.name);
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create {}", root.display()))?;

        for (relative, content) in &self.files {
            let path = root.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, content)
                .with_context(|| format!("Failed to write fixture file {}", path.display()))?;
        }
        Ok(root)
    }
}
