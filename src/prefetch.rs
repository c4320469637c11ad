use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use hf_hub::api::sync::{Api, ApiRepo};
use tracing::info;

/// Tokenizer file set for the sentiment model (BPE vocab + merges)
const TOKENIZER_FILES: &[&str] = &[
    "vocab.json",
    "merges.txt",
    "tokenizer_config.json",
    "special_tokens_map.json",
];
const CONFIG_FILES: &[&str] = &["config.json"];
const WEIGHT_FILES: &[&str] = &["model.safetensors"];

/// Subdirectory names under the models root, fixed so runtime inference
/// code can locate each artifact set without configuration.
pub const TOKENIZER_DIR: &str = "sentiment_tokenizer";
/// Model config subdirectory
pub const CONFIG_DIR: &str = "sentiment_config";
/// Model weights subdirectory
pub const MODEL_DIR: &str = "sentiment_model";

/// Download the sentiment model's artifact bundle from the Hugging Face hub
/// and persist it under `models_root`.
///
/// Creates the root if absent. Fetches the tokenizer, config, and weights
/// into their fixed subdirectories. This runs during the container image
/// build; there is no retry and every failure propagates so the build
/// aborts loudly.
///
/// # Errors
/// Returns error on any hub or filesystem failure.
pub fn prefetch_model(model_id: &str, models_root: &Path) -> Result<()> {
    fs::create_dir_all(models_root).with_context(|| {
        format!("failed to create models root at {}", models_root.display())
    })?;

    info!(model = model_id, "downloading sentiment analysis model");
    let api = Api::new().context("failed to initialize hub client")?;
    let repo = api.model(model_id.to_owned());

    fetch_bundle_part(&repo, &models_root.join(TOKENIZER_DIR), TOKENIZER_FILES)?;
    fetch_bundle_part(&repo, &models_root.join(CONFIG_DIR), CONFIG_FILES)?;
    fetch_bundle_part(&repo, &models_root.join(MODEL_DIR), WEIGHT_FILES)?;

    info!(
        model = model_id,
        root = %models_root.display(),
        "sentiment analysis model downloaded"
    );
    Ok(())
}

fn fetch_bundle_part(repo: &ApiRepo, dest: &Path, files: &[&str]) -> Result<()> {
    fs::create_dir_all(dest)
        .with_context(|| format!("failed to create {}", dest.display()))?;

    for &filename in files {
        let cached = repo
            .get(filename)
            .with_context(|| format!("failed to download '{filename}' from hub"))?;

        // hf-hub caches under its own directory; copy into the bundle
        let target = dest.join(filename);
        if cached != target {
            fs::copy(&cached, &target).with_context(|| {
                format!("failed to copy '{filename}' to {}", target.display())
            })?;
        }
        info!(file = filename, dest = %dest.display(), "fetched artifact");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_dirs_are_distinct() {
        let dirs = [TOKENIZER_DIR, CONFIG_DIR, MODEL_DIR];
        for (i, a) in dirs.iter().enumerate() {
            for b in &dirs[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_tokenizer_files_cover_bpe_assets() {
        assert!(TOKENIZER_FILES.contains(&"vocab.json"));
        assert!(TOKENIZER_FILES.contains(&"merges.txt"));
    }

    #[test]
    #[ignore] // Requires network access and downloads a full model
    fn test_prefetch_model_integration() {
        let dir = tempfile::tempdir().unwrap();

        prefetch_model("cardiffnlp/twitter-roberta-base-sentiment-latest", dir.path())
            .unwrap();

        for subdir in [TOKENIZER_DIR, CONFIG_DIR, MODEL_DIR] {
            let path = dir.path().join(subdir);
            assert!(path.is_dir(), "missing bundle part: {subdir}");
            assert!(fs::read_dir(&path).unwrap().next().is_some());
        }
    }
}
