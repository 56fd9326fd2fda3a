use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use rust_embed::Embed;

use crate::pool::{Category, Question, QuestionSource};

#[derive(Embed)]
#[folder = "assets/pools/"]
struct PoolAssets;

/// Pools shipped inside the binary, overridable per category by dropping a
/// `<category>.json` file into `override_dir`.
#[derive(Clone, Debug, Default)]
pub struct BundledSource {
    override_dir: Option<PathBuf>,
}

impl BundledSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            override_dir: Some(dir.into()),
        }
    }

    fn file_name(category: Category) -> String {
        format!("{}.json", category.to_key())
    }
}

impl QuestionSource for BundledSource {
    fn load(&self, category: Category) -> Result<Vec<Question>> {
        let filename = Self::file_name(category);

        // A user pool that exists but doesn't parse is reported, not papered over
        if let Some(dir) = &self.override_dir {
            let path = dir.join(&filename);
            if path.exists() {
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                return serde_json::from_str(&content)
                    .with_context(|| format!("parsing {}", path.display()));
            }
        }

        let file = PoolAssets::get(&filename)
            .ok_or_else(|| anyhow!("no bundled pool for {category}"))?;
        let content = std::str::from_utf8(file.data.as_ref())
            .with_context(|| format!("bundled {filename} is not UTF-8"))?;
        serde_json::from_str(content).with_context(|| format!("parsing bundled {filename}"))
    }
}
