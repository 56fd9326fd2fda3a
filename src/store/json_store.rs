use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::Serialize;

use crate::config::default_data_dir;
use crate::pool::Category;
use crate::store::ProgressBackend;
use crate::store::schema::{
    CategoryProgress, EXPORT_VERSION, ExportData, ProgressData, SCHEMA_VERSION,
};

const PROGRESS_FILE: &str = "progress.json";

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(default_data_dir())
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("creating data directory {}", base_dir.display()))?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let json = serde_json::to_string_pretty(data)?;
        write_atomically(&path, json.as_bytes())
    }

    /// Snapshot the saved progress (defaults if nothing is saved yet).
    pub fn export_all(&self) -> Result<ExportData> {
        let progress = self.read()?.unwrap_or_default();
        Ok(ExportData {
            hamprep_export_version: EXPORT_VERSION,
            exported_at: Utc::now(),
            progress,
        })
    }

    pub fn export_to(&self, path: &Path) -> Result<ExportData> {
        let export = self.export_all()?;
        let json = serde_json::to_string_pretty(&export)?;
        write_atomically(path, json.as_bytes())?;
        Ok(export)
    }

    /// Replace saved progress with an export. The new file is staged next to
    /// the old one and renamed over it, so a failure leaves the original intact.
    pub fn import_all(&self, data: &ExportData) -> Result<()> {
        if data.hamprep_export_version != EXPORT_VERSION {
            bail!(
                "Unsupported export version: {} (expected {})",
                data.hamprep_export_version,
                EXPORT_VERSION
            );
        }

        let mut progress = data.progress.clone();
        progress.schema_version = SCHEMA_VERSION;
        progress.normalize();

        self.save(PROGRESS_FILE, &progress)
            .context("Import failed while writing progress")
    }

    /// Import from a file holding either a hamprep export or the bare
    /// per-category map kept by the browser version of the trainer.
    pub fn import_from(&self, path: &Path) -> Result<ExportData> {
        let content =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let export = parse_import(&content)
            .with_context(|| format!("{} is not a progress export", path.display()))?;
        self.import_all(&export)?;
        Ok(export)
    }
}

impl ProgressBackend for JsonStore {
    fn read(&self) -> Result<Option<ProgressData>> {
        let path = self.file_path(PROGRESS_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let content =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let data = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(data))
    }

    fn write(&self, data: &ProgressData) -> Result<()> {
        self.save(PROGRESS_FILE, data)
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp_path = path.with_extension("json.tmp");

    let staged = (|| -> Result<()> {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        Ok(())
    })();
    if let Err(e) = staged {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.context(format!("staging {}", tmp_path.display())));
    }

    fs::rename(&tmp_path, path).with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

fn parse_import(content: &str) -> Result<ExportData> {
    if let Ok(export) = serde_json::from_str::<ExportData>(content) {
        return Ok(export);
    }

    let categories: BTreeMap<Category, CategoryProgress> = serde_json::from_str(content)?;
    if categories.is_empty() {
        bail!("no categories found");
    }
    Ok(ExportData {
        hamprep_export_version: EXPORT_VERSION,
        exported_at: Utc::now(),
        progress: ProgressData {
            schema_version: SCHEMA_VERSION,
            categories,
        },
    })
}
