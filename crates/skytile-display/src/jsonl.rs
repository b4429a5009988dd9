//! Append-only snapshot log for headless runs

use std::fs::{create_dir_all, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;

use skytile_core::{Presenter, WeatherSnapshot};

pub struct JsonlPresenter {
    _dir: PathBuf,
    file: PathBuf,
}

impl JsonlPresenter {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        create_dir_all(&dir)?;
        let file = dir.join("snapshots.jsonl");
        Ok(Self { _dir: dir, file })
    }
}

#[async_trait::async_trait]
impl Presenter for JsonlPresenter {
    async fn status(&mut self, message: &str) -> Result<()> {
        tracing::info!("{}", message);
        Ok(())
    }

    async fn publish(&mut self, snapshot: &WeatherSnapshot) -> Result<()> {
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file)?;
        let line = serde_json::to_string(snapshot)?;
        f.write_all(line.as_bytes())?;
        f.write_all(b"\n")?;
        Ok(())
    }
}
