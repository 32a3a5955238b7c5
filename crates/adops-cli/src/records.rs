use std::path::{Path, PathBuf};

use adops_model::RecordSchema;
use adops_view::{ConfigFile, RecordSource, SourceError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Either a bare JSON array or `{"records": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordFile<R> {
    Bare(Vec<R>),
    Wrapped { records: Vec<R> },
}

/// Reads a whole record file on every load.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

async fn read_bytes(path: &Path) -> Result<Vec<u8>, SourceError> {
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || std::fs::read(owned))
        .await
        .map_err(|err| SourceError::unavailable(err.to_string()))?
        .map_err(|err| SourceError::unavailable(format!("{}: {err}", path.display())))
}

#[async_trait]
impl<R> RecordSource<R> for JsonFileSource
where
    R: DeserializeOwned + Send + 'static,
{
    async fn load(&self) -> Result<Vec<R>, SourceError> {
        let bytes = read_bytes(&self.path).await?;
        let file: RecordFile<R> = serde_json::from_slice(&bytes)
            .map_err(|err| SourceError::invalid(format!("{}: {err}", self.path.display())))?;
        Ok(match file {
            RecordFile::Bare(records) | RecordFile::Wrapped { records } => records,
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// `Ok(None)` when there is no file at `path`.
pub fn read_config_file(path: &Path) -> Result<Option<ConfigFile>, String> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(format!("{}: {err}", path.display())),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|err| format!("{}: {err}", path.display()))
}

pub fn read_schema(path: &Path) -> Result<RecordSchema, String> {
    let bytes = std::fs::read(path).map_err(|err| format!("{}: {err}", path.display()))?;
    serde_json::from_slice(&bytes).map_err(|err| format!("{}: {err}", path.display()))
}
