use std::collections::HashMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::io::AsyncReadExt;

use super::BlobStore;
use crate::error::{AppError, Result};

const CHUNK_SIZE: usize = 64 * 1024;

/// Body of a blob, delivered chunk by chunk so large archives are never buffered whole.
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

pub struct BlobObject {
    pub body: ByteStream,
    /// Content type recorded by the store, if any
    pub content_type: Option<String>,
    pub size: Option<u64>,
}

impl fmt::Debug for BlobObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobObject")
            .field("content_type", &self.content_type)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl BlobObject {
    /// Drain the stream into memory. Meant for tests and small objects.
    pub async fn collect(self) -> std::io::Result<Vec<u8>> {
        let mut body = self.body;
        let mut out = Vec::new();
        while let Some(chunk) = body.next().await {
            out.extend_from_slice(&chunk?);
        }
        Ok(out)
    }
}

/// Blob store over a local directory. Keys are relative paths below the root.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key below the root. Keys that could escape it resolve to nothing.
    fn resolve(&self, key: &str) -> Option<PathBuf> {
        let relative = Path::new(key);
        let mut saw_normal = false;
        for component in relative.components() {
            match component {
                Component::Normal(_) => saw_normal = true,
                Component::CurDir => {}
                _ => return None,
            }
        }
        saw_normal.then(|| self.root.join(relative))
    }
}

fn content_type_for(path: &Path) -> Option<String> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("zip") => Some("application/zip".to_string()),
        _ => None,
    }
}

fn file_stream(file: tokio::fs::File) -> ByteStream {
    stream::try_unfold(file, |mut file| async move {
        let mut buf = vec![0u8; CHUNK_SIZE];
        let n = file.read(&mut buf).await?;
        if n == 0 {
            return Ok::<_, std::io::Error>(None);
        }
        buf.truncate(n);
        Ok(Some((Bytes::from(buf), file)))
    })
    .boxed()
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn get(&self, key: &str) -> Result<Option<BlobObject>> {
        let Some(path) = self.resolve(key) else {
            tracing::warn!(key, "Rejected blob key outside the artifact root");
            return Ok(None);
        };

        let file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Ok(None);
        }

        Ok(Some(BlobObject {
            body: file_stream(file),
            content_type: content_type_for(&path),
            size: Some(metadata.len()),
        }))
    }
}

#[derive(Default)]
pub struct MemoryBlobStore {
    objects: RwLock<HashMap<String, (Bytes, Option<String>)>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &self,
        key: &str,
        data: impl Into<Bytes>,
        content_type: Option<&str>,
    ) -> Result<()> {
        let mut objects = self
            .objects
            .write()
            .map_err(|_| AppError::Internal("blob store lock poisoned".into()))?;
        objects.insert(
            key.to_string(),
            (data.into(), content_type.map(String::from)),
        );
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<bool> {
        let mut objects = self
            .objects
            .write()
            .map_err(|_| AppError::Internal("blob store lock poisoned".into()))?;
        Ok(objects.remove(key).is_some())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> Result<Option<BlobObject>> {
        let objects = self
            .objects
            .read()
            .map_err(|_| AppError::Internal("blob store lock poisoned".into()))?;

        Ok(objects.get(key).map(|(data, content_type)| {
            let data = data.clone();
            BlobObject {
                size: Some(data.len() as u64),
                content_type: content_type.clone(),
                body: stream::iter(vec![Ok(data)]).boxed(),
            }
        }))
    }
}
