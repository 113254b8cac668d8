use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::io::ReaderStream;

use ccai_client::{ClientError, Result};
use ccai_atoms::wire;

/// Server-side staging area for one batch of uploaded files; passed by
/// id into follow-up creation mutations.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ContainerRef {
    pub id: String,
}

/// Single-use direct-upload descriptor for exactly one file.
///
/// `data` holds form fields to merge into a POST multipart body;
/// `headers` are server-dictated request headers. Valid only within the
/// upload session that produced it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PresignUpload {
    pub url: String,
    pub method: String,
    pub data: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
}

impl PresignUpload {
    pub fn from_graphql(value: &Value) -> Result<Self> {
        Ok(Self {
            url: wire::str_field(value, "url")?,
            method: wire::str_field(value, "method")?,
            data: string_map(value, "data")?,
            headers: string_map(value, "headers")?,
        })
    }
}

fn string_map(value: &Value, name: &str) -> Result<BTreeMap<String, String>> {
    match wire::field(value, name)? {
        Value::Null => Ok(BTreeMap::new()),
        Value::Object(map) => map
            .iter()
            .map(|(key, entry)| {
                entry
                    .as_str()
                    .map(|text| (key.clone(), text.to_string()))
                    .ok_or_else(|| {
                        ClientError::decode(format!("`{}.{}` is not a string", name, key))
                    })
            })
            .collect(),
        _ => Err(ClientError::decode(format!(
            "field `{}` is not an object",
            name
        ))),
    }
}

/// One local byte source to upload: a file on disk (streamed) or an
/// in-memory buffer.
#[derive(Debug, Clone)]
pub enum UploadSource {
    Path(PathBuf),
    Bytes { name: String, bytes: Vec<u8> },
}

impl UploadSource {
    pub fn file_name(&self) -> Result<String> {
        match self {
            Self::Path(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    ClientError::validation(format!("`{}` has no file name", path.display()))
                }),
            Self::Bytes { name, .. } => Ok(name.clone()),
        }
    }

    pub(crate) async fn into_body(self) -> Result<reqwest::Body> {
        match self {
            Self::Path(path) => {
                let file = tokio::fs::File::open(&path).await?;
                Ok(reqwest::Body::wrap_stream(ReaderStream::new(file)))
            }
            Self::Bytes { bytes, .. } => Ok(reqwest::Body::from(bytes)),
        }
    }

    pub(crate) async fn into_part(self) -> Result<reqwest::multipart::Part> {
        let name = self.file_name()?;
        let body = self.into_body().await?;
        Ok(reqwest::multipart::Part::stream(body).file_name(name))
    }
}

/// Reference to a just-created file, as creation mutations return it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub id: String,
    pub name: String,
}

/// Which color map a new mask should render with.
#[derive(Debug, Clone)]
pub enum ColorMapRef {
    Id(String),
    Codename(String),
}

/// Options for creating a mask from an uploaded raster.
#[derive(Debug, Clone, Default)]
pub struct MaskUploadOptions {
    pub scale: Option<f64>,
    pub tile_size: Option<i64>,
    /// Server-side `UploadedMaskType` enum value.
    pub mask_type: Option<String>,
}

/// Options for creating a slide from local files.
#[derive(Debug, Clone, Default)]
pub struct SlideCreateOptions {
    /// Common root the container-relative paths are computed against;
    /// inferred from the inputs when absent.
    pub root: Option<PathBuf>,
    pub is_collage: bool,
    pub anonymize: bool,
    pub filters: Vec<String>,
}

/// Derives the container-relative path (always `/`-separated) of a file
/// under the upload root.
pub(crate) fn container_path(file: &Path, root: &Path) -> Result<String> {
    let relative = file.strip_prefix(root).map_err(|_| {
        ClientError::validation(format!(
            "`{}` is not under the upload root `{}`",
            file.display(),
            root.display()
        ))
    })?;
    let parts: Vec<String> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        return Err(ClientError::validation(format!(
            "`{}` equals the upload root",
            file.display()
        )));
    }
    Ok(parts.join("/"))
}
