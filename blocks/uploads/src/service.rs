use std::collections::VecDeque;
use std::path::{Component, Path, PathBuf};

use serde_json::{json, Map, Value};

use ccai_atoms::patho::TiledMask;
use ccai_atoms::wire;
use ccai_client::{queries, Api, ClientError, Result};

use super::model::{
    container_path, ColorMapRef, ContainerRef, FileRef, MaskUploadOptions, PresignUpload,
    SlideCreateOptions, UploadSource,
};

/// Creates an upload container for the given relative paths.
///
/// The returned presigns are positionally aligned with `relative_paths`;
/// neither list may be reordered, alignment is implicit.
pub async fn create_container(
    api: &Api,
    relative_paths: &[String],
) -> Result<(ContainerRef, Vec<PresignUpload>)> {
    let data = api
        .query_graphql(
            &queries::MUTATION_UPLOAD_CONTAINER,
            Some(json!({ "files": relative_paths })),
        )
        .await?;

    let container = ContainerRef {
        id: wire::str_field(wire::field(&data, "container")?, "id")?,
    };
    let presigns = wire::array_field(wire::field(&data, "presignUpload")?, "files")?
        .iter()
        .map(PresignUpload::from_graphql)
        .collect::<Result<Vec<_>>>()?;
    if presigns.len() != relative_paths.len() {
        return Err(ClientError::decode(format!(
            "requested {} presigned uploads, server answered with {}",
            relative_paths.len(),
            presigns.len()
        )));
    }
    Ok((container, presigns))
}

/// Uploads local byte sources into a fresh container and returns its
/// reference for a follow-up creation mutation.
///
/// Transfers run in request order, one per presign. The first failing
/// transfer aborts the remaining ones; already-transferred files are
/// left in the container (it is a server-owned staging resource with
/// its own lifecycle).
pub async fn upload(
    api: &Api,
    sources: Vec<UploadSource>,
    relative_paths: Vec<String>,
) -> Result<ContainerRef> {
    if sources.len() != relative_paths.len() {
        return Err(ClientError::validation(format!(
            "{} sources for {} relative paths",
            sources.len(),
            relative_paths.len()
        )));
    }

    let (container, presigns) = create_container(api, &relative_paths).await?;
    for ((source, presign), relative_path) in
        sources.into_iter().zip(presigns).zip(&relative_paths)
    {
        transfer(api.http(), source, &presign).await.map_err(|err| {
            tracing::error!("upload of `{}` failed: {}", relative_path, err);
            err
        })?;
        tracing::debug!("uploaded `{}`", relative_path);
    }
    Ok(container)
}

/// Performs one direct transfer against a presigned URL.
async fn transfer(
    http: &reqwest::Client,
    source: UploadSource,
    presign: &PresignUpload,
) -> Result<()> {
    let mut request = match presign.method.to_uppercase().as_str() {
        "POST" => {
            let mut form = reqwest::multipart::Form::new();
            for (key, value) in &presign.data {
                form = form.text(key.clone(), value.clone());
            }
            form = form.part("file", source.into_part().await?);
            http.post(&presign.url).multipart(form)
        }
        "PUT" => http.put(&presign.url).body(source.into_body().await?),
        other => {
            return Err(ClientError::validation(format!(
                "unsupported upload method `{}`",
                other
            )))
        }
    };
    for (name, value) in &presign.headers {
        request = request.header(name, value);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Transport {
            status: status.as_u16(),
            body,
        });
    }
    Ok(())
}

/// Uploads a mask raster for a slide and creates the tiled mask.
pub async fn upload_tiled_mask(
    api: &Api,
    slide_id: &str,
    source: UploadSource,
    color_map: ColorMapRef,
    options: MaskUploadOptions,
) -> Result<TiledMask> {
    let relative_path = source.file_name()?;
    let container = upload(api, vec![source], vec![relative_path]).await?;

    let mut variables = Map::new();
    variables.insert("slide".to_string(), Value::from(slide_id));
    variables.insert("uploadsContainer".to_string(), Value::from(container.id));
    match color_map {
        ColorMapRef::Id(id) => {
            variables.insert("colorMapId".to_string(), Value::from(id));
        }
        ColorMapRef::Codename(codename) => {
            variables.insert("colorMapCodename".to_string(), Value::from(codename));
        }
    }
    if let Some(scale) = options.scale {
        variables.insert("scale".to_string(), Value::from(scale));
    }
    if let Some(tile_size) = options.tile_size {
        variables.insert("tileSize".to_string(), Value::from(tile_size));
    }
    if let Some(mask_type) = options.mask_type {
        variables.insert("maskType".to_string(), Value::from(mask_type));
    }

    let data = api
        .query_graphql(
            &queries::MUTATION_TILED_MASK_CREATE,
            Some(Value::Object(variables)),
        )
        .await?;
    TiledMask::from_graphql(wire::field(&data, "tiledMask")?)
}

/// Uploads local files (directories expanded recursively) and creates a
/// pathology slide from the container.
pub async fn create_slide_from_files(
    api: &Api,
    inputs: &[PathBuf],
    parent_id: &str,
    name: &str,
    options: SlideCreateOptions,
) -> Result<FileRef> {
    let files = expand_inputs(inputs).await?;
    if files.is_empty() {
        return Err(ClientError::validation("no input files to upload"));
    }
    let root = match options.root {
        Some(root) => root,
        None => common_root(&files)?,
    };
    let relative_paths = files
        .iter()
        .map(|file| container_path(file, &root))
        .collect::<Result<Vec<_>>>()?;

    tracing::info!(
        "uploading {} file(s) under `{}` for slide `{}`",
        files.len(),
        root.display(),
        name
    );
    let sources = files.into_iter().map(UploadSource::Path).collect();
    let container = upload(api, sources, relative_paths).await?;

    let data = api
        .query_graphql(
            &queries::MUTATION_PATHOLOGY_SLIDE_CREATE,
            Some(json!({
                "container": container.id,
                "parent": parent_id,
                "name": name,
                "isCollage": options.is_collage,
                "anonymize": options.anonymize,
                "filters": options.filters,
            })),
        )
        .await?;
    let file = wire::field(&data, "file")?;
    Ok(FileRef {
        id: wire::str_field(file, "id")?,
        name: wire::str_field(file, "name")?,
    })
}

/// Expands directory inputs into their files, depth-first with sorted
/// entries so the container order is deterministic.
async fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut queue: VecDeque<PathBuf> = inputs.iter().cloned().collect();
    let mut files = Vec::new();
    while let Some(path) = queue.pop_front() {
        let metadata = tokio::fs::metadata(&path).await?;
        if metadata.is_dir() {
            let mut entries = Vec::new();
            let mut dir = tokio::fs::read_dir(&path).await?;
            while let Some(entry) = dir.next_entry().await? {
                entries.push(entry.path());
            }
            entries.sort();
            for entry in entries.into_iter().rev() {
                queue.push_front(entry);
            }
        } else {
            files.push(path);
        }
    }
    Ok(files)
}

/// Longest common ancestor directory of the given files.
///
/// Fails when the inputs share no ancestor (for instance a mix of
/// absolute and relative paths); the caller must then supply the root
/// explicitly.
pub fn common_root(paths: &[PathBuf]) -> Result<PathBuf> {
    let first = paths
        .first()
        .ok_or_else(|| ClientError::validation("no input files"))?;
    let mut prefix: Vec<Component> = parent_components(first);
    for path in &paths[1..] {
        let components = parent_components(path);
        let shared = prefix
            .iter()
            .zip(&components)
            .take_while(|(ours, theirs)| ours == theirs)
            .count();
        prefix.truncate(shared);
    }
    if prefix.is_empty() {
        return Err(ClientError::validation(
            "input files share no common root; pass one explicitly",
        ));
    }
    Ok(prefix.iter().collect())
}

fn parent_components(path: &Path) -> Vec<Component> {
    path.parent()
        .map(|parent| parent.components().collect())
        .unwrap_or_default()
}
