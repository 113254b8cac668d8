use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};
use tokio::io::AsyncWriteExt;

use ccai_client::{queries, Api, ClientError, Result};

use super::model::{
    Algorithm, AlgorithmRun, Annotation, ColorMap, Marker, ShapeType, Tile, TiledMask,
    TiledMaskPyramidInfo, UpdateAnnotationFields,
};
use crate::wire;

/// Lists the overlay masks of a slide.
pub async fn list_tiled_masks(api: &Api, slide_id: &str) -> Result<Vec<TiledMask>> {
    let data = api
        .query_graphql(
            &queries::QUERY_PATHOLOGY_SLIDE_MASKS,
            Some(json!({ "id": slide_id })),
        )
        .await?;
    wire::edge_nodes(&data, "tiledMasks")?
        .into_iter()
        .map(TiledMask::from_graphql)
        .collect()
}

/// Lists legacy markers; only slides annotated before the annotation
/// overlay carry any.
pub async fn list_markers(api: &Api, slide_id: &str) -> Result<Vec<Marker>> {
    let data = api
        .query_graphql(
            &queries::QUERY_PATHOLOGY_SLIDE_MARKERS,
            Some(json!({ "id": slide_id })),
        )
        .await?;
    wire::edge_nodes(&data, "markers")?
        .into_iter()
        .map(Marker::from_graphql)
        .collect()
}

/// Lists all annotations of a slide.
pub async fn list_annotations(api: &Api, slide_id: &str) -> Result<Vec<Annotation>> {
    let data = api
        .query_graphql(
            &queries::QUERY_PATHOLOGY_SLIDE_ANNOTATIONS,
            Some(json!({ "id": slide_id })),
        )
        .await?;
    wire::edge_nodes(&data, "annotations")?
        .into_iter()
        .map(Annotation::from_graphql)
        .collect()
}

/// Lists the annotations whose shape is one of `shapes`.
pub async fn list_annotations_of_shape(
    api: &Api,
    slide_id: &str,
    shapes: &[ShapeType],
) -> Result<Vec<Annotation>> {
    let annotations = list_annotations(api, slide_id).await?;
    Ok(annotations
        .into_iter()
        .filter(|annotation| shapes.contains(&annotation.shape_type))
        .collect())
}

/// Imports annotations from a GeoJSON document and returns the created
/// annotations.
pub async fn import_annotations_from_geojson(
    api: &Api,
    slide_id: &str,
    geojson: &str,
) -> Result<Vec<Annotation>> {
    let data = api
        .query_graphql(
            &queries::MUTATION_IMPORT_ANNOTATIONS_FROM_GEOJSON,
            Some(json!({ "id": slide_id, "geojson": geojson })),
        )
        .await?;
    wire::array_field(&data, "annotations")?
        .iter()
        .map(Annotation::from_graphql)
        .collect()
}

/// Updates an annotation in place; absent fields are left untouched.
/// Returns the server's re-decoded copy.
pub async fn update_annotation(
    api: &Api,
    annotation_id: &str,
    fields: UpdateAnnotationFields,
) -> Result<Annotation> {
    // Only submitted variables reach the mutation input: a missing
    // variable means "keep", while null would erase the value.
    let mut variables = Map::new();
    variables.insert("id".to_string(), Value::from(annotation_id));
    if let Some(shape_data) = fields.shape_data {
        variables.insert("shapeData".to_string(), json!(shape_data));
    }
    if let Some(color) = fields.color {
        variables.insert("color".to_string(), Value::from(color));
    }
    if let Some(label) = fields.label {
        variables.insert("label".to_string(), Value::from(label));
    }
    if let Some(point_type) = fields.point_type {
        variables.insert("pointType".to_string(), Value::from(point_type));
    }
    if let Some(is_label_visible) = fields.is_label_visible {
        variables.insert("isLabelVisible".to_string(), Value::from(is_label_visible));
    }

    let data = api
        .query_graphql(
            &queries::MUTATION_UPDATE_ANNOTATION,
            Some(Value::Object(variables)),
        )
        .await?;
    Annotation::from_graphql(wire::field(&data, "annotation")?)
}

/// Streams the slide's original image into `target_dir` and returns the
/// written path.
///
/// The file name comes from the `Content-Disposition` header when
/// present, otherwise from the URL path stripped of its query string.
/// Failing both is an error rather than a made-up name: a generated
/// name would hide that the server stopped sending one.
pub async fn download_original(api: &Api, slide_id: &str, target_dir: &Path) -> Result<PathBuf> {
    let data = api
        .query_graphql(
            &queries::QUERY_PATHOLOGY_SLIDE_DOWNLOAD,
            Some(json!({ "id": slide_id })),
        )
        .await?;
    let download_url = wire::str_field(&data, "downloadUrl")?;

    let mut response = api.http().get(&download_url).send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Transport {
            status: status.as_u16(),
            body,
        });
    }

    let file_name = derived_file_name(&response, &download_url)?;
    let target = target_dir.join(&file_name);
    let mut out = tokio::fs::File::create(&target).await?;
    while let Some(chunk) = response.chunk().await? {
        out.write_all(&chunk).await?;
    }
    out.flush().await?;
    tracing::info!("downloaded original slide to {}", target.display());
    Ok(target)
}

fn derived_file_name(response: &reqwest::Response, download_url: &str) -> Result<String> {
    if let Some(disposition) = response
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)
        .and_then(|header| header.to_str().ok())
    {
        if let Some((_, name)) = disposition.split_once("filename=") {
            let name = name.trim().trim_matches('"');
            if !name.is_empty() {
                return Ok(name.to_string());
            }
        }
    }

    let last_segment = url::Url::parse(download_url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|segments| segments.last().map(str::to_string))
        })
        .unwrap_or_default();
    if last_segment.is_empty() {
        return Err(ClientError::validation(format!(
            "could not derive a file name from `{}`",
            download_url
        )));
    }
    Ok(last_segment)
}

/// Fetches the tile geometry of a mask for a caller-side pyramid reader.
pub async fn get_pyramid_info(api: &Api, mask_id: &str) -> Result<TiledMaskPyramidInfo> {
    let data = api
        .query_graphql(&queries::QUERY_TILED_MASK_TILES, Some(json!({ "id": mask_id })))
        .await?;
    let tiles = wire::array_field(&data, "tiles")?
        .iter()
        .map(|tile| {
            Ok(Tile {
                x: wire::i64_field(tile, "x")?,
                y: wire::i64_field(tile, "y")?,
                level: wire::i64_field(tile, "level")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(TiledMaskPyramidInfo {
        tiles,
        scale: wire::f64_field(&data, "scale")?,
        tiles_url: wire::str_field(&data, "tilesUrl")?,
        tile_size: wire::i64_field(&data, "tileSize")?,
    })
}

/// Lists the algorithms available to the organization.
pub async fn all_algorithms(api: &Api) -> Result<Vec<Algorithm>> {
    let data = api.query_graphql(&queries::QUERY_ALL_ALGORITHMS, None).await?;
    wire::array_field(&data, "edges")?
        .iter()
        .map(|edge| Algorithm::from_graphql(wire::field(edge, "node")?))
        .collect()
}

/// Invokes an algorithm on a slide, optionally restricted to a region
/// of interest, and returns the created run.
pub async fn run_algorithm(
    api: &Api,
    slide_id: &str,
    algorithm_id: &str,
    roi: Option<&str>,
) -> Result<AlgorithmRun> {
    let data = api
        .query_graphql(
            &queries::MUTATION_RUN_ALGORITHM,
            Some(json!({ "slide": slide_id, "algorithm": algorithm_id, "roi": roi })),
        )
        .await?;
    AlgorithmRun::from_graphql(wire::field(&data, "algorithmRun")?)
}

/// Lists every color map of the organization.
pub async fn all_color_maps(api: &Api) -> Result<Vec<ColorMap>> {
    let data = api.query_graphql(&queries::QUERY_ALL_COLOR_MAPS, None).await?;
    wire::array_field(&data, "edges")?
        .iter()
        .map(|edge| ColorMap::from_graphql(wire::field(edge, "node")?))
        .collect()
}

/// Looks a color map up by codename.
pub async fn color_map_by_codename(api: &Api, codename: &str) -> Result<ColorMap> {
    let maps = all_color_maps(api).await?;
    maps.into_iter()
        .find(|map| map.codename == codename)
        .ok_or_else(|| {
            ClientError::validation(format!("color map with codename `{}` not found", codename))
        })
}
