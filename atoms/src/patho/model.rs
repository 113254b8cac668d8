use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use ccai_client::{ClientError, Result};

use crate::discussion::{Comment, Discussion};
use crate::wire;

/// Slide resolution metadata.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SlideProperties {
    /// Microns per pixel at full resolution.
    pub mpp: f64,
    pub magnification: f64,
}

/// Opaque handle for a caller-side DZI pyramid reader: the tile URL
/// plus the resolution metadata it needs.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DziFile {
    pub url: String,
    pub properties: SlideProperties,
}

/// How an annotation's flat `shape_data` coordinate list is read.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ShapeType {
    Rect,
    Polygon,
    Circle,
    Ellipse,
    Path,
    ClosedPath,
    Line,
    ArrowLine,
    Point,
    Text,
}

impl ShapeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rect => "rect",
            Self::Polygon => "polygon",
            Self::Circle => "circle",
            Self::Ellipse => "ellipse",
            Self::Path => "path",
            Self::ClosedPath => "closed_path",
            Self::Line => "line",
            Self::ArrowLine => "arrow_line",
            Self::Point => "point",
            Self::Text => "text",
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "rect" => Ok(Self::Rect),
            "polygon" => Ok(Self::Polygon),
            "circle" => Ok(Self::Circle),
            "ellipse" => Ok(Self::Ellipse),
            "path" => Ok(Self::Path),
            "closed_path" => Ok(Self::ClosedPath),
            "line" => Ok(Self::Line),
            "arrow_line" => Ok(Self::ArrowLine),
            "point" => Ok(Self::Point),
            "text" => Ok(Self::Text),
            other => Err(ClientError::decode(format!(
                "unknown shape type `{}`",
                other
            ))),
        }
    }
}

/// Slide overlay annotation. Mutable in place only through
/// `update_annotation`, which re-decodes the server's copy.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Annotation {
    pub id: String,
    pub shape_type: ShapeType,
    /// Flat coordinate list; arity and meaning depend on `shape_type`.
    pub shape_data: Vec<f64>,
    pub author: Option<String>,
    pub slide_id: String,
    pub number: Option<i64>,
    pub label: Option<String>,
    pub is_label_visible: Option<bool>,
    pub color: Option<String>,
    pub point_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub discussion: Discussion,
}

impl Annotation {
    pub fn from_graphql(value: &Value) -> Result<Self> {
        let shape_data = wire::array_field(value, "shapeData")?
            .iter()
            .map(|item| {
                item.as_f64()
                    .ok_or_else(|| ClientError::decode("shapeData holds a non-number"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            id: wire::str_field(value, "id")?,
            shape_type: ShapeType::parse(&wire::str_field(value, "shapeType")?)?,
            shape_data,
            author: wire::author_name(value)?,
            slide_id: wire::str_field(value, "slideId")?,
            number: wire::opt_i64_field(value, "number")?,
            label: wire::opt_str_field(value, "label")?,
            is_label_visible: wire::opt_bool_field(value, "isLabelVisible")?,
            color: wire::opt_str_field(value, "color")?,
            point_type: wire::opt_str_field(value, "pointType")?,
            created_at: wire::datetime_field(value, "createdAt")?,
            discussion: Discussion::from_parent(value)?,
        })
    }
}

/// Fields `update_annotation` may change; `None` leaves the field as-is.
#[derive(Debug, Clone, Default)]
pub struct UpdateAnnotationFields {
    pub shape_data: Option<Vec<f64>>,
    pub color: Option<String>,
    pub label: Option<String>,
    pub point_type: Option<String>,
    pub is_label_visible: Option<bool>,
}

/// Legacy rectangular marker, kept for slides annotated before the
/// annotation overlay existed.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Marker {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub width: f64,
    pub height: f64,
    pub author: Option<String>,
    pub number: Option<i64>,
    pub discussion: Discussion,
}

impl Marker {
    pub fn from_graphql(value: &Value) -> Result<Self> {
        Ok(Self {
            id: wire::str_field(value, "id")?,
            x: wire::f64_field(value, "x")?,
            y: wire::f64_field(value, "y")?,
            rotation: wire::f64_field(value, "rotation")?,
            width: wire::f64_field(value, "width")?,
            height: wire::f64_field(value, "height")?,
            author: wire::author_name(value)?,
            number: wire::opt_i64_field(value, "number")?,
            discussion: Discussion::from_parent(value)?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Rating {
    pub score: i64,
    pub author: String,
}

impl Rating {
    pub fn from_graphql(value: &Value) -> Result<Self> {
        Ok(Self {
            score: wire::i64_field(value, "score")?,
            author: wire::str_field(wire::field(value, "author")?, "name")?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Algorithm {
    pub id: String,
    pub name: String,
}

impl Algorithm {
    pub fn from_graphql(value: &Value) -> Result<Self> {
        Ok(Self {
            id: wire::str_field(value, "id")?,
            name: wire::str_field(value, "name")?,
        })
    }
}

/// One invocation of an algorithm on a slide, with its own discussion
/// and ratings.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AlgorithmRun {
    pub id: String,
    pub algorithm: Algorithm,
    pub discussion: Discussion,
    pub ratings: Vec<Rating>,
}

impl AlgorithmRun {
    pub fn from_graphql(value: &Value) -> Result<Self> {
        Ok(Self {
            id: wire::str_field(value, "id")?,
            algorithm: Algorithm::from_graphql(wire::field(value, "algorithm")?)?,
            discussion: Discussion::from_parent(value)?,
            ratings: wire::array_field(value, "ratings")?
                .iter()
                .map(Rating::from_graphql)
                .collect::<Result<Vec<_>>>()?,
        })
    }

    /// Appends a comment to this run's discussion thread.
    pub async fn add_comment(
        &mut self,
        api: &ccai_client::Api,
        text: &str,
    ) -> Result<Comment> {
        crate::discussion::add_comment(api, &mut self.discussion, text).await
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Color {
    pub name: String,
    pub key: i64,
    pub value: String,
}

impl Color {
    pub fn from_graphql(value: &Value) -> Result<Self> {
        Ok(Self {
            name: wire::str_field(value, "name")?,
            key: wire::i64_field(value, "key")?,
            value: wire::str_field(value, "value")?,
        })
    }
}

/// Named palette used to render mask tiles and point clouds.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ColorMap {
    pub id: String,
    pub name: String,
    pub codename: String,
    pub colors: Vec<Color>,
}

impl ColorMap {
    pub fn from_graphql(value: &Value) -> Result<Self> {
        Ok(Self {
            id: wire::str_field(value, "id")?,
            name: wire::str_field(value, "name")?,
            codename: wire::str_field(value, "codename")?,
            colors: wire::edge_nodes(value, "colors")?
                .into_iter()
                .map(Color::from_graphql)
                .collect::<Result<Vec<_>>>()?,
        })
    }
}

/// Per-slide overlay raster addressed by tile coordinates. Tile
/// geometry is fetched separately via `get_pyramid_info`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TiledMask {
    pub id: String,
    pub author: Option<String>,
    pub algorithm_run: Option<AlgorithmRun>,
    pub color_map: Option<ColorMap>,
}

impl TiledMask {
    pub fn from_graphql(value: &Value) -> Result<Self> {
        let algorithm_run = match wire::field(value, "algorithmRun")? {
            Value::Null => None,
            run => Some(AlgorithmRun::from_graphql(run)?),
        };
        let color_map = match wire::field(value, "colorMap")? {
            Value::Null => None,
            map => Some(ColorMap::from_graphql(map)?),
        };
        Ok(Self {
            id: wire::str_field(value, "id")?,
            author: wire::author_name(value)?,
            algorithm_run,
            color_map,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Tile {
    pub x: i64,
    pub y: i64,
    pub level: i64,
}

/// Everything a caller-side pyramid reader needs to address mask tiles.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TiledMaskPyramidInfo {
    pub tiles: Vec<Tile>,
    pub scale: f64,
    pub tiles_url: String,
    pub tile_size: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PointCloudStatistic {
    pub color: String,
    pub key: String,
    pub count: i64,
}

impl PointCloudStatistic {
    pub fn from_graphql(value: &Value) -> Result<Self> {
        let color = wire::field(value, "color")?;
        Ok(Self {
            color: wire::str_field(color, "name")?,
            key: wire::str_field(color, "value")?,
            count: wire::i64_field(value, "value")?,
        })
    }
}

/// One point of a sparse scored/colored coordinate set. The wire keys
/// are single letters (`v`, `r`, `s`) for payload size.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PointCloudPoint {
    pub x: i64,
    pub y: i64,
    pub color_key: i64,
    pub radius: Option<f64>,
    pub score: Option<i64>,
}

impl PointCloudPoint {
    pub fn from_graphql(value: &Value) -> Result<Self> {
        Ok(Self {
            x: wire::i64_field(value, "x")?,
            y: wire::i64_field(value, "y")?,
            color_key: wire::i64_field(value, "v")?,
            radius: wire::opt_f64_field(value, "r")?,
            score: wire::opt_i64_field(value, "s")?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PointCloud {
    pub id: String,
    pub statistics: Vec<PointCloudStatistic>,
    pub points: Vec<PointCloudPoint>,
}

impl PointCloud {
    pub fn from_graphql(value: &Value) -> Result<Self> {
        Ok(Self {
            id: wire::str_field(value, "id")?,
            statistics: wire::array_field(value, "statistics")?
                .iter()
                .map(PointCloudStatistic::from_graphql)
                .collect::<Result<Vec<_>>>()?,
            points: wire::array_field(value, "pointsList")?
                .iter()
                .map(PointCloudPoint::from_graphql)
                .collect::<Result<Vec<_>>>()?,
        })
    }
}
