// Re-export model types and service functions
pub mod model;
pub mod service;

pub use model::{
    Algorithm, AlgorithmRun, Annotation, Color, ColorMap, DziFile, Marker, PointCloud,
    PointCloudPoint, PointCloudStatistic, Rating, ShapeType, SlideProperties, Tile, TiledMask,
    TiledMaskPyramidInfo, UpdateAnnotationFields,
};
pub use service::*;
