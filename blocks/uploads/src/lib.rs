//! Bulk upload flows: container negotiation, presigned direct
//! transfers, and the creation mutations layered on top (slides from
//! local files, mask rasters).

pub mod model;
pub mod service;

pub use model::{
    ColorMapRef, ContainerRef, FileRef, MaskUploadOptions, PresignUpload, SlideCreateOptions,
    UploadSource,
};
pub use service::*;
