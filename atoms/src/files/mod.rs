// Re-export model types and service functions
pub mod model;
pub mod service;

pub use model::{
    ChildrenQuery, DicomStudyFile, DicomwebAccess, FileCommon, FileNode, FilePage, FormFile,
    FormRef, PathologySlide, SearchQuery, SimpleFile, Study, StudyList, StudyParams, Tag,
};
pub use service::*;
