use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use ccai_client::Result;

use crate::discussion::Discussion;
use crate::patho::model::{DziFile, PointCloud, SlideProperties};
use crate::wire;

/// Label attached to a file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Tag {
    pub id: String,
    pub value: String,
}

impl Tag {
    pub fn from_graphql(value: &Value) -> Result<Self> {
        Ok(Self {
            id: wire::str_field(value, "id")?,
            value: wire::str_field(value, "value")?,
        })
    }
}

/// Fields every node in the file tree carries.
///
/// A decoded node is a snapshot: any later mutation invalidates it
/// unless the mutation's own response is decoded in its place.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FileCommon {
    pub id: String,
    pub name: String,
    pub type_tag: String,
    pub created_at: DateTime<Utc>,
    pub tags: Vec<Tag>,
    pub discussion: Discussion,
}

impl FileCommon {
    pub fn from_graphql(value: &Value) -> Result<Self> {
        Ok(Self {
            id: wire::str_field(value, "id")?,
            name: wire::str_field(value, "name")?,
            type_tag: wire::str_field(value, "__typename")?,
            created_at: wire::datetime_field(value, "createdAt")?,
            tags: wire::array_field(value, "tags")?
                .iter()
                .map(Tag::from_graphql)
                .collect::<Result<Vec<_>>>()?,
            discussion: Discussion::from_parent(value)?,
        })
    }
}

/// Plain downloadable file.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SimpleFile {
    pub common: FileCommon,
    pub file_name: String,
    /// Short-lived signed URL; refresh the node when it expires.
    pub download_url: String,
}

impl SimpleFile {
    pub fn from_graphql(value: &Value) -> Result<Self> {
        Ok(Self {
            common: FileCommon::from_graphql(value)?,
            file_name: wire::str_field(value, "fileName")?,
            download_url: wire::str_field(value, "accessUrl")?,
        })
    }
}

/// Imaging slide with a tiled pyramid, annotation overlays and point
/// clouds. `is_ready` reflects the remote processing pipeline; the
/// client only polls it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PathologySlide {
    pub common: FileCommon,
    pub is_ready: bool,
    pub thumbnail_url: Option<String>,
    pub dzi_url: Option<String>,
    pub slide_properties: Option<SlideProperties>,
    pub point_clouds: Vec<PointCloud>,
    #[serde(skip)]
    dzi_memo: OnceCell<DziFile>,
}

impl PathologySlide {
    pub fn from_graphql(value: &Value) -> Result<Self> {
        let slide_properties = match wire::field(value, "slideProperties")? {
            Value::Null => None,
            properties => Some(SlideProperties {
                mpp: wire::f64_field(properties, "mpp")?,
                magnification: wire::f64_field(properties, "magnification")?,
            }),
        };
        Ok(Self {
            common: FileCommon::from_graphql(value)?,
            is_ready: wire::bool_field(value, "isReady")?,
            thumbnail_url: wire::opt_str_field(value, "thumbnailUrl")?,
            dzi_url: wire::opt_str_field(value, "dziUrl")?,
            slide_properties,
            point_clouds: wire::edge_nodes(value, "pointClouds")?
                .into_iter()
                .map(PointCloud::from_graphql)
                .collect::<Result<Vec<_>>>()?,
            dzi_memo: OnceCell::new(),
        })
    }

    /// Handle for the caller-side pyramid library, computed once from
    /// the decoded URL and resolution metadata. `None` until the slide
    /// finished processing.
    pub fn dzi_file(&self) -> Option<&DziFile> {
        let url = self.dzi_url.as_deref()?;
        let properties = self.slide_properties.as_ref()?;
        Some(self.dzi_memo.get_or_init(|| DziFile {
            url: url.to_string(),
            properties: properties.clone(),
        }))
    }
}

/// Connection parameters for the external DICOMweb collaborator.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DicomwebAccess {
    pub url: String,
    pub authorization: String,
}

/// DICOM study; downloads go through a DICOMweb client, not this crate.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DicomStudyFile {
    pub common: FileCommon,
    pub access_token: String,
    pub dicomweb_url: String,
    pub study_instance_uid: String,
}

impl DicomStudyFile {
    pub fn from_graphql(value: &Value) -> Result<Self> {
        let study = wire::field(value, "study")?;
        Ok(Self {
            common: FileCommon::from_graphql(value)?,
            access_token: wire::str_field(study, "accessToken")?,
            dicomweb_url: wire::str_field(study, "dicomwebUrl")?,
            study_instance_uid: wire::str_field(study, "studyInstanceUid")?,
        })
    }

    pub fn dicomweb_access(&self) -> DicomwebAccess {
        DicomwebAccess {
            url: self.dicomweb_url.clone(),
            authorization: format!("Bearer {}", self.access_token),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FormRef {
    pub id: String,
}

/// Structured form node.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FormFile {
    pub common: FileCommon,
    pub form: FormRef,
}

impl FormFile {
    pub fn from_graphql(value: &Value) -> Result<Self> {
        Ok(Self {
            common: FileCommon::from_graphql(value)?,
            form: FormRef {
                id: wire::str_field(wire::field(value, "form")?, "id")?,
            },
        })
    }
}

/// Workflow node; study lists additionally own child studies.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Study {
    pub common: FileCommon,
    pub status: Option<String>,
    pub assigned_to: Option<String>,
}

impl Study {
    pub fn from_graphql(value: &Value) -> Result<Self> {
        let (status, assigned_to) = study_fields(value)?;
        Ok(Self {
            common: FileCommon::from_graphql(value)?,
            status,
            assigned_to,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StudyList {
    pub common: FileCommon,
    pub status: Option<String>,
    pub assigned_to: Option<String>,
}

impl StudyList {
    pub fn from_graphql(value: &Value) -> Result<Self> {
        let (status, assigned_to) = study_fields(value)?;
        Ok(Self {
            common: FileCommon::from_graphql(value)?,
            status,
            assigned_to,
        })
    }
}

fn study_fields(value: &Value) -> Result<(Option<String>, Option<String>)> {
    let status = match wire::field(value, "status")? {
        Value::Null => None,
        status => Some(wire::str_field(status, "name")?),
    };
    let assigned_to = match wire::field(value, "assignedTo")? {
        Value::Null => None,
        assigned => Some(wire::str_field(wire::field(assigned, "entity")?, "name")?),
    };
    Ok((status, assigned_to))
}

/// The closed set of node variants the server can answer with.
///
/// Decoding dispatches on `__typename`; unknown tags land in
/// [`FileNode::Generic`] with the base fields only.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum FileNode {
    Simple(SimpleFile),
    PathologySlide(PathologySlide),
    DicomStudy(DicomStudyFile),
    Form(FormFile),
    Study(Study),
    StudyList(StudyList),
    Generic(FileCommon),
}

impl FileNode {
    pub fn from_graphql(value: &Value) -> Result<Self> {
        let type_tag = wire::str_field(value, "__typename")?;
        match type_tag.as_str() {
            "SimpleFileNode" => Ok(Self::Simple(SimpleFile::from_graphql(value)?)),
            "PathologySlideNode" => Ok(Self::PathologySlide(PathologySlide::from_graphql(value)?)),
            "DicomStudyFileNode" => Ok(Self::DicomStudy(DicomStudyFile::from_graphql(value)?)),
            "FormFileNode" => Ok(Self::Form(FormFile::from_graphql(value)?)),
            "StudyNode" => Ok(Self::Study(Study::from_graphql(value)?)),
            "StudyListNode" => Ok(Self::StudyList(StudyList::from_graphql(value)?)),
            _ => Ok(Self::Generic(FileCommon::from_graphql(value)?)),
        }
    }

    pub fn common(&self) -> &FileCommon {
        match self {
            Self::Simple(file) => &file.common,
            Self::PathologySlide(slide) => &slide.common,
            Self::DicomStudy(study) => &study.common,
            Self::Form(form) => &form.common,
            Self::Study(study) => &study.common,
            Self::StudyList(list) => &list.common,
            Self::Generic(common) => common,
        }
    }

    pub fn id(&self) -> &str {
        &self.common().id
    }

    pub fn name(&self) -> &str {
        &self.common().name
    }

    pub fn type_tag(&self) -> &str {
        &self.common().type_tag
    }
}

/// One page of a cursor-paginated children listing. Feed `end_cursor`
/// back as `after` to fetch the next page.
#[derive(Debug, Clone)]
pub struct FilePage {
    pub nodes: Vec<FileNode>,
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

/// Filters for one `children` page.
#[derive(Debug, Clone, Default)]
pub struct ChildrenQuery {
    pub search: Option<String>,
    pub prefix_search: Option<String>,
    pub after: Option<String>,
    pub page_size: Option<i64>,
}

/// Filters for a recursive (or one-level, `deep = false`) search.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub deep: bool,
    pub include_root: bool,
    pub search: Option<String>,
    pub prefix_search: Option<String>,
    pub offset: i64,
    pub limit: i64,
    pub file_type: Option<String>,
    pub tags_value: Option<String>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            deep: false,
            include_root: false,
            search: None,
            prefix_search: None,
            offset: 0,
            limit: 100,
            file_type: None,
            tags_value: None,
        }
    }
}

/// Parameters for creating a workflow study under a study list.
#[derive(Debug, Clone, Default)]
pub struct StudyParams {
    pub name: Option<String>,
    pub status: Option<String>,
    pub mode: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
}
