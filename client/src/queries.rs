//! The fixed catalog of GraphQL documents the client sends.
//!
//! Documents are composed from shared fragments once at first use. The
//! declared variable names are the contract surface the service modules
//! build their variable maps against.

use once_cell::sync::Lazy;

const COMMENT_FRAGMENT: &str = r#"
fragment Comment on CommentNode {
    id
    text
    createdAt
    author {
        name
    }
}
"#;

static DISCUSSION_FRAGMENT: Lazy<String> = Lazy::new(|| {
    format!(
        r#"
fragment Discussion on DiscussionNode {{
    id
    comments {{
        edges {{
            node {{
                ...Comment
            }}
        }}
    }}
}}
{}"#,
        COMMENT_FRAGMENT
    )
});

static ANNOTATIONS_FRAGMENT: Lazy<String> = Lazy::new(|| {
    format!(
        r#"
fragment Annotations on AnnotationNode {{
    id
    number
    author {{
        name
    }}
    shapeType
    shapeData
    color
    label
    isLabelVisible
    slideId
    pointType
    createdAt
    discussion {{
        ...Discussion
    }}
}}
{}"#,
        DISCUSSION_FRAGMENT.as_str()
    )
});

static FILE_FRAGMENT: Lazy<String> = Lazy::new(|| {
    format!(
        r#"
fragment FileBasic on FileInterface {{
    id
    name
    __typename
    createdAt
    tags {{
        id
        value
    }}

    discussion {{
        ...Discussion
    }}

    ... on SimpleFileNode {{
        fileName
        accessUrl
    }}

    ... on PathologySlideNode {{
        isReady
        thumbnailUrl
        dziUrl
        slideProperties {{
            mpp
            magnification
        }}
        pointClouds {{
            edges {{
                node {{
                    id
                    statistics {{
                        color {{
                            value
                            name
                        }}
                        value
                    }}
                    pointsList
                }}
            }}
        }}
    }}

    ... on DicomStudyFileNode {{
        study: dicomStudy {{
            accessToken
            dicomwebUrl
            studyInstanceUid
        }}
    }}

    ... on FormFileNode {{
        form {{
            id
        }}
    }}

    ... on StudyInterface {{
        status {{
            name
        }}
        assignedTo {{
            entity {{
                name
            }}
        }}
    }}
}}
{}"#,
        DISCUSSION_FRAGMENT.as_str()
    )
});

static FOLDER_FRAGMENT: Lazy<String> = Lazy::new(|| {
    format!(
        r#"
fragment FileChildren on FileInterface {{
    children(
        after: $after,
        first: $page_size,
        name_Istartswith: $search,
        name_Icontains: $prefix_search
    ) {{
        edges {{
            node {{
                ...FileBasic
            }}
        }}
        pageInfo {{
            endCursor
            hasNextPage
        }}
    }}
}}
{}"#,
        FILE_FRAGMENT.as_str()
    )
});

static ALGORITHM_RUN_FRAGMENT: Lazy<String> = Lazy::new(|| {
    format!(
        r#"
fragment AlgorithmRun on AlgorithmRunNode {{
    id
    algorithm {{
        id
        name
    }}
    discussion {{
        ...Discussion
    }}
    ratings {{
        score
        author {{
            name
        }}
    }}
}}
{}"#,
        DISCUSSION_FRAGMENT.as_str()
    )
});

const COLOR_MAP_FRAGMENT: &str = r#"
fragment ColorMap on ColorMapNode {
    id
    name
    codename
    colors {
        edges {
            node {
                name
                key
                value
            }
        }
    }
}
"#;

static TILED_MASK_FRAGMENT: Lazy<String> = Lazy::new(|| {
    format!(
        r#"
fragment TiledMask on TiledMaskNode {{
    id
    author {{
        name
    }}
    colorMap {{
        ...ColorMap
    }}
    algorithmRun {{
        ...AlgorithmRun
    }}
}}
{}{}"#,
        COLOR_MAP_FRAGMENT,
        ALGORITHM_RUN_FRAGMENT.as_str()
    )
});

pub static QUERY_ENTITY: Lazy<String> = Lazy::new(|| {
    r#"
query GetCurrentEntity {
    entity {
        id
        name
        organization {
            name
        }
    }
}
"#
    .to_string()
});

pub static QUERY_ROOT_FILE: Lazy<String> = Lazy::new(|| {
    format!(
        r#"
query GetRootFile {{
    entity {{
        fileRoot {{
            ...FileBasic
        }}
    }}
}}
{}"#,
        FILE_FRAGMENT.as_str()
    )
});

pub static QUERY_FILE: Lazy<String> = Lazy::new(|| {
    format!(
        r#"
query GetFile($id: ID!) {{
    file(id: $id) {{
        ...FileBasic
    }}
}}
{}"#,
        FILE_FRAGMENT.as_str()
    )
});

pub static QUERY_FOLDER: Lazy<String> = Lazy::new(|| {
    format!(
        r#"
query FileChildren(
    $id: ID!, $after: String, $page_size: Int,
    $search: String, $prefix_search: String
) {{
    file(id: $id) {{
        ...FileBasic
        ...FileChildren
    }}
}}
{}"#,
        FOLDER_FRAGMENT.as_str()
    )
});

pub static QUERY_DEEP_SEARCH_FILES: Lazy<String> = Lazy::new(|| {
    format!(
        r#"
query SearchFiles(
    $root_file_id: ID!,
    $deep: Boolean = false,
    $include_root: Boolean = false,
    $search: String = "",
    $search_prefix: String = "",
    $offset: Int = 0,
    $limit: Int = 100,
    $type: String
    $tagsValue: String
) {{
    searchFiles(
        rootFileId: $root_file_id,
        deep: $deep,
        includeRoot: $include_root,
        name_Icontains: $search,
        name_Istartswith: $search_prefix,
        offset: $offset,
        first: $limit,
        type: $type
        tagsValue: $tagsValue
    ) {{
        edges {{
            node {{
                ...FileBasic
            }}
        }}
    }}
}}
{}"#,
        FILE_FRAGMENT.as_str()
    )
});

pub static QUERY_PATHOLOGY_SLIDE_DOWNLOAD: Lazy<String> = Lazy::new(|| {
    r#"
query GetPathologySlideDownload($id: ID!) {
    file(id: $id) {
        ... on PathologySlideNode {
            downloadUrl
        }
    }
}
"#
    .to_string()
});

pub static QUERY_PATHOLOGY_SLIDE_MASKS: Lazy<String> = Lazy::new(|| {
    format!(
        r#"
query GetPathologySlideMasks($id: ID!) {{
    file(id: $id) {{
        ... on PathologySlideNode {{
            tiledMasks {{
                edges {{
                    node {{
                        ...TiledMask
                    }}
                }}
            }}
        }}
    }}
}}
{}"#,
        TILED_MASK_FRAGMENT.as_str()
    )
});

// deprecated on the server, still served for old slides
pub static QUERY_PATHOLOGY_SLIDE_MARKERS: Lazy<String> = Lazy::new(|| {
    format!(
        r#"
query GetPathologySlideMarkers($id: ID!) {{
    file(id: $id) {{
        ... on PathologySlideNode {{
            markers {{
                edges {{
                    node {{
                        id
                        x
                        y
                        rotation
                        width
                        height
                        author {{
                            name
                        }}
                        number
                        discussion {{
                            ...Discussion
                        }}
                    }}
                }}
            }}
        }}
    }}
}}
{}"#,
        DISCUSSION_FRAGMENT.as_str()
    )
});

pub static QUERY_PATHOLOGY_SLIDE_ANNOTATIONS: Lazy<String> = Lazy::new(|| {
    format!(
        r#"
query GetPathologySlideAnnotations($id: ID!) {{
    file(id: $id) {{
        ... on PathologySlideNode {{
            annotations {{
                edges {{
                    node {{
                        ...Annotations
                    }}
                }}
            }}
        }}
    }}
}}
{}"#,
        ANNOTATIONS_FRAGMENT.as_str()
    )
});

pub static QUERY_TILED_MASK_TILES: Lazy<String> = Lazy::new(|| {
    r#"
query GetTiledMaskTiles($id: ID!) {
    tiledMask(id: $id) {
        tileSize
        tilesUrl
        scale
        tiles {
            x
            y
            level
        }
    }
}
"#
    .to_string()
});

pub static QUERY_ALL_ALGORITHMS: Lazy<String> = Lazy::new(|| {
    r#"
query GetAllAlgorithms {
    allAlgorithms {
        edges {
            node {
                id
                name
            }
        }
    }
}
"#
    .to_string()
});

pub static QUERY_ALL_COLOR_MAPS: Lazy<String> = Lazy::new(|| {
    format!(
        r#"
query GetAllColorMaps {{
    allColorMaps {{
        edges {{
            node {{
                ...ColorMap
            }}
        }}
    }}
}}
{}"#,
        COLOR_MAP_FRAGMENT
    )
});

pub static MUTATION_RENAME_FILE: Lazy<String> = Lazy::new(|| {
    format!(
        r#"
mutation RenameFile($id: ID!, $name: String!) {{
    fileUpdate(input: {{
        id: $id,
        name: $name
    }}) {{
        file {{
            ...FileBasic
        }}
    }}
}}
{}"#,
        FILE_FRAGMENT.as_str()
    )
});

pub static MUTATION_DELETE_FILE: Lazy<String> = Lazy::new(|| {
    format!(
        r#"
mutation DeleteFile($id: ID!, $parent: ID!) {{
    fileDelete(input: {{
        id: $id,
        parent: $parent
    }}) {{
        file {{
            ...FileBasic
        }}
    }}
}}
{}"#,
        FILE_FRAGMENT.as_str()
    )
});

pub static MUTATION_DELETE_FULL_FILE: Lazy<String> = Lazy::new(|| {
    format!(
        r#"
mutation DeleteFullFile($id: ID!) {{
    fileDeleteFull(input: {{
        id: $id
    }}) {{
        file {{
            ...FileBasic
        }}
    }}
}}
{}"#,
        FILE_FRAGMENT.as_str()
    )
});

pub static MUTATION_LINK_FILE: Lazy<String> = Lazy::new(|| {
    format!(
        r#"
mutation LinkFile($id: ID!, $target: ID!) {{
    fileLink(input: {{
        id: $id,
        target: $target
    }}) {{
        file {{
            ...FileBasic
        }}
    }}
}}
{}"#,
        FILE_FRAGMENT.as_str()
    )
});

pub static MUTATION_MOVE_FILE: Lazy<String> = Lazy::new(|| {
    format!(
        r#"
mutation MoveFile($id: ID!, $parent: ID!, $target: ID!) {{
    fileMove(input: {{
        id: $id,
        parent: $parent,
        target: $target
    }}) {{
        file {{
            ...FileBasic
        }}
    }}
}}
{}"#,
        FILE_FRAGMENT.as_str()
    )
});

pub static MUTATION_ADD_SUBFOLDER: Lazy<String> = Lazy::new(|| {
    format!(
        r#"
mutation AddSubfolder($parent: ID!, $name: String!) {{
    folderCreate(input: {{
        parent: $parent,
        name: $name
    }}) {{
        file {{
            ...FileBasic
        }}
    }}
}}
{}"#,
        FILE_FRAGMENT.as_str()
    )
});

pub static MUTATION_CREATE_STUDY: Lazy<String> = Lazy::new(|| {
    format!(
        r#"
mutation CreateStudy($parent: ID!, $name: String, $status: ID, $mode: ID, $deadline: DateTime) {{
    studyCreate(input: {{
        parent: $parent,
        name: $name,
        status: $status,
        mode: $mode,
        deadline: $deadline
    }}) {{
        file {{
            ...FileBasic
        }}
    }}
}}
{}"#,
        FILE_FRAGMENT.as_str()
    )
});

pub static MUTATION_RUN_ALGORITHM: Lazy<String> = Lazy::new(|| {
    format!(
        r#"
mutation RunAlgorithm($slide: ID!, $algorithm: ID!, $roi: ID) {{
    algorithmRun(input: {{
        slide: $slide,
        algorithm: $algorithm,
        roi: $roi
    }}) {{
        algorithmRun {{
            ...AlgorithmRun
        }}
    }}
}}
{}"#,
        ALGORITHM_RUN_FRAGMENT.as_str()
    )
});

pub static MUTATION_UPDATE_ANNOTATION: Lazy<String> = Lazy::new(|| {
    format!(
        r#"
mutation AnnotationUpdateMutation(
    $id: ID!,
    $shapeData: [Float!],
    $color: ID,
    $label: String,
    $pointType: PointType,
    $isLabelVisible: Boolean
) {{
    annotationUpdate(input: {{
        id: $id,
        shapeData: $shapeData,
        color: $color,
        label: $label,
        pointType: $pointType,
        isLabelVisible: $isLabelVisible
    }}) {{
        annotation {{
            ...Annotations
        }}
    }}
}}
{}"#,
        ANNOTATIONS_FRAGMENT.as_str()
    )
});

pub static MUTATION_IMPORT_ANNOTATIONS_FROM_GEOJSON: Lazy<String> = Lazy::new(|| {
    format!(
        r#"
mutation ImportAnnotationsFromGeojson($id: ID!, $geojson: String!) {{
    importAnnotationsFromGeojson(input: {{
        id: $id,
        geojson: $geojson
    }}) {{
        file {{
            id
            name
        }}
        annotations {{
            ...Annotations
        }}
    }}
}}
{}"#,
        ANNOTATIONS_FRAGMENT.as_str()
    )
});

pub static MUTATION_COMMENT_CREATE: Lazy<String> = Lazy::new(|| {
    format!(
        r#"
mutation CommentCreate($discussion: ID!, $text: String!) {{
    commentCreate(input: {{
        discussion: $discussion,
        text: $text
    }}) {{
        comment {{
            ...Comment
        }}
    }}
}}
{}"#,
        COMMENT_FRAGMENT
    )
});

pub static MUTATION_UPLOAD_CONTAINER: Lazy<String> = Lazy::new(|| {
    r#"
mutation UploadContainer($files: [String!]!) {
    uploadContainerCreate(input: { files: $files }) {
        container {
            id
        }
        presignUpload {
            files {
                url
                method
                data
                headers
            }
        }
    }
}
"#
    .to_string()
});

pub static MUTATION_PATHOLOGY_SLIDE_CREATE: Lazy<String> = Lazy::new(|| {
    r#"
mutation PathologySlideCreate($container: ID!, $parent: ID!, $name: String!,
 $isCollage: Boolean = false, $anonymize: Boolean = false, $filters: [String!] = []) {
    pathologySlideCreate(input: {
        container: $container,
        parent: $parent,
        name: $name,
        isCollage: $isCollage,
        anonymize: $anonymize,
        filters: $filters
    }) {
        file {
            id
            name
        }
    }
}
"#
    .to_string()
});

pub static MUTATION_TILED_MASK_CREATE: Lazy<String> = Lazy::new(|| {
    format!(
        r#"
mutation TiledMaskCreate(
    $slide: ID!,
    $colorMapId: ID,
    $colorMapCodename: String,
    $uploadsContainer: ID,
    $tileSize: Int,
    $scale: Float,
    $maskType: UploadedMaskType
) {{
    tiledMaskCreate(input: {{
        slide: $slide,
        colorMapId: $colorMapId,
        colorMapCodename: $colorMapCodename,
        uploadsContainer: $uploadsContainer,
        tileSize: $tileSize,
        scale: $scale,
        maskType: $maskType
    }}) {{
        tiledMask {{
            ...TiledMask
        }}
    }}
}}
{}"#,
        TILED_MASK_FRAGMENT.as_str()
    )
});
