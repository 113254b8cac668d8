use std::path::Path;

use serde_json::json;
use tokio::io::AsyncWriteExt;

use ccai_client::{queries, Api, ClientError, Result};

use super::model::{ChildrenQuery, FileNode, FilePage, SearchQuery, SimpleFile, StudyParams};
use crate::wire;

/// Fetches one node by id.
pub async fn get(api: &Api, id: &str) -> Result<FileNode> {
    let data = api
        .query_graphql(&queries::QUERY_FILE, Some(json!({ "id": id })))
        .await?;
    FileNode::from_graphql(&data)
}

/// Fetches the organization's file tree root.
pub async fn get_root(api: &Api) -> Result<FileNode> {
    let data = api.query_graphql(&queries::QUERY_ROOT_FILE, None).await?;
    FileNode::from_graphql(wire::field(&data, "fileRoot")?)
}

/// Lists one page of a folder's children. Pagination is forward-only:
/// pass the previous page's `end_cursor` as `after` to continue.
pub async fn children(api: &Api, id: &str, query: ChildrenQuery) -> Result<FilePage> {
    let data = api
        .query_graphql(
            &queries::QUERY_FOLDER,
            Some(json!({
                "id": id,
                "after": query.after,
                "page_size": query.page_size,
                "search": query.search,
                "prefix_search": query.prefix_search,
            })),
        )
        .await?;

    let connection = wire::field(&data, "children")?;
    let nodes = wire::edge_nodes(&data, "children")?
        .into_iter()
        .map(FileNode::from_graphql)
        .collect::<Result<Vec<_>>>()?;
    let page_info = wire::field(connection, "pageInfo")?;
    Ok(FilePage {
        nodes,
        end_cursor: wire::opt_str_field(page_info, "endCursor")?,
        has_next_page: wire::bool_field(page_info, "hasNextPage")?,
    })
}

/// Offset/limit search under a root node; `deep = false` restricts the
/// scope to immediate children.
pub async fn search(api: &Api, root_id: &str, query: SearchQuery) -> Result<Vec<FileNode>> {
    let data = api
        .query_graphql(
            &queries::QUERY_DEEP_SEARCH_FILES,
            Some(json!({
                "root_file_id": root_id,
                "deep": query.deep,
                "include_root": query.include_root,
                "search": query.search.unwrap_or_default(),
                "search_prefix": query.prefix_search.unwrap_or_default(),
                "offset": query.offset,
                "limit": query.limit,
                "type": query.file_type,
                "tagsValue": query.tags_value,
            })),
        )
        .await?;
    let edges = wire::array_field(&data, "edges")?;
    edges
        .iter()
        .map(|edge| FileNode::from_graphql(wire::field(edge, "node")?))
        .collect()
}

/// Renames a node and returns the fresh post-mutation snapshot.
pub async fn rename(api: &Api, id: &str, name: &str) -> Result<FileNode> {
    let data = api
        .query_graphql(
            &queries::MUTATION_RENAME_FILE,
            Some(json!({ "id": id, "name": name })),
        )
        .await?;
    mutated_file(&data)
}

/// Unlinks a node from one parent; other links stay intact.
pub async fn remove_from_parent(api: &Api, id: &str, parent: &str) -> Result<FileNode> {
    let data = api
        .query_graphql(
            &queries::MUTATION_DELETE_FILE,
            Some(json!({ "id": id, "parent": parent })),
        )
        .await?;
    mutated_file(&data)
}

/// Deletes a node from every parent it is linked into.
pub async fn delete_everywhere(api: &Api, id: &str) -> Result<FileNode> {
    let data = api
        .query_graphql(&queries::MUTATION_DELETE_FULL_FILE, Some(json!({ "id": id })))
        .await?;
    mutated_file(&data)
}

/// Links an existing node into an additional folder.
pub async fn link_into(api: &Api, id: &str, target: &str) -> Result<FileNode> {
    let data = api
        .query_graphql(
            &queries::MUTATION_LINK_FILE,
            Some(json!({ "id": id, "target": target })),
        )
        .await?;
    mutated_file(&data)
}

/// Moves a node from one folder to another.
pub async fn move_to(api: &Api, id: &str, parent: &str, target: &str) -> Result<FileNode> {
    let data = api
        .query_graphql(
            &queries::MUTATION_MOVE_FILE,
            Some(json!({ "id": id, "parent": parent, "target": target })),
        )
        .await?;
    mutated_file(&data)
}

/// Creates a subfolder and returns its node.
pub async fn add_subfolder(api: &Api, parent: &str, name: &str) -> Result<FileNode> {
    let data = api
        .query_graphql(
            &queries::MUTATION_ADD_SUBFOLDER,
            Some(json!({ "parent": parent, "name": name })),
        )
        .await?;
    mutated_file(&data)
}

/// Creates a workflow study under a study list.
pub async fn create_study(api: &Api, parent: &str, params: StudyParams) -> Result<FileNode> {
    let data = api
        .query_graphql(
            &queries::MUTATION_CREATE_STUDY,
            Some(json!({
                "parent": parent,
                "name": params.name,
                "status": params.status,
                "mode": params.mode,
                "deadline": params.deadline,
            })),
        )
        .await?;
    mutated_file(&data)
}

/// Streams a simple file's content to `target`.
///
/// The signed `download_url` is short-lived; refresh the node if the
/// transfer is rejected.
pub async fn download_simple_file(api: &Api, file: &SimpleFile, target: &Path) -> Result<()> {
    let mut response = api.http().get(&file.download_url).send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Transport {
            status: status.as_u16(),
            body,
        });
    }
    let mut out = tokio::fs::File::create(target).await?;
    while let Some(chunk) = response.chunk().await? {
        out.write_all(&chunk).await?;
    }
    out.flush().await?;
    tracing::info!("downloaded {} to {}", file.file_name, target.display());
    Ok(())
}

/// Every file mutation answers with `{ file: <FileBasic> }`; the decoded
/// node is the authoritative post-mutation state.
fn mutated_file(data: &serde_json::Value) -> Result<FileNode> {
    FileNode::from_graphql(wire::field(data, "file")?)
}
