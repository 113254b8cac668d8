use serde_json::json;

use ccai_client::{queries, Api, Result};

use super::model::{Comment, Discussion};
use crate::wire;

/// Appends a comment to a discussion and returns the server's copy.
///
/// The local thread is updated in place so the snapshot stays in step
/// with the remote one.
pub async fn add_comment(api: &Api, discussion: &mut Discussion, text: &str) -> Result<Comment> {
    let data = api
        .query_graphql(
            &queries::MUTATION_COMMENT_CREATE,
            Some(json!({ "discussion": discussion.id, "text": text })),
        )
        .await?;
    let comment = Comment::from_graphql(wire::field(&data, "comment")?)?;
    discussion.comments.push(comment.clone());
    Ok(comment)
}
