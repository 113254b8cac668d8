use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use ccai_client::Result;

use crate::wire;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn from_graphql(value: &Value) -> Result<Self> {
        Ok(Self {
            id: wire::str_field(value, "id")?,
            text: wire::str_field(value, "text")?,
            author: wire::str_field(wire::field(value, "author")?, "name")?,
            created_at: wire::datetime_field(value, "createdAt")?,
        })
    }
}

/// Comment thread attached to an entity, newest comment last.
///
/// Embedded by composition in every node kind that carries one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Discussion {
    pub id: String,
    pub comments: Vec<Comment>,
}

impl Discussion {
    /// Decodes the `discussion { id comments { edges { node } } }` shape
    /// found on the parent value.
    pub fn from_parent(parent: &Value) -> Result<Self> {
        let discussion = wire::field(parent, "discussion")?;
        Ok(Self {
            id: wire::str_field(discussion, "id")?,
            comments: wire::edge_nodes(discussion, "comments")?
                .into_iter()
                .map(Comment::from_graphql)
                .collect::<Result<Vec<_>>>()?,
        })
    }
}
