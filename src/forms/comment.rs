use serde::{Deserialize, Serialize};

use crate::error::*;
use crate::models::comment::*;

use super::{QueryParams, Page, check_allowed};

pub const COMMENT_LIST_PARAMS: &[&str] = &["limit", "p"];

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentOut<T> {
  pub comment: T,
}

#[derive(Debug, Serialize)]
pub struct CommentList {
  pub comments: Vec<Comment>,
}

/// Validated `GET /api/articles/{id}/comments` query.
/// Comments are always newest first, only the page is selectable.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentListRequest {
  pub page: Page,
}

impl CommentListRequest {
  pub fn from_query(params: &QueryParams, default_limit: i64) -> Result<Self> {
    check_allowed(params, COMMENT_LIST_PARAMS)?;
    Ok(Self {
      page: Page::from_query(params, default_limit)?,
    })
  }
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct CreateComment {
  pub username: String,
  pub body: String,
}
