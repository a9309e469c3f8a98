use chrono::NaiveDateTime;

use serde::Serialize;

use crate::util::serialize_timestamp;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Comment {
  pub comment_id: i32,
  pub article_id: i32,
  pub author: String,
  pub body: String,
  pub votes: i32,
  #[serde(serialize_with = "serialize_timestamp")]
  pub created_at: NaiveDateTime,
}
