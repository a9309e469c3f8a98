use chrono::NaiveDateTime;

use serde::Serialize;

use crate::util::serialize_timestamp;

/// Full article, as returned by the single article endpoints.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Article {
  pub article_id: i32,
  pub author: String,
  pub title: String,
  pub body: String,
  pub topic: String,
  #[serde(serialize_with = "serialize_timestamp")]
  pub created_at: NaiveDateTime,
  pub votes: i32,
  pub article_img_url: String,
  pub comment_count: i32,
}

/// Listing row: everything but the body.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ArticleSummary {
  pub article_id: i32,
  pub author: String,
  pub title: String,
  pub topic: String,
  #[serde(serialize_with = "serialize_timestamp")]
  pub created_at: NaiveDateTime,
  pub votes: i32,
  pub article_img_url: String,
  pub comment_count: i32,
}
