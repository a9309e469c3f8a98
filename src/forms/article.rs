use serde::{Deserialize, Serialize};

use crate::error::*;
use crate::models::ArticleSummary;
use crate::db::ARTICLE_COLUMNS;

use super::{QueryParams, Page, check_allowed};

pub const ARTICLE_LIST_PARAMS: &[&str] = &["topic", "sort_by", "order", "limit", "p"];

pub const DEFAULT_SORT_BY: &str = "created_at";

#[derive(Debug, Serialize, Deserialize)]
pub struct ArticleOut<T> {
  pub article: T,
}

#[derive(Debug, Serialize)]
pub struct ArticleList {
  pub articles: Vec<ArticleSummary>,
  pub total_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
  Asc,
  Desc,
}

impl Default for SortOrder {
  fn default() -> Self {
    SortOrder::Asc
  }
}

impl SortOrder {
  pub fn parse(val: &str) -> Result<Self> {
    if val.eq_ignore_ascii_case("asc") {
      Ok(SortOrder::Asc)
    } else if val.eq_ignore_ascii_case("desc") {
      Ok(SortOrder::Desc)
    } else {
      Err(Error::OrderNotValid)
    }
  }

  pub fn as_sql(&self) -> &'static str {
    match self {
      SortOrder::Asc => "ASC",
      SortOrder::Desc => "DESC",
    }
  }
}

/// Validated `GET /api/articles` query.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleListRequest {
  pub topic: Option<String>,
  pub sort_by: String,
  pub order: SortOrder,
  pub page: Page,
}

impl ArticleListRequest {
  pub fn from_query(params: &QueryParams, default_limit: i64) -> Result<Self> {
    check_allowed(params, ARTICLE_LIST_PARAMS)?;

    let sort_by = match params.get("sort_by") {
      Some(col) if ARTICLE_COLUMNS.has_column(col) => col.clone(),
      Some(_) => return Err(Error::ColumnDoesNotExist),
      None => DEFAULT_SORT_BY.to_string(),
    };
    let order = match params.get("order") {
      Some(order) => SortOrder::parse(order)?,
      None => SortOrder::default(),
    };
    let page = Page::from_query(params, default_limit)?;

    Ok(Self {
      // `?topic=` is no filter at all.
      topic: params.get("topic").filter(|topic| !topic.is_empty()).cloned(),
      sort_by,
      order,
      page,
    })
  }
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct CreateArticle {
  pub author: String,
  pub title: String,
  pub body: String,
  pub topic: String,
  #[serde(default)]
  pub article_img_url: Option<String>,
}
