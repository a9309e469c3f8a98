use log::*;

use actix_web::{get, post, patch, delete, web, HttpResponse};

use crate::error::*;
use crate::app::*;
use crate::forms::*;
use crate::db::DbService;

pub const DEFAULT_LIMIT: i64 = 10;

/// Get an article's comments, newest first
#[get("/articles/{article_id}/comments")]
async fn list(
  cfg: web::Data<CommentService>,
  db: web::Data<DbService>,
  article_id: web::Path<String>,
  query: web::Query<QueryParams>,
) -> Result<HttpResponse> {
  let article_id = parse_id(&article_id)?;
  let req = CommentListRequest::from_query(&query, cfg.default_limit)?;
  if !db.article.exists(article_id).await? {
    return Err(Error::ArticleNotFound);
  }
  let comments = db.comment.get_comments_by_article(article_id, &req).await?;
  Ok(HttpResponse::Ok().json(CommentList { comments }))
}

/// post a comment on an article
#[post("/articles/{article_id}/comments")]
async fn store_comment(
  db: web::Data<DbService>,
  article_id: web::Path<String>,
  comment: web::Json<CreateComment>,
) -> Result<HttpResponse> {
  let article_id = parse_id(&article_id)?;
  if !db.article.exists(article_id).await? {
    return Err(Error::ArticleNotFound);
  }
  let comment = db.comment.store(article_id, &comment).await?;
  info!("Comment - new comment: id={} article={}", comment.comment_id, article_id);
  Ok(HttpResponse::Created().json(CommentOut { comment }))
}

/// apply a vote delta to an existing comment
#[patch("/comments/{comment_id}")]
async fn update_comment(
  db: web::Data<DbService>,
  comment_id: web::Path<String>,
  votes: web::Json<IncVotes>,
) -> Result<HttpResponse> {
  let comment_id = parse_id(&comment_id)?;
  let comment = db.comment.update_votes(comment_id, votes.inc_votes).await?
    .ok_or(Error::CommentNotFound)?;
  Ok(HttpResponse::Ok().json(CommentOut { comment }))
}

/// delete an existing comment
#[delete("/comments/{comment_id}")]
async fn delete_comment(
  db: web::Data<DbService>,
  comment_id: web::Path<String>,
) -> Result<HttpResponse> {
  let comment_id = parse_id(&comment_id)?;
  if db.comment.delete(comment_id).await? == 0 {
    return Err(Error::CommentNotFound);
  }
  info!("Comment - deleted comment: id={}", comment_id);
  Ok(HttpResponse::NoContent().finish())
}

#[derive(Debug, Clone)]
pub struct CommentService {
  pub default_limit: i64,
}

impl Default for CommentService {
  fn default() -> Self {
    Self {
      default_limit: DEFAULT_LIMIT,
    }
  }
}

impl super::Service for CommentService {
  fn load_app_config(&mut self, config: &AppConfig, _prefix: &str) -> Result<()> {
    self.default_limit = config.get_int("comment.default_limit")?.unwrap_or(DEFAULT_LIMIT);
    if self.default_limit <= 0 {
      return Err(anyhow::anyhow!("comment.default_limit must be > 0").into());
    }
    Ok(())
  }

  fn api_config(&self, web: &mut web::ServiceConfig) {
    web
      .app_data(web::Data::new(self.clone()))
      .service(list)
      .service(store_comment)
      .service(update_comment)
      .service(delete_comment);
  }
}

pub fn new_factory() -> CommentService {
  Default::default()
}
