use log::*;

use actix_web::{get, post, patch, delete, web, HttpResponse};

use crate::error::*;
use crate::app::*;
use crate::forms::*;
use crate::db::DbService;

pub const DEFAULT_LIMIT: i64 = 10;
pub const DEFAULT_IMG_URL: &str =
  "https://images.pexels.com/photos/97050/pexels-photo-97050.jpeg?w=700&h=700";

/// Get list of articles
#[get("/articles")]
async fn list(
  cfg: web::Data<ArticleService>,
  db: web::Data<DbService>,
  query: web::Query<QueryParams>,
) -> Result<HttpResponse> {
  let req = ArticleListRequest::from_query(&query, cfg.default_limit)?;
  debug!("Article - list: {:?}", req);
  let articles = db.article.get_articles(&req).await?;
  Ok(HttpResponse::Ok().json(articles))
}

/// get article by id
#[get("/articles/{article_id}")]
async fn get_article(
  db: web::Data<DbService>,
  article_id: web::Path<String>,
) -> Result<HttpResponse> {
  let article_id = parse_id(&article_id)?;
  let article = db.article.get_by_id(article_id).await?
    .ok_or(Error::ArticleNotFound)?;
  Ok(HttpResponse::Ok().json(ArticleOut { article }))
}

/// post new article
#[post("/articles")]
async fn store_article(
  cfg: web::Data<ArticleService>,
  db: web::Data<DbService>,
  article: web::Json<CreateArticle>,
) -> Result<HttpResponse> {
  let article = db.article.store(&article, &cfg.default_img_url).await?;
  info!("Article - new article: id={}", article.article_id);
  Ok(HttpResponse::Created().json(ArticleOut { article }))
}

/// apply a vote delta to an existing article
#[patch("/articles/{article_id}")]
async fn update_article(
  db: web::Data<DbService>,
  article_id: web::Path<String>,
  votes: web::Json<IncVotes>,
) -> Result<HttpResponse> {
  let article_id = parse_id(&article_id)?;
  let article = db.article.update_votes(article_id, votes.inc_votes).await?
    .ok_or(Error::ArticleNotFound)?;
  Ok(HttpResponse::Ok().json(ArticleOut { article }))
}

/// delete an existing article
#[delete("/articles/{article_id}")]
async fn delete_article(
  db: web::Data<DbService>,
  article_id: web::Path<String>,
) -> Result<HttpResponse> {
  let article_id = parse_id(&article_id)?;
  if db.article.delete(article_id).await? == 0 {
    return Err(Error::ArticleNotFound);
  }
  info!("Article - deleted article: id={}", article_id);
  Ok(HttpResponse::NoContent().finish())
}

#[derive(Debug, Clone)]
pub struct ArticleService {
  pub default_limit: i64,
  pub default_img_url: String,
}

impl Default for ArticleService {
  fn default() -> Self {
    Self {
      default_limit: DEFAULT_LIMIT,
      default_img_url: DEFAULT_IMG_URL.to_string(),
    }
  }
}

impl super::Service for ArticleService {
  fn load_app_config(&mut self, config: &AppConfig, _prefix: &str) -> Result<()> {
    self.default_limit = config.get_int("article.default_limit")?.unwrap_or(DEFAULT_LIMIT);
    if self.default_limit <= 0 {
      return Err(anyhow::anyhow!("article.default_limit must be > 0").into());
    }
    if let Some(url) = config.get_str("article.default_img_url")? {
      self.default_img_url = url;
    }
    Ok(())
  }

  fn api_config(&self, web: &mut web::ServiceConfig) {
    web
      .app_data(web::Data::new(self.clone()))
      .service(list)
      .service(get_article)
      .service(store_article)
      .service(update_article)
      .service(delete_article);
  }
}

pub fn new_factory() -> ArticleService {
  Default::default()
}
