use log::*;

use actix_web::{get, post, web, HttpResponse};

use crate::error::*;
use crate::app::*;
use crate::forms::*;
use crate::db::DbService;

/// Get list of topics
#[get("/topics")]
async fn list(
  db: web::Data<DbService>,
) -> Result<HttpResponse> {
  let topics = db.topic.get_topics().await?;
  Ok(HttpResponse::Ok().json(topics))
}

/// post new topic
#[post("/topics")]
async fn store_topic(
  db: web::Data<DbService>,
  topic: web::Json<CreateTopic>,
) -> Result<HttpResponse> {
  let topic = db.topic.store(&topic).await?;
  info!("Topic - new topic: {:?}", topic.slug);
  Ok(HttpResponse::Created().json(TopicOut { topic }))
}

#[derive(Debug, Clone, Default)]
pub struct TopicService {
}

impl super::Service for TopicService {
  fn load_app_config(&mut self, _config: &AppConfig, _prefix: &str) -> Result<()> {
    Ok(())
  }

  fn api_config(&self, web: &mut web::ServiceConfig) {
    web
      .service(list)
      .service(store_topic);
  }
}

pub fn new_factory() -> TopicService {
  Default::default()
}
