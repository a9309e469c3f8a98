use actix_web::{get, web, HttpResponse};
use serde_json::{json, Value as JsonValue};

use crate::error::*;
use crate::app::*;

/// Catalog of every endpoint this API serves.
pub const ENDPOINTS_JSON: &str = include_str!("../../endpoints.json");

/// Describe the API.
#[get("/api")]
async fn list() -> Result<HttpResponse> {
  let endpoints: JsonValue = serde_json::from_str(ENDPOINTS_JSON)?;
  Ok(HttpResponse::Ok().json(json!({ "endpoints": endpoints })))
}

#[derive(Debug, Clone, Default)]
pub struct EndpointsService {
}

impl super::Service for EndpointsService {
  fn load_app_config(&mut self, _config: &AppConfig, _prefix: &str) -> Result<()> {
    Ok(())
  }

  fn web_config(&self, web: &mut web::ServiceConfig) {
    web.service(list);
  }
}

pub fn new_factory() -> EndpointsService {
  Default::default()
}
