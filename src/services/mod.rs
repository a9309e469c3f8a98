use log::*;

use std::collections::HashMap;

use actix_web::{web, HttpRequest, HttpResponse};

use crate::error::*;
use crate::app::*;
use crate::db::DbService;

mod endpoints;
mod topic;
mod article;
mod comment;
mod user;

type BoxService = Box<dyn Service>;

pub trait Service: ServiceClone + Send {
  /// Load Service config from AppConfig.
  fn load_app_config(&mut self, config: &AppConfig, prefix: &str) -> Result<()>;

  /// Setup Service endpoints.
  fn web_config(&self, _web: &mut web::ServiceConfig) {
  }

  fn api_config(&self, _web: &mut web::ServiceConfig) {
  }
}

pub trait ServiceClone {
  fn clone_box(&self) -> BoxService;
}

impl<T> ServiceClone for T
where
    T: 'static + Service + Clone,
{
  fn clone_box(&self) -> BoxService {
    Box::new(self.clone())
  }
}

impl Clone for BoxService {
  fn clone(&self) -> BoxService {
    self.clone_box()
  }
}

#[derive(Clone, Default)]
pub struct Services {
  db_url: String,
  services: Vec<BoxService>,
}

impl Services {
  pub fn new() -> Services {
    Default::default()
  }

  fn load_service(&mut self, name: &str, config: &AppConfig, prefix: &str) -> Result<BoxService> {
    let mut service: BoxService = match name {
      "Endpoints" => Box::new(endpoints::new_factory()),
      "Topic" => Box::new(topic::new_factory()),
      "Article" => Box::new(article::new_factory()),
      "Comment" => Box::new(comment::new_factory()),
      "User" => Box::new(user::new_factory()),
      _ => {
        return Err(anyhow::anyhow!("Unknown Service: {}", name).into());
      },
    };

    service.load_app_config(config, prefix)?;
    Ok(service)
  }

  /// Load Service config from AppConfig.
  pub fn load_app_config(&mut self, config: &AppConfig, prefix: &str) -> Result<()> {
    // DB config
    self.db_url = config.get_str("db.url")?
      .ok_or_else(|| anyhow::anyhow!("db.url must be set"))?;

    let mut loaded: HashMap<String, bool> = HashMap::new();
    let list = config.get_array(&format!("{}.services", prefix))?
      .ok_or_else(|| anyhow::anyhow!("missing list of services: {}.services", prefix))?;
    for name in list.into_iter() {
      let name = name.into_string()?;
      info!("Loading {}Service config", name);
      // check if it is loaded already.
      if loaded.contains_key(&name) {
        return Err(anyhow::anyhow!("can't load service multiple times: {}", name).into());
      }
      loaded.insert(name.clone(), true);
      // load service
      let service = self.load_service(&name, config, prefix)?;
      self.services.push(service);
    }
    Ok(())
  }

  /// Setup Service endpoints.
  pub fn web_config(&self, web: &mut web::ServiceConfig) {
    // Create DbService for worker.
    let db = DbService::new(&self.db_url);
    web.app_data(web::Data::new(db));

    // Malformed input never reaches the handlers.
    web
      .app_data(web::JsonConfig::default().error_handler(|err, _req| {
        debug!("Rejected json body: {}", err);
        Error::BadRequest.into()
      }))
      .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        debug!("Rejected query string: {}", err);
        Error::BadRequest.into()
      }))
      .app_data(web::PathConfig::default().error_handler(|err, _req| {
        debug!("Rejected path: {}", err);
        Error::BadRequest.into()
      }));

    for service in self.services.iter() {
      service.web_config(web);
    }
    web.service(
      web::scope("/api")
        .configure(|web| {
          for service in self.services.iter() {
            service.api_config(web);
          }
        })
    );
  }
}

/// Fallback for any request no service handled.
pub async fn path_not_found(req: HttpRequest) -> Result<HttpResponse> {
  debug!("Path not found: {} {}", req.method(), req.path());
  Err(Error::PathNotFound)
}

pub fn config_services(config: &AppConfig, prefix: &str) -> Result<Services> {
  let mut services = Services::new();
  services.load_app_config(config, prefix)?;
  Ok(services)
}
