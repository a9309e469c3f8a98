use actix_web::{get, web, HttpResponse};

use crate::error::*;
use crate::app::*;
use crate::forms::*;
use crate::db::DbService;

/// Get list of users
#[get("/users")]
async fn list(
  db: web::Data<DbService>,
) -> Result<HttpResponse> {
  let users = db.user.get_users().await?;
  Ok(HttpResponse::Ok().json(UserList { users }))
}

/// get user by username
#[get("/users/{username}")]
async fn get_user(
  db: web::Data<DbService>,
  username: web::Path<String>,
) -> Result<HttpResponse> {
  let user = db.user.get_by_username(&username).await?
    .ok_or(Error::UserNotFound)?;
  Ok(HttpResponse::Ok().json(UserOut { user }))
}

#[derive(Debug, Clone, Default)]
pub struct UserService {
}

impl super::Service for UserService {
  fn load_app_config(&mut self, _config: &AppConfig, _prefix: &str) -> Result<()> {
    Ok(())
  }

  fn api_config(&self, web: &mut web::ServiceConfig) {
    web
      .service(list)
      .service(get_user);
  }
}

pub fn new_factory() -> UserService {
  Default::default()
}
