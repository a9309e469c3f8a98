#![allow(dead_code)]

use nc_news::app::AppConfig;

/// Nothing listens here; requests that reach the store fail.
pub const UNREACHABLE_DB: &str = "postgres://nc_news@127.0.0.1:1/nc_news";

pub const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");
pub const SEED_SQL: &str = include_str!("../fixtures/seed.sql");

pub fn test_config(db_url: &str) -> AppConfig {
  AppConfig::from_toml(&format!(r#"
[db]
url = "{}"

[api]
listen = "127.0.0.1:0"
services = ["Endpoints", "Topic", "Article", "Comment", "User"]
"#, db_url)).expect("test config")
}

/// Build the same app the server runs, minus the middleware.
macro_rules! test_app {
  ($config:expr) => {{
    let services = nc_news::services::config_services(&$config, "api")
      .expect("configure services");
    actix_web::test::init_service(
      actix_web::App::new()
        .configure(move |web| services.web_config(web))
        .default_service(actix_web::web::to(nc_news::services::path_not_found))
    ).await
  }};
}

/// Call the app, returning the status and JSON body.
macro_rules! call_json {
  ($app:expr, $req:expr) => {{
    let resp = actix_web::test::call_service(&$app, $req.to_request()).await;
    let status = resp.status().as_u16();
    let body: serde_json::Value = actix_web::test::read_body_json(resp).await;
    (status, body)
  }};
}

/// Call the app, returning only the status.
macro_rules! call_status {
  ($app:expr, $req:expr) => {{
    let resp = actix_web::test::call_service(&$app, $req.to_request()).await;
    resp.status().as_u16()
  }};
}
