use log::*;

use std::convert::TryFrom;

use actix_rt::System;
use actix_web::{web, middleware, App, HttpServer};

use crate::{
  error::*,
  app::*,
  db::DbService,
  services::{config_services, path_not_found},
};

/// Prefix of the server block used when `server` is not configured.
pub const DEFAULT_SERVER: &str = "api";

pub fn execute(config: AppConfig) -> Result<()> {
  let prefix = config.get_str("server")?.unwrap_or_else(|| DEFAULT_SERVER.to_string());
  run_server(&config, &prefix)?;
  info!("server({}): stopped.", prefix);
  Ok(())
}

async fn test_db(url: String) -> Result<()> {
  let db = DbService::new(&url);
  db.prepare().await
}

fn run_server(config: &AppConfig, prefix: &str) -> Result<()> {
  let sys = System::new();

  let debug = config.get_bool("debug")?.unwrap_or(false);
  debug!("Debug = {:?}", debug);

  if debug {
    let db_url = config.get_str("db.url")?
      .ok_or_else(|| anyhow::anyhow!("db.url must be set"))?;

    // Test db prepared statements.
    sys.block_on(test_db(db_url))?;
  }

  // configure services
  info!("Serve.Services: configure services. prefix={}", prefix);
  let services = config_services(config, prefix)?;

  // Start http server
  let mut server = HttpServer::new(move || {
    App::new()
      .wrap(middleware::Logger::default())
      .wrap(middleware::Compress::default())
      .configure(|web| services.web_config(web))
      .default_service(web::to(path_not_found))
  });

  // workers
  if let Some(workers) = config.get_int(&format!("{}.workers", prefix))? {
    info!("Workers: {}", workers);
    let workers = usize::try_from(workers).ok().filter(|w| *w > 0)
      .ok_or_else(|| anyhow::anyhow!("{}.workers must be > 0", prefix))?;
    server = server.workers(workers);
  }

  // listen backlog
  if let Some(backlog) = config.get_int(&format!("{}.backlog", prefix))? {
    info!("Listen backlog: {}", backlog);
    let backlog = u32::try_from(backlog)
      .map_err(|_| anyhow::anyhow!("{}.backlog must be >= 0", prefix))?;
    server = server.backlog(backlog);
  }

  // setup binds.
  let listen = config.get_str(&format!("{}.listen", prefix))?
    .ok_or_else(|| anyhow::anyhow!("Missing {}.listen", prefix))?;
  info!("{} services listening on: {}", prefix, listen);

  // run server future, until ctrl-c/SIGTERM.
  sys.block_on(async move {
    server.bind(listen)?.run().await
  })?;
  Ok(())
}
