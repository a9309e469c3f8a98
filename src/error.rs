use log::*;

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;

use tokio_postgres::error::SqlState;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  // 400
  #[error("Bad request")]
  BadRequest,

  #[error("Query not allowed")]
  QueryNotAllowed,

  #[error("Page not valid")]
  PageNotValid,

  #[error("Limit not valid")]
  LimitNotValid,

  #[error("Column does not exist")]
  ColumnDoesNotExist,

  #[error("Order not valid")]
  OrderNotValid,

  // 404
  #[error("This article does not exist")]
  ArticleNotFound,

  #[error("This comment does not exist")]
  CommentNotFound,

  #[error("This user does not exist")]
  UserNotFound,

  #[error("Not found")]
  NotFound,

  #[error("Path not found")]
  PathNotFound,

  // 503
  #[error("disconnected: {0}")]
  DisconnectedError(String),

  // Json error
  #[error("Json error: {source}")]
  JsonError {
    #[from]
    source: serde_json::Error,
  },

  #[error("postgres error")]
  PgError {
    #[source]
    source: tokio_postgres::error::Error,
  },

  #[error("std io error")]
  IOError {
    #[from]
    source: std::io::Error,
  },

  #[error("config error")]
  ConfigError {
    #[from]
    source: config::ConfigError,
  },

  #[error(transparent)]
  Other(#[from] anyhow::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Normalize a store failure into one of the client facing kinds.
///
/// Bad input that slipped past validation (wrong types, missing values,
/// duplicate keys) is a bad request, a dangling reference is "not found".
/// Anything else stays an internal error.
impl From<tokio_postgres::Error> for Error {
  fn from(err: tokio_postgres::Error) -> Self {
    match err.code() {
      Some(code) if *code == SqlState::INVALID_TEXT_REPRESENTATION
        || *code == SqlState::NOT_NULL_VIOLATION
        || *code == SqlState::UNIQUE_VIOLATION
        || *code == SqlState::CHECK_VIOLATION
        || *code == SqlState::NUMERIC_VALUE_OUT_OF_RANGE => {
        debug!("store rejected input: {}", err);
        Error::BadRequest
      },
      Some(code) if *code == SqlState::FOREIGN_KEY_VIOLATION => {
        debug!("store reference missing: {}", err);
        Error::NotFound
      },
      _ => Error::PgError { source: err },
    }
  }
}

// the ResponseError trait lets us convert errors to http responses with appropriate data
// https://actix.rs/docs/errors/
impl ResponseError for Error {
  fn status_code(&self) -> StatusCode {
    match self {
      Error::BadRequest
      | Error::QueryNotAllowed
      | Error::PageNotValid
      | Error::LimitNotValid
      | Error::ColumnDoesNotExist
      | Error::OrderNotValid => StatusCode::BAD_REQUEST,
      Error::ArticleNotFound
      | Error::CommentNotFound
      | Error::UserNotFound
      | Error::NotFound
      | Error::PathNotFound => StatusCode::NOT_FOUND,
      Error::DisconnectedError(_) => StatusCode::SERVICE_UNAVAILABLE,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    let message = match status {
      StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => self.to_string(),
      StatusCode::SERVICE_UNAVAILABLE => {
        warn!("Store unavailable: {}", self);
        "Service unavailable".to_string()
      },
      _ => {
        error!("InternalServerError: {:?}", self);
        "Internal server error".to_string()
      },
    };
    HttpResponse::build(status).json(json!({ "message": message }))
  }
}
