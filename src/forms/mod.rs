use std::collections::HashMap;

use serde::Deserialize;

use crate::error::*;
use crate::util::parse_positive;

pub mod topic;
pub mod article;
pub mod comment;
pub mod user;

pub use self::{
  topic::*,
  article::*,
  comment::*,
  user::*,
};

/// Raw query string parameters.
pub type QueryParams = HashMap<String, String>;

/// Reject any parameter not in `allowed`.
pub fn check_allowed(params: &QueryParams, allowed: &[&str]) -> Result<()> {
  match params.keys().find(|key| !allowed.contains(&key.as_str())) {
    Some(key) => {
      log::debug!("Query parameter not allowed: {:?}", key);
      Err(Error::QueryNotAllowed)
    },
    None => Ok(()),
  }
}

/// Offset pagination from the `limit` and (1-indexed) `p` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
  pub limit: i64,
  pub page: i64,
  pub offset: i64,
}

impl Page {
  pub fn new(limit: i64, page: i64) -> Result<Self> {
    let offset = (page - 1).checked_mul(limit).ok_or(Error::PageNotValid)?;
    Ok(Self { limit, page, offset })
  }

  pub fn from_query(params: &QueryParams, default_limit: i64) -> Result<Self> {
    let limit = match params.get("limit") {
      Some(val) => parse_positive(val).ok_or(Error::LimitNotValid)?,
      None => default_limit,
    };
    let page = match params.get("p") {
      Some(val) => parse_positive(val).ok_or(Error::PageNotValid)?,
      None => 1,
    };
    Self::new(limit, page)
  }
}

/// Vote delta body shared by articles and comments.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct IncVotes {
  pub inc_votes: i32,
}

/// Parse a resource id taken from the path.
pub fn parse_id(val: &str) -> Result<i32> {
  parse_positive(val).ok_or(Error::BadRequest)
}

#[cfg(test)]
pub(crate) fn query(pairs: &[(&str, &str)]) -> QueryParams {
  pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}
