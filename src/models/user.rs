use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
  pub username: String,
  pub name: String,
  pub avatar_url: Option<String>,
}
