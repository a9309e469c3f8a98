use serde::{Deserialize, Serialize};

use crate::models::topic::*;

#[derive(Debug, Serialize, Deserialize)]
pub struct TopicOut {
  pub topic: Topic,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TopicList {
  pub topics: Vec<Topic>,
}

/// Only the slug is required; empty strings are valid values.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct CreateTopic {
  pub slug: String,
  #[serde(default)]
  pub description: Option<String>,
}
