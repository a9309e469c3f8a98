use serde::{Deserialize, Serialize};

use crate::models::User;

#[derive(Debug, Serialize, Deserialize)]
pub struct UserOut {
  pub user: User,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserList {
  pub users: Vec<User>,
}
