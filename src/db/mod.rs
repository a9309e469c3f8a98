pub mod util;

mod topic;
mod article;
mod comment;
mod user;
pub use self::{
  topic::*,
  article::*,
  comment::*,
  user::*,
};

mod service;
pub use service::*;
