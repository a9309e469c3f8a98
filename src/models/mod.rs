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
