#[macro_use]
extern crate lazy_static;

pub mod error;
pub use error::Error;

mod util;

pub mod app;

pub mod forms;

pub mod models;

pub mod services;

pub mod db;
