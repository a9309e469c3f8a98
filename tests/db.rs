//! End to end requests against a seeded postgres database.
//!
//! Set `TEST_DATABASE_URL` to run these, every test recreates the tables.

#[macro_use]
extern crate lazy_static;

#[macro_use]
mod common;

use std::sync::{Mutex, MutexGuard};

use actix_web::test::TestRequest;
use serde_json::{json, Value};
use tokio_postgres::NoTls;

use nc_news::app::AppConfig;
use nc_news::db::{SharedClient, VersionedStatement};

use common::*;

lazy_static! {
  static ref DB_LOCK: Mutex<()> = Mutex::new(());
}

/// Reset the database to the fixture data.
async fn seeded() -> Option<(MutexGuard<'static, ()>, AppConfig)> {
  let url = match std::env::var("TEST_DATABASE_URL") {
    Ok(url) => url,
    Err(_) => {
      eprintln!("TEST_DATABASE_URL not set, skipping");
      return None;
    },
  };
  let guard = DB_LOCK.lock().unwrap_or_else(|e| e.into_inner());

  let (client, conn) = tokio_postgres::connect(&url, NoTls).await.expect("connect");
  actix_rt::spawn(async move {
    let _ = conn.await;
  });
  client.batch_execute(SCHEMA_SQL).await.expect("create tables");
  client.batch_execute(SEED_SQL).await.expect("seed tables");

  Some((guard, test_config(&url)))
}

fn ids(articles: &Value) -> Vec<i64> {
  articles.as_array().expect("array").iter()
    .map(|a| a["article_id"].as_i64().expect("article_id"))
    .collect()
}

#[actix_web::test]
async fn list_articles_defaults() {
  let (_lock, config) = match seeded().await { Some(s) => s, None => return };
  let app = test_app!(config);

  let (status, body) = call_json!(app, TestRequest::get().uri("/api/articles"));
  assert_eq!(status, 200);
  assert_eq!(body["total_count"], 13);
  let articles = body["articles"].as_array().unwrap();
  assert_eq!(articles.len(), 10);
  for article in articles {
    assert!(article.get("body").is_none());
    for key in &["author", "title", "article_id", "topic", "created_at", "votes",
        "article_img_url", "comment_count"] {
      assert!(article.get(*key).is_some(), "missing {}", key);
    }
  }
  // oldest first
  assert_eq!(articles[0]["article_id"], 7);
  assert_eq!(articles[0]["created_at"], "2020-01-07T14:08:00.000Z");
  assert_eq!(articles[1]["article_id"], 11);
}

#[actix_web::test]
async fn list_articles_full_ordering() {
  let (_lock, config) = match seeded().await { Some(s) => s, None => return };
  let app = test_app!(config);

  let (_, body) = call_json!(app, TestRequest::get().uri("/api/articles?limit=13"));
  let ascending = body["articles"].as_array().unwrap().clone();
  assert_eq!(ascending.len(), 13);
  // same format everywhere, so string order is time order.
  let created: Vec<&str> = ascending.iter()
    .map(|a| a["created_at"].as_str().unwrap())
    .collect();
  assert!(created.windows(2).all(|w| w[0] <= w[1]), "{:?}", created);

  let (_, body) = call_json!(app, TestRequest::get().uri("/api/articles?limit=13&order=DESC"));
  let mut descending = body["articles"].as_array().unwrap().clone();
  descending.reverse();
  assert_eq!(descending, ascending);
}

#[actix_web::test]
async fn list_articles_sorted_and_filtered() {
  let (_lock, config) = match seeded().await { Some(s) => s, None => return };
  let app = test_app!(config);

  let (_, body) = call_json!(app, TestRequest::get().uri("/api/articles?order=desc"));
  assert_eq!(body["articles"][0]["article_id"], 3);

  let (_, body) = call_json!(app,
    TestRequest::get().uri("/api/articles?sort_by=votes&order=DESC&limit=1"));
  assert_eq!(ids(&body["articles"]), vec![1]);
  assert_eq!(body["articles"][0]["comment_count"], 11);

  let (status, body) = call_json!(app, TestRequest::get().uri("/api/articles?topic=mitch"));
  assert_eq!(status, 200);
  assert_eq!(body["total_count"], 12);
  for article in body["articles"].as_array().unwrap() {
    assert_eq!(article["topic"], "mitch");
  }

  let (status, body) = call_json!(app, TestRequest::get().uri("/api/articles?topic="));
  assert_eq!(status, 200);
  assert_eq!(body["total_count"], 13);

  let (_, body) = call_json!(app, TestRequest::get().uri("/api/articles?topic=cats"));
  assert_eq!(ids(&body["articles"]), vec![5]);
  assert_eq!(body["total_count"], 1);

  // a topic with no articles is treated like an unknown one.
  let (status, body) = call_json!(app, TestRequest::get().uri("/api/articles?topic=paper"));
  assert_eq!(status, 404);
  assert_eq!(body["message"], "Not found");

  let (status, body) = call_json!(app, TestRequest::get().uri("/api/articles?topic=banana"));
  assert_eq!(status, 404);
  assert_eq!(body["message"], "Not found");
}

#[actix_web::test]
async fn list_articles_paginated() {
  let (_lock, config) = match seeded().await { Some(s) => s, None => return };
  let app = test_app!(config);

  let (_, body) = call_json!(app, TestRequest::get().uri("/api/articles?limit=5"));
  assert_eq!(body["articles"].as_array().unwrap().len(), 5);
  assert_eq!(body["total_count"], 13);

  let (_, body) = call_json!(app, TestRequest::get().uri("/api/articles?limit=5&topic=mitch"));
  assert_eq!(body["articles"].as_array().unwrap().len(), 5);
  assert_eq!(body["total_count"], 12);

  let (_, body) = call_json!(app, TestRequest::get().uri("/api/articles?p=2&sort_by=article_id"));
  assert_eq!(ids(&body["articles"]), vec![11, 12, 13]);

  let (status, body) = call_json!(app, TestRequest::get().uri("/api/articles?p=4"));
  assert_eq!(status, 200);
  assert_eq!(body["articles"], json!([]));
  assert_eq!(body["total_count"], 13);
}

#[actix_web::test]
async fn get_article_by_id() {
  let (_lock, config) = match seeded().await { Some(s) => s, None => return };
  let app = test_app!(config);

  let (status, body) = call_json!(app, TestRequest::get().uri("/api/articles/1"));
  assert_eq!(status, 200);
  assert_eq!(body["article"], json!({
    "article_id": 1,
    "author": "butter_bridge",
    "title": "Living in the shadow of a great man",
    "body": "I find this existence challenging",
    "topic": "mitch",
    "created_at": "2020-07-09T20:11:00.000Z",
    "votes": 100,
    "article_img_url":
      "https://images.pexels.com/photos/158651/news-newsletter-newspaper-information-158651.jpeg?w=700&h=700",
    "comment_count": 11,
  }));

  let (_, body) = call_json!(app, TestRequest::get().uri("/api/articles/2"));
  assert_eq!(body["article"]["comment_count"], 0);

  let (status, body) = call_json!(app, TestRequest::get().uri("/api/articles/999"));
  assert_eq!(status, 404);
  assert_eq!(body["message"], "This article does not exist");
}

#[actix_web::test]
async fn post_article() {
  let (_lock, config) = match seeded().await { Some(s) => s, None => return };
  let app = test_app!(config);

  let (status, body) = call_json!(app, TestRequest::post().uri("/api/articles").set_json(json!({
    "author": "rogersop",
    "title": "Cats of the world",
    "body": "They are everywhere.",
    "topic": "cats",
  })));
  assert_eq!(status, 201);
  let article = &body["article"];
  assert_eq!(article["article_id"], 14);
  assert_eq!(article["votes"], 0);
  assert_eq!(article["comment_count"], 0);
  assert_eq!(article["article_img_url"],
    "https://images.pexels.com/photos/97050/pexels-photo-97050.jpeg?w=700&h=700");

  let (status, body) = call_json!(app, TestRequest::get().uri("/api/articles/14"));
  assert_eq!(status, 200);
  assert_eq!(body["article"]["author"], "rogersop");
  assert_eq!(body["article"]["title"], "Cats of the world");
  assert_eq!(body["article"]["body"], "They are everywhere.");
  assert_eq!(body["article"]["topic"], "cats");

  let (status, _) = call_json!(app, TestRequest::post().uri("/api/articles").set_json(json!({
    "author": "banana",
    "title": "Cats of the world",
    "body": "They are everywhere.",
    "topic": "cats",
  })));
  assert_eq!(status, 404);

  let (status, _) = call_json!(app, TestRequest::post().uri("/api/articles").set_json(json!({
    "author": "rogersop",
    "title": "Cats of the world",
    "body": "They are everywhere.",
    "topic": "banana",
  })));
  assert_eq!(status, 404);
}

#[actix_web::test]
async fn patch_and_delete_article() {
  let (_lock, config) = match seeded().await { Some(s) => s, None => return };
  let app = test_app!(config);

  let (status, body) = call_json!(app,
    TestRequest::patch().uri("/api/articles/1").set_json(json!({"inc_votes": 1})));
  assert_eq!(status, 200);
  assert_eq!(body["article"]["votes"], 101);
  assert_eq!(body["article"]["comment_count"], 11);

  let (_, body) = call_json!(app,
    TestRequest::patch().uri("/api/articles/1").set_json(json!({"inc_votes": -150})));
  assert_eq!(body["article"]["votes"], -49);

  let (status, body) = call_json!(app,
    TestRequest::patch().uri("/api/articles/999").set_json(json!({"inc_votes": 1})));
  assert_eq!(status, 404);
  assert_eq!(body["message"], "This article does not exist");

  assert_eq!(call_status!(app, TestRequest::delete().uri("/api/articles/1")), 204);
  assert_eq!(call_status!(app, TestRequest::delete().uri("/api/articles/1")), 404);
  assert_eq!(call_status!(app, TestRequest::get().uri("/api/articles/1/comments")), 404);

  let (_, body) = call_json!(app, TestRequest::get().uri("/api/articles"));
  assert_eq!(body["total_count"], 12);
}

#[actix_web::test]
async fn list_article_comments() {
  let (_lock, config) = match seeded().await { Some(s) => s, None => return };
  let app = test_app!(config);

  let (status, body) = call_json!(app, TestRequest::get().uri("/api/articles/1/comments"));
  assert_eq!(status, 200);
  let comments = body["comments"].as_array().unwrap();
  assert_eq!(comments.len(), 10);
  // newest first
  assert_eq!(comments[0]["comment_id"], 5);
  assert_eq!(comments[0]["created_at"], "2020-11-03T21:00:00.000Z");
  for comment in comments {
    assert_eq!(comment["article_id"], 1);
  }

  let (_, body) = call_json!(app, TestRequest::get().uri("/api/articles/1/comments?limit=5"));
  assert_eq!(body["comments"].as_array().unwrap().len(), 5);

  let (_, body) = call_json!(app, TestRequest::get().uri("/api/articles/1/comments?p=2"));
  let comments = body["comments"].as_array().unwrap();
  assert_eq!(comments.len(), 1);
  assert_eq!(comments[0]["body"], "Superficially charming");
  assert_eq!(comments[0]["created_at"], "2020-01-01T03:08:00.000Z");

  let (status, body) = call_json!(app, TestRequest::get().uri("/api/articles/2/comments"));
  assert_eq!(status, 200);
  assert_eq!(body["comments"], json!([]));

  let (status, body) = call_json!(app, TestRequest::get().uri("/api/articles/999/comments"));
  assert_eq!(status, 404);
  assert_eq!(body["message"], "This article does not exist");
}

#[actix_web::test]
async fn post_comment() {
  let (_lock, config) = match seeded().await { Some(s) => s, None => return };
  let app = test_app!(config);

  let (status, body) = call_json!(app, TestRequest::post().uri("/api/articles/2/comments")
    .set_json(json!({"username": "rogersop", "body": "This is interesting"})));
  assert_eq!(status, 201);
  assert_eq!(body["comment"]["comment_id"], 19);
  assert_eq!(body["comment"]["article_id"], 2);
  assert_eq!(body["comment"]["author"], "rogersop");
  assert_eq!(body["comment"]["body"], "This is interesting");
  assert_eq!(body["comment"]["votes"], 0);

  let (_, body) = call_json!(app, TestRequest::get().uri("/api/articles/2"));
  assert_eq!(body["article"]["comment_count"], 1);

  let (status, body) = call_json!(app, TestRequest::post().uri("/api/articles/999/comments")
    .set_json(json!({"username": "rogersop", "body": "This is interesting"})));
  assert_eq!(status, 404);
  assert_eq!(body["message"], "This article does not exist");

  let (status, _) = call_json!(app, TestRequest::post().uri("/api/articles/2/comments")
    .set_json(json!({"username": "banana", "body": "This is interesting"})));
  assert_eq!(status, 404);
}

#[actix_web::test]
async fn patch_and_delete_comment() {
  let (_lock, config) = match seeded().await { Some(s) => s, None => return };
  let app = test_app!(config);

  let (status, body) = call_json!(app,
    TestRequest::patch().uri("/api/comments/1").set_json(json!({"inc_votes": 1})));
  assert_eq!(status, 200);
  assert_eq!(body["comment"]["votes"], 17);
  assert_eq!(body["comment"]["created_at"], "2020-04-06T12:17:00.000Z");

  let (status, body) = call_json!(app,
    TestRequest::patch().uri("/api/comments/999").set_json(json!({"inc_votes": 1})));
  assert_eq!(status, 404);
  assert_eq!(body["message"], "This comment does not exist");

  assert_eq!(call_status!(app, TestRequest::delete().uri("/api/comments/1")), 204);
  let (status, body) = call_json!(app, TestRequest::delete().uri("/api/comments/1"));
  assert_eq!(status, 404);
  assert_eq!(body["message"], "This comment does not exist");
}

#[actix_web::test]
async fn users() {
  let (_lock, config) = match seeded().await { Some(s) => s, None => return };
  let app = test_app!(config);

  let (status, body) = call_json!(app, TestRequest::get().uri("/api/users"));
  assert_eq!(status, 200);
  assert_eq!(body["users"].as_array().unwrap().len(), 4);

  let (status, body) = call_json!(app, TestRequest::get().uri("/api/users/butter_bridge"));
  assert_eq!(status, 200);
  assert_eq!(body["user"], json!({
    "username": "butter_bridge",
    "name": "jonny",
    "avatar_url": "https://www.healthytherapies.com/wp-content/uploads/2016/06/Lime3.jpg",
  }));

  let (status, body) = call_json!(app, TestRequest::get().uri("/api/users/banana"));
  assert_eq!(status, 404);
  assert_eq!(body["message"], "This user does not exist");
}

#[actix_web::test]
async fn topics() {
  let (_lock, config) = match seeded().await { Some(s) => s, None => return };
  let app = test_app!(config);

  let (status, body) = call_json!(app, TestRequest::get().uri("/api/topics"));
  assert_eq!(status, 200);
  let topics = body["topics"].as_array().unwrap();
  assert_eq!(topics.len(), 3);
  for topic in topics {
    assert!(topic["slug"].is_string());
    assert!(topic["description"].is_string());
  }

  let (status, body) = call_json!(app, TestRequest::post().uri("/api/topics")
    .set_json(json!({"slug": "dogs", "description": "Not cats"})));
  assert_eq!(status, 201);
  assert_eq!(body["topic"], json!({"slug": "dogs", "description": "Not cats"}));

  let (status, body) = call_json!(app, TestRequest::post().uri("/api/topics")
    .set_json(json!({"slug": "", "description": ""})));
  assert_eq!(status, 201);
  assert_eq!(body["topic"], json!({"slug": "", "description": ""}));

  let (status, body) = call_json!(app, TestRequest::post().uri("/api/topics")
    .set_json(json!({"slug": "dogs"})));
  assert_eq!(status, 400);
  assert_eq!(body["message"], "Bad request");

  let (_, body) = call_json!(app, TestRequest::get().uri("/api/topics"));
  assert_eq!(body["topics"].as_array().unwrap().len(), 5);
}

#[actix_web::test]
async fn statement_usable_after_cancelled_prepare() {
  let (_lock, config) = match seeded().await { Some(s) => s, None => return };
  let url = config.get_str("db.url").unwrap().unwrap();

  let cl = SharedClient::new(&url);
  cl.get_client().await.expect("connected");
  let stmt = VersionedStatement::new(cl, "SELECT COUNT(*) FROM articles");

  // drop the prepare while it waits on the server.
  let _ = tokio::time::timeout(std::time::Duration::from_micros(1), stmt.prepare()).await;

  let started = std::time::Instant::now();
  let row = stmt.query_one(&[]).await.expect("statement still usable");
  let count: i64 = row.get(0);
  assert_eq!(count, 13);
  assert!(started.elapsed() < std::time::Duration::from_secs(2));
}
