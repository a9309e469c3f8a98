use std::rc::Rc;
use std::cell::RefCell;
use std::collections::HashMap;

use tokio_postgres::Row;

use crate::error::*;

use crate::models::*;
use crate::forms::article::*;

use crate::db::*;
use crate::db::util::*;

#[derive(Clone)]
pub struct ArticleService {
  shared_cl: SharedClient,

  // get one article
  article_by_id: RefStatement,
  article_exists: RefStatement,

  // store article
  store_article: RefStatement,

  // update article votes
  update_votes: RefStatement,

  // delete article
  delete_article: RefStatement,

  // topic filter validation
  article_topics: RefStatement,

  // total count for a (possibly filtered) listing
  count_articles: RefStatement,

  // listing statements, one per sort column/order, prepared on demand.
  list_articles: Rc<RefCell<HashMap<String, RefStatement>>>,
}

lazy_static! {
  pub static ref ARTICLE_COLUMNS: ColumnMappers = {
    ColumnMappers {
      table_name: "articles",
      columns: vec![
        serial("article_id"),
        column("author"),
        column("title"),
        column("body"),
        column("topic"),
        generated("created_at"),
        generated("votes"),
        column("article_img_url"),
      ],
    }
  };

  static ref ARTICLE_DETAILS_SELECT: String = format!(r#"
SELECT {}, COUNT(comments.comment_id)::INT AS comment_count
FROM articles LEFT JOIN comments ON comments.article_id = articles.article_id
"#, ARTICLE_COLUMNS.get_qualified_columns(&[]));

  static ref ARTICLE_SUMMARY_SELECT: String = format!(r#"
SELECT {}, COUNT(comments.comment_id)::INT AS comment_count
FROM articles LEFT JOIN comments ON comments.article_id = articles.article_id
"#, ARTICLE_COLUMNS.get_qualified_columns(&["body"]));
}

fn article_from_row(row: &Row) -> Article {
  Article {
    article_id: row.get("article_id"),
    author: row.get("author"),
    title: row.get("title"),
    body: row.get("body"),
    topic: row.get("topic"),
    created_at: row.get("created_at"),
    votes: row.get("votes"),
    article_img_url: row.get("article_img_url"),
    comment_count: row.get("comment_count"),
  }
}

fn article_summary_from_row(row: &Row) -> ArticleSummary {
  ArticleSummary {
    article_id: row.get("article_id"),
    author: row.get("author"),
    title: row.get("title"),
    topic: row.get("topic"),
    created_at: row.get("created_at"),
    votes: row.get("votes"),
    article_img_url: row.get("article_img_url"),
    comment_count: row.get("comment_count"),
  }
}

/// Build the listing query for one sort column/order.
///
/// `sort_by` must already be whitelisted; the interpolated identifier comes
/// from the column mapper, never from the request. Ties are broken by id so
/// paging is stable.
pub fn build_list_query(sort_by: &str, order: SortOrder) -> Result<String> {
  let col = ARTICLE_COLUMNS.get_column(sort_by).ok_or(Error::ColumnDoesNotExist)?;
  let order = order.as_sql();
  Ok(format!(r#"{}
WHERE ($1::TEXT IS NULL OR articles.topic = $1)
GROUP BY articles.article_id
ORDER BY articles.{} {}, articles.article_id {}
LIMIT $2 OFFSET $3"#, *ARTICLE_SUMMARY_SELECT, col.column, order, order))
}

impl ArticleService {
  pub fn new(cl: SharedClient) -> ArticleService {
    // Build article_by_* queries
    let article_by_id = VersionedStatement::new_ref(cl.clone(),
        &format!(r#"{} WHERE articles.article_id = $1 GROUP BY articles.article_id"#,
        *ARTICLE_DETAILS_SELECT));
    let article_exists = VersionedStatement::new_ref(cl.clone(),
        r#"SELECT 1 FROM articles WHERE article_id = $1"#);

    // store article query, a new article has no comments.
    let store_article = VersionedStatement::new_ref(cl.clone(),
        &format!(r#"{}, 0::INT AS comment_count"#, ARTICLE_COLUMNS.build_insert_query()));

    // update article votes
    let update_votes = VersionedStatement::new_ref(cl.clone(),
        &format!(r#"WITH updated AS (
          UPDATE articles SET votes = votes + $2 WHERE article_id = $1 RETURNING {}
        )
        SELECT updated.*,
          (SELECT COUNT(*) FROM comments WHERE comments.article_id = updated.article_id)::INT
            AS comment_count
        FROM updated"#, ARTICLE_COLUMNS.get_columns()));

    // delete article query
    let delete_article = VersionedStatement::new_ref(cl.clone(),
        &ARTICLE_COLUMNS.build_delete_query());

    let article_topics = VersionedStatement::new_ref(cl.clone(),
        r#"SELECT topic FROM articles GROUP BY topic"#);

    let count_articles = VersionedStatement::new_ref(cl.clone(),
        r#"SELECT COUNT(*) FROM articles WHERE ($1::TEXT IS NULL OR topic = $1)"#);

    ArticleService {
      shared_cl: cl,

      article_by_id,
      article_exists,

      store_article,
      update_votes,
      delete_article,

      article_topics,
      count_articles,
      list_articles: Default::default(),
    }
  }

  pub async fn prepare(&self) -> Result<()> {
    self.article_by_id.prepare().await?;
    self.article_exists.prepare().await?;

    self.store_article.prepare().await?;
    self.update_votes.prepare().await?;
    self.delete_article.prepare().await?;

    self.article_topics.prepare().await?;
    self.count_articles.prepare().await?;

    // every sort column/order combination.
    for col in ARTICLE_COLUMNS.columns.iter() {
      for order in [SortOrder::Asc, SortOrder::Desc].iter() {
        self.list_statement(&col.name, *order)?.prepare().await?;
      }
    }
    Ok(())
  }

  fn list_statement(&self, sort_by: &str, order: SortOrder) -> Result<RefStatement> {
    let key = format!("{} {}", sort_by, order.as_sql());
    if let Some(statement) = self.list_articles.borrow().get(&key) {
      return Ok(statement.clone());
    }
    let statement = VersionedStatement::new_ref(self.shared_cl.clone(),
        &build_list_query(sort_by, order)?);
    self.list_articles.borrow_mut().insert(key, statement.clone());
    Ok(statement)
  }

  pub async fn get_by_id(&self, article_id: i32) -> Result<Option<Article>> {
    let row = self.article_by_id.query_opt(&[&article_id]).await?;
    Ok(from_opt_row(&row, article_from_row))
  }

  pub async fn exists(&self, article_id: i32) -> Result<bool> {
    Ok(self.article_exists.query_opt(&[&article_id]).await?.is_some())
  }

  pub async fn store(&self, article: &CreateArticle, default_img_url: &str) -> Result<Article> {
    let img_url = article.article_img_url.as_deref().unwrap_or(default_img_url);
    let row = self.store_article.query_one(&[
        &article.author, &article.title, &article.body, &article.topic, &img_url
      ]).await?;
    Ok(article_from_row(&row))
  }

  pub async fn update_votes(&self, article_id: i32, inc_votes: i32) -> Result<Option<Article>> {
    let row = self.update_votes.query_opt(&[&article_id, &inc_votes]).await?;
    Ok(from_opt_row(&row, article_from_row))
  }

  pub async fn delete(&self, article_id: i32) -> Result<u64> {
    Ok(self.delete_article.execute(&[&article_id]).await?)
  }

  /// Topics currently used by at least one article.
  pub async fn get_topics(&self) -> Result<Vec<String>> {
    let rows = self.article_topics.query(&[]).await?;
    Ok(rows.iter().map(|r| r.get(0)).collect())
  }

  pub async fn get_articles(&self, req: &ArticleListRequest) -> Result<ArticleList> {
    if let Some(topic) = &req.topic {
      let topics = self.get_topics().await?;
      if !topics.iter().any(|t| t == topic) {
        return Err(Error::NotFound);
      }
    }

    let total_count: i64 = self.count_articles.query_one(&[&req.topic]).await?.get(0);

    let statement = self.list_statement(&req.sort_by, req.order)?;
    let rows = statement.query(&[&req.topic, &req.page.limit, &req.page.offset]).await?;

    Ok(ArticleList {
      articles: rows.iter().map(article_summary_from_row).collect(),
      total_count,
    })
  }
}
