use crate::error::*;

use crate::models::*;
use crate::forms::*;

use crate::db::*;
use crate::db::util::*;

use tokio_postgres::Row;

#[derive(Clone)]
pub struct CommentService {
  // store comment
  store_comment: RefStatement,

  // update comment votes
  update_votes: RefStatement,

  // delete comment
  delete_comment: RefStatement,

  // get multiple comments
  comments_by_article: RefStatement,
}

lazy_static! {
  static ref COMMENT_COLUMNS: ColumnMappers = {
    ColumnMappers {
      table_name: "comments",
      columns: vec![
        serial("comment_id"),
        column("article_id"),
        column("author"),
        column("body"),
        generated("votes"),
        generated("created_at"),
      ],
    }
  };
}

fn comment_from_row(row: &Row) -> Comment {
  Comment {
    comment_id: row.get("comment_id"),
    article_id: row.get("article_id"),
    author: row.get("author"),
    body: row.get("body"),
    votes: row.get("votes"),
    created_at: row.get("created_at"),
  }
}

impl CommentService {
  pub fn new(cl: SharedClient) -> CommentService {
    // insert comment query
    let store_comment = VersionedStatement::new_ref(cl.clone(),
        &COMMENT_COLUMNS.build_insert_query());

    let update_votes = VersionedStatement::new_ref(cl.clone(),
        &format!(r#"UPDATE comments SET votes = votes + $2 WHERE comment_id = $1
        RETURNING {}"#, COMMENT_COLUMNS.get_columns()));

    // delete comment query
    let delete_comment = VersionedStatement::new_ref(cl.clone(),
        &COMMENT_COLUMNS.build_delete_query());

    // newest first, not configurable.
    let comments_by_article = VersionedStatement::new_ref(cl.clone(),
        &format!(r#"{} WHERE article_id = $1
          ORDER BY created_at DESC, comment_id DESC
          LIMIT $2 OFFSET $3"#, COMMENT_COLUMNS.build_select_query()));

    CommentService {
      store_comment,
      update_votes,
      delete_comment,

      comments_by_article,
    }
  }

  pub async fn prepare(&self) -> Result<()> {
    self.store_comment.prepare().await?;
    self.update_votes.prepare().await?;
    self.delete_comment.prepare().await?;

    self.comments_by_article.prepare().await?;

    Ok(())
  }

  pub async fn store(&self, article_id: i32, comment: &CreateComment) -> Result<Comment> {
    let row = self.store_comment.query_one(&[&article_id, &comment.username, &comment.body])
      .await?;
    Ok(comment_from_row(&row))
  }

  pub async fn update_votes(&self, comment_id: i32, inc_votes: i32) -> Result<Option<Comment>> {
    let row = self.update_votes.query_opt(&[&comment_id, &inc_votes]).await?;
    Ok(from_opt_row(&row, comment_from_row))
  }

  pub async fn delete(&self, comment_id: i32) -> Result<u64> {
    Ok(self.delete_comment.execute(&[&comment_id]).await?)
  }

  pub async fn get_comments_by_article(&self, article_id: i32, req: &CommentListRequest) -> Result<Vec<Comment>> {
    let rows = self.comments_by_article
      .query(&[&article_id, &req.page.limit, &req.page.offset]).await?;
    Ok(rows.iter().map(comment_from_row).collect())
  }
}
