use std::fmt::Write;

use tokio_postgres::Row;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnNote {
  Primary,
  /// Store generated primary key.
  Serial,
  /// Filled in by the store defaults. Never inserted.
  Generated,
  None,
}

#[derive(Debug, Clone)]
pub struct ColumnMapper {
  pub name: String,
  pub column: String,
  pub note: ColumnNote,
}

pub fn column(name: &'static str) -> ColumnMapper {
  ColumnMapper {
    name: name.to_string(),
    column: name.to_string(),
    note: ColumnNote::None,
  }
}

pub fn primary(name: &'static str) -> ColumnMapper {
  ColumnMapper {
    note: ColumnNote::Primary,
    ..column(name)
  }
}

pub fn serial(name: &'static str) -> ColumnMapper {
  ColumnMapper {
    note: ColumnNote::Serial,
    ..column(name)
  }
}

pub fn generated(name: &'static str) -> ColumnMapper {
  ColumnMapper {
    note: ColumnNote::Generated,
    ..column(name)
  }
}

#[derive(Debug, Default, Clone)]
pub struct ColumnMappers {
  pub table_name: &'static str,
  pub columns: Vec<ColumnMapper>,
}

impl ColumnMappers {
  /// Lookup a column by its public name.
  pub fn get_column(&self, name: &str) -> Option<&ColumnMapper> {
    self.columns.iter().find(|col| col.name == name)
  }

  pub fn has_column(&self, name: &str) -> bool {
    self.get_column(name).is_some()
  }

  /// Comma separated column list, `table.column` qualified.
  /// Columns named in `skip` are left out.
  pub fn get_qualified_columns(&self, skip: &[&str]) -> String {
    self.columns.iter().filter_map(|col| {
      if skip.contains(&col.name.as_str()) {
        None
      } else {
        Some(format!("{}.{}", self.table_name, col.column))
      }
    }).collect::<Vec<String>>().join(", ")
  }

  pub fn get_columns(&self) -> String {
    self.columns.iter()
      .map(|col| col.column.clone())
      .collect::<Vec<String>>()
      .join(", ")
  }

  pub fn build_select_query(&self) -> String {
    format!("SELECT {} FROM {}", self.get_columns(), self.table_name)
  }

  /// `INSERT INTO table(cols) VALUES($1, ..) RETURNING <all columns>`,
  /// skipping store generated columns.
  pub fn build_insert_query(&self) -> String {
    let mut buf = String::new();
    let mut idx = 0;
    let mut values = Vec::new();
    let _ = write!(buf, "INSERT INTO {}(", self.table_name);
    for col in self.columns.iter() {
      if col.note == ColumnNote::Generated || col.note == ColumnNote::Serial {
        continue;
      }
      if idx > 0 {
        buf.push_str(", ");
      }
      idx += 1;
      values.push(format!("${}", idx));
      buf.push_str(&col.column);
    }
    let _ = write!(buf, ") VALUES({}) RETURNING {}", values.join(", "), self.get_columns());
    buf
  }

  pub fn primary_column(&self) -> Option<&ColumnMapper> {
    self.columns.iter()
      .find(|col| col.note == ColumnNote::Primary || col.note == ColumnNote::Serial)
  }

  /// `DELETE FROM table WHERE <primary> = $1`
  pub fn build_delete_query(&self) -> String {
    let key = self.primary_column().map(|col| col.column.as_str()).unwrap_or("id");
    format!("DELETE FROM {} WHERE {} = $1", self.table_name, key)
  }
}

/// Shared `Option<Row>` -> `Option<T>` mapping used by every service.
pub fn from_opt_row<T>(row: &Option<Row>, f: fn(&Row) -> T) -> Option<T> {
  row.as_ref().map(f)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn comments() -> ColumnMappers {
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
  }

  #[test]
  fn insert_skips_generated_columns() {
    assert_eq!(comments().build_insert_query(),
      "INSERT INTO comments(article_id, author, body) VALUES($1, $2, $3) \
      RETURNING comment_id, article_id, author, body, votes, created_at");
  }

  #[test]
  fn select_and_qualified_lists() {
    let cols = comments();
    assert_eq!(cols.build_select_query(),
      "SELECT comment_id, article_id, author, body, votes, created_at FROM comments");
    assert_eq!(cols.get_qualified_columns(&["body", "votes"]),
      "comments.comment_id, comments.article_id, comments.author, comments.created_at");
  }

  #[test]
  fn delete_uses_primary_key() {
    assert_eq!(comments().build_delete_query(), "DELETE FROM comments WHERE comment_id = $1");

    let topics = ColumnMappers {
      table_name: "topics",
      columns: vec![primary("slug"), column("description")],
    };
    assert_eq!(topics.build_delete_query(), "DELETE FROM topics WHERE slug = $1");
    assert!(topics.has_column("description"));
    assert!(!topics.has_column("banana"));
  }
}
