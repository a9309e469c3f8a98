use crate::error::*;
use crate::models::*;

use crate::db::*;
use crate::db::util::*;

use tokio_postgres::Row;

#[derive(Clone)]
pub struct UserService {
  // gets
  get_users: RefStatement,
  user_by_username: RefStatement,
}

lazy_static! {
  static ref USER_COLUMNS: ColumnMappers = {
    ColumnMappers {
      table_name: "users",
      columns: vec![
        primary("username"),
        column("name"),
        column("avatar_url"),
      ],
    }
  };
}

fn user_from_row(row: &Row) -> User {
  User {
    username: row.get("username"),
    name: row.get("name"),
    avatar_url: row.get("avatar_url"),
  }
}

impl UserService {
  pub fn new(cl: SharedClient) -> UserService {
    let select = USER_COLUMNS.build_select_query();
    let get_users = VersionedStatement::new_ref(cl.clone(),
        &format!(r#"{} ORDER BY username"#, select));
    let user_by_username = VersionedStatement::new_ref(cl.clone(),
        &format!(r#"{} WHERE username = $1"#, select));

    UserService {
      get_users,
      user_by_username,
    }
  }

  pub async fn prepare(&self) -> Result<()> {
    self.get_users.prepare().await?;
    self.user_by_username.prepare().await?;

    Ok(())
  }

  pub async fn get_users(&self) -> Result<Vec<User>> {
    let rows = self.get_users.query(&[]).await?;
    Ok(rows.iter().map(user_from_row).collect())
  }

  pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
    let row = self.user_by_username.query_opt(&[&username]).await?;
    Ok(from_opt_row(&row, user_from_row))
  }
}
