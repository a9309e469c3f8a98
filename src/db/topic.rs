use crate::error::*;

use crate::models::*;
use crate::forms::topic::*;

use crate::db::*;
use crate::db::util::*;

use tokio_postgres::Row;

#[derive(Clone)]
pub struct TopicService {
  // get all topics
  get_topics: RefStatement,

  // store topic
  store_topic: RefStatement,
}

lazy_static! {
  static ref TOPIC_COLUMNS: ColumnMappers = {
    ColumnMappers {
      table_name: "topics",
      columns: vec![
        primary("slug"),
        column("description"),
      ],
    }
  };
}

fn topic_from_row(row: &Row) -> Topic {
  Topic {
    slug: row.get("slug"),
    description: row.get("description"),
  }
}

impl TopicService {
  pub fn new(cl: SharedClient) -> TopicService {
    let get_topics = VersionedStatement::new_ref(cl.clone(),
        &format!("{} ORDER BY slug", TOPIC_COLUMNS.build_select_query()));

    let store_topic = VersionedStatement::new_ref(cl.clone(),
        &TOPIC_COLUMNS.build_insert_query());

    TopicService {
      get_topics,
      store_topic,
    }
  }

  pub async fn prepare(&self) -> Result<()> {
    self.get_topics.prepare().await?;
    self.store_topic.prepare().await?;
    Ok(())
  }

  pub async fn get_topics(&self) -> Result<TopicList> {
    let rows = self.get_topics.query(&[]).await?;
    Ok(TopicList {
      topics: rows.iter().map(topic_from_row).collect(),
    })
  }

  pub async fn store(&self, topic: &CreateTopic) -> Result<Topic> {
    let row = self.store_topic.query_one(&[&topic.slug, &topic.description]).await?;
    Ok(topic_from_row(&row))
  }
}
