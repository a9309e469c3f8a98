use log::*;

use std::rc::Rc;
use std::cell::RefCell;
use std::time::Duration;

use tokio::time::sleep;

use tokio_postgres::{
  connect, Client, Statement, Row, NoTls,
  types::ToSql,
};

use crate::error::*;

use super::{
  TopicService,
  ArticleService,
  CommentService,
  UserService,
};

/// How many times (100ms apart) a request waits for the background
/// task to (re)connect before giving up.
const MAX_WAIT_RETRIES: u32 = 50;

pub type RefClient = Rc<(u64, Client)>;

/// Client connected state
#[derive(Clone)]
pub enum ClientState {
  Disconnected(u64),
  Connecting(u64),
  Connected(RefClient),
}

/// Wraps a postgres client with a version number.
/// Each time the client reconnects a new version number is generated.
pub struct VersionedClient {
  state: ClientState,
}

impl VersionedClient {
  pub fn new() -> Self {
    Self {
      state: ClientState::Disconnected(0),
    }
  }

  pub fn get_state(&self) -> &ClientState {
    &self.state
  }

  pub fn set_state(&mut self, state: ClientState) {
    self.state = state;
  }
}

/// A postgres client shared by all the table services of one worker.
/// Wraps a `VersionedClient`
#[derive(Clone)]
pub struct SharedClient {
  cl: Rc<RefCell<VersionedClient>>,
}

impl SharedClient {
  pub fn new(url: &str) -> Self {
    Self {
      cl: Rc::new(RefCell::new(VersionedClient::new())),
    }.start_client(url.to_string())
  }

  fn start_client(self, url: String) -> Self {
    let shared_cl = self.clone();
    actix_rt::spawn(async move {
      shared_cl.spawn_client(url).await;
      debug!("client background task stopped.");
    });
    self
  }

  async fn spawn_client(&self, url: String) {
    let mut version = 0;
    debug!("Spawned client background task: ver={}", version);
    loop {
      version += 1;
      debug!("client task: Connecting: ver={}", version);
      self.change_inner_state(ClientState::Connecting(version));
      let (cl, conn) = loop {
        match connect(&url, NoTls).await {
          Ok((cl, conn)) => {
            debug!("client task: ver={}: connected.", version);
            break (cl, conn);
          },
          Err(e) => {
            debug!("client task: ver={}: connect error: {}", version, e);
            sleep(Duration::from_millis(500)).await;
          },
        }
      };
      debug!("client task: ver={}: Connecting -> Connected", version);
      self.change_inner_state(ClientState::Connected(
        Rc::new((version, cl))
      ));
      // Drive the connection until it drops.
      match conn.await {
        Err(e) => {
          warn!("tokio-postgres connection error: {}", e);
        },
        _ => {
          debug!("tokio-postgres connection closed.");
          self.change_inner_state(ClientState::Disconnected(version));
          return;
        },
      }
      debug!("client task: ver={}: Connected -> Connecting", version);
      self.change_inner_state(ClientState::Disconnected(version));
      sleep(Duration::from_millis(500)).await;
    }
  }

  pub async fn get_client(&self) -> Result<RefClient> {
    let mut retries = 0u32;
    loop {
      match self.get_inner_state() {
        ClientState::Connected(cl) => return Ok(cl),
        ClientState::Connecting(version) => {
          debug!("get_client: ver={}: Connecting..", version);
        },
        ClientState::Disconnected(version) => {
          debug!("get_client: ver={}: Disconnected..", version);
        },
      }
      retries += 1;
      if retries >= MAX_WAIT_RETRIES {
        return Err(Error::DisconnectedError("Failed to connect to database".to_string()));
      }
      sleep(Duration::from_millis(100)).await;
    }
  }

  /// Check client version.
  pub fn check_version(&self, version: u64) -> bool {
    match self.cl.borrow().get_state() {
      ClientState::Connected(ref cl) => cl.0 == version,
      _ => false,
    }
  }

  fn get_inner_state(&self) -> ClientState {
    self.cl.borrow().get_state().clone()
  }

  fn change_inner_state(&self, state: ClientState) {
    self.cl.borrow_mut().set_state(state)
  }
}

pub type RefClientStatement = Rc<ClientStatement>;
#[derive(Clone)]
pub struct ClientStatement {
  cl: RefClient,
  statement: Statement,
}

impl ClientStatement {
  pub fn get_version(&self) -> u64 {
    self.cl.0
  }

  pub fn get_cl_statement(&self) -> (&Client, &Statement) {
    (&self.cl.1, &self.statement)
  }
}

/// Prepare statement state
#[derive(Clone)]
enum StatementState {
  Init(u64),
  Preparing(u64),
  Prepared(RefClientStatement),
}

/// A prepared statement bound to the current client version.
/// Re-prepared on first use after the client reconnects.
pub struct VersionedStatement {
  /// Shared Client, used for checking the version.
  shared_cl: SharedClient,

  /// Current version and statement state.
  state: RefCell<StatementState>,

  /// Statement query
  query: String,
}

pub type RefStatement = Rc<VersionedStatement>;

/// Holds a statement in `Preparing` while its prepare is in flight.
/// Dropped without `finish` (prepare failed or the request future was
/// dropped mid-prepare) it goes back to `Init`, so the next caller prepares.
struct PrepareGuard<'a> {
  statement: &'a VersionedStatement,
  version: u64,
  done: bool,
}

impl<'a> PrepareGuard<'a> {
  fn start(statement: &'a VersionedStatement, version: u64) -> Self {
    statement.set_state(StatementState::Preparing(version));
    Self {
      statement,
      version,
      done: false,
    }
  }

  fn finish(mut self, state: StatementState) {
    self.statement.set_state(state);
    self.done = true;
  }
}

impl<'a> Drop for PrepareGuard<'a> {
  fn drop(&mut self) {
    if !self.done {
      debug!("get_statement: ver={}: prepare abandoned, Preparing -> Init", self.version);
      self.statement.set_state(StatementState::Init(self.version));
    }
  }
}

// Statements run exactly once. A failure (including a dropped connection)
// fails the request, the background task takes care of reconnecting.
macro_rules! impl_client_method {
  ($method:ident, $res_ty:ty) => {
    pub async fn $method(&self, params: &[&(dyn ToSql + Sync)]) -> Result<$res_ty> {
      let ref_statement = self.get_statement().await?;
      let (cl, statement) = ref_statement.get_cl_statement();

      match cl.$method(statement, params).await {
        Ok(res) => Ok(res),
        Err(err) => {
          if err.is_closed() {
            info!("DB connection closed during query=[[{}]]", self.query);
            return Err(Error::DisconnectedError("Lost connection to database".to_string()));
          }
          debug!("Postgres error: {}, query=[[{}]]", err, self.query);
          Err(err.into())
        },
      }
    }
  };
}

impl VersionedStatement {
  pub fn new(shared_cl: SharedClient, query: &str) -> Self {
    Self {
      shared_cl,
      state: RefCell::new(StatementState::Init(0)),
      query: query.to_string(),
    }
  }

  pub fn new_ref(shared_cl: SharedClient, query: &str) -> RefStatement {
    Rc::new(Self::new(shared_cl, query))
  }

  pub async fn prepare(&self) -> Result<()> {
    self.get_statement().await?;
    Ok(())
  }

  pub async fn get_statement(&self) -> Result<RefClientStatement> {
    let mut retries = 0u32;
    loop {
      match self.get_state() {
        StatementState::Init(version) => {
          debug!("get_statement: ver={}: Init -> Preparing. Get client", version);
          let cl = match self.shared_cl.get_client().await {
            Ok(cl) => cl,
            Err(err) => {
              debug!("get_statement: ver={}: Init error: {:?}", version, err);
              return Err(err);
            },
          };
          let version = cl.0;
          let guard = PrepareGuard::start(self, version);
          match cl.1.prepare(&self.query).await {
            Ok(statement) => {
              debug!("get_statement: ver={}: Preparing -> Prepared.", version);
              let prepared = Rc::new(ClientStatement {
                cl,
                statement,
              });
              guard.finish(StatementState::Prepared(prepared.clone()));
              return Ok(prepared);
            },
            Err(err) => {
              drop(guard);
              if err.is_closed() {
                return Err(Error::DisconnectedError("Lost connection to database".to_string()));
              }
              error!("Postgres prepare error: {}, query=[[{}]]", err, self.query);
              return Err(Error::PgError { source: err });
            },
          }
        },
        StatementState::Preparing(version) => {
          // Another request on this worker is preparing it.
          debug!("get_statement: ver={}: Preparing..", version);
          sleep(Duration::from_millis(10)).await;
        },
        StatementState::Prepared(cl_statement) => {
          let version = cl_statement.get_version();
          if self.shared_cl.check_version(version) {
            return Ok(cl_statement);
          }
          debug!("get_statement: ver={}: stale client, re-prepare", version);
          self.set_state(StatementState::Init(version));
        },
      }
      retries += 1;
      if retries >= MAX_WAIT_RETRIES * 10 {
        return Err(Error::DisconnectedError("Failed to prepare statement".to_string()));
      }
    }
  }

  fn get_state(&self) -> StatementState {
    self.state.borrow().clone()
  }

  fn set_state(&self, state: StatementState) {
    self.state.replace(state);
  }

  impl_client_method!(query, Vec<Row>);
  impl_client_method!(query_one, Row);
  impl_client_method!(query_opt, Option<Row>);
  impl_client_method!(execute, u64);
}

/// Per worker database access: one shared client and a service per table.
#[derive(Clone)]
pub struct DbService {
  pub shared_cl: SharedClient,
  pub topic: TopicService,
  pub article: ArticleService,
  pub comment: CommentService,
  pub user: UserService,
}

impl DbService {
  pub fn new(db_url: &str) -> DbService {
    let shared_cl = SharedClient::new(db_url);

    DbService {
      topic: TopicService::new(shared_cl.clone()),
      article: ArticleService::new(shared_cl.clone()),
      comment: CommentService::new(shared_cl.clone()),
      user: UserService::new(shared_cl.clone()),
      shared_cl,
    }
  }

  /// Prepare every fixed statement, surfacing SQL errors at startup.
  pub async fn prepare(&self) -> Result<()> {
    info!("DBService: Prepare TopicService.");
    self.topic.prepare().await?;
    info!("DBService: Prepare ArticleService.");
    self.article.prepare().await?;
    info!("DBService: Prepare CommentService.");
    self.comment.prepare().await?;
    info!("DBService: Prepare UserService.");
    self.user.prepare().await?;

    info!("DBService: finished.");
    Ok(())
  }
}
