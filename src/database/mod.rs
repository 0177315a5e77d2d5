use std::time::Duration;

use derive_new::new;
use serde::Deserialize;
use snafu::{Location, ResultExt as _, Snafu};
use surrealdb::{
    engine::any::Any,
    opt::{
        auth::{self, Credentials, Jwt, Signin},
        IntoQuery, QueryResult,
    },
    Surreal,
};
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;
use url::Url;

pub use surrealdb::sql::Thing;

use crate::Located;

/// Macros for defining table methods.
pub mod macros;

mod store;

pub type Result<T, E = DatabaseError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DatabaseError {
    #[snafu(display("failed to query the database at {location}: {source}"))]
    DatabaseQuery {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("failed to deserialize the database response at {location}: {source}"))]
    DatabaseDeserialize {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("failed to parse the database response at {location}: response is empty"))]
    EmptyQuery {
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("cannot connect to the database `{url}` at {location}: {source}"))]
    DatabaseConnection {
        url: Url,
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },
}

impl Located for DatabaseError {
    fn location(&self) -> Location {
        match self {
            DatabaseError::DatabaseQuery { location, .. }
            | DatabaseError::DatabaseDeserialize { location, .. }
            | DatabaseError::EmptyQuery { location, .. }
            | DatabaseError::DatabaseConnection { location, .. } => *location,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(rename = "surreal_url")]
    pub url: Url,
    #[serde(rename = "surreal_ns", default = "default_scope")]
    pub namespace: String,
    #[serde(rename = "surreal_db", default = "default_scope")]
    pub database: String,
    #[serde(flatten)]
    pub credentials: Option<DatabaseCredentials>,
}

fn default_scope() -> String {
    "skillery".to_owned()
}

#[derive(Debug, Deserialize, Clone, new)]
pub struct DatabaseCredentials {
    #[serde(rename = "surreal_user")]
    pub username: String,
    #[serde(rename = "surreal_pass")]
    pub password: String,
}

impl DatabaseCredentials {
    fn auth<'a>(
        &'a self, namespace: &'a str, database: &'a str,
    ) -> impl Credentials<Signin, Jwt> + 'a {
        auth::Database {
            namespace,
            database,
            username: &self.username,
            password: &self.password,
        }
    }
}

/// Represents a database wrapper.
///
/// This struct provides a wrapper around a database, allowing for easier interaction and abstraction.
#[derive(Debug, Clone, new)]
pub struct Database {
    database: Surreal<Any>,
}

impl Database {
    /// Connects to the database at `config.url`, signs in if credentials are configured and
    /// selects the configured namespace and database.
    ///
    /// Any engine compiled into surrealdb is accepted, e.g. `mem://` for an in-process store.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let url = &config.url;
        let db = surrealdb::engine::any::connect(url.as_str())
            .await
            .context(DatabaseConnectionSnafu { url: url.clone() })?;

        if let Some(credentials) = &config.credentials {
            db.signin(credentials.auth(&config.namespace, &config.database))
                .await
                .context(DatabaseConnectionSnafu { url: url.clone() })?;
        }

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .context(DatabaseConnectionSnafu { url: url.clone() })?;

        tracing::info!(%url, namespace = %config.namespace, database = %config.database, "connected to the database");
        Ok(Database::new(db))
    }

    /// [Database::connect] with exponential backoff, giving up after `attempts` retries.
    pub async fn connect_with_retry(config: &DatabaseConfig, attempts: usize) -> Result<Self> {
        let strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(5))
            .map(jitter)
            .take(attempts);

        Retry::spawn(strategy, move || async move {
            Self::connect(config).await.inspect_err(|error| {
                tracing::warn!(%error, "could not connect to the database, retrying");
            })
        })
        .await
    }

    /// Create a builder to execute arbitrary SQL code on the database.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let recent: Vec<SnapshotRow> = db.sql("SELECT * FROM stats ORDER BY created_at DESC LIMIT $limit")
    ///                 .bind(("limit", 12))
    ///                 .fetch().await?;
    /// ```
    ///
    /// The `fetch` method can deserialize the result into either a single value (`Option<T>`) or a collection of values (`Vec<T>`).
    pub fn sql(&self, query: impl IntoQuery) -> Query<'_> {
        let query = self.database.query(query);
        Query { query }
    }
}

impl std::ops::Deref for Database {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.database
    }
}

#[derive(Debug)]
pub struct Query<'a> {
    query: surrealdb::method::Query<'a, Any>,
}

impl Query<'_> {
    pub fn bind(mut self, params: impl serde::Serialize) -> Self {
        let query = self.query;
        self.query = query.bind(params);
        self
    }

    pub async fn fetch<T: serde::de::DeserializeOwned>(self) -> Result<T>
    where
        usize: QueryResult<T>,
    {
        let mut statements = self.query.await.context(DatabaseQuerySnafu)?;
        tracing::trace!(?statements, "executed query");
        let result = statements.take::<T>(0).context(DatabaseDeserializeSnafu)?;
        Ok(result)
    }
}
