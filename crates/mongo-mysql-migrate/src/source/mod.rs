//! Source store: streaming reads from MongoDB.

use async_trait::async_trait;
use bson::{doc, Document};
use futures_util::stream::BoxStream;
use futures_util::{StreamExt, TryStreamExt};
use mongodb::Client;
use tracing::info;

use crate::config::SourceConfig;
use crate::error::{MigrateError, Result};

/// Stream of raw documents from one source collection.
pub type DocumentStream = BoxStream<'static, Result<Document>>;

/// Read access to the source document store.
///
/// The interface is deliberately narrow: the migration only ever streams a
/// whole collection (no filter, no projection) and counts it.
#[async_trait]
pub trait SourceStore: Send + Sync {
    /// Stream every document of a collection in its natural order.
    async fn stream_collection(&self, collection: &str) -> Result<DocumentStream>;

    /// Count the documents of a collection.
    async fn count_documents(&self, collection: &str) -> Result<u64>;
}

/// MongoDB-backed source store.
pub struct MongoSource {
    db: mongodb::Database,
}

impl MongoSource {
    /// Connect to MongoDB and verify the connection with a ping.
    pub async fn connect(config: &SourceConfig) -> Result<Self> {
        let client = Client::with_uri_str(&config.uri).await?;
        let db = client.database(&config.database);
        db.run_command(doc! { "ping": 1 }).await?;

        info!(database = %config.database, "Connected to MongoDB source");
        Ok(Self { db })
    }

    /// Re-verify the connection.
    pub async fn ping(&self) -> Result<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

#[async_trait]
impl SourceStore for MongoSource {
    async fn stream_collection(&self, collection: &str) -> Result<DocumentStream> {
        let cursor = self
            .db
            .collection::<Document>(collection)
            .find(doc! {})
            .await?;
        Ok(cursor.map_err(MigrateError::from).boxed())
    }

    async fn count_documents(&self, collection: &str) -> Result<u64> {
        let count = self
            .db
            .collection::<Document>(collection)
            .count_documents(doc! {})
            .await?;
        Ok(count)
    }
}
