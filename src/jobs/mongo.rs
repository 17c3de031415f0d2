use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Client, Collection};
use uuid::Uuid;

use super::entry::{EmailJob, NewEmailJob};
use super::store::{JobStore, StoreError};

const DEFAULT_DATABASE: &str = "sendlater";
const COLLECTION: &str = "jobs";

/// MongoDB-backed [`JobStore`].
///
/// One document per job; the driver's serde integration maps [`EmailJob`]
/// directly, with attachment bytes landing as BSON binary. The database
/// comes from the connection string path, falling back to `sendlater`.
#[derive(Clone)]
pub struct MongoStore {
    jobs: Collection<EmailJob>,
}

impl MongoStore {
    /// Connect and ping, so an unreachable database fails at boot rather
    /// than on the first request.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(url).await?;
        let db = client
            .default_database()
            .unwrap_or_else(|| client.database(DEFAULT_DATABASE));
        db.run_command(doc! { "ping": 1 }).await?;

        Ok(Self {
            jobs: db.collection(COLLECTION),
        })
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

#[async_trait]
impl JobStore for MongoStore {
    async fn create(&self, new: NewEmailJob) -> Result<EmailJob, StoreError> {
        let job = new.with_id(Uuid::new_v4());
        self.jobs.insert_one(&job).await?;
        Ok(job)
    }

    async fn list(&self) -> Result<Vec<EmailJob>, StoreError> {
        let cursor = self.jobs.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn get(&self, id: Uuid) -> Result<EmailJob, StoreError> {
        self.jobs
            .find_one(doc! { "id": id.to_string() })
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<EmailJob, StoreError> {
        self.jobs
            .find_one_and_delete(doc! { "id": id.to_string() })
            .await?
            .ok_or(StoreError::NotFound)
    }
}
