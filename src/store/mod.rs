//! In-memory entity store with write-through persistence.
//!
//! Every collection lives in memory behind one `RwLock`. A mutation builds the
//! new collection, persists it to local storage together with a revision
//! bump, and only then swaps it into memory, so a failed write leaves the
//! store as it was.

use chrono::Utc;
use tokio::sync::RwLock;

use crate::db::LocalStorage;
use crate::errors::AppError;
use crate::models::{
    new_id, Category, Collections, Course, Datastore, Ebook, Entity, Job, Lecture, RevisionInfo,
    Subscription, User,
};

pub struct Store {
    storage: LocalStorage,
    state: RwLock<Datastore>,
}

impl Store {
    /// Load every collection from local storage.
    ///
    /// A missing key is an empty collection; a value that does not parse is
    /// a storage error.
    pub async fn open(storage: LocalStorage) -> Result<Self, AppError> {
        let schema_version = storage.schema_version().await?;
        let revision = storage.revision_info().await?;

        let collections = Collections {
            categories: load::<Category>(&storage).await?,
            courses: load::<Course>(&storage).await?,
            lectures: load::<Lecture>(&storage).await?,
            jobs: load::<Job>(&storage).await?,
            ebooks: load::<Ebook>(&storage).await?,
            users: load::<User>(&storage).await?,
            subscriptions: load::<Subscription>(&storage).await?,
        };

        for key in storage.keys().await? {
            if !Collections::KEYS.iter().any(|known| *known == key.as_str()) {
                tracing::warn!(key = %key, "Ignoring unknown local storage key");
            }
        }

        tracing::info!(
            revision_id = revision.revision_id,
            courses = collections.courses.len(),
            users = collections.users.len(),
            "Store loaded"
        );

        Ok(Self {
            storage,
            state: RwLock::new(Datastore {
                schema_version,
                generated_at: revision.generated_at,
                revision_id: revision.revision_id,
                collections,
            }),
        })
    }

    pub async fn revision_id(&self) -> i64 {
        self.state.read().await.revision_id
    }

    pub async fn revision_info(&self) -> RevisionInfo {
        let state = self.state.read().await;
        RevisionInfo {
            revision_id: state.revision_id,
            generated_at: state.generated_at.clone(),
        }
    }

    /// Snapshot of the whole datastore.
    pub async fn datastore(&self) -> Datastore {
        self.state.read().await.clone()
    }

    /// Run `f` against the collections under a single read lock, returning
    /// its result together with the revision it was read at.
    pub async fn read<R>(&self, f: impl FnOnce(&Collections) -> R) -> (R, i64) {
        let state = self.state.read().await;
        (f(&state.collections), state.revision_id)
    }

    pub async fn list<E: Entity>(&self) -> (Vec<E>, i64) {
        self.read(|c| E::collection(c).clone()).await
    }

    pub async fn get<E: Entity>(&self, id: &str) -> (Option<E>, i64) {
        self.read(|c| E::collection(c).iter().find(|item| item.id() == id).cloned())
            .await
    }

    /// Validate and append a new record.
    pub async fn create<E: Entity>(&self, request: E::Create) -> Result<E, AppError> {
        E::validate(&request)?;

        let mut state = self.state.write().await;
        let mut items = E::collection(&state.collections).clone();

        let mut id = new_id();
        while items.iter().any(|item| item.id() == id) {
            id = new_id();
        }
        let record = E::create(id, Utc::now().to_rfc3339(), request);
        items.push(record.clone());

        self.persist(&mut state, items).await?;
        tracing::info!(collection = E::COLLECTION, id = record.id(), "Created record");
        Ok(record)
    }

    /// Merge `request` into the record with `id`; other records are untouched.
    pub async fn update<E: Entity>(&self, id: &str, request: E::Update) -> Result<E, AppError> {
        let mut state = self.state.write().await;
        let mut items = E::collection(&state.collections).clone();

        let record = items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or_else(|| not_found::<E>(id))?;

        if let Some(expected) = E::expected_version(&request) {
            if record.version() != expected {
                return Err(AppError::Conflict {
                    message: format!(
                        "Version mismatch: expected {}, current {}",
                        expected,
                        record.version()
                    ),
                    current_version: record.version(),
                });
            }
        }

        record.apply(request)?;
        let version = record.version() + 1;
        record.stamp(Utc::now().to_rfc3339(), version);
        let updated = record.clone();

        self.persist(&mut state, items).await?;
        tracing::info!(
            collection = E::COLLECTION,
            id = id,
            version = version,
            "Updated record"
        );
        Ok(updated)
    }

    /// Remove exactly the record with `id`. References to it elsewhere stay.
    pub async fn delete<E: Entity>(&self, id: &str) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        let mut items = E::collection(&state.collections).clone();

        let index = items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| not_found::<E>(id))?;
        items.remove(index);

        self.persist(&mut state, items).await?;
        tracing::info!(collection = E::COLLECTION, id = id, "Deleted record");
        Ok(())
    }

    /// Replace every collection at once.
    pub async fn import(&self, collections: Collections) -> Result<Datastore, AppError> {
        collections.check_unique_ids()?;

        let entries = vec![
            encode(&collections.categories)?,
            encode(&collections.courses)?,
            encode(&collections.lectures)?,
            encode(&collections.jobs)?,
            encode(&collections.ebooks)?,
            encode(&collections.users)?,
            encode(&collections.subscriptions)?,
        ];

        let mut state = self.state.write().await;
        let revision = self.storage.commit(&entries).await?;
        state.collections = collections;
        state.revision_id = revision.revision_id;
        state.generated_at = revision.generated_at;

        tracing::info!(revision_id = state.revision_id, "Imported datastore");
        Ok(state.clone())
    }

    async fn persist<E: Entity>(&self, state: &mut Datastore, items: Vec<E>) -> Result<(), AppError> {
        let entry = encode(&items)?;
        let revision = self.storage.commit(&[entry]).await?;

        *E::collection_mut(&mut state.collections) = items;
        state.revision_id = revision.revision_id;
        state.generated_at = revision.generated_at;
        Ok(())
    }
}

async fn load<E: Entity>(storage: &LocalStorage) -> Result<Vec<E>, AppError> {
    match storage.get_item(E::COLLECTION).await? {
        Some(raw) => serde_json::from_str(&raw).map_err(|e| {
            AppError::Storage(format!("Corrupt {} in local storage: {}", E::COLLECTION, e))
        }),
        None => Ok(Vec::new()),
    }
}

fn encode<E: Entity>(items: &[E]) -> Result<(&'static str, String), AppError> {
    let value = serde_json::to_string(items)
        .map_err(|e| AppError::Internal(format!("Failed to encode {}: {}", E::COLLECTION, e)))?;
    Ok((E::COLLECTION, value))
}

fn not_found<E: Entity>(id: &str) -> AppError {
    AppError::NotFound(format!("{} {} not found", E::LABEL, id))
}
