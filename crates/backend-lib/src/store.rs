// ============================
// goaltrack-backend-lib/src/store.rs
// ============================
//! Store abstraction with in-memory and flat-file implementations.
//!
//! The store is the single source of truth for identity uniqueness:
//! `create_identity` re-checks under a write lock, so the second of
//! two concurrent duplicate registrations fails here even if both
//! passed the auth-flow pre-check.
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::{fs as tokio_fs, sync::Mutex};
use uuid::Uuid;

use crate::error::AppError;
use goaltrack_common::{Goal, PublicIdentity};

/// A registered identity as persisted. Never leaves the server; the
/// outbound view is [`PublicIdentity`], which has no hash field.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct IdentityRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&IdentityRecord> for PublicIdentity {
    fn from(record: &IdentityRecord) -> Self {
        PublicIdentity {
            id: record.id,
            username: record.username.clone(),
            email: record.email.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Input for identity creation (inputs already validated and the
/// email already normalized by the auth flow)
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Input for goal creation
#[derive(Debug, Clone)]
pub struct NewGoal {
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub target_date: Option<NaiveDate>,
    pub progress: u8,
}

/// Partial goal update; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct GoalPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub progress: Option<u8>,
}

impl GoalPatch {
    fn apply(&self, goal: &mut Goal) {
        if let Some(title) = &self.title {
            goal.title = title.clone();
        }
        if let Some(description) = &self.description {
            goal.description = description.clone();
        }
        if let Some(target_date) = self.target_date {
            goal.target_date = Some(target_date);
        }
        if let Some(progress) = self.progress {
            goal.progress = progress;
        }
        goal.updated_at = Utc::now();
    }
}

/// Trait for storage backends
#[async_trait]
pub trait Store: Send + Sync {
    /// Persist a new identity. Fails with `Conflict` if the email or
    /// username is already taken.
    async fn create_identity(&self, new: NewIdentity) -> Result<IdentityRecord, AppError>;

    /// Look up an identity by normalized email, hash included
    async fn find_identity_by_email(
        &self,
        email: &str,
    ) -> Result<Option<IdentityRecord>, AppError>;

    /// Look up an identity by id, hash included
    async fn find_identity_by_id(&self, id: Uuid) -> Result<Option<IdentityRecord>, AppError>;

    /// Persist a new goal for its owner
    async fn create_goal(&self, new: NewGoal) -> Result<Goal, AppError>;

    /// All goals belonging to `owner_id`
    async fn list_goals(&self, owner_id: Uuid) -> Result<Vec<Goal>, AppError>;

    /// A single goal, owner-scoped: a goal belonging to someone else
    /// is indistinguishable from a missing one
    async fn find_goal(&self, owner_id: Uuid, goal_id: Uuid) -> Result<Option<Goal>, AppError>;

    /// Apply a partial update to an owner's goal
    async fn update_goal(
        &self,
        owner_id: Uuid,
        goal_id: Uuid,
        patch: GoalPatch,
    ) -> Result<Option<Goal>, AppError>;

    /// Delete an owner's goal; returns whether anything was removed
    async fn delete_goal(&self, owner_id: Uuid, goal_id: Uuid) -> Result<bool, AppError>;
}

fn build_goal(new: NewGoal) -> Goal {
    let now = Utc::now();
    Goal {
        id: Uuid::new_v4(),
        owner_id: new.owner_id,
        title: new.title,
        description: new.description,
        target_date: new.target_date,
        progress: new.progress,
        created_at: now,
        updated_at: now,
    }
}

fn build_identity(new: NewIdentity) -> IdentityRecord {
    let now = Utc::now();
    IdentityRecord {
        id: Uuid::new_v4(),
        username: new.username,
        email: new.email,
        password_hash: new.password_hash,
        created_at: now,
        updated_at: now,
    }
}

const DUPLICATE_EMAIL: &str = "User already exists with this email";
const DUPLICATE_USERNAME: &str = "Username is already taken";

// ----------------------------------------------------------------------------
// In-memory store
// ----------------------------------------------------------------------------

/// `DashMap`-backed store for tests and ephemeral runs
#[derive(Default)]
pub struct MemoryStore {
    identities: DashMap<Uuid, IdentityRecord>,
    goals: DashMap<Uuid, Goal>,
    // serializes creations; the uniqueness scan must not race a write
    create_lock: Mutex<()>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_identity(&self, new: NewIdentity) -> Result<IdentityRecord, AppError> {
        let _guard = self.create_lock.lock().await;

        for entry in self.identities.iter() {
            if entry.email == new.email {
                return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
            }
            if entry.username == new.username {
                return Err(AppError::Conflict(DUPLICATE_USERNAME.to_string()));
            }
        }

        let record = build_identity(new);
        self.identities.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_identity_by_email(
        &self,
        email: &str,
    ) -> Result<Option<IdentityRecord>, AppError> {
        Ok(self
            .identities
            .iter()
            .find(|entry| entry.email == email)
            .map(|entry| entry.value().clone()))
    }

    async fn find_identity_by_id(&self, id: Uuid) -> Result<Option<IdentityRecord>, AppError> {
        Ok(self.identities.get(&id).map(|entry| entry.value().clone()))
    }

    async fn create_goal(&self, new: NewGoal) -> Result<Goal, AppError> {
        let goal = build_goal(new);
        self.goals.insert(goal.id, goal.clone());
        Ok(goal)
    }

    async fn list_goals(&self, owner_id: Uuid) -> Result<Vec<Goal>, AppError> {
        let mut goals: Vec<Goal> = self
            .goals
            .iter()
            .filter(|entry| entry.owner_id == owner_id)
            .map(|entry| entry.value().clone())
            .collect();
        goals.sort_by_key(|goal| goal.created_at);
        Ok(goals)
    }

    async fn find_goal(&self, owner_id: Uuid, goal_id: Uuid) -> Result<Option<Goal>, AppError> {
        Ok(self
            .goals
            .get(&goal_id)
            .filter(|entry| entry.owner_id == owner_id)
            .map(|entry| entry.value().clone()))
    }

    async fn update_goal(
        &self,
        owner_id: Uuid,
        goal_id: Uuid,
        patch: GoalPatch,
    ) -> Result<Option<Goal>, AppError> {
        match self.goals.get_mut(&goal_id) {
            Some(mut entry) if entry.owner_id == owner_id => {
                patch.apply(entry.value_mut());
                Ok(Some(entry.value().clone()))
            },
            _ => Ok(None),
        }
    }

    async fn delete_goal(&self, owner_id: Uuid, goal_id: Uuid) -> Result<bool, AppError> {
        Ok(self
            .goals
            .remove_if(&goal_id, |_, goal| goal.owner_id == owner_id)
            .is_some())
    }
}

// ----------------------------------------------------------------------------
// Flat-file store
// ----------------------------------------------------------------------------

/// Flat-file implementation of the `Store` trait.
///
/// Layout under the data directory:
/// `identities/<id>.json` and `goals/<owner_id>/<goal_id>.json`.
#[derive(Clone)]
pub struct FlatFileStore {
    root: PathBuf,
    create_lock: std::sync::Arc<Mutex<()>>,
}

impl FlatFileStore {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(root.join("identities"))?;
        std::fs::create_dir_all(root.join("goals"))?;
        Ok(Self {
            root,
            create_lock: std::sync::Arc::new(Mutex::new(())),
        })
    }

    fn identity_path(&self, id: Uuid) -> PathBuf {
        self.root.join("identities").join(format!("{id}.json"))
    }

    fn goal_path(&self, owner_id: Uuid, goal_id: Uuid) -> PathBuf {
        self.root
            .join("goals")
            .join(owner_id.to_string())
            .join(format!("{goal_id}.json"))
    }

    async fn read_identity(&self, path: &Path) -> Result<IdentityRecord, AppError> {
        let content = tokio_fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    async fn scan_identities(
        &self,
        matches: impl Fn(&IdentityRecord) -> bool,
    ) -> Result<Option<IdentityRecord>, AppError> {
        let dir = self.root.join("identities");
        let mut entries = tokio_fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let record = self.read_identity(&entry.path()).await?;
            if matches(&record) {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    async fn write_goal(&self, goal: &Goal) -> Result<(), AppError> {
        let path = self.goal_path(goal.owner_id, goal.id);
        tokio_fs::create_dir_all(path.parent().unwrap()).await?;
        tokio_fs::write(path, serde_json::to_string_pretty(goal)?).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for FlatFileStore {
    async fn create_identity(&self, new: NewIdentity) -> Result<IdentityRecord, AppError> {
        // The scan and the write happen under the same lock; this is
        // the storage-layer uniqueness constraint the pre-check
        // depends on.
        let _guard = self.create_lock.lock().await;

        let email = new.email.clone();
        let username = new.username.clone();
        if let Some(existing) = self
            .scan_identities(|record| record.email == email || record.username == username)
            .await?
        {
            if existing.email == new.email {
                return Err(AppError::Conflict(DUPLICATE_EMAIL.to_string()));
            }
            return Err(AppError::Conflict(DUPLICATE_USERNAME.to_string()));
        }

        let record = build_identity(new);
        let path = self.identity_path(record.id);
        tokio_fs::write(path, serde_json::to_string_pretty(&record)?).await?;
        Ok(record)
    }

    async fn find_identity_by_email(
        &self,
        email: &str,
    ) -> Result<Option<IdentityRecord>, AppError> {
        self.scan_identities(|record| record.email == email).await
    }

    async fn find_identity_by_id(&self, id: Uuid) -> Result<Option<IdentityRecord>, AppError> {
        let path = self.identity_path(id);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(self.read_identity(&path).await?))
    }

    async fn create_goal(&self, new: NewGoal) -> Result<Goal, AppError> {
        let goal = build_goal(new);
        self.write_goal(&goal).await?;
        Ok(goal)
    }

    async fn list_goals(&self, owner_id: Uuid) -> Result<Vec<Goal>, AppError> {
        let dir = self.root.join("goals").join(owner_id.to_string());
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut goals = Vec::new();
        let mut entries = tokio_fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let content = tokio_fs::read_to_string(entry.path()).await?;
            goals.push(serde_json::from_str(&content)?);
        }
        goals.sort_by_key(|goal: &Goal| goal.created_at);
        Ok(goals)
    }

    async fn find_goal(&self, owner_id: Uuid, goal_id: Uuid) -> Result<Option<Goal>, AppError> {
        let path = self.goal_path(owner_id, goal_id);
        if !path.exists() {
            return Ok(None);
        }
        let content = tokio_fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn update_goal(
        &self,
        owner_id: Uuid,
        goal_id: Uuid,
        patch: GoalPatch,
    ) -> Result<Option<Goal>, AppError> {
        let Some(mut goal) = self.find_goal(owner_id, goal_id).await? else {
            return Ok(None);
        };
        patch.apply(&mut goal);
        self.write_goal(&goal).await?;
        Ok(Some(goal))
    }

    async fn delete_goal(&self, owner_id: Uuid, goal_id: Uuid) -> Result<bool, AppError> {
        let path = self.goal_path(owner_id, goal_id);
        if !path.exists() {
            return Ok(false);
        }
        tokio_fs::remove_file(path).await?;
        Ok(true)
    }
}
