//! Identity lookup trait and implementations.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use common::UserId;
use serde::Deserialize;

use crate::remote::{RemoteError, check_status};

/// User data returned by the identity service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Trait for user existence lookups.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Fetches a user by id, or `RemoteError::NotFound` when absent.
    async fn get_user(&self, id: UserId) -> Result<UserRecord, RemoteError>;
}

#[derive(Debug, Default)]
struct InMemoryIdentityState {
    users: HashMap<i64, UserRecord>,
    fail_on_lookup: bool,
}

/// In-memory identity service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityService {
    state: Arc<RwLock<InMemoryIdentityState>>,
}

impl InMemoryIdentityService {
    /// Creates a new empty identity service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user.
    pub fn add_user(&self, record: UserRecord) {
        self.state
            .write()
            .unwrap()
            .users
            .insert(record.id.as_i64(), record);
    }

    /// Registers a user with placeholder contact data.
    pub fn add_user_id(&self, id: UserId) {
        self.add_user(UserRecord {
            id,
            email: format!("user{id}@example.com"),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
        });
    }

    /// Configures the service to fail lookups as if unreachable.
    pub fn set_fail_on_lookup(&self, fail: bool) {
        self.state.write().unwrap().fail_on_lookup = fail;
    }
}

#[async_trait]
impl IdentityService for InMemoryIdentityService {
    async fn get_user(&self, id: UserId) -> Result<UserRecord, RemoteError> {
        let state = self.state.read().unwrap();
        if state.fail_on_lookup {
            return Err(RemoteError::unavailable("identity service down"));
        }
        state
            .users
            .get(&id.as_i64())
            .cloned()
            .ok_or(RemoteError::NotFound)
    }
}

/// Wire shape of the identity service's user payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDto {
    id: i64,
    email: String,
    first_name: String,
    last_name: String,
}

/// HTTP client for a remote identity service.
#[derive(Debug, Clone)]
pub struct HttpIdentityService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIdentityService {
    /// Creates a client with a bounded per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl IdentityService for HttpIdentityService {
    async fn get_user(&self, id: UserId) -> Result<UserRecord, RemoteError> {
        let url = format!("{}/api/users/{id}", self.base_url);
        let response = self.client.get(&url).send().await?;
        let dto: UserDto = check_status(response)?.json().await?;
        Ok(UserRecord {
            id: UserId::new(dto.id),
            email: dto.email,
            first_name: dto.first_name,
            last_name: dto.last_name,
        })
    }
}
