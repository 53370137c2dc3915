//! In-memory user, group and category directory.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{CategoryId, GroupId, UserId},
    ports::{
        CategoryLookup, GroupLookup, ReferenceLookupError, ReferenceLookupResult, UserLookup,
    },
};

/// Thread-safe set of known users, groups and categories.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    state: Arc<RwLock<DirectoryState>>,
}

#[derive(Debug, Default)]
struct DirectoryState {
    users: HashSet<UserId>,
    groups: HashSet<GroupId>,
    categories: HashSet<CategoryId>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new user and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceLookupError`] when the directory lock is poisoned.
    pub fn add_user(&self) -> ReferenceLookupResult<UserId> {
        let user_id = UserId::new();
        self.write(|state| state.users.insert(user_id))?;
        Ok(user_id)
    }

    /// Registers a new group and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceLookupError`] when the directory lock is poisoned.
    pub fn add_group(&self) -> ReferenceLookupResult<GroupId> {
        let group_id = GroupId::new();
        self.write(|state| state.groups.insert(group_id))?;
        Ok(group_id)
    }

    /// Registers a new category and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceLookupError`] when the directory lock is poisoned.
    pub fn add_category(&self) -> ReferenceLookupResult<CategoryId> {
        let category_id = CategoryId::new();
        self.write(|state| state.categories.insert(category_id))?;
        Ok(category_id)
    }

    fn write<T>(&self, f: impl FnOnce(&mut DirectoryState) -> T) -> ReferenceLookupResult<T> {
        let mut state = self.state.write().map_err(|err| {
            ReferenceLookupError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(f(&mut state))
    }

    fn read<T>(&self, f: impl FnOnce(&DirectoryState) -> T) -> ReferenceLookupResult<T> {
        let state = self.state.read().map_err(|err| {
            ReferenceLookupError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(f(&state))
    }
}

#[async_trait]
impl UserLookup for InMemoryDirectory {
    async fn user_exists(&self, user_id: UserId) -> ReferenceLookupResult<bool> {
        self.read(|state| state.users.contains(&user_id))
    }
}

#[async_trait]
impl GroupLookup for InMemoryDirectory {
    async fn group_exists(&self, group_id: GroupId) -> ReferenceLookupResult<bool> {
        self.read(|state| state.groups.contains(&group_id))
    }
}

#[async_trait]
impl CategoryLookup for InMemoryDirectory {
    async fn category_exists(&self, category_id: CategoryId) -> ReferenceLookupResult<bool> {
        self.read(|state| state.categories.contains(&category_id))
    }
}
