//! Storage of per-user profiles.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::types::UserProfile;

/// Backing store for user profiles, keyed by user id.
///
/// Profiles are exchanged by value; the in-memory map is one interchangeable
/// implementation.
pub trait PreferenceRepository: Send + Sync {
    fn load(&self, user_id: &str) -> Option<UserProfile>;

    fn store(&self, user_id: &str, profile: UserProfile);

    /// Returns true if a profile existed
    fn remove(&self, user_id: &str) -> bool;

    fn user_count(&self) -> usize;
}

/// Process-memory repository; nothing survives a restart
#[derive(Debug, Default)]
pub struct InMemoryPreferenceRepository {
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl InMemoryPreferenceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceRepository for InMemoryPreferenceRepository {
    fn load(&self, user_id: &str) -> Option<UserProfile> {
        self.profiles.read().get(user_id).cloned()
    }

    fn store(&self, user_id: &str, profile: UserProfile) {
        self.profiles.write().insert(user_id.to_string(), profile);
    }

    fn remove(&self, user_id: &str) -> bool {
        self.profiles.write().remove(user_id).is_some()
    }

    fn user_count(&self) -> usize {
        self.profiles.read().len()
    }
}
