//! Identity registry - the in-memory store of user records.

use super::error::ServiceError;
use crate::models::{PrivilegeTier, UserRecord};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

#[derive(Debug, Default)]
struct RegistryState {
    /// Records in registration order. Listings share these; a tier change
    /// copies the record if a listing still holds it.
    records: Vec<Arc<UserRecord>>,
    /// user_id -> position in `records`.
    index: HashMap<Uuid, usize>,
}

impl RegistryState {
    fn get(&self, user_id: &Uuid) -> Result<&Arc<UserRecord>, ServiceError> {
        self.index
            .get(user_id)
            .and_then(|&pos| self.records.get(pos))
            .ok_or(ServiceError::NotFound(*user_id))
    }
}

/// Passive store of user records keyed by identifier.
///
/// Shared behind an `Arc`; a single lock guards all records.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    state: RwLock<RegistryState>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record. An existing record with the same identifier is left untouched.
    pub fn register(&self, record: UserRecord) -> Result<(), ServiceError> {
        let mut state = self.write_state()?;
        let user_id = record.user_id();

        if state.index.contains_key(&user_id) {
            tracing::warn!(user_id = %user_id, "Rejected duplicate registration");
            return Err(ServiceError::DuplicateIdentity(user_id));
        }

        tracing::info!(
            user_id = %user_id,
            tier = %record.tier(),
            "User registered"
        );

        let position = state.records.len();
        state.records.push(Arc::new(record));
        state.index.insert(user_id, position);
        Ok(())
    }

    /// Return a copy of the record as currently stored.
    pub fn find(&self, user_id: &Uuid) -> Result<UserRecord, ServiceError> {
        Ok(UserRecord::clone(self.read_state()?.get(user_id)?))
    }

    /// All records in registration order.
    ///
    /// The iterator walks a snapshot of shared handles taken at call time, so
    /// records are not copied per listing. Clone it to walk the same sequence
    /// again; later tier changes do not show through an existing snapshot.
    pub fn list_all(
        &self,
    ) -> Result<impl Iterator<Item = Arc<UserRecord>> + Clone, ServiceError> {
        Ok(self.read_state()?.records.clone().into_iter())
    }

    pub fn len(&self) -> Result<usize, ServiceError> {
        Ok(self.read_state()?.records.len())
    }

    pub fn is_empty(&self) -> Result<bool, ServiceError> {
        Ok(self.read_state()?.records.is_empty())
    }

    /// Take the exclusive guard used for read-then-write tier transitions.
    pub(crate) fn lock_for_update(&self) -> Result<RegistryWriter<'_>, ServiceError> {
        Ok(RegistryWriter {
            state: self.write_state()?,
        })
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, RegistryState>, ServiceError> {
        self.state.read().map_err(|e| {
            ServiceError::Internal(anyhow::anyhow!("Identity registry lock poisoned: {}", e))
        })
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, RegistryState>, ServiceError> {
        self.state.write().map_err(|e| {
            ServiceError::Internal(anyhow::anyhow!("Identity registry lock poisoned: {}", e))
        })
    }
}

/// Exclusive view of the registry. Every lookup and mutation made through one
/// writer happens atomically with respect to other registry callers.
pub(crate) struct RegistryWriter<'a> {
    state: RwLockWriteGuard<'a, RegistryState>,
}

impl RegistryWriter<'_> {
    pub(crate) fn tier_of(&self, user_id: &Uuid) -> Result<PrivilegeTier, ServiceError> {
        Ok(self.state.get(user_id)?.tier())
    }

    /// Set the tier and return the previous one.
    pub(crate) fn set_tier(
        &mut self,
        user_id: &Uuid,
        tier: PrivilegeTier,
    ) -> Result<PrivilegeTier, ServiceError> {
        let position = *self
            .state
            .index
            .get(user_id)
            .ok_or(ServiceError::NotFound(*user_id))?;
        let record = self
            .state
            .records
            .get_mut(position)
            .ok_or(ServiceError::NotFound(*user_id))?;
        Ok(Arc::make_mut(record).set_tier(tier))
    }
}
