//! In-memory storage backend.
//!
//! Implements every store trait over a single mutex-guarded state, which
//! gives the same atomicity guarantees as the `PostgreSQL` repositories
//! (unique emails, one OTP per email, atomic item append).

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use shoptrail_core::{Email, OtpCode, OtpId, UserId, VisitId};

use super::{OtpStore, RepositoryError, UserStore, VisitStore};
use crate::models::user::UserWithPassword;
use crate::models::{LineItem, OtpRecord, User, Visit};

#[derive(Default)]
struct State {
    users: HashMap<Email, UserWithPassword>,
    otps: HashMap<Email, OtpRecord>,
    visits: HashMap<VisitId, Visit>,
    next_user_id: i32,
    next_otp_id: i32,
}

/// Storage that lives in process memory.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // Every mutation below validates first and then writes, so a
        // panicking holder never leaves a half-applied change.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self.lock().users.get(email).map(|found| found.user.clone()))
    }

    async fn find_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<UserWithPassword>, RepositoryError> {
        Ok(self.lock().users.get(email).cloned())
    }

    async fn create(&self, email: &Email, password_hash: &str) -> Result<User, RepositoryError> {
        let mut state = self.lock();
        if state.users.contains_key(email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        state.next_user_id += 1;
        let user = User {
            id: UserId::new(state.next_user_id),
            email: email.clone(),
            created_at: Utc::now(),
        };
        state.users.insert(
            email.clone(),
            UserWithPassword {
                user: user.clone(),
                password_hash: password_hash.to_owned(),
            },
        );
        Ok(user)
    }
}

#[async_trait]
impl OtpStore for MemoryStore {
    async fn replace_for_email(
        &self,
        email: &Email,
        code: &OtpCode,
        expires_at: DateTime<Utc>,
    ) -> Result<OtpRecord, RepositoryError> {
        let mut state = self.lock();
        state.next_otp_id += 1;
        let record = OtpRecord {
            id: OtpId::new(state.next_otp_id),
            email: email.clone(),
            code: code.clone(),
            expires_at,
            created_at: Utc::now(),
        };
        state.otps.insert(email.clone(), record.clone());
        Ok(record)
    }

    async fn take(
        &self,
        email: &Email,
        code: &OtpCode,
    ) -> Result<Option<OtpRecord>, RepositoryError> {
        let mut state = self.lock();
        let matches = state
            .otps
            .get(email)
            .is_some_and(|record| &record.code == code);
        Ok(if matches { state.otps.remove(email) } else { None })
    }
}

#[async_trait]
impl VisitStore for MemoryStore {
    async fn create(&self, visit: &Visit) -> Result<(), RepositoryError> {
        let mut state = self.lock();
        if state.visits.contains_key(&visit.id) {
            return Err(RepositoryError::Conflict("visit id already exists".to_owned()));
        }
        state.visits.insert(visit.id, visit.clone());
        Ok(())
    }

    async fn get(&self, id: VisitId) -> Result<Option<Visit>, RepositoryError> {
        Ok(self.lock().visits.get(&id).cloned())
    }

    async fn append_item(&self, id: VisitId, item: &LineItem) -> Result<Visit, RepositoryError> {
        let mut state = self.lock();
        let visit = state.visits.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        let total = visit
            .total
            .checked_add(item.price)
            .ok_or(RepositoryError::OutOfRange)?;
        visit.items.push(item.clone());
        visit.total = total;
        Ok(visit.clone())
    }

    async fn mark_exited(
        &self,
        id: VisitId,
        exited_at: DateTime<Utc>,
    ) -> Result<Visit, RepositoryError> {
        let mut state = self.lock();
        let visit = state.visits.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        if visit.exited_at.is_some() {
            return Err(RepositoryError::Conflict("visit already exited".to_owned()));
        }
        visit.exited_at = Some(exited_at);
        Ok(visit.clone())
    }

    async fn list_recent_first(&self) -> Result<Vec<Visit>, RepositoryError> {
        let mut visits: Vec<Visit> = self.lock().visits.values().cloned().collect();
        visits.sort_by(|a, b| b.entered_at.cmp(&a.entered_at).then(b.id.cmp(&a.id)));
        Ok(visits)
    }
}
