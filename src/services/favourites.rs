use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use super::to_document;
use crate::cache::{FAVOURITES_KEY, LocalCache};
use crate::error::AppError;
use crate::models::{Actor, Course};
use crate::policy::{self, Action};
use crate::store::{RemoteStore, favourites_of};

/// Dual-write favourites synchronizer.
///
/// The in-memory set is the source of truth for the running session. Every
/// toggle rewrites the whole set to the local cache and, for signed-in
/// users, mirrors the single changed pair to the remote store. The two
/// writes are independent: a failed remote write leaves the local cache
/// authoritative and the remote copy stale until the next successful
/// toggle. On startup only the local cache is read; there is no
/// reconciliation against the remote store, so a multi-device user can see
/// stale favourites (known inconsistency, preserved as-is).
pub struct FavouritesService {
    store: Arc<dyn RemoteStore>,
    cache: Arc<dyn LocalCache>,
    favourites: Mutex<Vec<Course>>,
}

impl FavouritesService {
    pub fn new(store: Arc<dyn RemoteStore>, cache: Arc<dyn LocalCache>) -> Self {
        Self {
            store,
            cache,
            favourites: Mutex::new(Vec::new()),
        }
    }

    /// Loads the session set from the local cache. Called on app start.
    pub async fn load(&self) -> Result<Vec<Course>, AppError> {
        let favourites: Vec<Course> = match self.cache.get(FAVOURITES_KEY).await? {
            Some(stored) => serde_json::from_str(&stored)?,
            None => Vec::new(),
        };
        *self.lock() = favourites.clone();
        info!("loaded {} favourites from cache", favourites.len());
        Ok(favourites)
    }

    /// Flips membership of `course` and returns whether it is now a
    /// favourite. Anonymous users keep a local-only list; signed-in users
    /// also get the remote mirror for cross-device continuity.
    pub async fn toggle(&self, actor: Option<&Actor>, course: &Course) -> Result<bool, AppError> {
        if let Some(actor) = actor {
            policy::require(actor, Action::ToggleFavourite, None)?;
        }

        let (snapshot, added) = {
            let mut favourites = self.lock();
            let existed = favourites.iter().any(|c| c.id == course.id);
            if existed {
                favourites.retain(|c| c.id != course.id);
            } else {
                favourites.push(course.clone());
            }
            (favourites.clone(), !existed)
        };

        self.cache
            .set(FAVOURITES_KEY, &serde_json::to_string(&snapshot)?)
            .await?;

        if let Some(actor) = actor {
            let collection = favourites_of(&actor.uid);
            let result = if added {
                self.store
                    .upsert(&collection, &course.id, to_document(course)?)
                    .await
            } else {
                self.store.delete(&collection, &course.id).await
            };
            // The local flip stands either way; the remote copy catches up
            // on the next successful toggle.
            if let Err(err) = result {
                warn!(
                    "favourites remote write failed for user {} course {}: {err}",
                    actor.uid, course.id
                );
            }
        }

        Ok(added)
    }

    /// The current session set.
    pub fn current(&self) -> Vec<Course> {
        self.lock().clone()
    }

    pub fn is_favourite(&self, course_id: &str) -> bool {
        self.lock().iter().any(|c| c.id == course_id)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Course>> {
        self.favourites
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
