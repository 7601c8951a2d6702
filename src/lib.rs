//! Academic workflow and synchronization engine for the CourseHub mobile
//! client: course catalog, enrollments, coursework, submissions/grading,
//! and a dual-write favourites synchronizer.
//!
//! The engine sits between the (out-of-scope) presentation layer and two
//! storage ports: a [`store::RemoteStore`] treated as source of truth and a
//! [`cache::LocalCache`] for offline-available data. Callers hold an
//! explicit [`Engine`] handle; there is no ambient global state.

pub mod cache;
pub mod error;
pub mod models;
pub mod policy;
pub mod services;
pub mod store;

pub use error::AppError;

use std::sync::Arc;

use cache::LocalCache;
use services::{
    AdminService, CourseService, EnrollmentService, FavouritesService, SubmissionService,
    WorkService,
};
use store::RemoteStore;

/// One engine per client session, wiring every service over shared storage
/// handles.
pub struct Engine {
    pub courses: CourseService,
    pub enrollments: EnrollmentService,
    pub works: WorkService,
    pub submissions: SubmissionService,
    pub favourites: FavouritesService,
    pub admin: AdminService,
}

impl Engine {
    pub fn new(store: Arc<dyn RemoteStore>, cache: Arc<dyn LocalCache>) -> Self {
        Self {
            courses: CourseService::new(store.clone()),
            enrollments: EnrollmentService::new(store.clone()),
            works: WorkService::new(store.clone()),
            submissions: SubmissionService::new(store.clone()),
            favourites: FavouritesService::new(store.clone(), cache),
            admin: AdminService::new(store),
        }
    }
}
