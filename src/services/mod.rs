//! Business logic services

pub mod authors;
pub mod books;
pub mod categories;
pub mod collections;
pub mod users;

use std::sync::Arc;

use crate::{
    config::AuthConfig,
    repository::{DataStore, StoreHealth},
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub authors: authors::AuthorsService,
    pub categories: categories::CategoriesService,
    pub books: books::BooksService,
    pub collections: collections::CollectionsService,
    pub users: users::UsersService,
    pub health: Arc<dyn StoreHealth>,
}

impl Services {
    /// Create all services on top of one store
    pub fn new<S: DataStore>(store: Arc<S>, auth_config: AuthConfig) -> Self {
        Self {
            authors: authors::AuthorsService::new(store.clone()),
            categories: categories::CategoriesService::new(store.clone()),
            books: books::BooksService::new(store.clone(), store.clone(), store.clone()),
            collections: collections::CollectionsService::new(store.clone(), store.clone()),
            users: users::UsersService::new(store.clone(), auth_config),
            health: store,
        }
    }
}
