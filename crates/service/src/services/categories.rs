use std::sync::Arc;

use crate::domain::Category;
use crate::errors::{ServiceError, ServiceResult};
use crate::storage::Storage;

#[derive(Clone)]
pub struct CategoryService {
    store: Arc<dyn Storage>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> ServiceResult<Vec<Category>> {
        self.store.get_categories().await
    }

    pub async fn get(&self, id: i32) -> ServiceResult<Category> {
        self.store.get_category(id).await?.ok_or_else(|| ServiceError::not_found("Category"))
    }
}
