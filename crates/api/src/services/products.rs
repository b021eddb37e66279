//! Product catalog workflow (read-only).

use std::sync::Arc;

use tracing::instrument;

use order_management_core::ProductId;

use super::ServiceError;
use crate::cache::{Cache, keys};
use crate::db::ProductStore;
use crate::models::ProductDto;

#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductStore>,
    cache: Cache,
}

impl ProductService {
    #[must_use]
    pub fn new(products: Arc<dyn ProductStore>, cache: Cache) -> Self {
        Self { products, cache }
    }

    /// All products, cached under `products:all`.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<ProductDto>, ServiceError> {
        if let Some(cached) = self.cache.get(keys::PRODUCTS_ALL).await {
            return Ok(cached);
        }

        let products: Vec<ProductDto> = self
            .products
            .list()
            .await?
            .iter()
            .map(ProductDto::from)
            .collect();

        self.cache
            .set(keys::PRODUCTS_ALL, &products, Some(keys::PRODUCTS_ALL_TTL))
            .await;
        Ok(products)
    }

    /// One product, cached under `product:{id}`.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Option<ProductDto>, ServiceError> {
        let key = keys::product(id);
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(Some(cached));
        }

        let Some(product) = self.products.get_by_id(id).await? else {
            return Ok(None);
        };

        let dto = ProductDto::from(&product);
        self.cache.set(&key, &dto, Some(keys::PRODUCT_TTL)).await;
        Ok(Some(dto))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::cache::MemoryCache;
    use crate::testing::{FailingCache, MemoryStore};

    fn service(store: &Arc<MemoryStore>) -> ProductService {
        ProductService::new(store.clone(), Cache::new(Arc::new(MemoryCache::new(100))))
    }

    #[tokio::test]
    async fn test_list_is_cached() {
        let store = MemoryStore::with_sample_data();
        let service = service(&store);

        let first = service.list_products().await.unwrap();
        let second = service.list_products().await.unwrap();

        assert_eq!(first.len(), 4);
        assert_eq!(first, second);
        assert_eq!(store.product_reads(), 1);
    }

    #[tokio::test]
    async fn test_get_product() {
        let store = MemoryStore::with_sample_data();
        let service = service(&store);

        let product = service.get_product(ProductId::new(2)).await.unwrap().unwrap();
        assert_eq!(product.name, "Mouse Logitech");
        assert_eq!(product.price, Decimal::from(500_000));

        service.get_product(ProductId::new(2)).await.unwrap();
        assert_eq!(store.product_reads(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_product() {
        let store = MemoryStore::with_sample_data();
        let service = service(&store);

        assert_eq!(service.get_product(ProductId::new(99)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reads_through_failing_cache() {
        let store = MemoryStore::with_sample_data();
        let service = ProductService::new(store.clone(), Cache::new(Arc::new(FailingCache)));

        assert_eq!(service.list_products().await.unwrap().len(), 4);
        assert!(service.get_product(ProductId::new(4)).await.unwrap().is_some());
        assert_eq!(store.product_reads(), 2);
    }
}
