//! In-memory reference data
//!
//! Clients, products and vehicle taxonomy are only checked for existence, so
//! they are kept as id sets. Coverages and distributors are kept in full.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use core_kernel::{
    ClientId, CoverageId, DistributorId, DomainPort, PortError, ProductId, VehicleCategoryId,
    VehicleMakeId, VehicleModelId,
};
use domain_policy::ReferenceDataPort;
use domain_rating::{Distributor, MotorCoverage};

#[derive(Debug, Default)]
struct Catalogue {
    clients: HashSet<ClientId>,
    products: HashSet<ProductId>,
    categories: HashSet<VehicleCategoryId>,
    makes: HashSet<VehicleMakeId>,
    models: HashSet<VehicleModelId>,
    coverages: HashMap<CoverageId, MotorCoverage>,
    distributors: HashMap<DistributorId, Distributor>,
}

/// `ReferenceDataPort` backed by in-memory collections
#[derive(Debug, Clone, Default)]
pub struct InMemoryReferenceData {
    catalogue: Arc<RwLock<Catalogue>>,
}

impl InMemoryReferenceData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference data holding the standard SECTION_A..H coverage catalogue
    pub async fn with_standard_catalogue() -> Self {
        let reference = Self::new();
        for coverage in MotorCoverage::standard_catalogue() {
            reference.add_coverage(coverage).await;
        }
        reference
    }

    pub async fn add_client(&self, id: ClientId) {
        self.catalogue.write().await.clients.insert(id);
    }

    pub async fn add_product(&self, id: ProductId) {
        self.catalogue.write().await.products.insert(id);
    }

    /// Registers a category/make/model triple
    pub async fn add_vehicle(&self, category: VehicleCategoryId, make: VehicleMakeId, model: VehicleModelId) {
        let mut catalogue = self.catalogue.write().await;
        catalogue.categories.insert(category);
        catalogue.makes.insert(make);
        catalogue.models.insert(model);
    }

    pub async fn add_coverage(&self, coverage: MotorCoverage) {
        self.catalogue.write().await.coverages.insert(coverage.id, coverage);
    }

    pub async fn add_distributor(&self, distributor: Distributor) {
        self.catalogue.write().await.distributors.insert(distributor.id, distributor);
    }

    /// Finds a coverage by its code, e.g. `SECTION_B`
    pub async fn coverage_by_code(&self, code: &str) -> Option<MotorCoverage> {
        self.catalogue
            .read()
            .await
            .coverages
            .values()
            .find(|c| c.code == code)
            .cloned()
    }
}

impl DomainPort for InMemoryReferenceData {}

#[async_trait]
impl ReferenceDataPort for InMemoryReferenceData {
    async fn client_exists(&self, id: ClientId) -> Result<bool, PortError> {
        Ok(self.catalogue.read().await.clients.contains(&id))
    }

    async fn product_exists(&self, id: ProductId) -> Result<bool, PortError> {
        Ok(self.catalogue.read().await.products.contains(&id))
    }

    async fn vehicle_category_exists(&self, id: VehicleCategoryId) -> Result<bool, PortError> {
        Ok(self.catalogue.read().await.categories.contains(&id))
    }

    async fn vehicle_make_exists(&self, id: VehicleMakeId) -> Result<bool, PortError> {
        Ok(self.catalogue.read().await.makes.contains(&id))
    }

    async fn vehicle_model_exists(&self, id: VehicleModelId) -> Result<bool, PortError> {
        Ok(self.catalogue.read().await.models.contains(&id))
    }

    async fn get_coverage(&self, id: CoverageId) -> Result<MotorCoverage, PortError> {
        self.catalogue
            .read()
            .await
            .coverages
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Coverage", id))
    }

    async fn list_coverages(&self) -> Result<Vec<MotorCoverage>, PortError> {
        let mut coverages: Vec<MotorCoverage> = self
            .catalogue
            .read()
            .await
            .coverages
            .values()
            .filter(|c| c.is_active)
            .cloned()
            .collect();
        coverages.sort_by_key(|c| c.section_letter);
        Ok(coverages)
    }

    async fn get_distributor(&self, id: DistributorId) -> Result<Distributor, PortError> {
        self.catalogue
            .read()
            .await
            .distributors
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Distributor", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_standard_catalogue_is_sorted_by_section() {
        let reference = InMemoryReferenceData::with_standard_catalogue().await;
        let letters: String = reference
            .list_coverages()
            .await
            .unwrap()
            .iter()
            .map(|c| c.section_letter)
            .collect();
        assert_eq!(letters, "ABCDEFGH");
        assert!(reference.coverage_by_code("SECTION_E").await.is_some());
    }

    #[tokio::test]
    async fn test_unknown_coverage_fails_batch_lookup() {
        let reference = InMemoryReferenceData::with_standard_catalogue().await;
        let known = reference.coverage_by_code("SECTION_B").await.unwrap().id;

        let error = reference.get_coverages(&[known, CoverageId::new()]).await.unwrap_err();
        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn test_existence_checks() {
        let reference = InMemoryReferenceData::new();
        let client = ClientId::new();
        reference.add_client(client).await;

        assert!(reference.client_exists(client).await.unwrap());
        assert!(!reference.client_exists(ClientId::new()).await.unwrap());
        assert!(!reference.product_exists(ProductId::new()).await.unwrap());
    }
}
