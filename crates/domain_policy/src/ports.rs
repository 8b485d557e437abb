//! Ports consumed by the quote and policy services
//!
//! Reference data (clients, products, vehicles, the coverage catalogue,
//! distributors) is maintained elsewhere; the lifecycle only needs to check
//! that references exist and to read coverages and distributors.

use async_trait::async_trait;

use core_kernel::{
    ClientId, CoverageId, DistributorId, DomainPort, PortError, ProductId, VehicleCategoryId,
    VehicleMakeId, VehicleModelId,
};
use domain_rating::{Distributor, MotorCoverage};

/// Read-only reference data lookup
#[async_trait]
pub trait ReferenceDataPort: DomainPort {
    async fn client_exists(&self, id: ClientId) -> Result<bool, PortError>;

    async fn product_exists(&self, id: ProductId) -> Result<bool, PortError>;

    async fn vehicle_category_exists(&self, id: VehicleCategoryId) -> Result<bool, PortError>;

    async fn vehicle_make_exists(&self, id: VehicleMakeId) -> Result<bool, PortError>;

    async fn vehicle_model_exists(&self, id: VehicleModelId) -> Result<bool, PortError>;

    /// Fetches a catalogue coverage
    ///
    /// # Errors
    ///
    /// `PortError::NotFound` if the coverage does not exist
    async fn get_coverage(&self, id: CoverageId) -> Result<MotorCoverage, PortError>;

    /// Active catalogue entries, ordered by section letter
    async fn list_coverages(&self) -> Result<Vec<MotorCoverage>, PortError>;

    /// Fetches a distributor
    ///
    /// # Errors
    ///
    /// `PortError::NotFound` if the distributor does not exist
    async fn get_distributor(&self, id: DistributorId) -> Result<Distributor, PortError>;

    /// Fetches every coverage in `ids`, failing on the first unknown one
    async fn get_coverages(&self, ids: &[CoverageId]) -> Result<Vec<MotorCoverage>, PortError> {
        let mut coverages = Vec::with_capacity(ids.len());
        for id in ids {
            coverages.push(self.get_coverage(*id).await?);
        }
        Ok(coverages)
    }
}
