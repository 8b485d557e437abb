//! Test Data Builders
//!
//! Builders for service inputs with sensible defaults. Tests set only the
//! fields they care about.

use chrono::NaiveDate;
use core_kernel::{
    ClientId, CoverageId, DistributorId, Money, PolicyId, ProductId, VehicleCategoryId,
    VehicleMakeId, VehicleModelId,
};
use domain_claims::{ClaimRequest, MotorClaimDetails, MotorClaimType, ThirdPartyDetails};
use domain_policy::{QuoteRequest, VehicleDetails};
use domain_rating::FuelType;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::fixtures::{MoneyFixtures, TemporalFixtures, VehicleFixtures};

/// Builder for `QuoteRequest`
#[derive(Debug, Clone)]
pub struct QuoteRequestBuilder {
    request: QuoteRequest,
}

impl Default for QuoteRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteRequestBuilder {
    /// A 12-month request for the reference saloon, with fresh unregistered ids
    pub fn new() -> Self {
        Self {
            request: QuoteRequest {
                client_id: ClientId::new(),
                distributor_id: None,
                product_id: ProductId::new(),
                policy_start_date: TemporalFixtures::policy_start(),
                policy_end_date: TemporalFixtures::policy_end(),
                duration_months: 12,
                vehicle: VehicleFixtures::saloon(
                    VehicleCategoryId::new(),
                    VehicleMakeId::new(),
                    VehicleModelId::new(),
                ),
                coverage_ids: Vec::new(),
                professional_discount: Decimal::ZERO,
                commercial_discount: Decimal::ZERO,
                notes: None,
            },
        }
    }

    pub fn client(mut self, client_id: ClientId) -> Self {
        self.request.client_id = client_id;
        self
    }

    pub fn product(mut self, product_id: ProductId) -> Self {
        self.request.product_id = product_id;
        self
    }

    pub fn vehicle(mut self, vehicle: VehicleDetails) -> Self {
        self.request.vehicle = vehicle;
        self
    }

    pub fn vehicle_value(mut self, value: Money) -> Self {
        self.request.vehicle.vehicle_value = value;
        self
    }

    pub fn horsepower(mut self, horsepower: u32, fuel_type: FuelType) -> Self {
        self.request.vehicle.horsepower = horsepower;
        self.request.vehicle.fuel_type = fuel_type;
        self
    }

    pub fn distributor(mut self, distributor_id: DistributorId) -> Self {
        self.request.distributor_id = Some(distributor_id);
        self
    }

    pub fn coverages(mut self, coverage_ids: Vec<CoverageId>) -> Self {
        self.request.coverage_ids = coverage_ids;
        self
    }

    pub fn discounts(mut self, professional: Decimal, commercial: Decimal) -> Self {
        self.request.professional_discount = professional;
        self.request.commercial_discount = commercial;
        self
    }

    /// Sets the duration and an end date consistent with it
    pub fn duration_months(mut self, months: u32) -> Self {
        self.request.duration_months = months;
        self.request.policy_end_date = self
            .request
            .policy_start_date
            .checked_add_months(chrono::Months::new(months))
            .and_then(|d| d.pred_opt())
            .unwrap_or(self.request.policy_end_date);
        self
    }

    pub fn period(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.request.policy_start_date = start;
        self.request.policy_end_date = end;
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.request.notes = Some(notes.into());
        self
    }

    pub fn build(self) -> QuoteRequest {
        self.request
    }
}

/// Builder for `ClaimRequest`
#[derive(Debug, Clone)]
pub struct ClaimRequestBuilder {
    request: ClaimRequest,
}

impl ClaimRequestBuilder {
    /// A road accident on `policy_id`, claiming 850,000 XOF
    pub fn new(policy_id: PolicyId) -> Self {
        Self {
            request: ClaimRequest {
                policy_id,
                claim_date: TemporalFixtures::loss_date(),
                location: "Boulevard Latrille, Abidjan".to_string(),
                description: "Collision à un carrefour".to_string(),
                circumstances: Some("Refus de priorité du tiers".to_string()),
                claimed_amount: MoneyFixtures::xof(dec!(850000)),
                motor: MotorClaimDetails::new(MotorClaimType::Accident),
                third_parties: Vec::new(),
            },
        }
    }

    pub fn claim_date(mut self, date: NaiveDate) -> Self {
        self.request.claim_date = date;
        self
    }

    pub fn claimed_amount(mut self, amount: Money) -> Self {
        self.request.claimed_amount = amount;
        self
    }

    pub fn claim_type(mut self, claim_type: MotorClaimType) -> Self {
        self.request.motor.claim_type = claim_type;
        self
    }

    pub fn injuries(mut self, count: u32) -> Self {
        self.request.motor.has_injuries = count > 0;
        self.request.motor.injury_count = count;
        self
    }

    pub fn police_report(mut self, number: impl Into<String>, station: impl Into<String>) -> Self {
        self.request.motor.has_police_report = true;
        self.request.motor.police_report_number = Some(number.into());
        self.request.motor.police_station = Some(station.into());
        self
    }

    pub fn third_party(mut self, details: ThirdPartyDetails) -> Self {
        self.request.third_parties.push(details);
        self
    }

    pub fn build(self) -> ClaimRequest {
        self.request
    }
}
