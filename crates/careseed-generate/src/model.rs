use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use careseed_core::EntityType;

use crate::errors::GenerationError;

/// Options for the fixture emitter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Seed for reproducible output. Unseeded runs draw from OS entropy.
    pub seed: Option<u64>,
    /// Run the integrity checks over every batch before accepting it.
    pub strict: bool,
    /// Reference instant for relative dates. Defaults to the local clock.
    pub base_time: Option<NaiveDateTime>,
    /// VAT applied to invoice subtotals.
    pub vat_rate: f64,
    /// Income tax withheld from gross pay.
    pub income_tax_rate: f64,
    /// National Insurance withheld from gross pay.
    pub ni_rate: f64,
    pub balance_policy: BalancePolicy,
    pub counts: EntityCounts,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            seed: None,
            strict: true,
            base_time: None,
            vat_rate: 0.20,
            income_tax_rate: 0.20,
            ni_rate: 0.12,
            balance_policy: BalancePolicy::Outstanding,
            counts: EntityCounts::default(),
        }
    }
}

impl GenerateOptions {
    pub fn validate(&self) -> Result<(), GenerationError> {
        for (name, rate) in [
            ("vat_rate", self.vat_rate),
            ("income_tax_rate", self.income_tax_rate),
            ("ni_rate", self.ni_rate),
        ] {
            if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
                return Err(GenerationError::InvalidOptions(format!(
                    "{name} must be between 0 and 1, got {rate}"
                )));
            }
        }
        if self.income_tax_rate + self.ni_rate > 1.0 {
            return Err(GenerationError::InvalidOptions(
                "income_tax_rate + ni_rate must not exceed 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// How much of an invoice is still owed when it is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalancePolicy {
    /// Nothing paid yet: `balance_due == total`.
    #[default]
    Outstanding,
    /// Fully paid: `balance_due == 0`.
    Settled,
}

/// Rows requested per entity type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityCounts {
    pub agencies: usize,
    pub profiles_per_agency: usize,
    pub staff_per_agency: usize,
    pub clients_per_agency: usize,
    pub shifts: usize,
    pub bookings: usize,
    pub timesheets: usize,
    pub invoices: usize,
    pub payslips: usize,
    pub compliance: usize,
    pub groups: usize,
    pub admin_workflows: usize,
    pub change_logs: usize,
    pub operational_costs: usize,
    pub invoice_amendments: usize,
    pub notification_queue: usize,
}

impl Default for EntityCounts {
    fn default() -> Self {
        Self {
            agencies: 2,
            profiles_per_agency: 2,
            staff_per_agency: 5,
            clients_per_agency: 3,
            shifts: 15,
            bookings: 10,
            timesheets: 8,
            invoices: 3,
            payslips: 2,
            compliance: 12,
            groups: 2,
            admin_workflows: 3,
            change_logs: 5,
            operational_costs: 3,
            invoice_amendments: 1,
            notification_queue: 2,
        }
    }
}

/// Which part of the dependency order a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Agencies, profiles, staff and clients.
    Foundation,
    /// Shifts through the notification queue, on top of a loaded manifest.
    Operations,
    #[default]
    All,
}

impl Stage {
    pub fn entities(self) -> &'static [EntityType] {
        let order = &EntityType::DEPENDENCY_ORDER;
        match self {
            Stage::Foundation => &order[..4],
            Stage::Operations => &order[4..],
            Stage::All => order,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Foundation => "foundation",
            Stage::Operations => "operations",
            Stage::All => "all",
        })
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "foundation" => Ok(Stage::Foundation),
            "operations" => Ok(Stage::Operations),
            "all" => Ok(Stage::All),
            _ => Err(format!(
                "unknown stage: {s}. Use foundation, operations or all"
            )),
        }
    }
}

/// Summary of one generated entity batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableReport {
    pub entity: EntityType,
    pub rows_requested: usize,
    pub rows_generated: usize,
    /// Parent pool that ran out before the requested count was reached.
    pub limited_by: Option<EntityType>,
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub stage: Stage,
    pub seed: Option<u64>,
    pub tables: Vec<TableReport>,
    pub statements: usize,
    pub duration_ms: u64,
}

impl GenerationReport {
    pub fn new(run_id: String, stage: Stage, seed: Option<u64>) -> Self {
        Self {
            run_id,
            stage,
            seed,
            tables: Vec::new(),
            statements: 0,
            duration_ms: 0,
        }
    }

    pub fn table(&self, entity: EntityType) -> Option<&TableReport> {
        self.tables.iter().find(|table| table.entity == entity)
    }

    pub fn truncated(&self) -> impl Iterator<Item = &TableReport> {
        self.tables.iter().filter(|table| table.limited_by.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_split_dependency_order() {
        assert_eq!(Stage::Foundation.entities().last(), Some(&EntityType::Clients));
        assert_eq!(Stage::Operations.entities().first(), Some(&EntityType::Shifts));
        assert_eq!(Stage::All.entities().len(), 16);
    }

    #[test]
    fn rejects_out_of_range_rates() {
        let mut options = GenerateOptions::default();
        assert!(options.validate().is_ok());
        options.vat_rate = 1.5;
        assert!(matches!(
            options.validate(),
            Err(GenerationError::InvalidOptions(_))
        ));
    }
}
