//! Integrity checks run over generated records before they are accepted.

use careseed_core::{EntityType, ManifestRegistry, Money, Record, SqlValue};

use crate::errors::GenerationError;
use crate::generators::finance::{InvoiceTotals, PayslipTotals};
use crate::model::{BalancePolicy, GenerateOptions};

/// Run every check that applies to `record`'s entity type.
pub fn verify_record(
    record: &Record,
    registry: &ManifestRegistry,
    options: &GenerateOptions,
) -> Result<(), GenerationError> {
    check_references(record, registry)?;
    match record.entity() {
        EntityType::Invoices => check_invoice_totals(record, options),
        EntityType::Payslips => check_payslip_totals(record, options),
        EntityType::Shifts => check_shift_assignment(record),
        _ => Ok(()),
    }
}

/// Every declared reference must point at a registered identifier.
pub fn check_references(
    record: &Record,
    registry: &ManifestRegistry,
) -> Result<(), GenerationError> {
    for reference in record.references() {
        for id in &reference.ids {
            if !registry.contains(reference.target, id) {
                return Err(GenerationError::DanglingReference {
                    entity: record.entity(),
                    column: reference.column,
                    target: reference.target,
                    id: *id,
                });
            }
        }
    }
    Ok(())
}

/// `vat_amount`, `total` and `balance_due` follow from `subtotal`.
pub fn check_invoice_totals(
    record: &Record,
    options: &GenerateOptions,
) -> Result<(), GenerationError> {
    let subtotal = money(record, "subtotal")?;
    let expected = InvoiceTotals::compute(subtotal, options.vat_rate, options.balance_policy);
    expect_money(record, "vat_amount", expected.vat_amount)?;
    expect_money(record, "total", expected.total)?;
    expect_money(record, "balance_due", expected.balance_due)?;
    if options.balance_policy == BalancePolicy::Settled
        && record.value("status").and_then(SqlValue::as_str) != Some("paid")
    {
        return Err(GenerationError::Invariant(
            "settled invoice must have status paid".to_string(),
        ));
    }
    Ok(())
}

/// `tax`, `ni`, `deductions` and `net_pay` follow from `gross_pay`.
pub fn check_payslip_totals(
    record: &Record,
    options: &GenerateOptions,
) -> Result<(), GenerationError> {
    let gross = money(record, "gross_pay")?;
    let expected = PayslipTotals::compute(gross, options.income_tax_rate, options.ni_rate);
    expect_money(record, "tax", expected.tax)?;
    expect_money(record, "ni", expected.ni)?;
    expect_money(record, "deductions", expected.deductions)?;
    expect_money(record, "net_pay", expected.net_pay)
}

/// Open and cancelled shifts have no staff; every other status has one.
pub fn check_shift_assignment(record: &Record) -> Result<(), GenerationError> {
    let status = record
        .value("status")
        .and_then(SqlValue::as_str)
        .ok_or_else(|| GenerationError::Invariant("shift without status".to_string()))?;
    let assigned = record
        .value("assigned_staff_id")
        .is_some_and(|value| !value.is_null());
    let unstaffed = matches!(status, "open" | "cancelled");
    if assigned == unstaffed {
        return Err(GenerationError::Invariant(format!(
            "shift with status {status} has assigned_staff_id {}",
            if assigned { "set" } else { "null" }
        )));
    }
    Ok(())
}

fn money(record: &Record, column: &str) -> Result<Money, GenerationError> {
    record
        .value(column)
        .and_then(SqlValue::as_money)
        .ok_or_else(|| {
            GenerationError::Invariant(format!(
                "{} is missing money column {column}",
                record.entity()
            ))
        })
}

fn expect_money(record: &Record, column: &str, expected: Money) -> Result<(), GenerationError> {
    let actual = money(record, column)?;
    if actual != expected {
        return Err(GenerationError::Invariant(format!(
            "{}.{column} is {actual}, expected {expected}",
            record.entity()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use careseed_core::Identifier;

    use super::*;

    #[test]
    fn flags_unregistered_references() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut registry = ManifestRegistry::new();
        let agency = Identifier::mint(&mut rng);
        registry.append(EntityType::Agencies, agency);
        let stranger = Identifier::mint(&mut rng);

        let good =
            Record::new(EntityType::Groups).reference("agency_id", EntityType::Agencies, agency);
        assert!(check_references(&good, &registry).is_ok());

        let bad = Record::new(EntityType::Groups).embed(
            "staff_members",
            EntityType::Staff,
            vec![stranger],
            SqlValue::UuidArray(vec![stranger]),
        );
        let err = check_references(&bad, &registry).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::DanglingReference { column: "staff_members", .. }
        ));
    }

    #[test]
    fn rejects_inconsistent_invoice_totals() {
        let options = GenerateOptions::default();
        let record = Record::new(EntityType::Invoices)
            .set("subtotal", Money::from_pence(10_000))
            .set("vat_amount", Money::from_pence(2_000))
            .set("total", Money::from_pence(12_000))
            .set("balance_due", Money::from_pence(11_000));
        let err = check_invoice_totals(&record, &options).unwrap_err();
        assert!(err.to_string().contains("balance_due"));
    }

    #[test]
    fn couples_shift_status_and_assignment() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let staff = Identifier::mint(&mut rng);
        let open_with_staff = Record::new(EntityType::Shifts)
            .set("status", "open")
            .set("assigned_staff_id", staff);
        assert!(check_shift_assignment(&open_with_staff).is_err());

        let completed_without_staff = Record::new(EntityType::Shifts)
            .set("status", "completed")
            .set("assigned_staff_id", SqlValue::Null);
        assert!(check_shift_assignment(&completed_without_staff).is_err());

        let cancelled = Record::new(EntityType::Shifts)
            .set("status", "cancelled")
            .set("assigned_staff_id", SqlValue::Null);
        assert!(check_shift_assignment(&cancelled).is_ok());
    }
}
