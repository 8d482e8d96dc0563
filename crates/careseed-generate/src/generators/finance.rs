//! Invoices, payslips, platform costs and invoice amendments.
//!
//! Money columns are computed in whole pence so the derived totals hold
//! exactly: `total = subtotal + vat_amount`, `net_pay = gross_pay - deductions`.

use chrono::Datelike;
use rand::{Rng, RngCore};
use serde_json::json;

use careseed_core::{EntityType, Identifier, Money, Record, SqlValue};

use crate::errors::GenerationError;
use crate::generators::pools;
use crate::generators::{BatchPlan, EntityGenerator, GeneratorCatalog, GeneratorContext};
use crate::model::BalancePolicy;

pub fn register(catalog: &mut GeneratorCatalog) {
    catalog.register_generator(Box::new(InvoiceGenerator));
    catalog.register_generator(Box::new(PayslipGenerator));
    catalog.register_generator(Box::new(OperationalCostGenerator));
    catalog.register_generator(Box::new(InvoiceAmendmentGenerator));
}

/// Invoice amounts derived from a subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub subtotal: Money,
    pub vat_amount: Money,
    pub total: Money,
    pub balance_due: Money,
}

impl InvoiceTotals {
    pub fn compute(subtotal: Money, vat_rate: f64, policy: BalancePolicy) -> Self {
        let vat_amount = subtotal.apply_rate(vat_rate);
        let total = subtotal + vat_amount;
        let balance_due = match policy {
            BalancePolicy::Outstanding => total,
            BalancePolicy::Settled => Money::ZERO,
        };
        Self {
            subtotal,
            vat_amount,
            total,
            balance_due,
        }
    }
}

/// Payslip amounts derived from gross pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayslipTotals {
    pub gross_pay: Money,
    pub tax: Money,
    pub ni: Money,
    pub deductions: Money,
    pub net_pay: Money,
}

impl PayslipTotals {
    pub fn compute(gross_pay: Money, income_tax_rate: f64, ni_rate: f64) -> Self {
        let tax = gross_pay.apply_rate(income_tax_rate);
        let ni = gross_pay.apply_rate(ni_rate);
        let deductions = tax + ni;
        Self {
            gross_pay,
            tax,
            ni,
            deductions,
            net_pay: gross_pay - deductions,
        }
    }
}

struct InvoiceGenerator;

impl EntityGenerator for InvoiceGenerator {
    fn entity(&self) -> EntityType {
        EntityType::Invoices
    }

    fn plan(&self, ctx: &GeneratorContext<'_>) -> BatchPlan {
        BatchPlan::fixed(ctx.options.counts.invoices)
    }

    fn build(
        &self,
        ctx: &GeneratorContext<'_>,
        index: usize,
        id: Identifier,
        rng: &mut dyn RngCore,
    ) -> Result<Record, GenerationError> {
        let agency = ctx.parent(EntityType::Agencies, index)?;
        let client = ctx.parent(EntityType::Clients, index)?;
        let base = ctx.base_time;
        let options = ctx.options;

        let subtotal = Money::from_pence(rng.random_range(80_000..=250_000));
        let totals = InvoiceTotals::compute(subtotal, options.vat_rate, options.balance_policy);
        let status = match options.balance_policy {
            BalancePolicy::Outstanding => "sent",
            BalancePolicy::Settled => "paid",
        };
        let quantity: i64 = rng.random_range(5..=15);
        let unit_rate = (subtotal.as_f64() / quantity as f64 * 100.0).round() / 100.0;

        Ok(Record::new(EntityType::Invoices)
            .set("id", id)
            .reference("agency_id", EntityType::Agencies, agency)
            .reference("client_id", EntityType::Clients, client)
            .set(
                "invoice_number",
                format!("INV-{}-{}", base.year(), 1000 + index),
            )
            .set("invoice_date", pools::date_ago(base, 10, rng))
            .set("due_date", pools::date_ahead(base, 20, rng))
            .set("period_start", pools::date_ago(base, 20, rng))
            .set("period_end", pools::date_ago(base, 5, rng))
            .set("subtotal", totals.subtotal)
            .set("vat_rate", options.vat_rate)
            .set("vat_amount", totals.vat_amount)
            .set("total", totals.total)
            .set("balance_due", totals.balance_due)
            .set("status", status)
            .set("created_by", "admin@agency.com")
            .set(
                "line_items",
                json!([{
                    "description": "Healthcare services",
                    "quantity": quantity,
                    "rate": unit_rate,
                    "amount": subtotal.as_f64(),
                }]),
            )
            .set("notes", "Monthly invoice for healthcare services")
            .set("reminder_sent_count", 0_i64)
            .set("created_date", pools::timestamp_ago(base, 15, rng))
            .set("updated_date", pools::timestamp_ago(base, 1, rng)))
    }
}

/// Payslip `i` pays staff member `i`.
struct PayslipGenerator;

impl EntityGenerator for PayslipGenerator {
    fn entity(&self) -> EntityType {
        EntityType::Payslips
    }

    fn plan(&self, ctx: &GeneratorContext<'_>) -> BatchPlan {
        BatchPlan::bounded(ctx.options.counts.payslips, ctx, &[EntityType::Staff])
    }

    fn build(
        &self,
        ctx: &GeneratorContext<'_>,
        index: usize,
        id: Identifier,
        rng: &mut dyn RngCore,
    ) -> Result<Record, GenerationError> {
        let staff = ctx.parent_exact(EntityType::Staff, index)?;
        let agency = ctx.parent(EntityType::Agencies, index)?;
        let base = ctx.base_time;

        let gross = Money::from_pence(rng.random_range(80_000..=150_000));
        let totals =
            PayslipTotals::compute(gross, ctx.options.income_tax_rate, ctx.options.ni_rate);

        let record = Record::new(EntityType::Payslips)
            .set("id", id)
            .reference("agency_id", EntityType::Agencies, agency)
            .reference("staff_id", EntityType::Staff, staff)
            .set(
                "payslip_number",
                format!("PAY-{}-{}", base.year(), 5000 + index),
            )
            .set("period_start", pools::date_ago(base, 30, rng))
            .set("period_end", pools::date_ago(base, 7, rng))
            .set("payment_date", pools::date_ago(base, 3, rng))
            .set("gross_pay", totals.gross_pay)
            .set("tax", totals.tax)
            .set("ni", totals.ni)
            .set("deductions", totals.deductions)
            .set("net_pay", totals.net_pay)
            .set("total_hours", pools::round1(rng.random_range(60.0..100.0)))
            .set("status", "paid")
            .set("created_by", "admin@agency.com")
            .set("pdf_url", format!("https://example.com/payslips/{id}.pdf"))
            .set(
                "bank_details",
                json!({
                    "account_name": "Staff Member",
                    "sort_code": "20-00-00",
                    "account_number": "12345678",
                }),
            );

        let record = match ctx.first(EntityType::Timesheets) {
            Some(timesheet) => record.embed(
                "timesheets",
                EntityType::Timesheets,
                vec![timesheet],
                json!([timesheet.to_string()]),
            ),
            None => record.set("timesheets", SqlValue::Null),
        };

        Ok(record
            .set("created_date", pools::timestamp_ago(base, 15, rng))
            .set("updated_date", pools::timestamp_ago(base, 1, rng)))
    }
}

const PLATFORM_SERVICES: [(&str, &str); 3] = [
    ("Twilio SMS", "communication"),
    ("Resend Email", "communication"),
    ("Supabase Hosting", "platform_hosting"),
];

struct OperationalCostGenerator;

impl EntityGenerator for OperationalCostGenerator {
    fn entity(&self) -> EntityType {
        EntityType::OperationalCosts
    }

    fn plan(&self, ctx: &GeneratorContext<'_>) -> BatchPlan {
        BatchPlan::fixed(ctx.options.counts.operational_costs)
    }

    fn build(
        &self,
        ctx: &GeneratorContext<'_>,
        index: usize,
        id: Identifier,
        rng: &mut dyn RngCore,
    ) -> Result<Record, GenerationError> {
        let agency = ctx.parent(EntityType::Agencies, index)?;
        let (service, category) = PLATFORM_SERVICES[index % PLATFORM_SERVICES.len()];
        let base = ctx.base_time;

        Ok(Record::new(EntityType::OperationalCosts)
            .set("id", id)
            .reference("agency_id", EntityType::Agencies, agency)
            .set("cost_type", "monthly_subscription")
            .set("service_name", service)
            .set("service_category", category)
            .set("amount", Money::from_pence(rng.random_range(2_000..=15_000)))
            .set("cost_date", pools::date_ago(base, 5, rng))
            .set("currency", "GBP")
            .set("status", "paid")
            .set("created_by", "admin@agency.com")
            .set("billing_period", pools::date_ago(base, 30, rng))
            .set("roi_impact", pools::pick(&["high", "medium", "critical"], rng))
            .set("created_date", pools::timestamp_ago(base, 30, rng))
            .set("updated_date", pools::timestamp_ago(base, 1, rng)))
    }
}

/// Amendment `i` revises invoice `i`.
struct InvoiceAmendmentGenerator;

impl EntityGenerator for InvoiceAmendmentGenerator {
    fn entity(&self) -> EntityType {
        EntityType::InvoiceAmendments
    }

    fn plan(&self, ctx: &GeneratorContext<'_>) -> BatchPlan {
        BatchPlan::bounded(
            ctx.options.counts.invoice_amendments,
            ctx,
            &[EntityType::Invoices],
        )
    }

    fn build(
        &self,
        ctx: &GeneratorContext<'_>,
        index: usize,
        id: Identifier,
        rng: &mut dyn RngCore,
    ) -> Result<Record, GenerationError> {
        let invoice = ctx.parent_exact(EntityType::Invoices, index)?;
        let agency = ctx.parent(EntityType::Agencies, 0)?;
        let base = ctx.base_time;

        let original_total = Money::from_pence(100_000);
        let amended_total = Money::from_pence(95_000);

        Ok(Record::new(EntityType::InvoiceAmendments)
            .set("id", id)
            .reference("agency_id", EntityType::Agencies, agency)
            .reference("invoice_id", EntityType::Invoices, invoice)
            .set("amendment_type", "hours_adjustment")
            .set(
                "amendment_reason",
                "Client requested adjustment for actual hours worked",
            )
            .reference("original_invoice_id", EntityType::Invoices, invoice)
            .set("amendment_version", 1_i64)
            .set("original_total", original_total)
            .set("amended_total", amended_total)
            .set("total_difference", amended_total - original_total)
            .set("status", "approved")
            .set("created_by", "admin@agency.com")
            .set(
                "changes_made",
                json!([{"field": "hours", "old": "50", "new": "47.5"}]),
            )
            .set("risk_level", "low")
            .set("created_date", pools::timestamp_ago(base, 5, rng))
            .set("updated_date", pools::timestamp_ago(base, 1, rng)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoice_totals_follow_policy() {
        let subtotal = Money::from_pence(123_457);
        let outstanding = InvoiceTotals::compute(subtotal, 0.20, BalancePolicy::Outstanding);
        assert_eq!(outstanding.vat_amount, Money::from_pence(24_691));
        assert_eq!(outstanding.total, Money::from_pence(148_148));
        assert_eq!(outstanding.balance_due, outstanding.total);

        let settled = InvoiceTotals::compute(subtotal, 0.20, BalancePolicy::Settled);
        assert_eq!(settled.total, outstanding.total);
        assert_eq!(settled.balance_due, Money::ZERO);
    }

    #[test]
    fn payslip_net_pay_is_gross_minus_deductions() {
        let totals = PayslipTotals::compute(Money::from_pence(100_001), 0.20, 0.12);
        assert_eq!(totals.tax, Money::from_pence(20_000));
        assert_eq!(totals.ni, Money::from_pence(12_000));
        assert_eq!(totals.deductions, Money::from_pence(32_000));
        assert_eq!(totals.net_pay, Money::from_pence(68_001));
    }
}
