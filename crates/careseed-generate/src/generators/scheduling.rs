//! Shifts, the bookings that fill them and the timesheets that close them.

use chrono::{Duration, NaiveTime};
use rand::{Rng, RngCore};
use serde_json::json;

use careseed_core::{EntityType, Identifier, Money, Record};

use crate::errors::GenerationError;
use crate::generators::pools;
use crate::generators::workforce::STAFF_ROLES;
use crate::generators::{BatchPlan, EntityGenerator, GeneratorCatalog, GeneratorContext};
use crate::weighted::WeightedTable;

pub fn register(catalog: &mut GeneratorCatalog) {
    catalog.register_generator(Box::new(ShiftGenerator::new()));
    catalog.register_generator(Box::new(BookingGenerator));
    catalog.register_generator(Box::new(TimesheetGenerator));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftStatus {
    Open,
    Assigned,
    Confirmed,
    Completed,
    InProgress,
    Cancelled,
}

impl ShiftStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ShiftStatus::Open => "open",
            ShiftStatus::Assigned => "assigned",
            ShiftStatus::Confirmed => "confirmed",
            ShiftStatus::Completed => "completed",
            ShiftStatus::InProgress => "in_progress",
            ShiftStatus::Cancelled => "cancelled",
        }
    }

    /// Whether a shift in this status has a staff member attached.
    pub fn is_staffed(self) -> bool {
        !matches!(self, ShiftStatus::Open | ShiftStatus::Cancelled)
    }
}

/// Status mix of generated shifts.
pub const SHIFT_STATUS_WEIGHTS: [(ShiftStatus, u32); 6] = [
    (ShiftStatus::Open, 3),
    (ShiftStatus::Assigned, 3),
    (ShiftStatus::Confirmed, 2),
    (ShiftStatus::Completed, 5),
    (ShiftStatus::InProgress, 1),
    (ShiftStatus::Cancelled, 1),
];

struct ShiftGenerator {
    statuses: WeightedTable<ShiftStatus>,
}

impl ShiftGenerator {
    fn new() -> Self {
        Self {
            statuses: WeightedTable::new(&SHIFT_STATUS_WEIGHTS),
        }
    }
}

impl EntityGenerator for ShiftGenerator {
    fn entity(&self) -> EntityType {
        EntityType::Shifts
    }

    fn plan(&self, ctx: &GeneratorContext<'_>) -> BatchPlan {
        BatchPlan::fixed(ctx.options.counts.shifts)
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
        let status = self.statuses.pick_cyclic(index);
        let staff = if status.is_staffed() {
            Some(ctx.parent(EntityType::Staff, index)?)
        } else {
            None
        };
        let role = STAFF_ROLES[index % STAFF_ROLES.len()];
        let base = ctx.base_time;

        let date = (base + Duration::days(rng.random_range(-14..=7))).date();
        let start = date.and_time(NaiveTime::MIN) + Duration::hours(8);
        let end = start + Duration::hours(12);
        let journey_log = match status {
            ShiftStatus::Open => json!([]),
            _ => {
                let opened = pools::iso(pools::timestamp_ago(base, 20, rng));
                let updated = pools::iso(pools::timestamp_ago(base, 10, rng));
                json!([
                    {"status": "open", "timestamp": opened, "user": "system"},
                    {"status": status.as_str(), "timestamp": updated, "user": "admin"},
                ])
            }
        };
        let completed = status == ShiftStatus::Completed;

        Ok(Record::new(EntityType::Shifts)
            .set("id", id)
            .reference("agency_id", EntityType::Agencies, agency)
            .reference("client_id", EntityType::Clients, client)
            .reference_opt("assigned_staff_id", EntityType::Staff, staff)
            .set("date", date)
            .set("start_time", start)
            .set("end_time", end)
            .set("duration_hours", 12_i64)
            .set("role_required", role)
            .set("pay_rate", rng.random_range(15_i64..=22))
            .set("charge_rate", rng.random_range(22_i64..=32))
            .set("break_duration_minutes", 30_i64)
            .set("status", status.as_str())
            .set("urgency", if index % 5 == 0 { "urgent" } else { "normal" })
            .set("notes", format!("Shift for {role}"))
            .set("created_by", "admin@agency.com")
            .set(
                "work_location_within_site",
                format!("Room {}", rng.random_range(1_u32..=20)),
            )
            .set("shift_journey_log", journey_log)
            .set("financial_locked", completed)
            .set("recurring", false)
            .set("requirements", json!(["Medication trained", "DBS checked"]))
            .set("booking_id", None::<Identifier>)
            .set("timesheet_received", completed)
            .set("marketplace_visible", false)
            .set("admin_closure_required", status != ShiftStatus::Open)
            .set("created_date", pools::timestamp_ago(base, 30, rng))
            .set("updated_date", pools::timestamp_ago(base, 1, rng)))
    }
}

/// Booking `i` fills shift `i` with staff member `i`.
struct BookingGenerator;

impl EntityGenerator for BookingGenerator {
    fn entity(&self) -> EntityType {
        EntityType::Bookings
    }

    fn plan(&self, ctx: &GeneratorContext<'_>) -> BatchPlan {
        BatchPlan::bounded(
            ctx.options.counts.bookings,
            ctx,
            &[EntityType::Shifts, EntityType::Staff],
        )
    }

    fn build(
        &self,
        ctx: &GeneratorContext<'_>,
        index: usize,
        id: Identifier,
        rng: &mut dyn RngCore,
    ) -> Result<Record, GenerationError> {
        let shift = ctx.parent_exact(EntityType::Shifts, index)?;
        let staff = ctx.parent_exact(EntityType::Staff, index)?;
        let client = ctx.parent(EntityType::Clients, index)?;
        let agency = ctx.parent(EntityType::Agencies, index)?;
        let base = ctx.base_time;

        Ok(Record::new(EntityType::Bookings)
            .set("id", id)
            .reference("agency_id", EntityType::Agencies, agency)
            .reference("shift_id", EntityType::Shifts, shift)
            .reference("staff_id", EntityType::Staff, staff)
            .reference("client_id", EntityType::Clients, client)
            .set("status", "confirmed")
            .set("booking_date", pools::timestamp_ago(base, 10, rng))
            .set("shift_date", pools::date_ago(base, 10, rng))
            .set("confirmation_method", "phone")
            .set("confirmed_by_staff_at", pools::timestamp_ago(base, 9, rng))
            .set("notes", "Booking confirmed by staff")
            .set("created_date", pools::timestamp_ago(base, 15, rng))
            .set("updated_date", pools::timestamp_ago(base, 1, rng)))
    }
}

/// Timesheet `i` closes booking `i` for staff member `i`.
struct TimesheetGenerator;

impl EntityGenerator for TimesheetGenerator {
    fn entity(&self) -> EntityType {
        EntityType::Timesheets
    }

    fn plan(&self, ctx: &GeneratorContext<'_>) -> BatchPlan {
        BatchPlan::bounded(
            ctx.options.counts.timesheets,
            ctx,
            &[EntityType::Bookings, EntityType::Staff],
        )
    }

    fn build(
        &self,
        ctx: &GeneratorContext<'_>,
        index: usize,
        id: Identifier,
        rng: &mut dyn RngCore,
    ) -> Result<Record, GenerationError> {
        let booking = ctx.parent_exact(EntityType::Bookings, index)?;
        let staff = ctx.parent_exact(EntityType::Staff, index)?;
        let client = ctx.parent(EntityType::Clients, index)?;
        let agency = ctx.parent(EntityType::Agencies, index)?;
        let base = ctx.base_time;

        let hours_tenths: i64 = rng.random_range(100..=120);
        let pay_rate: i64 = rng.random_range(15..=22);
        let charge_rate: i64 = rng.random_range(22..=32);
        let clock_in = pools::timestamp_ago(base, 7, rng);
        let clock_out = clock_in + Duration::minutes(hours_tenths * 6);

        Ok(Record::new(EntityType::Timesheets)
            .set("id", id)
            .reference("agency_id", EntityType::Agencies, agency)
            .reference("booking_id", EntityType::Bookings, booking)
            .reference("staff_id", EntityType::Staff, staff)
            .reference("client_id", EntityType::Clients, client)
            .set("shift_date", clock_in.date())
            .set(
                "work_location_within_site",
                format!("Room {}", rng.random_range(1_u32..=10)),
            )
            .set("clock_in_time", clock_in)
            .set("clock_out_time", clock_out)
            .set("total_hours", hours_tenths as f64 / 10.0)
            .set("break_duration_minutes", 30_i64)
            .set("status", "approved")
            .set("pay_rate", pay_rate)
            .set("charge_rate", charge_rate)
            .set("staff_pay_amount", hours_amount(hours_tenths, pay_rate))
            .set("client_charge_amount", hours_amount(hours_tenths, charge_rate))
            .set("geofence_validated", true)
            .set("location_verified", true)
            .set("staff_signature", "SignatureDataBase64...")
            .set("created_date", pools::timestamp_ago(base, 10, rng))
            .set("updated_date", pools::timestamp_ago(base, 1, rng)))
    }
}

/// `hours × rate` for hours held in tenths and a whole-pound hourly rate.
pub fn hours_amount(hours_tenths: i64, rate_pounds: i64) -> Money {
    Money::from_pence(hours_tenths * rate_pounds * 10)
}
