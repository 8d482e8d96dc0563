//! Back-office rows: admin workflows, audit change logs and queued notifications.

use rand::RngCore;
use serde_json::{Value, json};

use careseed_core::{EntityType, Identifier, Record};

use crate::errors::GenerationError;
use crate::generators::pools;
use crate::generators::{BatchPlan, EntityGenerator, GeneratorCatalog, GeneratorContext};

pub fn register(catalog: &mut GeneratorCatalog) {
    catalog.register_generator(Box::new(AdminWorkflowGenerator));
    catalog.register_generator(Box::new(ChangeLogGenerator));
    catalog.register_generator(Box::new(NotificationGenerator));
}

const WORKFLOWS: [(&str, &str); 3] = [
    ("unfilled_urgent_shift", "high"),
    ("expired_compliance_document", "medium"),
    ("timesheet_discrepancy", "critical"),
];

const CHANGE_TYPES: [&str; 5] = [
    "shift_cancelled",
    "shift_reassigned",
    "bank_details_changed",
    "pay_rate_override",
    "staff_suspended",
];

const NOTIFICATION_TYPES: [&str; 2] = ["shift_assignment", "shift_reminder"];

/// Attach the first shift to `column` as a JSON payload built by `payload`,
/// declaring the reference only when a shift exists.
fn with_first_shift(
    record: Record,
    ctx: &GeneratorContext<'_>,
    column: &'static str,
    payload: impl FnOnce(Value) -> Value,
) -> Record {
    match ctx.first(EntityType::Shifts) {
        Some(shift) => record.embed(
            column,
            EntityType::Shifts,
            vec![shift],
            payload(json!(shift.to_string())),
        ),
        None => record.set(column, payload(Value::Null)),
    }
}

struct AdminWorkflowGenerator;

impl EntityGenerator for AdminWorkflowGenerator {
    fn entity(&self) -> EntityType {
        EntityType::AdminWorkflows
    }

    fn plan(&self, ctx: &GeneratorContext<'_>) -> BatchPlan {
        BatchPlan::fixed(ctx.options.counts.admin_workflows)
    }

    fn build(
        &self,
        ctx: &GeneratorContext<'_>,
        index: usize,
        id: Identifier,
        rng: &mut dyn RngCore,
    ) -> Result<Record, GenerationError> {
        let agency = ctx.parent(EntityType::Agencies, index)?;
        let (kind, priority) = WORKFLOWS[index % WORKFLOWS.len()];
        let base = ctx.base_time;

        let record = Record::new(EntityType::AdminWorkflows)
            .set("id", id)
            .reference("agency_id", EntityType::Agencies, agency)
            .set("type", kind)
            .set("priority", priority)
            .set("title", format!("Workflow: {}", pools::title_case(kind)))
            .set("status", "pending")
            .set("created_by", "system");
        let record = with_first_shift(record, ctx, "related_entity", |shift| {
            json!({"entity_type": "shift", "entity_id": shift})
        });

        Ok(record
            .set("deadline", pools::timestamp_ahead(base, 7, rng))
            .set("auto_created", true)
            .set("escalation_count", 0_i64)
            .set("created_date", pools::timestamp_ago(base, 5, rng))
            .set("updated_date", pools::timestamp_ago(base, 1, rng)))
    }
}

struct ChangeLogGenerator;

impl EntityGenerator for ChangeLogGenerator {
    fn entity(&self) -> EntityType {
        EntityType::ChangeLogs
    }

    fn plan(&self, ctx: &GeneratorContext<'_>) -> BatchPlan {
        BatchPlan::fixed(ctx.options.counts.change_logs)
    }

    fn build(
        &self,
        ctx: &GeneratorContext<'_>,
        index: usize,
        id: Identifier,
        rng: &mut dyn RngCore,
    ) -> Result<Record, GenerationError> {
        let agency = ctx.parent(EntityType::Agencies, index)?;
        let base = ctx.base_time;
        let changed_at = pools::timestamp_ago(base, 3, rng);

        Ok(Record::new(EntityType::ChangeLogs)
            .set("id", id)
            .reference("agency_id", EntityType::Agencies, agency)
            .set("change_type", CHANGE_TYPES[index % CHANGE_TYPES.len()])
            .set("affected_entity_type", "shift")
            .reference_opt(
                "affected_entity_id",
                EntityType::Shifts,
                ctx.first(EntityType::Shifts),
            )
            .set("old_value", "Old Value")
            .set("new_value", "New Value")
            .set("reason", "Administrative change")
            .set("changed_by_email", "admin@agency.com")
            .set("changed_at", changed_at)
            .set("risk_level", "low")
            .set("reviewed", false)
            .set("created_date", changed_at)
            .set("updated_date", pools::timestamp_ago(base, 1, rng)))
    }
}

struct NotificationGenerator;

impl EntityGenerator for NotificationGenerator {
    fn entity(&self) -> EntityType {
        EntityType::NotificationQueue
    }

    fn plan(&self, ctx: &GeneratorContext<'_>) -> BatchPlan {
        BatchPlan::fixed(ctx.options.counts.notification_queue)
    }

    fn build(
        &self,
        ctx: &GeneratorContext<'_>,
        index: usize,
        id: Identifier,
        rng: &mut dyn RngCore,
    ) -> Result<Record, GenerationError> {
        let agency = ctx.parent(EntityType::Agencies, index)?;
        let n = index + 1;
        let base = ctx.base_time;

        let record = Record::new(EntityType::NotificationQueue)
            .set("id", id)
            .reference("agency_id", EntityType::Agencies, agency)
            .set(
                "notification_type",
                NOTIFICATION_TYPES[index % NOTIFICATION_TYPES.len()],
            )
            .set("recipient_type", "staff")
            .set("recipient_email", format!("staff{n}@example.com"))
            .set("recipient_first_name", format!("Staff{n}"))
            .set("status", "pending")
            .set("created_by", "system");
        let record = with_first_shift(record, ctx, "pending_items", |shift| {
            json!([{"type": "shift", "id": shift}])
        });

        let queued_at = pools::timestamp_ago(base, 1, rng);
        Ok(record
            .set("item_count", 1_i64)
            .set("created_date", queued_at)
            .set("updated_date", queued_at))
    }
}
