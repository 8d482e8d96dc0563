//! Agency staff and their compliance documents.

use rand::{Rng, RngCore};
use serde_json::json;

use careseed_core::{EntityType, Identifier, Record, SqlValue};

use crate::errors::GenerationError;
use crate::generators::pools::{self, FIRST_NAMES_FEMALE, FIRST_NAMES_MALE, LAST_NAMES};
use crate::generators::{BatchPlan, EntityGenerator, GeneratorCatalog, GeneratorContext};

pub fn register(catalog: &mut GeneratorCatalog) {
    catalog.register_generator(Box::new(StaffGenerator));
    catalog.register_generator(Box::new(ComplianceGenerator));
}

/// Role of the n-th staff member within an agency block.
pub const STAFF_ROLES: [&str; 5] = [
    "nurse",
    "healthcare_assistant",
    "senior_care_worker",
    "nurse",
    "healthcare_assistant",
];

pub const DOCUMENT_TYPES: [&str; 6] = [
    "dbs_check",
    "right_to_work",
    "professional_registration",
    "training_certificate",
    "vaccination_record",
    "reference",
];

struct StaffGenerator;

impl EntityGenerator for StaffGenerator {
    fn entity(&self) -> EntityType {
        EntityType::Staff
    }

    fn plan(&self, ctx: &GeneratorContext<'_>) -> BatchPlan {
        let agencies = ctx.available(EntityType::Agencies);
        BatchPlan::fixed(agencies * ctx.options.counts.staff_per_agency)
    }

    fn build(
        &self,
        ctx: &GeneratorContext<'_>,
        index: usize,
        id: Identifier,
        rng: &mut dyn RngCore,
    ) -> Result<Record, GenerationError> {
        let per_agency = ctx.options.counts.staff_per_agency;
        let agency = ctx.parent_exact(EntityType::Agencies, index / per_agency)?;
        let slot = index % per_agency;
        let role = STAFF_ROLES[slot % STAFF_ROLES.len()];
        let is_nurse = role == "nurse";

        let first = if slot % 2 == 0 {
            pools::pick(FIRST_NAMES_FEMALE, rng)
        } else {
            pools::pick(FIRST_NAMES_MALE, rng)
        };
        let last = pools::pick(LAST_NAMES, rng);
        let base = ctx.base_time;

        let nmc_pin = if is_nurse {
            SqlValue::from(format!("NMC{}", rng.random_range(100_000_u32..=999_999)))
        } else {
            SqlValue::Null
        };
        let training_expiry = if is_nurse {
            SqlValue::from(pools::date_ahead(base, 365, rng))
        } else {
            SqlValue::Null
        };

        Ok(Record::new(EntityType::Staff)
            .set("id", id)
            .reference("agency_id", EntityType::Agencies, agency)
            .set("first_name", first)
            .set("last_name", last)
            .set("email", pools::email(first, last, "gmail.com"))
            .set("phone", pools::phone(rng))
            .set("role", role)
            .set("employment_type", "temporary")
            .set("status", "active")
            .set("hourly_rate", rng.random_range(12_i64..=25))
            .set("created_by", "admin@agency.com")
            .set("whatsapp_pin", rng.random_range(1000_u32..=9999).to_string())
            .set("whatsapp_number_verified", pools::phone(rng))
            .set("date_of_birth", pools::date_ago(base, 365 * 30, rng))
            .set(
                "profile_photo_url",
                format!("https://ui-avatars.com/api/?name={first}+{last}"),
            )
            .set("nmc_pin", nmc_pin)
            .set("medication_trained", is_nurse)
            .set("medication_training_expiry", training_expiry)
            .set("can_work_as_senior", role == "senior_care_worker")
            .set("role_hierarchy", json!({"can_work_as": [role]}))
            .set(
                "employment_history",
                json!([{"employer": "Previous Care Home", "duration": "2 years"}]),
            )
            .set(
                "references",
                json!([{"name": "Jane Ref", "phone": pools::phone(rng)}]),
            )
            .set("skills", json!(["First Aid", "Manual Handling"]))
            .set("gps_consent", true)
            .set(
                "last_known_location",
                json!({
                    "latitude": pools::BASE_LATITUDE + rng.random_range(-0.1..0.1),
                    "longitude": pools::BASE_LONGITUDE + rng.random_range(-0.1..0.1),
                    "timestamp": pools::iso(pools::timestamp_ago(base, 1, rng)),
                }),
            )
            .set("date_joined", pools::date_ago(base, 365, rng))
            .set("months_of_experience", rng.random_range(6_i64..=60))
            .set("address", pools::address(rng))
            .set(
                "emergency_contact",
                json!({
                    "name": "Emergency Contact",
                    "relationship": "Spouse",
                    "phone": pools::phone(rng),
                }),
            )
            .set(
                "availability",
                json!({
                    "monday": [{"start": "08:00", "end": "20:00"}],
                    "tuesday": [{"start": "08:00", "end": "20:00"}],
                }),
            )
            .set("rating", pools::round1(rng.random_range(4.0..5.0)))
            .set("total_shifts_completed", rng.random_range(5_i64..=50))
            .set("gps_consent_date", pools::timestamp_ago(base, 100, rng))
            .set("created_date", pools::timestamp_ago(base, 100, rng))
            .set("updated_date", pools::timestamp_ago(base, 1, rng)))
    }
}

struct ComplianceGenerator;

impl EntityGenerator for ComplianceGenerator {
    fn entity(&self) -> EntityType {
        EntityType::Compliance
    }

    fn plan(&self, ctx: &GeneratorContext<'_>) -> BatchPlan {
        BatchPlan::fixed(ctx.options.counts.compliance)
    }

    fn build(
        &self,
        ctx: &GeneratorContext<'_>,
        index: usize,
        id: Identifier,
        rng: &mut dyn RngCore,
    ) -> Result<Record, GenerationError> {
        let staff = ctx.parent(EntityType::Staff, index)?;
        let agency = ctx.parent(EntityType::Agencies, index)?;
        let document_type = DOCUMENT_TYPES[index % DOCUMENT_TYPES.len()];
        let n = index + 1;
        let base = ctx.base_time;

        Ok(Record::new(EntityType::Compliance)
            .set("id", id)
            .reference("staff_id", EntityType::Staff, staff)
            .reference("agency_id", EntityType::Agencies, agency)
            .set("document_type", document_type)
            .set(
                "document_name",
                format!("{} - Staff {n}", pools::title_case(document_type)),
            )
            .set("document_url", format!("https://example.com/docs/{id}.pdf"))
            .set("issue_date", pools::date_ago(base, 365, rng))
            .set(
                "expiry_date",
                pools::date_ahead(base, [30, 90, 365][rng.random_range(0..3)], rng),
            )
            .set("status", "verified")
            .set("created_by", "admin@agency.com")
            .set("issuing_authority", format!("Issuing Authority {n}"))
            .set(
                "reference_number",
                format!("REF-{}", rng.random_range(100_000_u32..=999_999)),
            )
            .set("reminder_30d_sent", false)
            .set("reminder_14d_sent", false)
            .set("created_date", pools::timestamp_ago(base, 365, rng))
            .set("updated_date", pools::timestamp_ago(base, 1, rng)))
    }
}
