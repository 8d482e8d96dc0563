//! Agencies, their admin profiles, client care homes and staff groups.

use rand::{Rng, RngCore};
use serde_json::json;

use careseed_core::{EntityType, Identifier, Record, SqlValue};

use crate::errors::GenerationError;
use crate::generators::pools::{self, CARE_HOME_NAMES};
use crate::generators::{BatchPlan, EntityGenerator, GeneratorCatalog, GeneratorContext};
use crate::weighted::WeightedTable;

pub fn register(catalog: &mut GeneratorCatalog) {
    catalog.register_generator(Box::new(AgencyGenerator));
    catalog.register_generator(Box::new(ProfileGenerator));
    catalog.register_generator(Box::new(ClientGenerator::new()));
    catalog.register_generator(Box::new(GroupGenerator));
}

struct AgencyPreset {
    name: &'static str,
    created_by: &'static str,
    registration_number: &'static str,
    contact_email: &'static str,
    contact_phone: &'static str,
    subscription_tier: &'static str,
    line1: &'static str,
    city: &'static str,
    postcode: &'static str,
    account_name: &'static str,
    account_number: &'static str,
    sort_code: &'static str,
    /// Feature toggles in `AGENCY_FLAGS` order.
    flags: [bool; 11],
    payment_terms_days: i64,
    invoice_frequency: &'static str,
}

const AGENCY_FLAGS: [&str; 11] = [
    "dbs_check_expiry_alerts",
    "mandatory_training_reminders",
    "document_expiry_warnings",
    "auto_approve_timesheets",
    "sms_shift_confirmations",
    "whatsapp_notifications",
    "auto_generate_invoices",
    "send_payment_reminders",
    "email_notifications",
    "sms_notifications",
    "whatsapp_global_notifications",
];

const AGENCY_PRESETS: [AgencyPreset; 2] = [
    AgencyPreset {
        name: "Dominion Healthcare Services Ltd",
        created_by: "g.basera@yahoo.com",
        registration_number: "GB12345678",
        contact_email: "info@dominionhealth.co.uk",
        contact_phone: "+441912345678",
        subscription_tier: "professional",
        line1: "123 Business Park",
        city: "Newcastle",
        postcode: "NE1 4ST",
        account_name: "Dominion Healthcare",
        account_number: "12345678",
        sort_code: "20-00-00",
        flags: [true, true, true, false, true, true, true, true, true, true, true],
        payment_terms_days: 30,
        invoice_frequency: "weekly",
    },
    AgencyPreset {
        name: "CareStaff Solutions Ltd",
        created_by: "admin@carestaff.co.uk",
        registration_number: "GB87654321",
        contact_email: "hello@carestaff.co.uk",
        contact_phone: "+441132345678",
        subscription_tier: "starter",
        line1: "456 Care House",
        city: "Leeds",
        postcode: "LS1 2AB",
        account_name: "CareStaff Solutions",
        account_number: "87654321",
        sort_code: "40-00-00",
        flags: [true, false, false, true, false, false, false, false, true, false, false],
        payment_terms_days: 14,
        invoice_frequency: "monthly",
    },
];

/// Suffix distinguishing the n-th reuse of a preset name (`""`, `" 2"`, ...).
fn cycle_suffix(index: usize, pool: usize) -> String {
    match index / pool {
        0 => String::new(),
        round => format!(" {}", round + 1),
    }
}

struct AgencyGenerator;

impl EntityGenerator for AgencyGenerator {
    fn entity(&self) -> EntityType {
        EntityType::Agencies
    }

    fn plan(&self, ctx: &GeneratorContext<'_>) -> BatchPlan {
        BatchPlan::fixed(ctx.options.counts.agencies)
    }

    fn build(
        &self,
        ctx: &GeneratorContext<'_>,
        index: usize,
        id: Identifier,
        _rng: &mut dyn RngCore,
    ) -> Result<Record, GenerationError> {
        // Continue the numbering of earlier runs.
        let index = ctx.offset(EntityType::Agencies) + index;
        let preset = &AGENCY_PRESETS[index % AGENCY_PRESETS.len()];
        let suffix = cycle_suffix(index, AGENCY_PRESETS.len());
        let registration_number = match index / AGENCY_PRESETS.len() {
            0 => preset.registration_number.to_string(),
            round => format!("{}-{}", preset.registration_number, round + 1),
        };

        let mut record = Record::new(EntityType::Agencies)
            .set("id", id)
            .set("name", format!("{}{suffix}", preset.name))
            .set("created_by", preset.created_by)
            .set("registration_number", registration_number)
            .set("contact_email", preset.contact_email)
            .set("contact_phone", preset.contact_phone)
            .set("subscription_tier", preset.subscription_tier)
            .set(
                "address",
                json!({"line1": preset.line1, "city": preset.city, "postcode": preset.postcode}),
            )
            .set("status", "active")
            .set(
                "bank_details",
                json!({
                    "account_name": preset.account_name,
                    "account_number": preset.account_number,
                    "sort_code": preset.sort_code,
                }),
            );
        for (flag, enabled) in AGENCY_FLAGS.iter().zip(preset.flags) {
            record = record.set(*flag, enabled);
        }
        Ok(record
            .set("payment_terms_days", preset.payment_terms_days)
            .set("invoice_frequency", preset.invoice_frequency))
    }
}

/// Admin and manager logins. Their ids must match auth users in a hosted
/// deployment, which is why the filter drops this section.
struct ProfileGenerator;

impl EntityGenerator for ProfileGenerator {
    fn entity(&self) -> EntityType {
        EntityType::Profiles
    }

    fn plan(&self, ctx: &GeneratorContext<'_>) -> BatchPlan {
        let agencies = ctx.available(EntityType::Agencies);
        BatchPlan::fixed(agencies * ctx.options.counts.profiles_per_agency)
    }

    fn build(
        &self,
        ctx: &GeneratorContext<'_>,
        index: usize,
        id: Identifier,
        rng: &mut dyn RngCore,
    ) -> Result<Record, GenerationError> {
        let per_agency = ctx.options.counts.profiles_per_agency;
        let agency_index = index / per_agency;
        let slot = index % per_agency;
        let agency = ctx.parent_exact(EntityType::Agencies, agency_index)?;
        let n = ctx.offset(EntityType::Agencies) + agency_index + 1;

        let (label, user_type, role) = if slot == 0 {
            ("Admin", "agency_admin", "admin")
        } else {
            ("Manager", "manager", "user")
        };
        let handle = match slot {
            0 | 1 => format!("{}{n}", label.to_lowercase()),
            _ => format!("{}{n}-{slot}", label.to_lowercase()),
        };

        Ok(Record::new(EntityType::Profiles)
            .set("id", id)
            .set("full_name", format!("{label} User {n}"))
            .set("email", format!("{handle}@agency{n}.com"))
            .set("phone", pools::phone(rng))
            .set("user_type", user_type)
            .reference("agency_id", EntityType::Agencies, agency)
            .set("created_date", pools::timestamp_ago(ctx.base_time, 60, rng))
            .set("role", role)
            .set(
                "profile_photo_url",
                format!("https://ui-avatars.com/api/?name={label}"),
            ))
    }
}

/// Inspection ratings given to generated care homes.
pub const CQC_RATING_WEIGHTS: [(&str, u32); 2] = [("good", 3), ("outstanding", 1)];

struct ClientGenerator {
    ratings: WeightedTable<&'static str>,
}

impl ClientGenerator {
    fn new() -> Self {
        Self {
            ratings: WeightedTable::new(&CQC_RATING_WEIGHTS),
        }
    }
}

impl EntityGenerator for ClientGenerator {
    fn entity(&self) -> EntityType {
        EntityType::Clients
    }

    fn plan(&self, ctx: &GeneratorContext<'_>) -> BatchPlan {
        let agencies = ctx.available(EntityType::Agencies);
        BatchPlan::fixed(agencies * ctx.options.counts.clients_per_agency)
    }

    fn build(
        &self,
        ctx: &GeneratorContext<'_>,
        index: usize,
        id: Identifier,
        rng: &mut dyn RngCore,
    ) -> Result<Record, GenerationError> {
        let agency =
            ctx.parent_exact(EntityType::Agencies, index / ctx.options.counts.clients_per_agency)?;
        let number = ctx.offset(EntityType::Clients) + index;
        let name = format!(
            "{}{}",
            CARE_HOME_NAMES[number % CARE_HOME_NAMES.len()],
            cycle_suffix(number, CARE_HOME_NAMES.len())
        );
        let domain = pools::slug(&name);

        let record = Record::new(EntityType::Clients)
            .set("id", id)
            .reference("agency_id", EntityType::Agencies, agency)
            .set("name", name.as_str())
            .set("type", "care_home")
            .set("status", "active")
            .set("created_by", "admin@agency.com")
            .set(
                "location_coordinates",
                json!({"latitude": pools::BASE_LATITUDE, "longitude": pools::BASE_LONGITUDE}),
            )
            .set("geofence_enabled", true)
            .set(
                "contact_person",
                json!({
                    "name": "Care Manager",
                    "email": format!("manager@{domain}.com"),
                    "phone": pools::phone(rng),
                    "role": "Manager",
                }),
            )
            .set("billing_email", format!("billing@{domain}.com"))
            .set("address", pools::address(rng))
            .set("cqc_rating", self.ratings.pick(rng))
            .set("bed_capacity", [38_i64, 45, 52, 60][rng.random_range(0..4)]);

        let record = match ctx.first(EntityType::Staff) {
            Some(staff) => record.embed(
                "preferred_staff",
                EntityType::Staff,
                vec![staff],
                json!([staff.to_string()]),
            ),
            None => record.set("preferred_staff", json!([])),
        };

        Ok(record
            .set("notes", "Preferred care home with excellent facilities")
            .set("total_bookings", rng.random_range(10_i64..=100))
            .set(
                "internal_locations",
                json!(["Room 1", "Room 2", "Room 3", "Wing A", "Wing B"]),
            )
            .set("payment_terms", "net_30")
            .set(
                "contract_terms",
                json!({
                    "require_location_specification": true,
                    "break_duration_minutes": 30,
                    "rates_by_role": {
                        "nurse": {"pay_rate": 20, "charge_rate": 30},
                        "healthcare_assistant": {"pay_rate": 12, "charge_rate": 18},
                        "senior_care_worker": {"pay_rate": 16, "charge_rate": 24},
                    },
                }),
            )
            .set("rating", pools::round1(rng.random_range(4.2..4.9)))
            .set("geofence_radius_meters", 100)
            .set("created_date", pools::timestamp_ago(ctx.base_time, 90, rng))
            .set("updated_date", pools::timestamp_ago(ctx.base_time, 1, rng)))
    }
}

/// One team per agency holding that agency's block of staff.
struct GroupGenerator;

impl EntityGenerator for GroupGenerator {
    fn entity(&self) -> EntityType {
        EntityType::Groups
    }

    fn plan(&self, ctx: &GeneratorContext<'_>) -> BatchPlan {
        BatchPlan::bounded(ctx.options.counts.groups, ctx, &[EntityType::Agencies])
    }

    fn build(
        &self,
        ctx: &GeneratorContext<'_>,
        index: usize,
        id: Identifier,
        rng: &mut dyn RngCore,
    ) -> Result<Record, GenerationError> {
        let agency = ctx.parent_exact(EntityType::Agencies, index)?;
        let staff = ctx.minted(EntityType::Staff);
        let per_agency = ctx.options.counts.staff_per_agency;
        let start = (index * per_agency).min(staff.len());
        let end = ((index + 1) * per_agency).min(staff.len());
        let members = staff[start..end].to_vec();
        let team = team_letter(ctx.offset(EntityType::Groups) + index);

        Ok(Record::new(EntityType::Groups)
            .set("id", id)
            .reference("agency_id", EntityType::Agencies, agency)
            .set("name", format!("Team {team}"))
            .set("description", format!("Primary healthcare team {team}"))
            .embed(
                "staff_members",
                EntityType::Staff,
                members.clone(),
                SqlValue::UuidArray(members),
            )
            .set("created_date", pools::timestamp_ago(ctx.base_time, 60, rng))
            .set("updated_date", pools::timestamp_ago(ctx.base_time, 1, rng)))
    }
}

/// `A`..`Z`, then `A2`..`Z2` and so on.
fn team_letter(index: usize) -> String {
    let letter = char::from(b'A' + (index % 26) as u8);
    match index / 26 {
        0 => letter.to_string(),
        round => format!("{letter}{}", round + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_repeat_with_a_round_suffix() {
        assert_eq!(cycle_suffix(1, 2), "");
        assert_eq!(cycle_suffix(2, 2), " 2");
        assert_eq!(team_letter(0), "A");
        assert_eq!(team_letter(27), "B2");
    }
}
