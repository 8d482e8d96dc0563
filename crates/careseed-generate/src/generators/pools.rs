//! UK name/place pools and small value helpers shared by the generators.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::{Rng, RngCore};
use serde_json::{Value, json};

use careseed_core::TIMESTAMP_FORMAT;

pub const FIRST_NAMES_FEMALE: &[&str] = &[
    "Mary", "Sarah", "Emma", "Jennifer", "Linda", "Elizabeth", "Jessica", "Karen", "Rachel",
    "Sophie",
];
pub const FIRST_NAMES_MALE: &[&str] = &[
    "James", "John", "Robert", "Michael", "William", "David", "Thomas", "Daniel", "Matthew",
    "Andrew",
];
pub const LAST_NAMES: &[&str] = &[
    "Smith", "Jones", "Williams", "Taylor", "Brown", "Davies", "Evans", "Wilson", "Thomas",
    "Roberts",
];
pub const CITIES: &[&str] = &[
    "London",
    "Manchester",
    "Sunderland",
    "Newcastle",
    "Leeds",
    "Birmingham",
];
pub const STREETS: &[&str] = &[
    "High Street",
    "Station Road",
    "Church Lane",
    "Main Street",
    "Park Road",
];
pub const CARE_HOME_NAMES: &[&str] = &[
    "Divine Care Center",
    "Instay Sunderland",
    "Harbor View Lodge",
    "Willow Manor",
    "Oakwood Residence",
    "Sunset Gardens",
];

const POSTCODE_AREAS: &[&str] = &["TS", "SR", "NE"];
const POSTCODE_LETTERS: &[u8] = b"ABDEFGHJLNPQRSTUWXYZ";

/// Newcastle city centre, the anchor for generated coordinates.
pub const BASE_LATITUDE: f64 = 54.9783;
pub const BASE_LONGITUDE: f64 = -1.6174;

pub fn pick<'a>(values: &[&'a str], rng: &mut dyn RngCore) -> &'a str {
    values[rng.random_range(0..values.len())]
}

pub fn phone(rng: &mut dyn RngCore) -> String {
    format!("+44{}", rng.random_range(7_000_000_000_u64..=7_999_999_999))
}

pub fn postcode(rng: &mut dyn RngCore) -> String {
    let area = pick(POSTCODE_AREAS, rng);
    let district = rng.random_range(1..=9);
    let sector = rng.random_range(1..=9);
    let a = POSTCODE_LETTERS[rng.random_range(0..POSTCODE_LETTERS.len())] as char;
    let b = POSTCODE_LETTERS[rng.random_range(0..POSTCODE_LETTERS.len())] as char;
    format!("{area}{district} {sector}{a}{b}")
}

pub fn address(rng: &mut dyn RngCore) -> Value {
    json!({
        "line1": format!("{} {}", rng.random_range(1..=999), pick(STREETS, rng)),
        "city": pick(CITIES, rng),
        "postcode": postcode(rng),
        "country": "UK",
    })
}

pub fn email(first: &str, last: &str, domain: &str) -> String {
    format!("{}.{}@{domain}", first.to_lowercase(), last.to_lowercase())
}

/// `"Harbor View Lodge"` -> `"harborviewlodge"`.
pub fn slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "")
}

/// `"dbs_check"` -> `"Dbs Check"`.
pub fn title_case(snake: &str) -> String {
    snake
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Date between `days` days ago and `base`.
pub fn date_ago(base: NaiveDateTime, days: i64, rng: &mut dyn RngCore) -> NaiveDate {
    (base - Duration::days(rng.random_range(0..=days))).date()
}

/// Date between tomorrow and `days` days ahead of `base`.
pub fn date_ahead(base: NaiveDateTime, days: i64, rng: &mut dyn RngCore) -> NaiveDate {
    (base + Duration::days(rng.random_range(1..=days.max(1)))).date()
}

/// Instant up to `days` days and 23 hours before `base`.
pub fn timestamp_ago(base: NaiveDateTime, days: i64, rng: &mut dyn RngCore) -> NaiveDateTime {
    base - Duration::days(rng.random_range(0..=days)) - Duration::hours(rng.random_range(0..=23))
}

/// Instant between one and `days` days after `base`.
pub fn timestamp_ahead(base: NaiveDateTime, days: i64, rng: &mut dyn RngCore) -> NaiveDateTime {
    base + Duration::days(rng.random_range(1..=days.max(1)))
}

/// Timestamp text for JSON payloads, matching the column literal layout.
pub fn iso(instant: NaiveDateTime) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn formats_uk_contact_details() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let phone = phone(&mut rng);
        assert!(phone.starts_with("+447"));
        assert_eq!(phone.len(), 13);

        let postcode = postcode(&mut rng);
        let (outward, inward) = postcode.split_once(' ').expect("postcode has a space");
        assert_eq!(outward.len(), 3);
        assert_eq!(inward.len(), 3);
    }

    #[test]
    fn title_cases_snake_identifiers() {
        assert_eq!(title_case("right_to_work"), "Right To Work");
        assert_eq!(slug("Willow Manor"), "willowmanor");
        assert_eq!(email("Emma", "Jones", "gmail.com"), "emma.jones@gmail.com");
    }

    #[test]
    fn relative_dates_stay_in_range() {
        let base = NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("base time");
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..50 {
            let past = date_ago(base, 10, &mut rng);
            assert!(past <= base.date() && past >= base.date() - Duration::days(10));
            let future = date_ahead(base, 20, &mut rng);
            assert!(future > base.date() && future <= base.date() + Duration::days(20));
        }
    }
}
