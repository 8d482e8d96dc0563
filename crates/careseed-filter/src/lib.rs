//! Section filter for generated fixture scripts.
//!
//! Splits a script on its `-- N. TABLE (k records)` markers and drops the
//! sections a hosted database cannot accept as-is, such as profiles whose
//! ids must come from the authentication service.

pub mod errors;
pub mod rules;
pub mod section;

use std::fs;
use std::path::Path;

use tracing::info;

pub use errors::FilterError;
pub use rules::{FilterOutcome, FilterRules, SkipReason, SkippedSection, apply, render};
pub use section::{Section, SectionSplitter, partition};

/// Read `input`, filter it with `rules` and write the result to `output`.
pub fn filter_file(
    input: &Path,
    output: &Path,
    rules: &FilterRules,
) -> Result<FilterOutcome, FilterError> {
    let text = fs::read_to_string(input)?;
    let outcome = apply(partition(&text)?, rules);
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, render(&outcome))?;
    info!(
        input = %input.display(),
        output = %output.display(),
        kept = outcome.kept.len(),
        skipped = outcome.skipped.len(),
        "filtered script written"
    );
    Ok(outcome)
}
