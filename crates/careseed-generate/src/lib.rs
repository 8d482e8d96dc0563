//! SQL fixture generation for the care staffing schema.
//!
//! Entity generators run in dependency order against a
//! [`careseed_core::ManifestRegistry`], so every foreign key in the emitted
//! script points at a row emitted earlier in the same run or a previous one.

pub mod checks;
pub mod engine;
pub mod errors;
pub mod generators;
pub mod model;
pub mod output;
pub mod script;
pub mod weighted;

pub use engine::{EmitResult, FixtureEmitter};
pub use errors::GenerationError;
pub use model::{
    BalancePolicy, EntityCounts, GenerateOptions, GenerationReport, Stage, TableReport,
};
pub use output::{WriteMode, write_script};
pub use script::{FixtureScript, Statement};
