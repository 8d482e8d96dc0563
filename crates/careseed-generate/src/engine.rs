use std::time::Instant;

use chrono::NaiveDateTime;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use careseed_core::{Identifier, ManifestRegistry, Record};

use crate::checks::verify_record;
use crate::errors::GenerationError;
use crate::generators::{EntityGenerator, GeneratorCatalog, GeneratorContext, RunOffsets};
use crate::model::{GenerateOptions, GenerationReport, Stage, TableReport};
use crate::script::FixtureScript;

/// Result of an emitter run.
#[derive(Debug, Clone)]
pub struct EmitResult {
    pub script: FixtureScript,
    pub report: GenerationReport,
}

/// Generates entity batches in dependency order, registering every
/// identifier it mints and rendering the rows as a SQL fixture script.
pub struct FixtureEmitter {
    options: GenerateOptions,
    catalog: GeneratorCatalog,
}

impl FixtureEmitter {
    pub fn new(options: GenerateOptions) -> Self {
        Self {
            options,
            catalog: GeneratorCatalog::new(),
        }
    }

    pub fn run(
        &self,
        registry: &mut ManifestRegistry,
        stage: Stage,
    ) -> Result<EmitResult, GenerationError> {
        self.options.validate()?;
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let base_time = self
            .options
            .base_time
            .unwrap_or_else(|| chrono::Local::now().naive_local());
        let mut rng: ChaCha8Rng = match self.options.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };

        info!(
            run_id = %run_id,
            stage = %stage,
            seed = ?self.options.seed,
            strict = self.options.strict,
            "generation started"
        );

        let offsets = RunOffsets::snapshot(registry, stage.entities());
        let mut report = GenerationReport::new(run_id.clone(), stage, self.options.seed);
        let mut script = FixtureScript::new();
        write_header(&mut script, stage, base_time);

        for &entity in stage.entities() {
            let table_start = Instant::now();
            let generator = self.catalog.generator(entity).ok_or_else(|| {
                GenerationError::Invariant(format!("no generator registered for {entity}"))
            })?;

            let batch = self.generate_batch(generator, registry, &offsets, base_time, &mut rng)?;

            script.comment(format!(
                "{}. {} ({} records)",
                entity.ordinal(),
                entity.section_label(),
                batch.records.len()
            ));
            for record in &batch.records {
                let sql = record
                    .to_insert_sql()
                    .map_err(|err| GenerationError::from(err).during(entity, "render"))?;
                script.insert(sql);
            }
            script.blank();

            if let Some(pool) = batch.table.limited_by {
                warn!(
                    entity = %entity,
                    requested = batch.table.rows_requested,
                    generated = batch.table.rows_generated,
                    limited_by = %pool,
                    "batch truncated"
                );
            }
            info!(
                entity = %entity,
                rows = batch.table.rows_generated,
                duration_ms = table_start.elapsed().as_millis() as u64,
                "table generated"
            );
            report.tables.push(batch.table);
        }

        report.statements = script.insert_count();
        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            run_id = %run_id,
            tables = report.tables.len(),
            statements = report.statements,
            duration_ms = report.duration_ms,
            "generation completed"
        );

        Ok(EmitResult { script, report })
    }

    /// Build one entity's rows, appending each identifier to `registry` as
    /// soon as its row is accepted.
    fn generate_batch(
        &self,
        generator: &dyn EntityGenerator,
        registry: &mut ManifestRegistry,
        offsets: &RunOffsets,
        base_time: NaiveDateTime,
        rng: &mut dyn RngCore,
    ) -> Result<Batch, GenerationError> {
        let entity = generator.entity();
        let plan = generator.plan(&GeneratorContext {
            registry,
            options: &self.options,
            offsets,
            base_time,
        });

        let mut records = Vec::with_capacity(plan.rows);
        for index in 0..plan.rows {
            let id = Identifier::mint(rng);
            let ctx = GeneratorContext {
                registry,
                options: &self.options,
                offsets,
                base_time,
            };
            let record = generator
                .build(&ctx, index, id, rng)
                .map_err(|err| err.during(entity, "build"))?;
            if self.options.strict {
                verify_record(&record, registry, &self.options)
                    .map_err(|err| err.during(entity, "verify"))?;
            }
            registry.append(entity, id);
            debug!(entity = %entity, index, id = %id, "row generated");
            records.push(record);
        }

        Ok(Batch {
            records,
            table: TableReport {
                entity,
                rows_requested: plan.requested,
                rows_generated: plan.rows,
                limited_by: plan.limited_by,
            },
        })
    }
}

struct Batch {
    records: Vec<Record>,
    table: TableReport,
}

fn write_header(script: &mut FixtureScript, stage: Stage, base_time: NaiveDateTime) {
    let rule = "=".repeat(76);
    match stage {
        Stage::Operations => {
            script.comment(&rule);
            script.comment("ADDITIONAL SEED DATA: Shifts, Bookings, Timesheets, Invoices, etc.");
            script.comment(&rule);
        }
        Stage::Foundation | Stage::All => {
            script.comment(format!(
                "COMPREHENSIVE SEED DATA - {} Tables",
                stage.entities().len()
            ));
            script.comment(format!(
                "Generated: {}",
                base_time.format(careseed_core::TIMESTAMP_FORMAT)
            ));
            script.comment("Run this in the SQL editor of the target database");
        }
    }
    script.blank();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_names_the_stage() {
        let base = chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(10, 30, 0))
            .unwrap();
        let mut script = FixtureScript::new();
        write_header(&mut script, Stage::Foundation, base);
        let text = script.render();
        assert!(text.starts_with("-- COMPREHENSIVE SEED DATA - 4 Tables\n"));
        assert!(text.contains("-- Generated: 2024-03-01T10:30:00\n"));

        let mut script = FixtureScript::new();
        write_header(&mut script, Stage::Operations, base);
        assert!(script.render().contains("ADDITIONAL SEED DATA"));
    }
}
