use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rand::RngCore;

use careseed_core::{EntityType, Identifier, ManifestRegistry, Record};

use crate::errors::GenerationError;
use crate::model::GenerateOptions;

pub mod finance;
pub mod operations;
pub mod organisation;
pub mod pools;
pub mod scheduling;
pub mod workforce;

/// Registry lengths captured when a run starts, for the entity types the
/// run generates. Other types keep an offset of zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOffsets(BTreeMap<EntityType, usize>);

impl RunOffsets {
    pub fn snapshot(registry: &ManifestRegistry, entities: &[EntityType]) -> Self {
        Self(
            entities
                .iter()
                .map(|&entity| (entity, registry.len(entity)))
                .collect(),
        )
    }

    pub fn of(&self, entity: EntityType) -> usize {
        self.0.get(&entity).copied().unwrap_or(0)
    }
}

/// Read-only view handed to a generator while it builds one row.
///
/// Exact-index lookups count from the run offset, so a run against a
/// loaded manifest only pairs rows with parents minted by the same run.
/// Cyclic lookups span the whole registry.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorContext<'a> {
    pub registry: &'a ManifestRegistry,
    pub options: &'a GenerateOptions,
    pub offsets: &'a RunOffsets,
    pub base_time: NaiveDateTime,
}

impl GeneratorContext<'_> {
    /// Parent at `index mod len`.
    pub fn parent(&self, entity: EntityType, index: usize) -> Result<Identifier, GenerationError> {
        Ok(self.registry.get(entity, index)?)
    }

    /// Identifiers of `entity` registered before this run.
    pub fn offset(&self, entity: EntityType) -> usize {
        self.offsets.of(entity)
    }

    /// Identifiers of `entity` minted by this run so far.
    pub fn available(&self, entity: EntityType) -> usize {
        self.registry.len(entity).saturating_sub(self.offset(entity))
    }

    /// `index`-th parent minted by this run; the batch plan guarantees it exists.
    pub fn parent_exact(
        &self,
        entity: EntityType,
        index: usize,
    ) -> Result<Identifier, GenerationError> {
        let position = self.offset(entity) + index;
        self.registry.get_exact(entity, position).ok_or_else(|| {
            GenerationError::Invariant(format!(
                "{entity} has no identifier at index {position}"
            ))
        })
    }

    /// First identifier of `entity` minted by this run, if any.
    pub fn first(&self, entity: EntityType) -> Option<Identifier> {
        self.registry.get_exact(entity, self.offset(entity))
    }

    /// Identifiers of `entity` minted by this run.
    pub fn minted(&self, entity: EntityType) -> &[Identifier] {
        let ids = self.registry.ids(entity);
        &ids[self.offset(entity).min(ids.len())..]
    }
}

/// How many rows a batch will produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlan {
    pub requested: usize,
    pub rows: usize,
    /// Required parent pool that is shorter than `requested`.
    pub limited_by: Option<EntityType>,
}

impl BatchPlan {
    pub fn fixed(requested: usize) -> Self {
        Self {
            requested,
            rows: requested,
            limited_by: None,
        }
    }

    /// Row `i` needs the `i`-th identifier this run minted in every pool of
    /// `pools`, so the batch stops at the shortest one.
    pub fn bounded(requested: usize, ctx: &GeneratorContext<'_>, pools: &[EntityType]) -> Self {
        let mut plan = Self::fixed(requested);
        for pool in pools {
            let available = ctx.available(*pool);
            if available < plan.rows {
                plan.rows = available;
                plan.limited_by = Some(*pool);
            }
        }
        plan
    }
}

/// Synthesizes the rows of one entity type.
pub trait EntityGenerator {
    fn entity(&self) -> EntityType;

    fn plan(&self, ctx: &GeneratorContext<'_>) -> BatchPlan;

    /// Build row `index` with primary key `id`.
    fn build(
        &self,
        ctx: &GeneratorContext<'_>,
        index: usize,
        id: Identifier,
        rng: &mut dyn RngCore,
    ) -> Result<Record, GenerationError>;
}

/// One generator per entity type.
pub struct GeneratorCatalog {
    generators: BTreeMap<EntityType, Box<dyn EntityGenerator>>,
}

impl GeneratorCatalog {
    pub fn new() -> Self {
        let mut catalog = Self {
            generators: BTreeMap::new(),
        };
        organisation::register(&mut catalog);
        workforce::register(&mut catalog);
        scheduling::register(&mut catalog);
        finance::register(&mut catalog);
        operations::register(&mut catalog);
        catalog
    }

    pub fn register_generator(&mut self, generator: Box<dyn EntityGenerator>) {
        self.generators.insert(generator.entity(), generator);
    }

    pub fn generator(&self, entity: EntityType) -> Option<&dyn EntityGenerator> {
        self.generators.get(&entity).map(|generator| generator.as_ref())
    }
}

impl Default for GeneratorCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn catalog_covers_every_entity_type() {
        let catalog = GeneratorCatalog::new();
        for entity in EntityType::DEPENDENCY_ORDER {
            let generator = catalog.generator(entity).expect("generator registered");
            assert_eq!(generator.entity(), entity);
        }
    }

    fn base_time() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap()
    }

    fn fill(registry: &mut ManifestRegistry, entity: EntityType, count: usize, seed: u8) {
        let mut rng = rand_chacha::ChaCha8Rng::from_seed([seed; 32]);
        for _ in 0..count {
            registry.append(entity, Identifier::mint(&mut rng));
        }
    }

    #[test]
    fn bounded_plan_stops_at_shortest_pool() {
        let mut registry = ManifestRegistry::new();
        fill(&mut registry, EntityType::Shifts, 8, 1);
        fill(&mut registry, EntityType::Staff, 10, 2);
        let options = GenerateOptions::default();
        let offsets = RunOffsets::default();
        let ctx = GeneratorContext {
            registry: &registry,
            options: &options,
            offsets: &offsets,
            base_time: base_time(),
        };

        let plan = BatchPlan::bounded(10, &ctx, &[EntityType::Shifts, EntityType::Staff]);
        assert_eq!(plan.rows, 8);
        assert_eq!(plan.limited_by, Some(EntityType::Shifts));
        assert_eq!(plan.requested, 10);

        let plan = BatchPlan::bounded(5, &ctx, &[EntityType::Shifts]);
        assert_eq!(plan, BatchPlan::fixed(5));
    }

    #[test]
    fn exact_parents_count_from_the_run_offset() {
        let mut registry = ManifestRegistry::new();
        fill(&mut registry, EntityType::Staff, 10, 3);
        let offsets = RunOffsets::snapshot(&registry, &[EntityType::Staff]);
        fill(&mut registry, EntityType::Staff, 3, 4);
        let options = GenerateOptions::default();
        let ctx = GeneratorContext {
            registry: &registry,
            options: &options,
            offsets: &offsets,
            base_time: base_time(),
        };

        assert_eq!(ctx.offset(EntityType::Staff), 10);
        assert_eq!(ctx.offset(EntityType::Shifts), 0);
        assert_eq!(ctx.available(EntityType::Staff), 3);
        assert_eq!(ctx.minted(EntityType::Staff), &registry.ids(EntityType::Staff)[10..]);
        assert_eq!(ctx.first(EntityType::Staff), registry.get_exact(EntityType::Staff, 10));
        assert_eq!(
            ctx.parent_exact(EntityType::Staff, 2).unwrap(),
            registry.ids(EntityType::Staff)[12]
        );
        assert!(ctx.parent_exact(EntityType::Staff, 3).is_err());

        let plan = BatchPlan::bounded(5, &ctx, &[EntityType::Staff]);
        assert_eq!(plan.rows, 3);
        assert_eq!(plan.limited_by, Some(EntityType::Staff));
    }
}
