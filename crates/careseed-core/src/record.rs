use crate::entity::EntityType;
use crate::error::Result;
use crate::identifier::Identifier;
use crate::value::{SqlValue, quote_column};

/// Identifiers a column points at, and the entity type they belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignRef {
    pub column: &'static str,
    pub target: EntityType,
    pub ids: Vec<Identifier>,
}

/// One synthesized row: ordered columns plus the references it declares.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    entity: EntityType,
    columns: Vec<(&'static str, SqlValue)>,
    references: Vec<ForeignRef>,
}

impl Record {
    pub fn new(entity: EntityType) -> Self {
        Self {
            entity,
            columns: Vec::new(),
            references: Vec::new(),
        }
    }

    pub fn entity(&self) -> EntityType {
        self.entity
    }

    pub fn set(mut self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        self.columns.push((column, value.into()));
        self
    }

    /// Foreign-key column holding a single parent identifier.
    pub fn reference(self, column: &'static str, target: EntityType, id: Identifier) -> Self {
        self.embed(column, target, vec![id], SqlValue::Uuid(id))
    }

    /// Nullable foreign-key column.
    pub fn reference_opt(
        self,
        column: &'static str,
        target: EntityType,
        id: Option<Identifier>,
    ) -> Self {
        match id {
            Some(id) => self.reference(column, target, id),
            None => self.set(column, SqlValue::Null),
        }
    }

    /// Column whose value (JSON or array) carries parent identifiers.
    pub fn embed(
        mut self,
        column: &'static str,
        target: EntityType,
        ids: Vec<Identifier>,
        value: impl Into<SqlValue>,
    ) -> Self {
        if !ids.is_empty() {
            self.references.push(ForeignRef {
                column,
                target,
                ids,
            });
        }
        self.set(column, value)
    }

    pub fn value(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> &[(&'static str, SqlValue)] {
        &self.columns
    }

    pub fn references(&self) -> &[ForeignRef] {
        &self.references
    }

    pub fn to_insert_sql(&self) -> Result<String> {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|(name, _)| quote_column(name))
            .collect();
        let values = self
            .columns
            .iter()
            .map(|(_, value)| value.render())
            .collect::<Result<Vec<_>>>()?;
        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({});",
            self.entity.table_name(),
            columns.join(", "),
            values.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_insert_statement_in_column_order() {
        let agency: Identifier = "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap();
        let id: Identifier = "a1a2a3a4-b1b2-4c1c-8d1d-e1e2e3e4e5e6".parse().unwrap();
        let record = Record::new(EntityType::Groups)
            .set("id", id)
            .reference("agency_id", EntityType::Agencies, agency)
            .set("name", "Team A")
            .set("references", SqlValue::Null);

        assert_eq!(
            record.to_insert_sql().unwrap(),
            "INSERT INTO groups (id, agency_id, name, \"references\") VALUES \
             ('a1a2a3a4-b1b2-4c1c-8d1d-e1e2e3e4e5e6', \
             '67e55044-10b1-426f-9247-bb680e5fe0c8', 'Team A', NULL);"
        );
        assert_eq!(record.value("id"), Some(&SqlValue::Uuid(id)));
        assert_eq!(record.references().len(), 1);
    }

    #[test]
    fn null_reference_declares_nothing() {
        let record = Record::new(EntityType::Shifts).reference_opt(
            "assigned_staff_id",
            EntityType::Staff,
            None,
        );
        assert!(record.references().is_empty());
        assert_eq!(record.value("assigned_staff_id"), Some(&SqlValue::Null));
    }
}
