//! A single table row with persistence state.

use crate::condition::eq;
use crate::error::{OrmError, OrmResult};
use crate::gateway::Gateway;
use crate::model::Model;
use crate::row::{Attrs, Row};
use crate::stmt::{delete, insert, select, update};
use crate::value::Value;

/// One row of a model's table, hydrated from a result row or built fresh.
///
/// Attribute access goes through [`Record::get`] and [`Record::set`]; there
/// is no per-column field magic. `persisted` tracks whether the record is
/// backed by a database row.
#[derive(Clone, Debug)]
pub struct Record {
    model: Model,
    attributes: Attrs,
    persisted: bool,
}

impl Record {
    pub(crate) fn hydrated(model: Model, row: &Row) -> Self {
        Self {
            model,
            attributes: Attrs::from_row(row),
            persisted: true,
        }
    }

    pub(crate) fn fresh(model: Model, attributes: Attrs) -> Self {
        Self {
            model,
            attributes,
            persisted: false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.attributes.put(name, value);
    }

    pub fn attributes(&self) -> &Attrs {
        &self.attributes
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// The record's current primary-key value.
    ///
    /// Identity operations need this before building any statement; a record
    /// without one fails here, without a gateway call.
    pub fn pk_value(&self) -> OrmResult<Value> {
        let logical = self.model.primary_key().logical();
        self.attributes.get(logical).cloned().ok_or_else(|| {
            OrmError::NoPrimaryKey(format!(
                "record of \"{}\" carries no \"{logical}\" value",
                self.model.table().name()
            ))
        })
    }

    /// UPDATE this row, replacing local attributes with the returned row.
    pub async fn update(&mut self, attrs: Attrs, gateway: &impl Gateway) -> OrmResult<()> {
        let pk = self.pk_value()?;
        let rows = update(self.model.table())
            .set_many(attrs)
            .filter(eq(self.model.primary_key(), pk))
            .returning()
            .execute(gateway)
            .await?;
        match rows.first() {
            Some(row) => {
                self.attributes = Attrs::from_row(row);
                self.persisted = true;
                Ok(())
            }
            None => Err(OrmError::RecordNotFound(
                self.model.table().name().to_string(),
            )),
        }
    }

    /// DELETE this row and flip `persisted` off. Local attributes remain
    /// readable afterwards.
    pub async fn destroy(&mut self, gateway: &impl Gateway) -> OrmResult<()> {
        let pk = self.pk_value()?;
        delete(self.model.table())
            .filter(eq(self.model.primary_key(), pk))
            .execute(gateway)
            .await?;
        self.persisted = false;
        Ok(())
    }

    /// Re-fetch this row by primary key, replacing local attributes.
    pub async fn reload(&mut self, gateway: &impl Gateway) -> OrmResult<()> {
        let pk = self.pk_value()?;
        let rows = select()
            .from(self.model.table())
            .filter(eq(self.model.primary_key(), pk))
            .limit(1)
            .execute(gateway)
            .await?;
        match rows.first() {
            Some(row) => {
                self.attributes = Attrs::from_row(row);
                Ok(())
            }
            None => Err(OrmError::RecordNotFound(
                self.model.table().name().to_string(),
            )),
        }
    }

    /// INSERT or UPDATE depending on persistence state.
    ///
    /// A persisted record updates with the primary-key attribute excluded
    /// from the assignment set; a fresh record inserts with `RETURNING *`
    /// and flips `persisted` on success.
    pub async fn save(&mut self, gateway: &impl Gateway) -> OrmResult<()> {
        if self.persisted {
            let mut assignments = self.attributes.clone();
            assignments.remove(self.model.primary_key().logical());
            self.update(assignments, gateway).await
        } else {
            let rows = insert(self.model.table())
                .values(self.attributes.clone())
                .returning()
                .execute(gateway)
                .await?;
            match rows.first() {
                Some(row) => {
                    self.attributes = Attrs::from_row(row);
                    self.persisted = true;
                    Ok(())
                }
                None => Err(OrmError::InsertFailed(
                    self.model.table().name().to_string(),
                )),
            }
        }
    }
}
