//! Live procedures and triggers in the target schema.

use dbm_core::{StaticKind, StaticName};
use dbm_db::{Database, DbResult};
use serde::Serialize;

/// Names of the procedures and triggers currently defined in a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LiveStatics {
    pub procedures: Vec<StaticName>,
    pub triggers: Vec<StaticName>,
}

impl LiveStatics {
    /// Introspect `schema`. An empty schema yields empty lists.
    pub async fn list(db: &dyn Database, schema: &str) -> DbResult<Self> {
        Ok(Self {
            procedures: db.list_statics(StaticKind::Procedure, schema).await?,
            triggers: db.list_statics(StaticKind::Trigger, schema).await?,
        })
    }

    pub fn names(&self, kind: StaticKind) -> &[StaticName] {
        match kind {
            StaticKind::Procedure => &self.procedures,
            StaticKind::Trigger => &self.triggers,
        }
    }

    pub fn count(&self, kind: StaticKind) -> usize {
        self.names(kind).len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty() && self.triggers.is_empty()
    }
}
