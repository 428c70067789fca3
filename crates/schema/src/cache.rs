use crate::{FieldIndex, SchemaSource};
use apollo_compiler::validation::Valid;
use apollo_compiler::Schema;
use std::sync::{Arc, RwLock};

/// A loaded schema together with everything derived from it.
#[derive(Debug)]
pub struct CachedSchema {
    schema: Valid<Schema>,
    sdl: String,
    source: SchemaSource,
    index: FieldIndex,
}

impl CachedSchema {
    #[must_use]
    pub fn schema(&self) -> &Valid<Schema> {
        &self.schema
    }

    /// The SDL text the schema was built from.
    #[must_use]
    pub fn sdl(&self) -> &str {
        &self.sdl
    }

    #[must_use]
    pub fn source(&self) -> &SchemaSource {
        &self.source
    }

    #[must_use]
    pub fn index(&self) -> &FieldIndex {
        &self.index
    }
}

/// Holds at most one schema; readers get a shared snapshot.
#[derive(Debug, Default)]
pub struct SchemaCache {
    current: RwLock<Option<Arc<CachedSchema>>>,
}

impl SchemaCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self) -> Option<Arc<CachedSchema>> {
        self.current.read().ok().and_then(|guard| guard.clone())
    }

    /// Store `schema`, deriving its field index first.
    pub fn set(&self, schema: Valid<Schema>, source: SchemaSource, sdl: String) -> Arc<CachedSchema> {
        let index = FieldIndex::from_schema(&schema);
        let cached = Arc::new(CachedSchema {
            schema,
            sdl,
            source,
            index,
        });
        if let Ok(mut guard) = self.current.write() {
            *guard = Some(Arc::clone(&cached));
        }
        tracing::info!(source = %cached.source, types = cached.index.len(), "Schema cached");
        cached
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.current.write() {
            if guard.take().is_some() {
                tracing::debug!("Schema cache cleared");
            }
        }
    }
}
