use crate::{introspection_to_sdl, IntrospectionClient, Result, SchemaError, SchemaSource};
use apollo_compiler::validation::Valid;
use apollo_compiler::Schema;

/// Reads schema files and introspects remote endpoints.
#[derive(Debug, Clone, Default)]
pub struct SchemaLoader {
    client: IntrospectionClient,
}

impl SchemaLoader {
    #[must_use]
    pub fn new(client: IntrospectionClient) -> Self {
        Self { client }
    }

    /// Load and validate the schema at `source`, returning it with its SDL.
    #[tracing::instrument(skip(self), fields(source = %source))]
    pub async fn load(&self, source: &SchemaSource) -> Result<(Valid<Schema>, String)> {
        let sdl = self.fetch_sdl(source).await?;
        let schema = parse_schema(&sdl, source)?;
        Ok((schema, sdl))
    }

    /// The SDL text at `source`, without validating it.
    pub async fn fetch_sdl(&self, source: &SchemaSource) -> Result<String> {
        match source {
            SchemaSource::File(path) => {
                tracing::debug!("Reading schema file");
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| SchemaError::Read {
                        path: path.clone(),
                        source,
                    })
            }
            SchemaSource::Url(url) => {
                let schema = self
                    .client
                    .fetch(url)
                    .await
                    .map_err(|source| SchemaError::Fetch {
                        url: url.clone(),
                        source,
                    })?;
                Ok(introspection_to_sdl(&schema))
            }
        }
    }
}

/// Parse and validate SDL; diagnostics name `source`.
pub fn parse_schema(sdl: &str, source: &SchemaSource) -> Result<Valid<Schema>> {
    Schema::parse_and_validate(sdl, source.to_string()).map_err(|invalid| {
        SchemaError::Parse {
            location: source.to_string(),
            message: invalid.errors.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.graphql");
        fs::write(&path, "type Query { me: String }").unwrap();

        let (schema, sdl) = SchemaLoader::default()
            .load(&SchemaSource::File(path))
            .await
            .unwrap();

        assert!(schema.types.contains_key("Query"));
        assert_eq!(sdl, "type Query { me: String }");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = SchemaLoader::default()
            .load(&SchemaSource::File("/nope/schema.graphql".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, SchemaError::Read { .. }));
        assert!(err.is_load_failure());
    }

    #[test]
    fn test_invalid_schema() {
        let source = SchemaSource::File("/work/schema.graphql".into());
        let err = parse_schema("type Query { me: Missing }", &source).unwrap_err();
        match err {
            SchemaError::Parse { location, message } => {
                assert_eq!(location, "/work/schema.graphql");
                assert!(message.contains("Missing"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
