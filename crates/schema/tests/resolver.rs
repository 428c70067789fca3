use gql_assist_config::{AssistConfig, MemorySettings, SettingsStore};
use gql_assist_schema::{SchemaError, SchemaResolver, SchemaSource};
use gql_assist_types::HostEvent;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const SCHEMA: &str = "type Query { user: User }\ntype User { id: ID! name: String }\n";

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn resolver_for(roots: &[&Path], settings: Arc<MemorySettings>) -> SchemaResolver {
    let roots: Vec<PathBuf> = roots.iter().map(|root| root.to_path_buf()).collect();
    SchemaResolver::new(roots, &AssistConfig::default(), settings).unwrap()
}

#[tokio::test]
async fn test_schema_found_in_first_root_only() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    write(&a.path().join("schema.graphql"), SCHEMA);

    let resolver = resolver_for(&[a.path(), b.path()], Arc::new(MemorySettings::new()));
    let cached = resolver.resolve_and_load().await.unwrap();

    assert!(cached.index().field("User", "name").is_some());
    assert_eq!(
        resolver.schema_location(),
        Some(SchemaSource::File(a.path().join("schema.graphql")))
    );
}

#[tokio::test]
async fn test_selection_wins_over_discovery() {
    let root = tempfile::tempdir().unwrap();
    write(&root.path().join("schema.graphql"), SCHEMA);
    write(
        &root.path().join("vendor/other.graphql"),
        "type Query { other: Int }",
    );

    let settings = Arc::new(MemorySettings::with_schema("vendor/other.graphql"));
    let resolver = resolver_for(&[root.path()], settings);
    let cached = resolver.resolve_and_load().await.unwrap();

    assert!(cached.index().field("Query", "other").is_some());
    assert_eq!(
        cached.source(),
        &SchemaSource::File(root.path().join("vendor/other.graphql"))
    );
}

#[tokio::test]
async fn test_override_applies_without_selection() {
    let root = tempfile::tempdir().unwrap();
    write(&root.path().join("schema.graphql"), SCHEMA);
    write(&root.path().join("api.graphql"), "type Query { api: Int }");

    let config = AssistConfig {
        schema_override: Some("api.graphql".to_string()),
        ..AssistConfig::default()
    };
    let resolver = SchemaResolver::new(
        vec![root.path().to_path_buf()],
        &config,
        Arc::new(MemorySettings::new()),
    )
    .unwrap();

    let cached = resolver.resolve_and_load().await.unwrap();
    assert!(cached.index().field("Query", "api").is_some());
}

#[tokio::test]
async fn test_no_schema() {
    let root = tempfile::tempdir().unwrap();
    let resolver = resolver_for(&[root.path()], Arc::new(MemorySettings::new()));

    let err = resolver.resolve_and_load().await.unwrap_err();
    assert!(matches!(err, SchemaError::NoSchemaFound { .. }));
    assert!(!err.is_load_failure());
    assert!(resolver.get_schema().await.is_none());
    assert!(resolver.schema_location().is_none());
}

#[tokio::test]
async fn test_invalid_schema_clears_cache() {
    let root = tempfile::tempdir().unwrap();
    let path = root.path().join("schema.graphql");
    write(&path, SCHEMA);

    let resolver = resolver_for(&[root.path()], Arc::new(MemorySettings::new()));
    resolver.resolve_and_load().await.unwrap();
    assert!(resolver.cache().get().is_some());

    write(&path, "type Query { broken: Nope }");
    let err = resolver
        .handle_file_event(&path, HostEvent::Changed)
        .await
        .unwrap_err();

    assert!(err.is_load_failure());
    assert!(resolver.cache().get().is_none());
}

#[tokio::test]
async fn test_file_events() {
    let root = tempfile::tempdir().unwrap();
    let current = root.path().join("schema.gql");
    let other = root.path().join("nested/schema.graphql");
    write(&current, SCHEMA);
    write(&other, "type Query { nested: Int }");

    let resolver = resolver_for(&[root.path()], Arc::new(MemorySettings::new()));
    resolver.resolve_and_load().await.unwrap();

    // not a schema file
    let reloaded = resolver
        .handle_file_event(&root.path().join("user.model.ts"), HostEvent::Changed)
        .await
        .unwrap();
    assert!(reloaded.is_none());

    // a schema file, but not the active one
    let reloaded = resolver
        .handle_file_event(&other, HostEvent::Changed)
        .await
        .unwrap();
    assert!(reloaded.is_none());

    write(&current, "type Query { changed: Int }");
    let reloaded = resolver
        .handle_file_event(&current, HostEvent::Changed)
        .await
        .unwrap()
        .unwrap();
    assert!(reloaded.index().field("Query", "changed").is_some());

    // deleting the active schema falls back to the next candidate
    fs::remove_file(&current).unwrap();
    let reloaded = resolver
        .handle_file_event(&current, HostEvent::Deleted)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.source(), &SchemaSource::File(other.clone()));
}

#[tokio::test]
async fn test_created_schema_is_picked_up() {
    let root = tempfile::tempdir().unwrap();
    let resolver = resolver_for(&[root.path()], Arc::new(MemorySettings::new()));
    assert!(resolver.get_schema().await.is_none());

    let path = root.path().join("schema.graphql");
    write(&path, SCHEMA);
    let loaded = resolver
        .handle_file_event(&path, HostEvent::Created)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.source(), &SchemaSource::File(path));
}

#[tokio::test]
async fn test_select_and_clear() {
    let root = tempfile::tempdir().unwrap();
    let default = root.path().join("schema.graphql");
    let picked = root.path().join("alt/picked.graphql");
    write(&default, SCHEMA);
    write(&picked, "type Query { picked: Int }");

    let settings = Arc::new(MemorySettings::new());
    let resolver = resolver_for(&[root.path()], Arc::clone(&settings));
    resolver.resolve_and_load().await.unwrap();

    let cached = resolver
        .select_schema(Some(&picked.to_string_lossy()))
        .await
        .unwrap();
    assert!(cached.index().field("Query", "picked").is_some());
    assert_eq!(settings.selected_schema(), Some(picked.to_string_lossy().into_owned()));

    let cached = resolver.select_schema(None).await.unwrap();
    assert_eq!(cached.source(), &SchemaSource::File(default));
    assert_eq!(settings.selected_schema(), None);
}

#[tokio::test]
async fn test_set_roots_takes_effect_on_next_resolve() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    write(&first.path().join("schema.graphql"), SCHEMA);
    write(&second.path().join("schema.graphql"), "type Query { second: Int }");

    let resolver = resolver_for(&[first.path()], Arc::new(MemorySettings::new()));
    resolver.resolve_and_load().await.unwrap();

    resolver.set_roots(vec![second.path().to_path_buf()]).await;
    assert_eq!(resolver.roots().await, vec![second.path().to_path_buf()]);
    // the cached schema stays until something re-resolves
    assert_eq!(
        resolver.schema_location(),
        Some(SchemaSource::File(first.path().join("schema.graphql")))
    );

    let cached = resolver.resolve_and_load().await.unwrap();
    assert!(cached.index().field("Query", "second").is_some());
}
