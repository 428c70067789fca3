use gql_assist_config::{AssistConfig, MemorySettings};
use gql_assist_engine::{
    Engine, EngineError, GenerateError, GenerateRequest, Generator, ProcessOutcome, SkipReason,
};
use gql_assist_patch::{LiveDocument, MemoryDocument, PatchOutcome};
use gql_assist_schema::SchemaResolver;
use gql_assist_types::{FileKind, HostEvent};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const MODEL: &str = "@ObjectType()\nexport class User {\n}\n";
const GENERATED_MODEL: &str = "@ObjectType()\nexport class User {\n  @Field()\n  id: string\n}\n";

struct Recorder {
    calls: AtomicUsize,
    requests: Mutex<Vec<GenerateRequest>>,
    output: Option<String>,
}

impl Recorder {
    fn returning(output: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            output: output.map(ToString::to_string),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Generator for Recorder {
    fn generate(&self, request: &GenerateRequest) -> Result<Option<String>, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.output.clone())
    }
}

fn engine(root: &Path, config: AssistConfig, generator: Arc<dyn Generator>) -> Engine {
    let resolver = SchemaResolver::new(
        vec![root.to_path_buf()],
        &config,
        Arc::new(MemorySettings::new()),
    )
    .unwrap();
    Engine::new(config, Arc::new(resolver), generator).unwrap()
}

#[tokio::test]
async fn test_repeated_saves_are_processed_once() {
    let root = tempfile::tempdir().unwrap();
    let recorder = Recorder::returning(Some(GENERATED_MODEL));
    let engine = engine(root.path(), AssistConfig::default(), recorder.clone());

    let mut doc = MemoryDocument::new("/work/src/user.model.ts", MODEL);

    let outcome = engine
        .process_document(&mut doc, HostEvent::Saved)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ProcessOutcome::Applied {
            kind: FileKind::Model,
            patch: PatchOutcome::Patched { actions: 1 },
        }
    );
    assert!(outcome.modified());
    assert_eq!(doc.text(), GENERATED_MODEL);
    assert_eq!(doc.save_count(), 1);

    // the generated text is new to the tracker; the generator confirms it
    let outcome = engine
        .process_document(&mut doc, HostEvent::Saved)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ProcessOutcome::Applied {
            kind: FileKind::Model,
            patch: PatchOutcome::Unchanged,
        }
    );
    assert!(!outcome.modified());

    let outcome = engine
        .process_document(&mut doc, HostEvent::Saved)
        .await
        .unwrap();
    assert_eq!(outcome, ProcessOutcome::Skipped(SkipReason::Unchanged));
    assert_eq!(recorder.calls(), 2);
    assert_eq!(doc.save_count(), 1);
}

#[tokio::test]
async fn test_events_are_tracked_separately() {
    let root = tempfile::tempdir().unwrap();
    let recorder = Recorder::returning(None);
    let engine = engine(root.path(), AssistConfig::default(), recorder.clone());
    let mut doc = MemoryDocument::new("/work/src/user.resolver.ts", "export class UserResolver {}\n");

    for event in [HostEvent::Saved, HostEvent::SelectionMoved] {
        let outcome = engine.process_document(&mut doc, event).await.unwrap();
        assert_eq!(
            outcome,
            ProcessOutcome::NothingGenerated {
                kind: FileKind::Resolver
            }
        );
    }
    assert_eq!(recorder.calls(), 2);
    assert_eq!(doc.save_count(), 0);
}

#[tokio::test]
async fn test_hook_without_schema_is_skipped() {
    let root = tempfile::tempdir().unwrap();
    let recorder = Recorder::returning(Some("generated"));
    let engine = engine(root.path(), AssistConfig::default(), recorder.clone());

    let mut doc = MemoryDocument::new("/work/src/user.gql.ts", "gql`query { me }`\n");
    let outcome = engine
        .process_document(&mut doc, HostEvent::Saved)
        .await
        .unwrap();

    assert_eq!(outcome, ProcessOutcome::Skipped(SkipReason::NoSchema));
    assert_eq!(recorder.calls(), 0);
    assert_eq!(doc.text(), "gql`query { me }`\n");
}

#[tokio::test]
async fn test_hook_is_retried_once_a_schema_appears() {
    let root = tempfile::tempdir().unwrap();
    let recorder = Recorder::returning(Some("export const useMe = () => {}\n"));
    let engine = engine(root.path(), AssistConfig::default(), recorder.clone());

    let mut doc = MemoryDocument::new(
        root.path().join("me.gql.ts").to_string_lossy(),
        "gql`query { me }`\n",
    );
    let outcome = engine
        .process_document(&mut doc, HostEvent::Saved)
        .await
        .unwrap();
    assert_eq!(outcome, ProcessOutcome::Skipped(SkipReason::NoSchema));
    assert!(engine.tracker().is_empty());

    std::fs::write(
        root.path().join("schema.graphql"),
        "type Query { me: String }",
    )
    .unwrap();

    // same text as before
    let outcome = engine
        .process_document(&mut doc, HostEvent::Saved)
        .await
        .unwrap();
    assert!(outcome.modified());
    assert_eq!(recorder.calls(), 1);
}

#[tokio::test]
async fn test_hook_receives_schema() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(
        root.path().join("schema.graphql"),
        "type Query { me: String }",
    )
    .unwrap();

    let recorder = Recorder::returning(Some("export const useMe = () => {}\n"));
    let engine = engine(root.path(), AssistConfig::default(), recorder.clone());

    let mut doc = MemoryDocument::new(
        root.path().join("me.gql.ts").to_string_lossy(),
        "gql`query { me }`\n",
    );
    let outcome = engine.generate_document(&mut doc).await.unwrap();
    assert!(outcome.modified());

    let requests = recorder.requests.lock().unwrap();
    let request = &requests[0];
    assert_eq!(request.kind, FileKind::Hook);
    assert_eq!(request.text, "gql`query { me }`\n");
    let schema = request.schema.as_ref().unwrap();
    assert!(schema.index().field("Query", "me").is_some());
}

#[tokio::test]
async fn test_forced_generation_ignores_tracker() {
    let root = tempfile::tempdir().unwrap();
    let recorder = Recorder::returning(None);
    let engine = engine(root.path(), AssistConfig::default(), recorder.clone());
    let mut doc = MemoryDocument::new("/work/src/user.input.ts", "export class UserInput {}\n");

    engine.generate_document(&mut doc).await.unwrap();
    engine.generate_document(&mut doc).await.unwrap();

    assert_eq!(recorder.calls(), 2);
    assert!(engine.tracker().is_empty());
}

#[tokio::test]
async fn test_run_on_save_disabled() {
    let root = tempfile::tempdir().unwrap();
    let recorder = Recorder::returning(None);
    let config = AssistConfig {
        run_on_save: false,
        ..AssistConfig::default()
    };
    let engine = engine(root.path(), config, recorder.clone());
    let mut doc = MemoryDocument::new("/work/src/user.model.ts", MODEL);

    let outcome = engine
        .process_document(&mut doc, HostEvent::Saved)
        .await
        .unwrap();
    assert_eq!(outcome, ProcessOutcome::Skipped(SkipReason::RunOnSaveDisabled));

    // selection changes still run
    engine
        .process_document(&mut doc, HostEvent::SelectionMoved)
        .await
        .unwrap();
    assert_eq!(recorder.calls(), 1);
}

#[tokio::test]
async fn test_disabled_and_unrecognized_files() {
    let root = tempfile::tempdir().unwrap();
    let recorder = Recorder::returning(None);
    let mut config = AssistConfig::default();
    config.model.enable = false;
    let engine = engine(root.path(), config, recorder.clone());

    let mut model = MemoryDocument::new("/work/src/user.model.ts", MODEL);
    assert_eq!(
        engine.generate_document(&mut model).await.unwrap(),
        ProcessOutcome::Skipped(SkipReason::Disabled(FileKind::Model))
    );

    let mut readme = MemoryDocument::new("/work/README.md", "# hi\n");
    assert_eq!(
        engine
            .process_document(&mut readme, HostEvent::Saved)
            .await
            .unwrap(),
        ProcessOutcome::Skipped(SkipReason::Unrecognized)
    );
    assert_eq!(
        engine.generate_document(&mut readme).await.unwrap(),
        ProcessOutcome::Skipped(SkipReason::Unrecognized)
    );

    let mut schema = MemoryDocument::new("/work/schema.graphql", "type Query { a: Int }");
    assert_eq!(
        engine.generate_document(&mut schema).await.unwrap(),
        ProcessOutcome::Skipped(SkipReason::Disabled(FileKind::Schema))
    );
    assert_eq!(recorder.calls(), 0);
}

#[tokio::test]
async fn test_generator_failure_leaves_document_untouched() {
    let root = tempfile::tempdir().unwrap();
    let failing = |_: &GenerateRequest| -> Result<Option<String>, GenerateError> {
        Err(GenerateError::Interrupted("killed".to_string()))
    };
    let engine = engine(root.path(), AssistConfig::default(), Arc::new(failing));
    let mut doc = MemoryDocument::new("/work/src/user.model.ts", MODEL);

    let err = engine
        .process_document(&mut doc, HostEvent::Saved)
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Generate(GenerateError::Interrupted(_))));
    assert_eq!(doc.text(), MODEL);
    assert_eq!(doc.save_count(), 0);

    // the failed run is not remembered, so saving again retries it
    assert!(engine.tracker().is_empty());
    assert!(engine
        .process_document(&mut doc, HostEvent::Saved)
        .await
        .is_err());
}

#[tokio::test]
async fn test_deleted_files_are_forgotten() {
    let root = tempfile::tempdir().unwrap();
    let recorder = Recorder::returning(None);
    let engine = engine(root.path(), AssistConfig::default(), recorder.clone());

    let path = root.path().join("user.model.ts");
    let mut doc = MemoryDocument::new(path.to_string_lossy(), MODEL);
    engine
        .process_document(&mut doc, HostEvent::Saved)
        .await
        .unwrap();
    assert_eq!(engine.tracker().len(), 1);

    let reloaded = engine
        .handle_file_event(&path, HostEvent::Deleted)
        .await
        .unwrap();
    assert!(reloaded.is_none());
    assert!(engine.tracker().is_empty());
}

#[tokio::test]
async fn test_reload_config_changes_patterns() {
    let root = tempfile::tempdir().unwrap();
    let recorder = Recorder::returning(None);
    let engine = engine(root.path(), AssistConfig::default(), recorder.clone());
    assert_eq!(engine.classify("/work/src/user.entity.ts"), None);

    let mut config = AssistConfig::default();
    config.model.file_extensions = Some(vec![".entity.ts".to_string()]);
    engine.reload_config(config).await.unwrap();

    assert_eq!(
        engine.classify("/work/src/user.entity.ts"),
        Some(FileKind::Model)
    );
    assert!(!engine.config().model.file_extensions.as_ref().unwrap().is_empty());
}
