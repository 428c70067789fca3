//! One engine per workspace folder.

use gql_assist_config::{load_or_default, AssistConfig, WorkspaceSettings, CONFIG_FILES};
use gql_assist_engine::{workspace_generator, Engine, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A workspace folder with the engine serving it.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    engine: Arc<Engine>,
    config_path: Option<PathBuf>,
}

impl Workspace {
    /// Set up a workspace from the client's settings, or from the config
    /// file found above `root` when the client sent none.
    ///
    /// Schemas are searched in `root` first, then in `other_roots`.
    pub fn load(
        root: PathBuf,
        other_roots: &[PathBuf],
        settings: Option<AssistConfig>,
    ) -> Result<Self> {
        let (config, config_path) = match settings {
            Some(config) => (config, None),
            None => load_or_default(&root)?,
        };
        let store = Arc::new(WorkspaceSettings::new(&root));
        let roots = search_roots(&root, other_roots);
        let engine = Engine::for_workspace(roots, config, store)?;

        tracing::info!(
            root = %root.display(),
            config = ?config_path,
            "Workspace loaded"
        );
        Ok(Self {
            root,
            engine: Arc::new(engine),
            config_path,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    #[must_use]
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
    }

    /// A config file that could apply to this workspace: a known config file
    /// name in the root or one of its ancestors.
    #[must_use]
    pub fn is_config_file(&self, path: &Path) -> bool {
        let named = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| CONFIG_FILES.contains(&name));
        named && path.parent().is_some_and(|dir| self.root.starts_with(dir))
    }

    /// Re-read the config file and apply it.
    pub async fn reload_from_disk(&self) -> Result<()> {
        let (config, _) = load_or_default(&self.root)?;
        self.apply_config(config).await
    }

    /// Switch the engine to `config`, including its generator command.
    pub async fn apply_config(&self, config: AssistConfig) -> Result<()> {
        let generator = workspace_generator(&config, Some(&self.root))?;
        self.engine.reload_config(config).await?;
        self.engine.set_generator(Arc::new(generator));
        Ok(())
    }
}

/// `root` followed by the other workspace folders, without duplicates.
fn search_roots(root: &Path, others: &[PathBuf]) -> Vec<PathBuf> {
    let mut roots = vec![root.to_path_buf()];
    for other in others {
        if !roots.contains(other) {
            roots.push(other.clone());
        }
    }
    roots
}

/// The workspace whose root is the longest prefix of `path`.
pub fn closest<'a, I>(workspaces: I, path: &Path) -> Option<Arc<Workspace>>
where
    I: IntoIterator<Item = &'a Arc<Workspace>>,
{
    workspaces
        .into_iter()
        .filter(|workspace| workspace.contains(path))
        .max_by_key(|workspace| workspace.root.components().count())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gql_assist_schema::SchemaSource;
    use gql_assist_types::FileKind;

    #[test]
    fn test_load_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".gqlassistrc.json"),
            r#"{ "model": { "fileExtensions": [".entity.ts"] } }"#,
        )
        .unwrap();

        let workspace = Workspace::load(dir.path().to_path_buf(), &[], None).unwrap();

        assert_eq!(
            workspace.config_path(),
            Some(dir.path().join(".gqlassistrc.json").as_path())
        );
        assert_eq!(
            workspace.engine().classify("src/user.entity.ts"),
            Some(FileKind::Model)
        );
    }

    #[test]
    fn test_client_settings_take_precedence() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".gqlassistrc.json"), r#"{ "runOnSave": false }"#).unwrap();

        let workspace =
            Workspace::load(dir.path().to_path_buf(), &[], Some(AssistConfig::default())).unwrap();

        assert!(workspace.config_path().is_none());
        assert!(workspace.engine().config().run_on_save);
    }

    #[test]
    fn test_config_files_in_ancestors() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("app");
        std::fs::create_dir(&root).unwrap();
        let workspace = Workspace::load(root.clone(), &[], None).unwrap();

        assert!(workspace.is_config_file(&root.join("gql-assist.config.yml")));
        assert!(workspace.is_config_file(&dir.path().join(".gqlassistrc")));
        assert!(!workspace.is_config_file(&root.join("src/.gqlassistrc")));
        assert!(!workspace.is_config_file(&root.join("package.json")));
    }

    #[test]
    fn test_closest_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let inner = dir.path().join("packages/web");
        std::fs::create_dir_all(&inner).unwrap();

        let outer = Arc::new(Workspace::load(dir.path().to_path_buf(), &[], None).unwrap());
        let nested = Arc::new(Workspace::load(inner.clone(), &[], None).unwrap());
        let all = [outer, nested];

        let found = closest(&all, &inner.join("src/user.model.ts")).unwrap();
        assert_eq!(found.root(), inner);
        let found = closest(&all, &dir.path().join("schema.graphql")).unwrap();
        assert_eq!(found.root(), dir.path());
        assert!(closest(&all, Path::new("/elsewhere/a.ts")).is_none());
    }

    #[tokio::test]
    async fn test_schema_from_another_folder() {
        let api = tempfile::tempdir().unwrap();
        let web = tempfile::tempdir().unwrap();
        std::fs::write(api.path().join("schema.graphql"), "type Query { me: String }").unwrap();
        let folders = [api.path().to_path_buf(), web.path().to_path_buf()];

        let workspace = Workspace::load(web.path().to_path_buf(), &folders, None).unwrap();
        let cached = workspace.engine().resolver().resolve_and_load().await.unwrap();
        assert_eq!(
            cached.source(),
            &SchemaSource::File(api.path().join("schema.graphql"))
        );

        // a schema in the folder itself wins
        std::fs::write(web.path().join("schema.graphql"), "type Query { web: Int }").unwrap();
        let cached = workspace.engine().resolver().resolve_and_load().await.unwrap();
        assert!(cached.index().field("Query", "web").is_some());
    }

    #[test]
    fn test_search_roots_put_own_folder_first() {
        let roots = search_roots(
            Path::new("/b"),
            &[PathBuf::from("/a"), PathBuf::from("/b"), PathBuf::from("/c")],
        );
        assert_eq!(
            roots,
            vec![PathBuf::from("/b"), PathBuf::from("/a"), PathBuf::from("/c")]
        );
    }

    #[tokio::test]
    async fn test_reload_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::load(dir.path().to_path_buf(), &[], None).unwrap();
        assert!(workspace.engine().config().run_on_save);

        std::fs::write(dir.path().join(".gqlassistrc.json"), r#"{ "runOnSave": false }"#).unwrap();
        workspace.reload_from_disk().await.unwrap();

        assert!(!workspace.engine().config().run_on_save);
    }
}
