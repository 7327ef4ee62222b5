use std::path::{Path, PathBuf};

use anyhow::Result;
use component_registry::{
    storage, ComponentSpec, ComponentStatus, RegisterMode, Registry, RegistryConfig, RegistryError,
};
use tempfile::TempDir;

struct Workspace {
    _dir: TempDir,
    root: PathBuf,
    registry: Registry,
}

impl Workspace {
    async fn new() -> Result<Self> {
        let dir = TempDir::new()?;
        let root = dir.path().to_path_buf();
        let config = RegistryConfig::with_root(root.join(".system"));
        storage::init(&config).await?;
        let registry = Registry::open(config).await?;
        Ok(Self {
            _dir: dir,
            root,
            registry,
        })
    }

    async fn component_dir(&self, name: &str) -> Result<PathBuf> {
        let path = self.root.join("components").join(name);
        tokio::fs::create_dir_all(&path).await?;
        Ok(path)
    }

    async fn target(&self, file: &str, contents: &str) -> Result<PathBuf> {
        let path = self.root.join(file);
        tokio::fs::write(&path, contents).await?;
        Ok(path)
    }
}

const PAGE_WITH_BTN_MARKERS: &str = r#"<html>
<head><style>
/* INJECT:btn:CSS */
</style></head>
<body>
<!-- INJECT:btn:HTML -->
<script>
// INJECT:btn:JS
</script>
</body>
</html>
"#;

#[tokio::test]
async fn register_validate_prove_workflow() -> Result<()> {
    let mut ws = Workspace::new().await?;
    let btn_dir = ws.component_dir("btn").await?;

    let out = ws
        .registry
        .register_component(ComponentSpec::new("btn", ".c-btn").with_filepath(&btn_dir), None)
        .await?;
    assert!(out.success);
    assert!(out.files_exist);
    assert_eq!(out.component.status, ComponentStatus::Registered);

    let err = ws
        .registry
        .register_component(ComponentSpec::new("btn2", ".c-btn"), None)
        .await
        .unwrap_err();
    match err {
        RegistryError::NamespaceConflict { namespace, owner } => {
            assert_eq!(namespace, ".c-btn");
            assert_eq!(owner, "btn");
        }
        other => panic!("expected NamespaceConflict, got {other:?}"),
    }

    let btn3_dir = ws.component_dir("btn3").await?;
    ws.registry
        .register_component(
            ComponentSpec::new("btn3", ".c-btn3")
                .with_dependencies(["missing-dep"])
                .with_filepath(&btn3_dir),
            None,
        )
        .await?;
    let target = ws.target("index.html", PAGE_WITH_BTN_MARKERS).await?;
    let btn3 = ws.registry.validate_integration("btn3", &target).await?;
    assert!(!btn3.valid);
    assert!(btn3.errors.iter().any(|e| e.contains("Missing dependency: missing-dep")));
    assert_eq!(
        ws.registry.store().get("btn3")?.status,
        ComponentStatus::Registered
    );

    let err = ws.registry.mark_as_proven("btn").await.unwrap_err();
    assert!(matches!(err, RegistryError::NotValidated(ref n) if n == "btn"));
    assert!(!ws.registry.store().get("btn")?.integrated);

    let valid = ws.registry.validate_integration("btn", &target).await?;
    assert!(valid.valid, "errors: {:?}", valid.errors);
    assert!(valid.safe_to_integrate);
    assert_eq!(valid.injection_points.len(), 3);

    let proven = ws.registry.mark_as_proven("btn").await?;
    assert!(proven.success);
    assert_eq!(proven.status, ComponentStatus::Proven);
    assert!(proven.integrated);
    assert!(proven.integrated_at.is_some());
    assert!(ws.registry.config().proven_path("btn").is_dir());

    Ok(())
}

#[tokio::test]
async fn revalidation_is_idempotent() -> Result<()> {
    let mut ws = Workspace::new().await?;
    let dir = ws.component_dir("btn").await?;
    ws.registry
        .register_component(ComponentSpec::new("btn", ".c-btn").with_filepath(&dir), None)
        .await?;
    let target = ws.target("index.html", PAGE_WITH_BTN_MARKERS).await?;

    let first = ws.registry.validate_integration("btn", &target).await?;
    let after_first = ws.registry.store().get("btn")?.clone();
    let second = ws.registry.validate_integration("btn", &target).await?;
    let after_second = ws.registry.store().get("btn")?;

    assert!(first.valid);
    assert_eq!(first.valid, second.valid);
    assert_eq!(first.errors, second.errors);
    assert_eq!(after_second.status, ComponentStatus::Validated);
    assert_eq!(after_first.status, after_second.status);
    assert_eq!(after_first.registered_at, after_second.registered_at);
    Ok(())
}

#[tokio::test]
async fn failing_revalidation_is_idempotent() -> Result<()> {
    let mut ws = Workspace::new().await?;
    let dir = ws.component_dir("btn").await?;
    ws.registry
        .register_component(ComponentSpec::new("btn", ".c-btn").with_filepath(&dir), None)
        .await?;
    let target = ws.target("bare.html", "<html><body></body></html>\n").await?;

    let first = ws.registry.validate_integration("btn", &target).await?;
    let second = ws.registry.validate_integration("btn", &target).await?;

    assert!(!first.valid);
    assert_eq!(first.valid, second.valid);
    assert_eq!(first.errors, second.errors);
    let record = ws.registry.store().get("btn")?;
    assert_eq!(record.status, ComponentStatus::Registered);
    assert!(!record.validated);
    assert!(record.validated_at.is_none());
    Ok(())
}

#[tokio::test]
async fn proven_is_not_downgraded_by_revalidation() -> Result<()> {
    let mut ws = Workspace::new().await?;
    let dir = ws.component_dir("btn").await?;
    ws.registry
        .register_component(ComponentSpec::new("btn", ".c-btn").with_filepath(&dir), None)
        .await?;
    let target = ws.target("index.html", PAGE_WITH_BTN_MARKERS).await?;

    ws.registry.validate_integration("btn", &target).await?;
    ws.registry.mark_as_proven("btn").await?;
    let again = ws.registry.validate_integration("btn", &target).await?;

    assert!(again.valid);
    assert_eq!(ws.registry.store().get("btn")?.status, ComponentStatus::Proven);
    Ok(())
}

#[tokio::test]
async fn target_mentioning_namespace_is_a_conflict() -> Result<()> {
    let mut ws = Workspace::new().await?;
    let dir = ws.component_dir("btn").await?;
    ws.registry
        .register_component(ComponentSpec::new("btn", ".c-btn").with_filepath(&dir), None)
        .await?;
    // `.c-btn-large` contains `.c-btn`: the substring heuristic flags it
    let contents = format!("<style>.c-btn-large {{}}</style>\n{}", PAGE_WITH_BTN_MARKERS);
    let target = ws.target("page.html", &contents).await?;

    let out = ws.registry.validate_integration("btn", &target).await?;
    assert!(!out.valid);
    assert!(out.errors.iter().any(|e| e.contains(".c-btn")));
    Ok(())
}

#[tokio::test]
async fn preflight_reports_every_check() -> Result<()> {
    let mut ws = Workspace::new().await?;
    let dir = ws.component_dir("btn").await?;
    ws.registry
        .register_component(ComponentSpec::new("btn", ".c-btn").with_filepath(&dir), None)
        .await?;
    let target = ws.target("index.html", PAGE_WITH_BTN_MARKERS).await?;

    let out = ws
        .registry
        .run_preflight_checks("btn", Some(Path::new(&target)))
        .await?;
    assert!(!out.success);
    assert!(out.checks.exists);
    assert!(!out.checks.tests);
    assert!(!out.checks.contract);
    assert!(out.checks.integration);
    assert_eq!(out.errors.len(), 2);
    assert_eq!(ws.registry.store().get("btn")?.status, ComponentStatus::Registered);
    Ok(())
}

#[tokio::test]
async fn upsert_after_prove_keeps_lifecycle() -> Result<()> {
    let mut ws = Workspace::new().await?;
    let dir = ws.component_dir("btn").await?;
    ws.registry
        .register_component(ComponentSpec::new("btn", ".c-btn").with_filepath(&dir), None)
        .await?;
    let target = ws.target("index.html", PAGE_WITH_BTN_MARKERS).await?;
    ws.registry.validate_integration("btn", &target).await?;
    ws.registry.mark_as_proven("btn").await?;
    let before = ws.registry.store().get("btn")?.clone();

    let out = ws
        .registry
        .register_component(
            ComponentSpec::new("btn", ".c-btn")
                .with_dependencies(["icon"])
                .with_filepath(&dir),
            Some(RegisterMode::Upsert),
        )
        .await?;

    let after = &out.component;
    assert_eq!(after.status, ComponentStatus::Proven);
    assert!(after.validated);
    assert!(after.integrated);
    assert_eq!(after.registered_at, before.registered_at);
    assert_eq!(after.validated_at, before.validated_at);
    assert_eq!(after.integrated_at, before.integrated_at);
    assert_eq!(after.dependencies, vec!["icon".to_string()]);
    Ok(())
}

#[tokio::test]
async fn names_cannot_escape_registry_directories() -> Result<()> {
    let mut ws = Workspace::new().await?;

    for name in ["../../x", "nested/btn", ".."] {
        let err = ws
            .registry
            .register_component(ComponentSpec::new(name, ".c-escape"), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidArguments", "{name}");
    }

    assert_eq!(ws.registry.list_components().total, 0);
    assert!(!ws.root.join("x").exists());
    Ok(())
}
