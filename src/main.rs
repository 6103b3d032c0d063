//! Hooky demo: a hookable document store wired to configuration and logging.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing_subscriber::{EnvFilter, fmt};

use hooky::prelude::*;
use hooky_core::config::HookyConfig;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Demo error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and `HOOKY__*` variables
fn load_configuration() -> HookyResult<HookyConfig> {
    let env = std::env::var("HOOKY_ENV").unwrap_or_else(|_| "development".to_string());
    HookyConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &HookyConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Read side shared by document stores.
#[async_trait]
trait DocumentSource {
    async fn fetch(&self, uri: &str) -> HookyResult<Value>;
}

static OPERATIONS: [OperationDescriptor; 2] = [
    operation!(abstract public fetch(uri)),
    operation!(protected save(path, body)),
];

struct DocumentStore {
    name: String,
    hooks: HookManager<DocumentStore>,
}

impl Hookable for DocumentStore {
    fn operations() -> &'static [OperationDescriptor] {
        &OPERATIONS
    }

    fn hooks(&self) -> &HookManager<Self> {
        &self.hooks
    }

    fn type_name() -> &'static str {
        "DocumentStore"
    }
}

impl DocumentStore {
    async fn open(name: &str) -> HookyResult<Self> {
        HookManager::<Self>::construct(&hook_args![name], || Self {
            name: name.to_string(),
            hooks: HookManager::new(),
        })
        .await
    }

    async fn save(&self, path: &str, body: &str) -> HookyResult<Value> {
        self.hooks
            .invoke(self, "save", &hook_args![path, body], || async move {
                Ok(json!({ "path": path, "bytes": body.len() }))
            })
            .await
    }
}

#[async_trait]
impl DocumentSource for DocumentStore {
    async fn fetch(&self, uri: &str) -> HookyResult<Value> {
        self.hooks
            .invoke(self, "fetch", &hook_args![uri], || async move {
                Ok(json!(format!("<{}:{uri}>", self.name)))
            })
            .await
    }
}

/// Demo run function
async fn run(config: HookyConfig) -> HookyResult<()> {
    tracing::info!("Starting Hooky demo v{}", env!("CARGO_PKG_VERSION"));

    let global = GlobalHooks::<DocumentStore>::shared();
    global.configure(&config.policy).await?;

    global
        .on_after_construction(ConstructionHook::<DocumentStore>::sync("announce", |ctx| {
            if let Some(store) = ctx.instance {
                tracing::info!(store = %store.name, "Store constructed");
            }
            Ok(HookOutcome::Continue)
        }))
        .await;

    let store = DocumentStore::open("archive").await?;

    store
        .hooks()
        .once_before_all(ClosureHook::<DocumentStore>::sync("warmup", |ctx| {
            tracing::info!(store = %ctx.target.name, operation = ctx.operation, "First operation");
            Ok(HookOutcome::Continue)
        }))
        .await?;

    store
        .hooks()
        .on_before(
            "fetch",
            ClosureHook::<DocumentStore>::sync("cache", |ctx| match ctx.argument_str(0) {
                Some(uri) if uri.starts_with("cache://") => {
                    Ok(HookOutcome::value(format!("cached {uri}")))
                }
                _ => Ok(HookOutcome::Continue),
            }),
        )
        .await?;

    let redact = global
        .on_after(
            "DocumentStore::fetch",
            ClosureHook::<DocumentStore>::sync("redact", |ctx| {
                match ctx.result.and_then(Value::as_str) {
                    Some(text) if text.contains("secret") => Ok(HookOutcome::value("[redacted]")),
                    _ => Ok(HookOutcome::Continue),
                }
            })
            .with_parameters(["resourceLocation", "returnValue"]),
        )
        .await?;
    tracing::info!(
        key = %redact.key,
        diagnostics = redact.diagnostics.len(),
        "Redaction hook installed"
    );

    let audit = store
        .hooks()
        .on_before(
            "save",
            ClosureHook::<DocumentStore>::sync("audit", |_ctx| Ok(HookOutcome::Continue)),
        )
        .await;
    if let Err(e) = audit {
        tracing::warn!(error = %e, "Audit hook not installed");
    }

    for uri in ["docs/readme", "cache://index", "vault/secret-plan"] {
        let value = store.fetch(uri).await?;
        tracing::info!(uri, value = %value, "Fetched");
    }

    let saved = store.save("notes.txt", "hello").await?;
    tracing::info!(result = %saved, "Saved");

    tracing::info!(
        instance_keys = store.hooks().registered_keys(Scope::Instance).await.len(),
        global_keys = store.hooks().registered_keys(Scope::Global).await.len(),
        "Demo finished"
    );

    Ok(())
}
