//! Image board bootstrap.
//!
//! Loads configuration, selects the storage backend and logs what was
//! resolved. Any paths given as arguments are stored through the selected
//! backend and their public URLs printed, one per line.

use std::ffi::OsStr;
use std::path::Path;

use anyhow::{Context, anyhow};
use bytes::Bytes;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imageboard_core::AppContext;
use imageboard_core::storage::generate_key;
use imageboard_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imageboard_core=debug,imageboard_bootstrap=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    info!(
        site = %config.site.name,
        environment = %config.environment,
        api = %config.api.public_url(),
        user_agent = %config.user_agent(env!("CARGO_PKG_VERSION")),
        "Configuration loaded"
    );

    let context = AppContext::initialize(&config).context("Failed to select storage backend")?;

    let order: Vec<String> = context
        .taxonomy()
        .display_order()
        .iter()
        .map(ToString::to_string)
        .collect();
    info!(
        display_order = ?order,
        creatable = ?context.taxonomy().creatable_categories(),
        "Tag taxonomy loaded"
    );

    for arg in std::env::args().skip(1) {
        let url = store_file(&context, Path::new(&arg)).await?;
        println!("{url}");
    }

    Ok(())
}

async fn store_file(context: &AppContext, path: &Path) -> anyhow::Result<String> {
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .ok_or_else(|| anyhow!("{} has no file extension", path.display()))?;
    let mime_type = context
        .file_types()
        .mime_for(extension)
        .ok_or_else(|| anyhow!("{} is not an accepted file type", path.display()))?;
    let canonical = context
        .file_types()
        .validate(mime_type)?
        .extension
        .clone();

    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let key = generate_key(&canonical);
    let stored = context
        .storage()
        .store(Bytes::from(content), &key)
        .await
        .with_context(|| format!("Failed to store {}", path.display()))?;

    info!(
        path = %path.display(),
        key = %stored.key,
        mime_type,
        size = stored.size,
        "File stored"
    );
    Ok(stored.url)
}
