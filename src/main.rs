use std::sync::Arc;

use anyhow::Context;
use bookstore_app::modules::{self, books::PgBookStore};
use bookstore_kernel::{settings::Settings, InitCtx, ModuleRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookstore settings")?;
    bookstore_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        "bookstore-app bootstrap starting"
    );

    let pool = bookstore_db::connect(&settings.database).await?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, Arc::new(PgBookStore::new(pool)));

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    tracing::info!("bookstore-app bootstrap complete");

    let served = bookstore_http::start_server(&registry, &settings).await;
    registry.stop_after(served).await
}
