use dotenvy::dotenv;
use rinos_shop::config::{database, seed};
use rinos_shop::db::{self, PageQuery};
use rinos_shop::errors::Result;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Connect and make sure the schema exists
    if std::env::var("DATABASE_URL").is_err() {
        std::fs::create_dir_all("data")?;
    }
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 4. Seed pages and catalog data if a seed file is present
    let seed_path = seed::seed_path();
    if Path::new(&seed_path).exists() {
        let config = seed::load_config(&seed_path)?;
        let report = db::seed_from_config(&db, &config)
            .await
            .inspect_err(|e| error!("Failed to seed from {}: {}", seed_path, e))?;
        info!(
            "Seeded {} pages and {} articles from {}",
            report.pages_created, report.articles_created, seed_path
        );
    } else {
        info!("No seed file at {}, skipping seeding", seed_path);
    }

    // 5. Report what the storefront serves
    let stored = db::list_pages(&db, &PageQuery::default()).await?;
    let published_only = PageQuery {
        published_only: true,
        ..PageQuery::default()
    };
    let published = db::list_pages(&db, &published_only).await?;
    info!("{} pages stored, {} published", stored.total, published.total);
    for entry in db::menu(&db).await? {
        info!("Menu: {} -> /{}", entry.label, entry.slug);
    }

    Ok(())
}
