// src/main.rs
mod extractors;
mod notion;
mod storage;
mod utils;

use clap::Parser;

use extractors::{Lexicon, PageParser};
use notion::NotionClient;
use storage::template::{page_slug, render_astro_page};
use storage::{PageRegistry, RegistryEntry, StorageManager};
use utils::AppError;

/// Command Line Interface for the Notion review-page generator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Notion page id to process (falls back to the SYNC_PAGE_ID env var)
    page_id: Option<String>,

    /// Output directory for generated pages
    #[arg(short, long, default_value = "src/pages")]
    output_dir: String,

    /// Path of the generated-pages registry
    #[arg(long, default_value = ".pages-registry.json")]
    registry: String,

    /// Parse and report without writing any files
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    let page_id = args
        .page_id
        .clone()
        .or_else(|| std::env::var("SYNC_PAGE_ID").ok())
        .ok_or_else(|| AppError::Config("No page id given (argument or SYNC_PAGE_ID)".to_string()))?;

    // 3. Fetch page metadata and block tree
    let client = NotionClient::from_env()?;
    let meta = client.retrieve_page(&page_id).await?;

    // Missing title is fatal for the document: skip it, emit nothing.
    if meta.title.trim().is_empty() {
        tracing::warn!("Page {} has no title, skipping", page_id);
        return Ok(());
    }
    tracing::info!("Processing page: {}", meta.title);

    let blocks = client.fetch_block_tree(&page_id).await?;

    // 4. Classify the block tree into structured review data
    let lexicon = Lexicon::default();
    let result = PageParser::new(&lexicon).parse(&meta, &blocks);
    tracing::info!(
        "Parsed {} products, {} FAQs, summary table: {}, comparison table: {}",
        result.products.len(),
        result.faqs.len(),
        !result.summary_table.is_empty(),
        !result.comparison_table.is_empty(),
    );

    // 5. Serialize and persist
    let slug = page_slug(&result.title);
    tracing::info!("Slug: {}", slug);
    let page = render_astro_page(&result);

    if args.dry_run {
        tracing::info!("Dry run, not writing {}.astro", slug);
        return Ok(());
    }

    let storage = StorageManager::new(&args.output_dir)?;
    let path = storage.save_page(&slug, &page)?;
    tracing::info!("Generated {}", path.display());

    // 6. Update the page registry; clean up a renamed page's old file
    let mut registry = PageRegistry::load(&args.registry)?;
    let stale = registry.record(
        &page_id,
        RegistryEntry {
            slug: slug.clone(),
            title: result.title.clone(),
            date: result.date.clone(),
            updated_at: chrono::Utc::now().to_rfc3339(),
        },
    );
    if let Some(old_slug) = stale {
        match storage.delete_page(&old_slug) {
            Ok(true) => tracing::info!("Removed stale page for old slug: {}", old_slug),
            Ok(false) => {}
            Err(e) => tracing::warn!("Failed to remove stale page {}: {}", old_slug, e),
        }
    }
    registry.save()?;

    Ok(())
}
