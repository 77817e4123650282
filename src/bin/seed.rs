//! Seed script for development. Populates an empty tools file with sample entries.
//!
//! Usage: `cargo run --bin seed`
//!
//! Honors `CSV_FILE_PATH` (reads .env).

use arsenal::config::AppConfig;
use arsenal::services::catalog;
use arsenal::services::validation::ToolSubmission;
use arsenal::store::RecordStore;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    let store = RecordStore::new(&config.data_file, config.cache_ttl());

    println!("=== AI Marketing Arsenal Seed Script ===");
    println!("Tools file: {}", config.data_file.display());

    seed_tools(&store)?;

    println!("\n=== Seed complete! ===");
    Ok(())
}

fn seed_tools(store: &RecordStore) -> anyhow::Result<()> {
    let count = store.try_load()?.table.len();
    if count > 0 {
        println!("[skip] Tools already exist ({count})");
        return Ok(());
    }

    let tools = vec![
        (
            "ChatGPT",
            "https://chat.openai.com",
            "Chatbots",
            "Freemium",
            "$20/month",
            "Rayna",
            "Drafts ad copy, email sequences and campaign briefs in seconds.",
        ),
        (
            "Midjourney",
            "https://www.midjourney.com",
            "Image Generation",
            "Paid",
            "$10/month",
            "Sneha",
            "Generates on-brand campaign imagery and concept art from prompts.",
        ),
        (
            "Canva Magic Studio",
            "https://www.canva.com",
            "Design Tools",
            "Freemium",
            "$12.99/month",
            "Saakshi",
            "Resizes and restyles social creatives across every channel format.",
        ),
        (
            "Surfer SEO",
            "https://surferseo.com",
            "SEO Tools",
            "Paid",
            "$89/month",
            "Sachin",
            "Scores blog drafts against top-ranking pages and suggests keywords.",
        ),
        (
            "DeepL",
            "https://www.deepl.com",
            "Translation",
            "Free",
            "",
            "Manjunath",
            "Localizes landing pages and newsletters for regional campaigns.",
        ),
    ];

    let total = tools.len();
    for (name, link, category, pricing, cost, uploader, purpose) in tools {
        let submission = ToolSubmission {
            name: name.to_string(),
            link: link.to_string(),
            category: category.to_string(),
            pricing_type: pricing.to_string(),
            subscription_cost: cost.to_string(),
            uploaded_by: uploader.to_string(),
            purpose: purpose.to_string(),
            ..ToolSubmission::default()
        };
        let record = catalog::add_tool(store, submission)?;
        println!("[done] #{} {}", record.serial_number, record.name);
    }

    println!("[done] Created {total} sample tools");
    Ok(())
}
