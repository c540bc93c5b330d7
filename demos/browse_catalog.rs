//! Browse the operation catalog of an OpenAPI document
//!
//! Run with: cargo run --example browse_catalog [settings.json]

use explorer_core::{ExplorerSession, LoadState, Settings};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let settings_file = std::env::args().nth(1).map(PathBuf::from);
    let settings = Settings::load(settings_file.as_deref())?;
    let session = ExplorerSession::from_settings(settings)?;

    println!("Fetching spec from: {}", session.settings().spec_url);
    let spec = match session.load_spec().await {
        LoadState::Ready(spec) => spec,
        LoadState::Failed(e) => return Err(e.into()),
        other => return Err(format!("unexpected loader state: {:?}", other).into()),
    };

    println!(
        "\n=== {} {} ===",
        spec.title.as_deref().unwrap_or("Untitled API"),
        spec.version.as_deref().unwrap_or("")
    );
    println!("Operations: {}", spec.len());

    let groups = session.groups().await;
    for (tag, members) in groups.iter() {
        println!("\n[{}]", tag);
        for op in members {
            println!("  {:7} {} - {}", op.method, op.path, op.summary);
            for param in &op.parameters {
                println!(
                    "          {:?} {}{}: {}",
                    param.location,
                    param.name,
                    if param.required { "*" } else { "" },
                    param.type_hint().unwrap_or("-")
                );
            }
            if op.has_json_body() {
                println!("          body: application/json");
            }
        }
    }

    session.shutdown().await;
    Ok(())
}
