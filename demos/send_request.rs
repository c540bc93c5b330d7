//! Select one operation, fill in its draft and send it
//!
//! Run with: cargo run --example send_request -- GET /users/{id} id=42
//!
//! A trailing `body=<json>` argument replaces the prefilled example body.

use explorer_core::{ExplorerSession, Settings};
use openapi_catalog::HttpMethod;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(method), Some(path)) = (args.next(), args.next()) else {
        eprintln!("usage: send_request <METHOD> <PATH> [name=value ...] [body=<json>]");
        std::process::exit(2);
    };
    let method = HttpMethod::from_key(&method).ok_or_else(|| format!("unknown method: {}", method))?;

    let session = ExplorerSession::from_settings(Settings::load(None)?)?;
    let state = session.load_spec().await;
    if !state.is_ready() {
        return Err(format!("spec not loaded: {:?}", state).into());
    }

    session.select(method, &path).await?;
    {
        let mut draft = session.selection_mut().await;
        for arg in args {
            let Some((name, value)) = arg.split_once('=') else {
                return Err(format!("expected name=value, got: {}", arg).into());
            };
            if name == "body" {
                draft.set_body(value);
            } else {
                draft.set_param(name, value);
            }
        }
        println!("Body:\n{}", draft.body());
    }

    match session.submit().await {
        Ok(record) => {
            println!("\n=== {} ({}ms) ===", record.status, record.elapsed_ms);
            for (name, value) in &record.headers {
                println!("{}: {}", name, value);
            }
            println!("\n{}", record.display_body());
        }
        Err(e) => eprintln!("Error: {}", e),
    }

    session.shutdown().await;
    Ok(())
}
