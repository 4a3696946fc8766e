use assistant_router::{envelope, AssistantRouter, RouterConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Classify one utterance from the command line and print the response body.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let message = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let config = RouterConfig::from_env()?;
    let router = AssistantRouter::from_config(&config)?;

    info!(message = %message, "Classifying utterance");

    let (status, body) = match router.handle_message(&message).await {
        Ok(result) => (200, serde_json::to_value(&result)?),
        Err(e) => (e.status_code().as_u16(), envelope::error_body(&e)),
    };

    println!("{}", serde_json::to_string_pretty(&body)?);

    if status != 200 {
        eprintln!("status: {}", status);
        std::process::exit(1);
    }

    Ok(())
}
