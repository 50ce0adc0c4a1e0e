#[tokio::main]
async fn main() {
    if let Err(e) = genai_relay::run().await {
        tracing::error!("Failed to start server: {:#}", e);
        eprintln!("genai-relay: {:#}", e);
        std::process::exit(1);
    }
}
