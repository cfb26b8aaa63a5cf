#[tokio::main]
async fn main() {
    if let Err(e) = setu_referral::run().await {
        eprintln!("Failed to start server: {e}");
        std::process::exit(1);
    }
}
