use tracing::error;

#[tokio::main]
async fn main() {
    if let Err(e) = bloglist::run().await {
        error!("startup failed: {e}");
        eprintln!("startup failed: {e}");
        std::process::exit(1);
    }
}
