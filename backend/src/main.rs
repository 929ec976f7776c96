use std::process::exit;

use tracing::error;

#[tokio::main]
async fn main() {
    if let Err(e) = giya_server::start_server().await {
        error!(error = %e, "Server failed to start");
        eprintln!("{e}");
        exit(1);
    }
}
