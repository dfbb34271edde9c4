#[tokio::main]
async fn main() {
    if let Err(e) = movie_catalog::start_server().await {
        eprintln!("Failed to start movie catalog: {}", e);
        std::process::exit(1);
    }
}
