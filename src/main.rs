use gto_trainer::cli;

#[tokio::main]
async fn main() {
    env_logger::init();
    cli::run().await;
}
