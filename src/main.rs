use std::sync::Arc;
use clap::Parser;
use dotenv::dotenv;
use table_reserve_backend::config::Config;
use table_reserve_backend::controller;
use table_reserve_backend::mailer::Mailer;
use table_reserve_backend::repositories::file_repo::FileReservationRepo;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::parse();

    let file_repo = FileReservationRepo::new(config.reservations_dir.clone().into());
    file_repo.init().await?;

    let mailer = Arc::new(Mailer::from_config(&config).await);

    controller::serve(mailer, &config).await
}
