use clap::Parser;
use dotenv::dotenv;
use tracing::{info, warn};
use table_reserve_backend::config::Config;
use table_reserve_backend::mailer::Mailer;
use table_reserve_backend::repositories::file_repo::FileReservationRepo;

/// Re-sends both notifications for every stored reservation. Used to
/// backfill after an outage of the mail channel.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::parse();

    let mailer = Mailer::from_config(&config).await;
    if !mailer.is_ready() {
        warn!("Mail channel is not ready ({:?}), nothing can be re-sent", mailer.state());
        return Ok(());
    }

    let file_repo = FileReservationRepo::new(config.reservations_dir.clone().into());
    let reservations = file_repo.list_all().await?;
    info!("Re-sending notifications for {} stored reservations", reservations.len());

    for reservation in &reservations {
        let outcome = mailer.notify_both(reservation).await;
        if outcome.all_sent() {
            info!("Reservation {}: both notifications sent", reservation.id);
        } else {
            warn!(
                "Reservation {}: restaurant notification sent: {}, guest notification sent: {}",
                reservation.id, outcome.restaurant_sent, outcome.guest_sent
            );
        }
    }

    Ok(())
}
