use std::path::PathBuf;

use anyhow::Context;
use tokio::fs;
use tracing::{info, warn};

use crate::models::reservation::Reservation;

pub const RESERVATION_FILE_PREFIX: &str = "reservation-";

/// Stores each reservation as one JSON file named
/// `reservation-{id}.json` inside the reservations directory.
pub struct FileReservationRepo {
    reservations_dir: PathBuf,
}

impl FileReservationRepo {
    pub fn new(reservations_dir: PathBuf) -> Self {
        Self { reservations_dir }
    }

    /// Creates the reservations directory if it does not exist yet.
    pub async fn init(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.reservations_dir)
            .await
            .with_context(|| {
                format!(
                    "Failed to create reservations directory: {}",
                    self.reservations_dir.display()
                )
            })?;
        info!("Reservation storage directory: {}", self.reservations_dir.display());
        Ok(())
    }

    fn record_path(&self, id: i64) -> PathBuf {
        self.reservations_dir
            .join(format!("{}{}.json", RESERVATION_FILE_PREFIX, id))
    }

    pub async fn save(&self, reservation: &Reservation) -> anyhow::Result<()> {
        let path = self.record_path(reservation.id);
        let body = serde_json::to_vec_pretty(reservation)
            .context("Failed to serialize reservation record")?;

        fs::write(&path, body)
            .await
            .with_context(|| format!("Failed to write reservation record: {}", path.display()))?;
        Ok(())
    }

    /// All stored reservations, ordered by identifier ascending. Files in the
    /// directory that do not carry the reservation prefix are ignored; files
    /// that carry it but do not parse are skipped with a warning.
    pub async fn list_all(&self) -> anyhow::Result<Vec<Reservation>> {
        let paths = self.find_by_prefix(RESERVATION_FILE_PREFIX).await?;

        let mut reservations = Vec::new();
        for path in paths {
            let raw = fs::read(&path)
                .await
                .with_context(|| format!("Failed to read reservation record: {}", path.display()))?;
            match serde_json::from_slice::<Reservation>(&raw) {
                Ok(reservation) => reservations.push(reservation),
                Err(e) => {
                    warn!("Skipping unreadable reservation file {} due to: {}", path.display(), e);
                }
            }
        }

        reservations.sort_by_key(|reservation| reservation.id);
        Ok(reservations)
    }

    /// Paths of record files whose name starts with the given prefix,
    /// distinguishing reservation records from any other files in the
    /// same directory.
    pub async fn find_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<PathBuf>> {
        let mut entries = fs::read_dir(&self.reservations_dir).await.with_context(|| {
            format!(
                "Failed to read reservations directory: {}",
                self.reservations_dir.display()
            )
        })?;

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if let Some(name) = entry.file_name().to_str() {
                if name.starts_with(prefix) && name.ends_with(".json") {
                    paths.push(entry.path());
                }
            }
        }
        paths.sort();
        Ok(paths)
    }
}
