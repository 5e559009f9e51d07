use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::OffsetDateTime;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Reservation {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub date: String,
    pub time: String,
    pub guests: u32,
    #[serde(default)]
    pub notes: String,
    pub submitted_at: String,
}

impl Reservation {
    /// Assigns the identifier and submission timestamp from a single clock
    /// reading. The identifier is the current time in milliseconds since the
    /// epoch; uniqueness is assumed adequate for the expected load.
    pub fn new(
        name: String,
        phone: String,
        email: String,
        date: String,
        time: String,
        guests: u32,
        notes: String,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        // Fixed-width millisecond encoding, so lexical order on the string
        // equals chronological order.
        let timestamp_format = format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
        );
        Self {
            id: (now.unix_timestamp_nanos() / 1_000_000) as i64,
            name,
            phone,
            email,
            date,
            time,
            guests,
            notes,
            submitted_at: now.format(&timestamp_format).unwrap(),
        }
    }
}
