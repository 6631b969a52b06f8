//! Unique token and boundary generation.

use chrono::{DateTime, Utc};
use rand::Rng;

/// Generates a collision-resistant token for a Message-ID local part.
///
/// The token is the hex seconds and hex microseconds of `now` followed by a
/// `.` and eight random digits, e.g. `65a1b2c30f1a2.04817263`.
#[must_use]
pub fn unique_token(now: DateTime<Utc>) -> String {
    let seconds = now.timestamp();
    let micros = now.timestamp_subsec_micros();
    let entropy: u32 = rand::thread_rng().gen_range(0..100_000_000);
    format!("{seconds:08x}{micros:05x}.{entropy:08}")
}

/// Generates a fresh multipart boundary.
#[must_use]
pub fn boundary() -> String {
    let mut rng = rand::thread_rng();
    let value: u128 = rng.r#gen();
    format!("=_mailpost_{value:032x}")
}
