use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use rand::rngs::{OsRng, SmallRng};
use rand::{Rng, RngCore, SeedableRng};
use tracing::warn;
use uuid::Uuid;

use crate::models::{Generation, HistoryRecord, QrConfig, RecordOrigin};
use crate::utils::sanitize_file_name;

const FALLBACK_SUFFIX_LEN: usize = 8;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

static FALLBACK_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Build a new record from the current configuration and a captured preview.
///
/// Returns `None` when there is nothing to encode: saving an empty QR is not allowed.
pub fn create_record(config: &QrConfig, preview_url: String) -> Option<HistoryRecord> {
    create_record_at(config, preview_url, Utc::now())
}

pub(crate) fn create_record_at(
    config: &QrConfig,
    preview_url: String,
    saved_at: DateTime<Utc>,
) -> Option<HistoryRecord> {
    let text = config.qr_text();
    if text.is_empty() {
        return None;
    }

    let origin = match &config.generation {
        Generation::Qr => RecordOrigin::Qr,
        Generation::Card(card) => RecordOrigin::Card { card_data: card.clone() },
    };

    Some(HistoryRecord {
        id: generate_id(),
        text,
        file_name: sanitize_file_name(&config.file_name),
        format: config.capture_format(),
        size: config.size(),
        preview_url,
        origin,
        saved_at,
    })
}

/// Random v4 UUID from the OS CSPRNG, or a timestamp-based id if that source is unavailable
pub fn generate_id() -> String {
    let mut bytes = [0u8; 16];
    match OsRng.try_fill_bytes(&mut bytes) {
        Ok(()) => uuid::Builder::from_random_bytes(bytes).into_uuid().to_string(),
        Err(e) => {
            warn!(error = %e, "secure random source unavailable, using fallback record id");
            fallback_id(Utc::now().timestamp_millis())
        }
    }
}

/// `<epoch millis>_<8 base36 chars>`
pub(crate) fn fallback_id(epoch_millis: i64) -> String {
    // Counter keeps ids distinct within one millisecond even if the clock-based seed repeats
    let counter = FALLBACK_COUNTER.fetch_add(1, Ordering::Relaxed);
    let seed = (epoch_millis as u64).rotate_left(17) ^ counter.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut rng = SmallRng::seed_from_u64(seed);

    let suffix: String = (0..FALLBACK_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}_{}", epoch_millis, suffix)
}

/// True if `id` looks like something [`generate_id`] produces
pub fn is_generated_id(id: &str) -> bool {
    if Uuid::parse_str(id).is_ok() {
        return true;
    }
    match id.split_once('_') {
        Some((millis, suffix)) => {
            millis.parse::<i64>().is_ok()
                && suffix.len() == FALLBACK_SUFFIX_LEN
                && suffix.bytes().all(|b| BASE36.contains(&b))
        }
        None => false,
    }
}
