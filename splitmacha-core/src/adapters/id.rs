//! Record identifier generation

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Counter for generating unique IDs within the same millisecond
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique ID based on timestamp + counter
///
/// Lower 48 bits hold the millisecond timestamp (good for ~8900 years),
/// upper 16 bits a per-process counter (65536 unique IDs per millisecond),
/// so rapid successive creates never collide.
pub fn generate_id() -> u64 {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;

    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
    (timestamp << 16) | counter
}

/// Generate a record id with a type prefix, e.g. `user-109951162777601`
pub fn prefixed_id(prefix: &str) -> String {
    format!("{}-{}", prefix, generate_id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let ids: HashSet<u64> = (0..1000).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_prefixed_id_shape() {
        let id = prefixed_id("expense");
        assert!(id.starts_with("expense-"));
        assert!(id["expense-".len()..].chars().all(|c| c.is_ascii_digit()));
    }
}
