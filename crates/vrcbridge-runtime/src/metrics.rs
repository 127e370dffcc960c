//! Metric names recorded by the runtime.

/// Inbound OSC events queued for the dispatch loop (counter, labels: kind).
pub const INBOUND_EVENTS_TOTAL: &str = "bridge_inbound_events_total";
/// Inbound OSC events dropped before reaching the queue (counter, labels: reason).
pub const INBOUND_DROPS_TOTAL: &str = "bridge_inbound_drops_total";
/// Broadcasts performed (counter, labels: type).
pub const BROADCASTS_TOTAL: &str = "bridge_broadcasts_total";
/// Subscribers pruned after a failed delivery (counter).
pub const SUBSCRIBER_PRUNES_TOTAL: &str = "bridge_subscriber_prunes_total";
/// Live subscribers (gauge).
pub const SUBSCRIBERS_ACTIVE: &str = "bridge_subscribers_active";
/// Subscriber commands (counter, labels: type, outcome).
pub const COMMANDS_TOTAL: &str = "bridge_commands_total";
/// Avatar reconciliations (counter, labels: outcome).
pub const AVATAR_LOADS_TOTAL: &str = "bridge_avatar_loads_total";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_are_prefixed_snake_case() {
        for name in [
            INBOUND_EVENTS_TOTAL,
            INBOUND_DROPS_TOTAL,
            BROADCASTS_TOTAL,
            SUBSCRIBER_PRUNES_TOTAL,
            SUBSCRIBERS_ACTIVE,
            COMMANDS_TOTAL,
            AVATAR_LOADS_TOTAL,
        ] {
            assert!(name.starts_with("bridge_"), "{name}");
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "{name}"
            );
        }
    }
}
