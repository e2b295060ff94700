use {
    crate::kernel::{
        entities::{
            Amount,
            ProductId,
        },
        store::AuctionSeed,
    },
    anyhow::Result,
    serde::{
        Deserialize,
        Serialize,
    },
    std::{
        collections::HashMap,
        fs,
        time::Duration,
    },
    time::OffsetDateTime,
};

/// Tunables for every room spawned by one service instance.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RoomConfig {
    /// Capacity of the room's command mailbox.
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity:  usize,
    /// Per-subscriber outbound event buffer; a subscriber that overflows it
    /// is evicted rather than allowed to backpressure the room.
    #[serde(default = "default_subscriber_buffer")]
    pub subscriber_buffer: usize,
    /// How many recently accepted bids the attach snapshot carries for late
    /// joiners.
    #[serde(default = "default_recent_tail")]
    pub recent_tail:       usize,
    /// Upper bound on enqueueing a submission and waiting for its verdict.
    #[serde(default = "default_submit_timeout", with = "humantime_serde")]
    pub submit_timeout:    Duration,
    /// Grace period before a closed room with no subscribers reclaims
    /// itself, so a late subscriber can still read the final state.
    #[serde(default = "default_reclaim_grace", with = "humantime_serde")]
    pub reclaim_grace:     Duration,
}

fn default_mailbox_capacity() -> usize {
    256
}

fn default_subscriber_buffer() -> usize {
    64
}

fn default_recent_tail() -> usize {
    16
}

fn default_submit_timeout() -> Duration {
    Duration::from_secs(2)
}

fn default_reclaim_grace() -> Duration {
    Duration::from_secs(5)
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity:  default_mailbox_capacity(),
            subscriber_buffer: default_subscriber_buffer(),
            recent_tail:       default_recent_tail(),
            submit_timeout:    default_submit_timeout(),
            reclaim_grace:     default_reclaim_grace(),
        }
    }
}

/// One catalog entry. The auction window is expressed relative to load time
/// so a catalog file stays meaningful across runs.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProductConfig {
    /// Lowest acceptable first bid, in minor currency units.
    pub base_price: Amount,
    /// Delay before bidding opens; the auction is open immediately when
    /// absent.
    #[serde(default, with = "humantime_serde::option")]
    pub opens_in:   Option<Duration>,
    /// How long bidding stays open once the auction has opened.
    #[serde(with = "humantime_serde")]
    pub duration:   Duration,
}

impl ProductConfig {
    pub fn seed(&self, now: OffsetDateTime) -> AuctionSeed {
        let opens_at = now + self.opens_in.unwrap_or(Duration::ZERO);
        AuctionSeed {
            base_price: self.base_price,
            opens_at,
            closes_at: opens_at + self.duration,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub rooms:    RoomConfig,
    #[serde(default)]
    pub products: HashMap<ProductId, ProductConfig>,
}

impl Config {
    pub fn load(path: &str) -> Result<Config> {
        let yaml_content = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&yaml_content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_tunables() {
        let config: Config = serde_yaml::from_str("products: {}").unwrap();
        assert_eq!(config.rooms, RoomConfig::default());
        assert!(config.products.is_empty());
    }

    #[test]
    fn catalog_entry_parses_humantime_durations() {
        let config: Config = serde_yaml::from_str(
            r#"
rooms:
  submit_timeout: 500ms
products:
  vintage-clock:
    base_price: 10000
    opens_in: 30s
    duration: 10m
"#,
        )
        .unwrap();
        assert_eq!(config.rooms.submit_timeout, Duration::from_millis(500));
        assert_eq!(config.rooms.recent_tail, 16);

        let product = &config.products["vintage-clock"];
        assert_eq!(product.base_price, 10_000);
        assert_eq!(product.opens_in, Some(Duration::from_secs(30)));

        let now = OffsetDateTime::now_utc();
        let seed = product.seed(now);
        assert_eq!(seed.opens_at, now + Duration::from_secs(30));
        assert_eq!(seed.closes_at, seed.opens_at + Duration::from_secs(600));
    }
}
