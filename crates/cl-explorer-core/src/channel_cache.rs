use cl_api_types::IbcChannelInfo;
use moka::sync;
use std::time::Duration;

/// Channel metadata can be updated by governance, so it is only trusted for
/// a bounded time.
pub const DEFAULT_CHANNEL_INFO_TTL: Duration = Duration::from_secs(60 * 60);

/// Channel ends keyed by `(port, channel)`, expiring `ttl` after insertion.
#[derive(Clone)]
pub struct ChannelInfoCache {
    channels: sync::Cache<(String, String), IbcChannelInfo>,
}

impl Default for ChannelInfoCache {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_INFO_TTL)
    }
}

impl ChannelInfoCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            channels: sync::Cache::builder().time_to_live(ttl).build(),
        }
    }

    pub fn get(&self, channel_id: &str, port_id: &str) -> Option<IbcChannelInfo> {
        self.channels.get(&(port_id.to_owned(), channel_id.to_owned()))
    }

    pub fn insert(&self, info: IbcChannelInfo) {
        self.channels.insert((info.port_id.clone(), info.channel_id.clone()), info);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel_0() -> IbcChannelInfo {
        IbcChannelInfo {
            channel_id: "channel-0".to_owned(),
            port_id: "transfer".to_owned(),
            state: "STATE_OPEN".to_owned(),
            counterparty_channel_id: "channel-141".to_owned(),
            counterparty_port_id: "transfer".to_owned(),
            counterparty_chain_id: Some("cosmoshub-4".to_owned()),
        }
    }

    #[test]
    fn fresh_entries_are_served() {
        let cache = ChannelInfoCache::default();
        assert!(cache.get("channel-0", "transfer").is_none());

        cache.insert(channel_0());
        assert_eq!(cache.get("channel-0", "transfer"), Some(channel_0()));
        assert!(cache.get("channel-0", "icahost").is_none());
    }

    #[test]
    fn zero_ttl_never_serves() {
        let cache = ChannelInfoCache::new(Duration::ZERO);
        cache.insert(channel_0());
        assert!(cache.get("channel-0", "transfer").is_none());
    }

    #[test]
    fn entries_expire_after_ttl() {
        let cache = ChannelInfoCache::new(Duration::from_millis(50));
        cache.insert(channel_0());
        assert!(cache.get("channel-0", "transfer").is_some());

        std::thread::sleep(Duration::from_millis(120));
        assert!(cache.get("channel-0", "transfer").is_none());
    }
}
