//! On-open configuration, analogous to the teacher crate's `bubt_config`:
//! a small set of tunables that parameterize constants the core design
//! leaves as implementation detail, without changing any operation's
//! observable contract.

/// Tunables consulted by [`crate::database::Database::open`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Bucket count for the `shardlog` backend. Ignored by `files` and
    /// `logdb`. Defaults to the backend's own built-in default when `None`.
    pub shard_count: Option<usize>,
}

impl Default for Config {
    fn default() -> Config {
        Config { shard_count: None }
    }
}

impl Config {
    pub fn new() -> Config {
        Config::default()
    }

    pub fn with_shard_count(mut self, n: usize) -> Config {
        self.shard_count = Some(n);
        self
    }
}

#[cfg(test)]
mod config_test {
    use super::*;

    #[test]
    fn default_leaves_shard_count_unset() {
        assert_eq!(Config::default().shard_count, None);
    }

    #[test]
    fn builder_sets_shard_count() {
        let cfg = Config::new().with_shard_count(16);
        assert_eq!(cfg.shard_count, Some(16));
    }
}
