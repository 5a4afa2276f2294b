//! Bridge from `a3bridge_config::BridgeConfig` to runtime types.
//!
//! The config crate has no dependencies on other a3bridge crates. This
//! module translates its sections into [`DispatchSettings`] and a ready
//! [`BridgeBuilder`].

use a3bridge_config::{BridgeConfig, DispatchSection};

use crate::bridge::{Bridge, BridgeBuilder, DispatchSettings};
use crate::error::RuntimeResult;

impl From<&DispatchSection> for DispatchSettings {
    fn from(section: &DispatchSection) -> Self {
        Self {
            reply_deadline: section.reply_deadline(),
            max_background: section.max_background,
            worker_threads: section.worker_threads,
            default_reply_capacity: section.default_reply_capacity,
        }
    }
}

impl BridgeBuilder {
    /// Start from a loaded configuration.
    pub fn from_config(cfg: &BridgeConfig) -> Self {
        Self::new()
            .extension_name(cfg.extension.name.clone())
            .version(cfg.extension.version.clone())
            .settings(DispatchSettings::from(&cfg.dispatch))
    }
}

impl Bridge {
    /// Build a bridge from a loaded configuration.
    ///
    /// # Errors
    ///
    /// See [`BridgeBuilder::build`].
    pub fn from_config(cfg: &BridgeConfig) -> RuntimeResult<Self> {
        BridgeBuilder::from_config(cfg).build()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn defaults_map_to_default_settings() {
        let settings = DispatchSettings::from(&DispatchSection::default());
        assert_eq!(settings, DispatchSettings::default());
    }

    #[test]
    fn zero_deadline_disables_it() {
        let section = DispatchSection {
            reply_deadline_ms: Some(0),
            ..DispatchSection::default()
        };
        assert_eq!(DispatchSettings::from(&section).reply_deadline, None);
    }

    #[test]
    fn bridge_takes_identity_and_limits_from_config() {
        let mut cfg = BridgeConfig::default();
        cfg.extension.name = "myExt".into();
        cfg.extension.version = "2.0".into();
        cfg.dispatch.reply_deadline_ms = Some(250);
        cfg.dispatch.max_background = Some(3);
        cfg.dispatch.worker_threads = Some(1);

        let bridge = Bridge::from_config(&cfg).unwrap();
        assert_eq!(bridge.extension_name(), "myExt");
        assert_eq!(bridge.version(), "2.0");
        assert_eq!(bridge.settings().reply_deadline, Some(Duration::from_millis(250)));
        assert_eq!(bridge.executor().max_background(), Some(3));
        assert_eq!(bridge.executor().available_permits(), Some(3));
    }
}
