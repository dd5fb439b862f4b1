//! Active wallet resolution.
//!
//! An explicit name always wins; otherwise the persisted pointer is used.
//! The pointer itself is owned by a [`ConfigStore`] passed into every
//! call.

use sigil_core::traits::ConfigStore;
use tracing::info;

use crate::error::WalletError;
use crate::record::validate_name;
use crate::store::WalletStore;

/// Pick the wallet to operate on, if any.
///
/// An empty or whitespace-only override counts as absent.
pub fn resolve(
    explicit: Option<&str>,
    config: &dyn ConfigStore,
) -> Result<Option<String>, WalletError> {
    if let Some(name) = explicit.map(str::trim).filter(|n| !n.is_empty()) {
        return Ok(Some(name.to_string()));
    }
    Ok(config.get_active_wallet()?)
}

/// Like [`resolve`], failing with [`WalletError::NoActiveWallet`] when
/// nothing is selected.
pub fn resolve_or_fail(
    explicit: Option<&str>,
    config: &dyn ConfigStore,
) -> Result<String, WalletError> {
    resolve(explicit, config)?.ok_or(WalletError::NoActiveWallet)
}

/// Make `name` the active wallet. The wallet must exist.
pub fn use_wallet(
    store: &WalletStore,
    config: &dyn ConfigStore,
    name: &str,
) -> Result<(), WalletError> {
    validate_name(name)?;
    if !store.exists(name) {
        return Err(WalletError::WalletNotFound(name.to_string()));
    }
    config.set_active_wallet(name)?;
    info!(wallet = name, "active wallet set");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfigStore;
    use sigil_core::error::ConfigError;

    struct FailingConfig;

    impl ConfigStore for FailingConfig {
        fn get_active_wallet(&self) -> Result<Option<String>, ConfigError> {
            Err(ConfigError::Io("unreadable".into()))
        }

        fn set_active_wallet(&self, _name: &str) -> Result<(), ConfigError> {
            Err(ConfigError::Io("read-only".into()))
        }

        fn clear_active_wallet(&self) -> Result<(), ConfigError> {
            Err(ConfigError::Io("read-only".into()))
        }
    }

    #[test]
    fn explicit_override_wins() {
        let config = MemoryConfigStore::new();
        config.set_active_wallet("active").unwrap();
        assert_eq!(
            resolve(Some("explicit"), &config).unwrap().as_deref(),
            Some("explicit")
        );
    }

    #[test]
    fn explicit_override_skips_config() {
        assert_eq!(
            resolve(Some("w1"), &FailingConfig).unwrap().as_deref(),
            Some("w1")
        );
    }

    #[test]
    fn falls_back_to_pointer() {
        let config = MemoryConfigStore::new();
        config.set_active_wallet("active").unwrap();
        assert_eq!(resolve(None, &config).unwrap().as_deref(), Some("active"));
        assert_eq!(resolve(Some("  "), &config).unwrap().as_deref(), Some("active"));
    }

    #[test]
    fn nothing_selected() {
        let config = MemoryConfigStore::new();
        assert_eq!(resolve(None, &config).unwrap(), None);
        assert_eq!(
            resolve_or_fail(None, &config).unwrap_err(),
            WalletError::NoActiveWallet
        );
    }

    #[test]
    fn config_errors_propagate() {
        let err = resolve(None, &FailingConfig).unwrap_err();
        assert!(matches!(err, WalletError::Config(_)));
    }

    #[test]
    fn use_requires_existing_wallet() {
        let dir = tempfile::tempdir().unwrap();
        let store = WalletStore::new(dir.path());
        let config = MemoryConfigStore::new();
        assert_eq!(
            use_wallet(&store, &config, "ghost").unwrap_err(),
            WalletError::WalletNotFound("ghost".into())
        );
        assert_eq!(config.get_active_wallet().unwrap(), None);
    }

    #[test]
    fn use_rejects_bad_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = WalletStore::new(dir.path());
        let err = use_wallet(&store, &MemoryConfigStore::new(), "../x").unwrap_err();
        assert!(matches!(err, WalletError::InvalidWalletName { .. }));
    }

    #[test]
    fn use_sets_pointer_for_existing_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = WalletStore::new(dir.path());
        std::fs::write(store.record_path("w1"), b"{}").unwrap();
        let config = MemoryConfigStore::new();
        use_wallet(&store, &config, "w1").unwrap();
        assert_eq!(config.get_active_wallet().unwrap().as_deref(), Some("w1"));
    }
}
