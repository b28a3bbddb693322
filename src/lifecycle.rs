// src/lifecycle.rs
// Activation and deactivation hooks, dispatched from a static table.

use tracing::info;

use crate::config::{Config, ConfigError, PLUGIN_VERSION, SETTINGS_KEY, VERSION_KEY};
use crate::store::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Activate,
    Deactivate,
}

impl LifecycleEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleEvent::Activate => "activate",
            LifecycleEvent::Deactivate => "deactivate",
        }
    }
}

type LifecycleHook = fn(&dyn KeyValueStore) -> Result<(), ConfigError>;

const HOOKS: [(LifecycleEvent, LifecycleHook); 2] = [
    (LifecycleEvent::Activate, on_activate),
    (LifecycleEvent::Deactivate, on_deactivate),
];

/// Records the installed version and seeds a default settings record if none exists.
fn on_activate(store: &dyn KeyValueStore) -> Result<(), ConfigError> {
    store.set(VERSION_KEY, PLUGIN_VERSION.as_bytes())?;
    if store.get(SETTINGS_KEY)?.is_none() {
        Config::default().save(store)?;
    }
    Ok(())
}

/// Forgets the installed version. Saved settings are kept.
fn on_deactivate(store: &dyn KeyValueStore) -> Result<(), ConfigError> {
    store.delete(VERSION_KEY)?;
    Ok(())
}

pub fn run_lifecycle(event: LifecycleEvent, store: &dyn KeyValueStore) -> Result<(), ConfigError> {
    for (registered, hook) in HOOKS.iter() {
        if *registered == event {
            hook(store)?;
        }
    }
    info!(event = event.as_str(), "lifecycle hook ran");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{BrokenStore, InMemoryStore};

    #[test]
    fn activate_records_version_and_seeds_defaults() {
        let store = InMemoryStore::default();
        run_lifecycle(LifecycleEvent::Activate, &store).unwrap();
        assert_eq!(store.raw(VERSION_KEY), Some(PLUGIN_VERSION.as_bytes().to_vec()));
        assert_eq!(Config::load(&store).unwrap(), Config::default());
        assert!(store.raw(SETTINGS_KEY).is_some());
    }

    #[test]
    fn activate_keeps_existing_settings() {
        let store = InMemoryStore::default();
        let saved = Config {
            enabled: true,
            allowed_ips: vec!["203.0.113.5".to_string()],
            ..Config::default()
        };
        saved.save(&store).unwrap();
        run_lifecycle(LifecycleEvent::Activate, &store).unwrap();
        assert_eq!(Config::load(&store).unwrap(), saved);
    }

    #[test]
    fn deactivate_removes_version_only() {
        let store = InMemoryStore::default();
        run_lifecycle(LifecycleEvent::Activate, &store).unwrap();
        run_lifecycle(LifecycleEvent::Deactivate, &store).unwrap();
        assert!(store.raw(VERSION_KEY).is_none());
        assert!(store.raw(SETTINGS_KEY).is_some());
    }

    #[test]
    fn store_failures_propagate() {
        assert!(matches!(
            run_lifecycle(LifecycleEvent::Activate, &BrokenStore),
            Err(ConfigError::Store(_))
        ));
        assert!(run_lifecycle(LifecycleEvent::Deactivate, &BrokenStore).is_err());
    }
}
