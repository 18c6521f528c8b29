use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    error::LocationError,
    model::Coordinates,
    storage::{LOCATION_DENIED_KEY, LOCATION_PROMPTED_KEY, Storage},
};

/// Source of the device's coordinates.
#[async_trait]
pub trait GeolocationResolver: Send + Sync {
    async fn resolve(&self) -> Result<Coordinates, LocationError>;
}

/// Always yields the same outcome.
#[derive(Debug, Clone)]
pub struct StaticResolver(pub Result<Coordinates, LocationError>);

#[async_trait]
impl GeolocationResolver for StaticResolver {
    async fn resolve(&self) -> Result<Coordinates, LocationError> {
        self.0.clone()
    }
}

/// Coordinates taken from the `[location]` config section; `Unsupported` without one.
#[derive(Debug, Clone)]
pub struct ConfiguredLocation {
    location: Option<Coordinates>,
}

impl ConfiguredLocation {
    pub fn new(location: Option<Coordinates>) -> Self {
        Self { location }
    }
}

#[async_trait]
impl GeolocationResolver for ConfiguredLocation {
    async fn resolve(&self) -> Result<Coordinates, LocationError> {
        let c = self.location.ok_or(LocationError::Unsupported)?;
        if !(-90.0..=90.0).contains(&c.latitude) || !(-180.0..=180.0).contains(&c.longitude) {
            return Err(LocationError::Unavailable(format!(
                "configured coordinates out of range: {}, {}",
                c.latitude, c.longitude
            )));
        }
        Ok(c)
    }
}

/// Whether the location prompt has been answered on this installation,
/// and whether the answer was a refusal.
#[derive(Clone)]
pub struct LocationConsent {
    storage: Arc<dyn Storage>,
}

impl LocationConsent {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn is_decided(&self) -> bool {
        self.storage.load(LOCATION_PROMPTED_KEY).as_deref() == Some("true")
    }

    pub fn is_denied(&self) -> bool {
        self.storage.load(LOCATION_DENIED_KEY).as_deref() == Some("true")
    }

    /// Mark the prompt as answered and remember whether access was refused.
    pub fn record(&self, denied: bool) {
        let result = self
            .storage
            .save(LOCATION_PROMPTED_KEY, "true")
            .and_then(|()| self.storage.save(LOCATION_DENIED_KEY, &denied.to_string()));

        if let Err(e) = result {
            tracing::warn!("failed to persist location consent: {e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[tokio::test]
    async fn configured_location_without_coordinates_is_unsupported() {
        let resolver = ConfiguredLocation::new(None);
        assert_eq!(resolver.resolve().await, Err(LocationError::Unsupported));
    }

    #[tokio::test]
    async fn configured_location_rejects_out_of_range() {
        let resolver =
            ConfiguredLocation::new(Some(Coordinates { latitude: 123.0, longitude: 0.0 }));
        assert!(matches!(resolver.resolve().await, Err(LocationError::Unavailable(_))));
    }

    #[tokio::test]
    async fn configured_location_returns_coordinates() {
        let here = Coordinates { latitude: 35.68, longitude: 139.69 };
        let resolver = ConfiguredLocation::new(Some(here));
        assert_eq!(resolver.resolve().await, Ok(here));
    }

    #[test]
    fn consent_flag_persists() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let consent = LocationConsent::new(storage.clone());
        assert!(!consent.is_decided());
        assert!(!consent.is_denied());

        consent.record(false);
        let reopened = LocationConsent::new(storage);
        assert!(reopened.is_decided());
        assert!(!reopened.is_denied());
    }

    #[test]
    fn refusal_is_remembered_until_granted() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let consent = LocationConsent::new(storage.clone());

        consent.record(true);
        assert!(LocationConsent::new(storage.clone()).is_denied());

        consent.record(false);
        assert!(!LocationConsent::new(storage).is_denied());
        assert!(consent.is_decided());
    }
}
