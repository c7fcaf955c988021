use std::collections::HashMap;

use log::debug;
use shared::data::Country;

use crate::service::AutoService;

/// Keeps track of the configured services by name.
///
/// Services are stored unordered, so [`ServiceManager::find_by_country`] is only
/// deterministic as long as no two services claim the same country.
#[derive(Default)]
pub struct ServiceManager {
    services: HashMap<String, Box<dyn AutoService>>,
}

impl ServiceManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a service. Does nothing if a service with the same name is already registered.
    pub fn add(&mut self, service: Box<dyn AutoService>) {
        let name = service.name().to_string();
        if self.services.contains_key(&name) {
            debug!("Service {name} is already registered, ignoring");
            return;
        }
        self.services.insert(name, service);
    }

    /// Returns the first service that supports the country, if any.
    #[must_use]
    pub fn find_by_country(&self, country: &Country) -> Option<&dyn AutoService> {
        self.services
            .values()
            .find(|service| service.supports(country))
            .map(AsRef::as_ref)
    }

    /// Names of all registered services in alphabetical order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.services.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use reqwest::blocking::Client;

    use super::*;
    use crate::{nrplade::NrpladeService, service::tests::config};

    fn configured(name: &str, country: &str) -> Box<dyn AutoService> {
        let mut service = NrpladeService::new(Client::new());
        service.configure(config(name, country)).unwrap();
        Box::new(service)
    }

    #[test]
    fn first_registration_of_a_name_wins() {
        let mut manager = ServiceManager::new();
        manager.add(configured("alpha", "dk"));
        manager.add(configured("alpha", "se"));

        assert_eq!(manager.len(), 1);
        assert!(manager.find_by_country(&"dk".into()).is_some());
        assert!(manager.find_by_country(&"se".into()).is_none());
    }

    #[test]
    fn finds_service_by_country() {
        let mut manager = ServiceManager::new();
        manager.add(configured("alpha", "dk"));
        manager.add(configured("beta", "se"));

        let found = manager.find_by_country(&"se".into()).unwrap();
        assert_eq!(found.name(), "beta");
        assert_eq!(manager.names(), vec!["alpha", "beta"]);
    }

    #[test]
    fn unknown_country_finds_nothing() {
        let mut manager = ServiceManager::new();
        assert!(manager.is_empty());
        assert!(manager.find_by_country(&"dk".into()).is_none());

        manager.add(configured("alpha", "dk"));
        assert!(manager.find_by_country(&"no".into()).is_none());
        assert!(manager.find_by_country(&"DK".into()).is_none());
        assert_eq!(manager.names(), vec!["alpha"]);
    }
}
