use log::{info, warn};
use reqwest::blocking::Client;
use shared::data::{Country, Vehicle};

use crate::{
    biluppgifter::BiluppgifterService,
    config::ServiceDefinition,
    nrplade::NrpladeService,
    registry::ServiceManager,
    service::{AutoService, Error},
};

/// Length of a vehicle identification number.
pub const VIN_LENGTH: usize = 17;

/// What kind of identifier a lookup was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identifier<'a> {
    Registration(&'a str),
    Vin(&'a str),
}

impl<'a> Identifier<'a> {
    /// Anything exactly [`VIN_LENGTH`] characters long is a VIN, everything else a registration number.
    #[must_use]
    pub fn classify(id: &'a str) -> Self {
        if id.chars().count() == VIN_LENGTH {
            Identifier::Vin(id)
        } else {
            Identifier::Registration(id)
        }
    }
}

/// Creates the service implementation registered under `provider`.
#[must_use]
pub fn new_service(provider: &str, client: &Client) -> Option<Box<dyn AutoService>> {
    match provider {
        "biluppgifter" => Some(Box::new(BiluppgifterService::new(client.clone()))),
        "nrplade" => Some(Box::new(NrpladeService::new(client.clone()))),
        _ => None,
    }
}

/// Builds, configures and registers a service for every definition with a known provider.
/// Definitions naming an unknown provider are skipped.
///
/// # Errors
///
/// This function will return an error if a service rejects its configuration.
pub fn build_services(
    definitions: Vec<ServiceDefinition>,
    client: &Client,
) -> Result<ServiceManager, Error> {
    let mut manager = ServiceManager::new();

    for definition in definitions {
        let Some(mut service) = new_service(&definition.provider, client) else {
            warn!(
                "Skipping service {}: unknown provider {:?}",
                definition.config.name, definition.provider
            );
            continue;
        };
        service.configure(definition.config)?;
        manager.add(service);
    }

    Ok(manager)
}

/// Picks the service for the country and looks up the vehicle, by VIN or
/// registration number depending on the identifier.
///
/// # Errors
///
/// Returns [`Error::NoProvider`] when no service supports the country, otherwise
/// whatever the chosen service's lookup returns.
pub fn lookup(manager: &ServiceManager, country: &Country, id: &str) -> Result<Vehicle, Error> {
    let Some(service) = manager.find_by_country(country) else {
        return Err(Error::NoProvider(country.clone()));
    };
    info!("Using service {} for country {country}", service.name());

    match Identifier::classify(id) {
        Identifier::Vin(vin_no) => service.lookup_vin(vin_no),
        Identifier::Registration(reg_no) => service.lookup_reg(reg_no),
    }
}
