use reqwest::blocking::Client;
use serde::Deserialize;
use shared::data::{Country, ServiceConfig, Vehicle};

use crate::service::{parse_date, AutoService, Error, Service};

/// Integrates with the biluppgifter license plate lookup service.
#[derive(Debug, Clone)]
pub struct BiluppgifterService {
    service: Service,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BiluppgifterData {
    data: BiluppgifterResponse,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BiluppgifterResponse {
    attributes: Attributes,
    basic: Basic,
    status: Status,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Attributes {
    regno: String,
    vin: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Basic {
    data: BasicData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BasicData {
    make: String,
    model: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Status {
    data: StatusData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StatusData {
    first_registered: String,
}

impl BiluppgifterData {
    fn into_vehicle(self) -> Result<Vehicle, Error> {
        let BiluppgifterResponse {
            attributes,
            basic,
            status,
        } = self.data;

        Ok(Vehicle {
            first_reg_date: parse_date(&status.data.first_registered)?,
            brand: basic.data.make,
            model: basic.data.model,
            reg_no: attributes.regno,
            vin_no: attributes.vin,
        })
    }
}

impl BiluppgifterService {
    #[must_use]
    pub fn new(client: Client) -> Self {
        BiluppgifterService {
            service: Service::new(client),
        }
    }

    /// Shared part of registration and VIN lookups, they only differ in the `kind` path segment.
    fn lookup(&self, kind: &str, id: &str) -> Result<Vehicle, Error> {
        let url = self.service.request_url(&[kind, id])?;
        let data: BiluppgifterData = self.service.fetch(url)?;
        data.into_vehicle()
    }
}

impl AutoService for BiluppgifterService {
    fn configure(&mut self, config: ServiceConfig) -> Result<(), Error> {
        self.service.configure(config)
    }

    fn name(&self) -> &str {
        self.service.name()
    }

    fn supports(&self, country: &Country) -> bool {
        self.service.supports(country)
    }

    fn lookup_reg(&self, reg_no: &str) -> Result<Vehicle, Error> {
        self.lookup("regno", reg_no)
    }

    fn lookup_vin(&self, vin_no: &str) -> Result<Vehicle, Error> {
        self.lookup("vin", vin_no)
    }
}
