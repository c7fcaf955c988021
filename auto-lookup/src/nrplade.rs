use chrono::Local;
use log::warn;
use reqwest::blocking::Client;
use serde::Deserialize;
use shared::data::{Country, ServiceConfig, Vehicle};

use crate::service::{parse_date, AutoService, Error, Service};

/// Integrates with the nrpla.de license plate lookup service.
///
/// The service has no VIN endpoint wired up yet, see [`NrpladeService::lookup_vin`].
#[derive(Debug, Clone)]
pub struct NrpladeService {
    service: Service,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NrpladeData {
    data: NrpladeResponse,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
#[allow(dead_code)]
struct NrpladeResponse {
    registration: String,
    first_registration_date: String,
    vin: String,
    #[serde(rename = "type")]
    vehicle_type: String,
    brand: String,
    model: String,
    version: String,
    fuel_type: String,
    registration_status: String,
}

impl NrpladeData {
    fn into_vehicle(self) -> Result<Vehicle, Error> {
        let data = self.data;
        Ok(Vehicle {
            first_reg_date: parse_date(&data.first_registration_date)?,
            brand: data.brand,
            model: data.model,
            reg_no: data.registration,
            vin_no: data.vin,
        })
    }
}

impl NrpladeService {
    #[must_use]
    pub fn new(client: Client) -> Self {
        NrpladeService {
            service: Service::new(client),
        }
    }
}

impl AutoService for NrpladeService {
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
        let url = self.service.request_url(&[reg_no])?;
        let data: NrpladeData = self.service.fetch(url)?;
        data.into_vehicle()
    }

    /// Not implemented against the service. Always returns the same placeholder
    /// vehicle, first registered today, without sending a request.
    fn lookup_vin(&self, vin_no: &str) -> Result<Vehicle, Error> {
        warn!("{} does not support VIN lookups, returning a placeholder for {vin_no}", self.name());
        Ok(Vehicle {
            brand: "Ford".to_string(),
            model: "GT".to_string(),
            reg_no: "123".to_string(),
            vin_no: "123".to_string(),
            first_reg_date: Local::now().date_naive(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;

    const GOLDEN: &str = r#"{
        "data": {
            "registration": "BX71743",
            "first_registration_date": "2015-03-27",
            "vin": "WVWZZZAUZFW123456",
            "type": "Personbil",
            "brand": "Volkswagen",
            "model": "Golf",
            "version": "1,4 TSI BMT Highline DSG",
            "fuel_type": "Benzin",
            "registration_status": "Registreret"
        }
    }"#;

    #[test]
    fn golden_response_maps_to_vehicle() {
        let data: NrpladeData = serde_json::from_str(GOLDEN).unwrap();
        let vehicle = data.into_vehicle().unwrap();

        assert_eq!(
            vehicle,
            Vehicle {
                brand: "Volkswagen".to_string(),
                model: "Golf".to_string(),
                reg_no: "BX71743".to_string(),
                vin_no: "WVWZZZAUZFW123456".to_string(),
                first_reg_date: NaiveDate::from_ymd_opt(2015, 3, 27).unwrap(),
            }
        );
    }

    #[test]
    fn garbage_date_is_rejected() {
        let data: NrpladeData = serde_json::from_str(
            r#"{"data": {"registration": "BX71743", "first_registration_date": "27-03-2015"}}"#,
        )
        .unwrap();
        assert!(matches!(data.into_vehicle(), Err(Error::Date(raw, _)) if raw == "27-03-2015"));
    }

    #[test]
    fn vin_lookup_returns_placeholder() {
        let service = NrpladeService::new(Client::new());
        let vehicle = service.lookup_vin("WVWZZZAUZFW123456").unwrap();

        assert_eq!(vehicle.brand, "Ford");
        assert_eq!(vehicle.model, "GT");
        assert_eq!(vehicle.reg_no, "123");
        assert_eq!(vehicle.vin_no, "123");
    }
}
