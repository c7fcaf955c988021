use chrono::NaiveDate;
use log::{debug, warn};
use reqwest::{
    blocking::Client,
    header::{HeaderMap, HeaderName, HeaderValue},
    StatusCode, Url,
};
use serde::de::DeserializeOwned;
use shared::data::{Country, HeaderSet, ServiceConfig, Vehicle};
use thiserror::Error;

/// Date format every service uses for the first registration date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The errors that can occur while configuring a service or looking up a vehicle.
#[derive(Debug, Error)]
pub enum Error {
    /// The request could not be sent or the response body could not be read.
    #[error("An error occured when talking to the service: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service answered with anything but 200 OK.
    #[error("service responded with status code {0}")]
    Status(u16),
    /// The response body did not match the schema of the service.
    #[error("Could not decode the service response: {0}")]
    Json(#[from] serde_json::Error),
    /// The first registration date was not in the `YYYY-MM-DD` format.
    #[error("Could not parse the date {0:?}: {1}")]
    Date(String, String),
    #[error("The request URL {0:?} is invalid: {1}")]
    InvalidUrl(String, String),
    #[error("The header {0:?} is not a valid HTTP header")]
    InvalidHeader(String),
    #[error("The service has not been configured")]
    NotConfigured,
    #[error("The service {0} is already configured")]
    AlreadyConfigured(String),
    #[error("no provider available for country {0}")]
    NoProvider(Country),
}

/// The capabilities every vehicle lookup service provides.
pub trait AutoService {
    /// Binds the configuration to this service. Can only be done once.
    ///
    /// # Errors
    ///
    /// This function will return an error if the configuration can not be used to build requests.
    fn configure(&mut self, config: ServiceConfig) -> Result<(), Error>;

    /// The configured name of the service. Empty until configured.
    fn name(&self) -> &str;

    fn supports(&self, country: &Country) -> bool;

    /// Looks up a vehicle by its registration number.
    ///
    /// # Errors
    ///
    /// This function will return an error if the request fails, the service does not answer
    /// with 200 OK or the response can not be decoded.
    fn lookup_reg(&self, reg_no: &str) -> Result<Vehicle, Error>;

    /// Looks up a vehicle by its vehicle identification number.
    ///
    /// # Errors
    ///
    /// Same as [`AutoService::lookup_reg`].
    fn lookup_vin(&self, vin_no: &str) -> Result<Vehicle, Error>;
}

/// The state every service implementation shares: the HTTP client and the bound configuration.
#[derive(Debug, Clone)]
pub struct Service {
    client: Client,
    config: Option<ServiceConfig>,
    headers: HeaderMap,
}

impl Service {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Service {
            client,
            config: None,
            headers: HeaderMap::new(),
        }
    }

    /// Stores the configuration and prepares the headers sent with every request.
    ///
    /// # Errors
    ///
    /// Fails if the service is already configured or a header name or value is invalid.
    pub fn configure(&mut self, config: ServiceConfig) -> Result<(), Error> {
        if let Some(existing) = &self.config {
            return Err(Error::AlreadyConfigured(existing.name.clone()));
        }
        if !config.method.eq_ignore_ascii_case("GET") {
            warn!(
                "Service {} is configured with method {:?}, only GET is supported and will be used",
                config.name, config.method
            );
        }
        self.headers = header_map(&config.headers)?;
        self.config = Some(config);
        Ok(())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.config.as_ref().map_or("", |config| config.name.as_str())
    }

    #[must_use]
    pub fn supports(&self, country: &Country) -> bool {
        self.config
            .as_ref()
            .is_some_and(|config| config.country == *country)
    }

    /// Returns the bound configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConfigured`] if [`Service::configure`] has not been called yet.
    pub fn config(&self) -> Result<&ServiceConfig, Error> {
        self.config.as_ref().ok_or(Error::NotConfigured)
    }

    /// Builds `{host}/{path}/{segments...}?api_token={token}` from the bound configuration.
    ///
    /// Each segment stays a single path segment: `/`, `?` and `#` are percent-encoded
    /// and the dot segments `.` and `..` are rejected.
    ///
    /// # Errors
    ///
    /// Fails if the service is not configured, a segment is a dot segment or the
    /// host and path do not form a valid URL.
    pub fn request_url(&self, segments: &[&str]) -> Result<Url, Error> {
        let config = self.config()?;
        let base = format!("{}/{}", config.host, config.path);
        let mut url =
            Url::parse(&base).map_err(|err| Error::InvalidUrl(base.clone(), err.to_string()))?;

        if let Some(dot) = segments.iter().find(|segment| matches!(**segment, "." | "..")) {
            return Err(Error::InvalidUrl(
                dot.to_string(),
                "dot segments are not allowed".to_string(),
            ));
        }
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(base.clone(), "cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);

        url.query_pairs_mut().append_pair("api_token", &config.token);
        Ok(url)
    }

    /// Sends a GET request to the url and decodes the JSON body into `T`.
    ///
    /// # Errors
    ///
    /// This function will return an error if the request fails, the status is not 200 OK
    /// or the body does not decode into `T`.
    pub fn fetch<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        fetch_json(&self.client, &self.headers, url)
    }
}

/// Performs a single GET request and decodes the response body as JSON.
///
/// # Errors
///
/// This function will return an error if the request fails, the status is not 200 OK
/// or the body does not decode into `T`.
pub fn fetch_json<T: DeserializeOwned>(
    client: &Client,
    headers: &HeaderMap,
    url: Url,
) -> Result<T, Error> {
    debug!("GET {}{}", url.origin().ascii_serialization(), url.path());

    let response = client.get(url).headers(headers.clone()).send()?;
    let status = response.status();
    debug!("Got response status: {status}");
    if status != StatusCode::OK {
        return Err(Error::Status(status.as_u16()));
    }

    let body = response.bytes()?;
    Ok(serde_json::from_slice(&body)?)
}

/// Parses a `YYYY-MM-DD` date as sent by the services.
///
/// # Errors
///
/// Returns [`Error::Date`] for anything that is not a valid calendar date in that format.
pub fn parse_date(date: &str) -> Result<NaiveDate, Error> {
    if !is_year_month_day(date) {
        return Err(Error::Date(
            date.to_string(),
            "expected the format YYYY-MM-DD".to_string(),
        ));
    }
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|err| Error::Date(date.to_string(), err.to_string()))
}

/// chrono accepts unpadded fields, leading whitespace and signed years, so the shape is checked first.
fn is_year_month_day(date: &str) -> bool {
    let bytes = date.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(index, byte)| match index {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        })
}

fn header_map(headers: &HeaderSet) -> Result<HeaderMap, Error> {
    let mut map = HeaderMap::new();
    for (name, values) in headers.iter() {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| Error::InvalidHeader(name.to_string()))?;
        for value in values {
            let header_value =
                HeaderValue::from_str(value).map_err(|_| Error::InvalidHeader(name.to_string()))?;
            map.append(header_name.clone(), header_value);
        }
    }
    Ok(map)
}
