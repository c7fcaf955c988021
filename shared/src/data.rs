use std::{collections::BTreeMap, fmt};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// A jurisdiction code such as `dk` or `se`. Compared verbatim, case included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Country(String);

impl Country {
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Country(code.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Country {
    fn from(value: &str) -> Self {
        Country(value.to_string())
    }
}

impl From<String> for Country {
    fn from(value: String) -> Self {
        Country(value)
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Headers sent along with every request to a service. Keys are unique and
/// kept in sorted order, each key may carry several values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, HeaderValues>")]
pub struct HeaderSet(BTreeMap<String, Vec<String>>);

/// A header value in the config file is either a single scalar or a list of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HeaderValues {
    One(Scalar),
    Many(Vec<Scalar>),
}

/// Any plain config value. Numbers and booleans are kept in their written form,
/// so `token: 123456` and `X-Api-Version: 2` are read as text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Bool(bool),
}

impl From<Scalar> for String {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Text(text) => text,
            Scalar::Integer(number) => number.to_string(),
            Scalar::Unsigned(number) => number.to_string(),
            Scalar::Float(number) => number.to_string(),
            Scalar::Bool(flag) => flag.to_string(),
        }
    }
}

/// Deserializes any [`Scalar`] into a `String`, for use with `#[serde(deserialize_with)]`.
///
/// # Errors
///
/// Fails for values that are not scalars, such as lists or mappings.
pub fn deserialize_scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Scalar::deserialize(deserializer).map(String::from)
}

impl From<BTreeMap<String, HeaderValues>> for HeaderSet {
    fn from(value: BTreeMap<String, HeaderValues>) -> Self {
        let mut headers = HeaderSet::default();
        for (name, values) in value {
            match values {
                HeaderValues::One(single) => headers.add(&name, String::from(single)),
                HeaderValues::Many(many) => {
                    for single in many {
                        headers.add(&name, String::from(single));
                    }
                }
            }
        }
        headers
    }
}

impl HeaderSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value to the header, creating the header if needed.
    pub fn add(&mut self, name: &str, value: impl Into<String>) {
        self.0.entry(name.to_string()).or_default().push(value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything needed to talk to one lookup service. Built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub name: String,
    pub country: Country,
    pub host: String,
    pub path: String,
    pub method: String,
    pub token: String,
    pub headers: HeaderSet,
}

impl fmt::Display for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "name: {}", self.name)?;
        writeln!(f, "country: {}", self.country)?;
        writeln!(f, "host: {}", self.host)?;
        writeln!(f, "path: {}", self.path)?;
        writeln!(f, "method: {}", self.method)?;
        writeln!(f, "token: {}", mask(&self.token))?;
        writeln!(f, "headers:")?;
        for (name, values) in self.headers.iter() {
            writeln!(f, "  {name}: {}", values.join(","))?;
        }
        Ok(())
    }
}

fn mask(token: &str) -> &'static str {
    if token.is_empty() {
        "<none>"
    } else {
        "********"
    }
}

/// The normalized vehicle data every service maps its response into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub brand: String,
    pub model: String,
    pub reg_no: String,
    pub vin_no: String,
    pub first_reg_date: NaiveDate,
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Brand:              {}", self.brand)?;
        writeln!(f, "Model:              {}", self.model)?;
        writeln!(f, "Registration:       {}", self.reg_no)?;
        writeln!(f, "VIN:                {}", self.vin_no)?;
        write!(
            f,
            "First registration: {}",
            self.first_reg_date.format("%Y-%m-%d")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_comparison_is_case_sensitive() {
        assert_eq!(Country::from("dk"), Country::new("dk"));
        assert_ne!(Country::from("dk"), Country::from("DK"));
    }

    #[test]
    fn header_values_accumulate_per_key() {
        let mut headers = HeaderSet::new();
        headers.add("Accept", "application/json");
        headers.add("X-Tag", "a");
        headers.add("X-Tag", "b");

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("X-Tag"), Some(&["a".to_string(), "b".to_string()][..]));
        assert_eq!(headers.get("Missing"), None);
    }

    #[test]
    fn numeric_header_values_are_read_as_text() {
        let map: BTreeMap<String, HeaderValues> =
            serde_json::from_str(r#"{"X-Api-Version": 2, "X-Flags": [true, 1.5, "x"]}"#).unwrap();
        let headers = HeaderSet::from(map);

        assert_eq!(headers.get("X-Api-Version"), Some(&["2".to_string()][..]));
        assert_eq!(
            headers.get("X-Flags"),
            Some(&["true".to_string(), "1.5".to_string(), "x".to_string()][..])
        );
    }

    #[test]
    fn config_display_hides_token() {
        let mut headers = HeaderSet::new();
        headers.add("X-Tag", "a");
        headers.add("X-Tag", "b");
        let config = ServiceConfig {
            name: "nrplade".into(),
            country: "dk".into(),
            host: "https://api.nrpla.de".into(),
            path: "v1".into(),
            method: "GET".into(),
            token: "hunter2".into(),
            headers,
        };

        let shown = config.to_string();
        assert!(shown.contains("name: nrplade\n"));
        assert!(shown.contains("country: dk\n"));
        assert!(shown.contains("  X-Tag: a,b\n"));
        assert!(!shown.contains("hunter2"));
    }

    #[test]
    fn vehicle_serializes_date_without_time() {
        let vehicle = Vehicle {
            brand: "Volvo".into(),
            model: "V70".into(),
            reg_no: "BX71743".into(),
            vin_no: "YV1SW61R021234567".into(),
            first_reg_date: NaiveDate::from_ymd_opt(2002, 4, 18).unwrap(),
        };

        let json = serde_json::to_value(&vehicle).unwrap();
        assert_eq!(json["first_reg_date"], "2002-04-18");
        assert!(vehicle.to_string().ends_with("First registration: 2002-04-18"));
    }
}
