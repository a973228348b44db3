use crate::domain::model::{Credentials, GrantType, Place};
use crate::utils::error::{Result, SquirrelError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquirrelConfig {
    pub ride: RideConfig,
    pub places: PlacesConfig,
    #[serde(default)]
    pub geocoder: GeocoderConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideConfig {
    #[serde(default = "default_ride_base_url")]
    pub base_url: String,
    pub access_token: String,
    pub client_id: String,
    pub client_secret: String,
    /// Display name of the product to sample, which differs per city.
    #[serde(default = "default_product_name")]
    pub product_name: String,
    #[serde(default = "default_expires_in_seconds")]
    pub expires_in_seconds: i64,
    #[serde(default = "default_grant_type")]
    pub grant_type: GrantType,
    pub scopes: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    pub start: Place,
    pub end: Place,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    #[serde(default = "default_geocoder_base_url")]
    pub base_url: String,
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: String,
}

fn default_ride_base_url() -> String {
    "https://api.uber.com".to_string()
}

fn default_product_name() -> String {
    "uberX".to_string()
}

const fn default_expires_in_seconds() -> i64 {
    9_999_999_999
}

const fn default_grant_type() -> GrantType {
    GrantType::AuthorizationCode
}

fn default_geocoder_base_url() -> String {
    "https://maps.googleapis.com/maps/api/geocode/json".to_string()
}

const fn default_timeout_seconds() -> u64 {
    5
}

fn default_output_path() -> String {
    "squirrel_monitoring.csv".to_string()
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoder_base_url(),
            api_key: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

impl SquirrelConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SquirrelError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content)
            .map_err(|e| SquirrelError::config(format!("TOML parsing error: {}", e)))
    }

    /// 替換環境變數 (例如 ${UBER_ACCESS_TOKEN})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| SquirrelError::config(format!("invalid placeholder pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => escape_toml_basic(&value),
                Err(_) => format!("${{{}}}", var_name),
            }
        });

        Ok(result.to_string())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            access_token: self.ride.access_token.clone(),
            client_id: self.ride.client_id.clone(),
            client_secret: self.ride.client_secret.clone(),
            expires_in_seconds: self.ride.expires_in_seconds,
            grant_type: self.ride.grant_type,
            scopes: self.ride.scopes.clone(),
        }
    }

    pub fn output_path(&self) -> &str {
        &self.output.path
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("ride.base_url", &self.ride.base_url)?;
        validation::validate_url("geocoder.base_url", &self.geocoder.base_url)?;

        validation::validate_secret("ride.access_token", &self.ride.access_token)?;
        validation::validate_secret("ride.client_id", &self.ride.client_id)?;
        validation::validate_secret("ride.client_secret", &self.ride.client_secret)?;
        reject_unresolved_placeholder("ride.access_token", &self.ride.access_token)?;
        reject_unresolved_placeholder("ride.client_id", &self.ride.client_id)?;
        reject_unresolved_placeholder("ride.client_secret", &self.ride.client_secret)?;
        if let Some(api_key) = &self.geocoder.api_key {
            reject_unresolved_placeholder("geocoder.api_key", api_key)?;
        }
        validation::validate_non_empty_string("ride.product_name", &self.ride.product_name)?;
        validation::validate_range(
            "ride.expires_in_seconds",
            self.ride.expires_in_seconds,
            1,
            i64::MAX,
        )?;

        for (field, place) in [("places.start", &self.places.start), ("places.end", &self.places.end)] {
            validation::validate_non_empty_string(&format!("{}.label", field), &place.label)?;
            validation::validate_non_empty_string(&format!("{}.address", field), &place.address)?;
        }

        validation::validate_range("geocoder.timeout_seconds", self.geocoder.timeout_seconds, 1, 300)?;
        validation::validate_path("output.path", &self.output.path)?;

        Ok(())
    }
}

/// Environment values land inside quoted TOML strings and must stay literal there.
fn escape_toml_basic(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_control() => escaped.push_str(&format!("\\u{:04X}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}

/// A `${VAR}` left in place means the variable was not set.
fn reject_unresolved_placeholder(field: &str, value: &str) -> Result<()> {
    if value.starts_with("${") && value.ends_with('}') {
        return Err(SquirrelError::MissingConfigError {
            field: format!("{} (environment variable {} is not set)", field, value),
        });
    }
    Ok(())
}

impl Validate for SquirrelConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
