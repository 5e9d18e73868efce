//! Blocking HTTP client for the two services the application consumes:
//! the CRUD backend (accounts, income, expenses, budgets) and the
//! currency-forecasting service.
//!
//! The client only moves typed payloads back and forth; all aggregation
//! happens in `chart_engine`/`forecast`/`budget` on the returned data.

use models::{
    Ack, BudgetResponse, LoginResponse, Record, RecordKind, RecordsResponse, Settings,
    SignupForm, UserProfile,
};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {endpoint}")]
    Status { endpoint: String, status: StatusCode },

    #[error("Backend reported failure: {0}")]
    Backend(String),
}

/// Where the two services live. Defaults come from [`Settings`].
#[derive(Debug, Clone)]
pub struct FinanceClientConfig {
    pub crud_base_url: String,
    pub forecast_base_url: String,
}

impl FinanceClientConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            crud_base_url: settings.crud_base_url.clone(),
            forecast_base_url: settings.forecast_base_url.clone(),
        }
    }

    /// Loads config from env vars:
    /// - `FINANCE_CRUD_URL`
    /// - `FINANCE_FORECAST_URL`
    /// falling back to the stock settings defaults.
    pub fn from_env() -> Self {
        let defaults = Settings::default();
        Self {
            crud_base_url: std::env::var("FINANCE_CRUD_URL")
                .unwrap_or(defaults.crud_base_url),
            forecast_base_url: std::env::var("FINANCE_FORECAST_URL")
                .unwrap_or(defaults.forecast_base_url),
        }
    }
}

impl Default for FinanceClientConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Blocking client for the CRUD backend and the forecasting service.
#[derive(Debug, Clone)]
pub struct FinanceClient {
    http: Client,
    crud_base: Url,
    forecast_base: Url,
}

impl FinanceClient {
    pub fn new(config: FinanceClientConfig) -> Result<Self> {
        let crud_base = parse_base_url(&config.crud_base_url)?;
        let forecast_base = parse_base_url(&config.forecast_base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            crud_base,
            forecast_base,
        })
    }

    /// Fetches the full income or expense list for `email`.
    ///
    /// The endpoint is a POST carrying the identity, mirroring how the
    /// backend multiplexes fetch and save on one route.
    pub fn fetch_records(&self, kind: RecordKind, email: &str) -> Result<Vec<Record>> {
        let endpoint = self.crud_endpoint(kind.endpoint())?;
        debug!(endpoint = %endpoint, "fetching records");

        let response = self
            .http
            .post(endpoint.clone())
            .json(&json!({ "email": email }))
            .send()?;
        let response = check_status(&endpoint, response)?;

        let body: RecordsResponse = response.json()?;
        if !body.success {
            let reason = body.error.unwrap_or_else(|| "fetch rejected".to_string());
            warn!(endpoint = %endpoint, %reason, "backend refused record fetch");
            return Err(ClientError::Backend(reason));
        }
        Ok(body.records)
    }

    /// Creates or updates one record. A record carrying an `id` updates
    /// the existing row; without one the backend inserts.
    pub fn save_record(&self, kind: RecordKind, email: &str, record: &Record) -> Result<()> {
        let endpoint = self.crud_endpoint(kind.endpoint())?;
        debug!(endpoint = %endpoint, id = ?record.id, "saving record");

        let mut payload = json!({
            "email": email,
            "amount": record.amount,
            "currency": record.currency,
            "date": record.date,
            "note": record.note,
        });
        if let Some(id) = record.id {
            payload["id"] = json!(id);
        }

        let response = self.http.post(endpoint.clone()).json(&payload).send()?;
        let response = check_status(&endpoint, response)?;

        let ack: Ack = response.json()?;
        if !ack.success {
            let reason = ack.error.unwrap_or_else(|| "save rejected".to_string());
            warn!(endpoint = %endpoint, %reason, "backend refused record save");
            return Err(ClientError::Backend(reason));
        }
        Ok(())
    }

    /// Fetches the per-category budget for one month. Past months fill
    /// `actual`, future months `estimated`.
    pub fn fetch_budget(&self, email: &str, month: u32, year: i32) -> Result<BudgetResponse> {
        let endpoint = self.crud_endpoint("budget")?;
        debug!(endpoint = %endpoint, month, year, "fetching budget");

        let month = month.to_string();
        let year = year.to_string();
        let response = self
            .http
            .get(endpoint.clone())
            .query(&[
                ("email", email),
                ("month", month.as_str()),
                ("year", year.as_str()),
            ])
            .send()?;
        let response = check_status(&endpoint, response)?;

        Ok(response.json()?)
    }

    /// Registers a new account. The form is normalized first so fields the
    /// chosen occupation does not imply never reach the backend.
    pub fn signup(&self, form: SignupForm) -> Result<()> {
        let endpoint = self.crud_endpoint("signup")?;
        debug!(endpoint = %endpoint, "signing up");

        let response = self.http.post(endpoint.clone()).json(&form.normalized()).send()?;
        let response = check_status(&endpoint, response)?;

        let ack: Ack = response.json()?;
        if !ack.success {
            return Err(ClientError::Backend(
                ack.error.unwrap_or_else(|| "signup rejected".to_string()),
            ));
        }
        Ok(())
    }

    /// Fetches the account profile for the signed-in email, as the
    /// profile page does after login. Same `{ success, user, error? }`
    /// shape as the login response.
    pub fn fetch_profile(&self, email: &str) -> Result<UserProfile> {
        let endpoint = self.crud_endpoint("profile")?;
        debug!(endpoint = %endpoint, "fetching profile");

        let response = self
            .http
            .post(endpoint.clone())
            .json(&json!({ "email": email }))
            .send()?;
        let response = check_status(&endpoint, response)?;

        let body: LoginResponse = response.json()?;
        match (body.success, body.user) {
            (true, Some(user)) => Ok(user),
            _ => Err(ClientError::Backend(
                body.error.unwrap_or_else(|| "profile fetch rejected".to_string()),
            )),
        }
    }

    /// Authenticates and returns the account profile on success.
    pub fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
        let endpoint = self.crud_endpoint("login")?;
        debug!(endpoint = %endpoint, "logging in");

        let response = self
            .http
            .post(endpoint.clone())
            .json(&json!({ "email": email, "password": password }))
            .send()?;
        let response = check_status(&endpoint, response)?;

        let body: LoginResponse = response.json()?;
        match (body.success, body.user) {
            (true, Some(user)) => Ok(user),
            _ => Err(ClientError::Backend(
                body.error.unwrap_or_else(|| "login rejected".to_string()),
            )),
        }
    }

    /// Requests the 7-day rate forecast for a currency pair (for example
    /// `GBP_USD`). Returns the raw prediction payload; shaping it for the
    /// chart is `forecast::parse_prediction`'s job.
    pub fn predict(&self, pair: &str) -> Result<Value> {
        let endpoint = join_endpoint(&self.forecast_base, "predict")?;
        debug!(endpoint = %endpoint, pair, "requesting forecast");

        let response = self
            .http
            .post(endpoint.clone())
            .json(&json!({ "currency": pair }))
            .send()?;
        let response = check_status(&endpoint, response)?;

        Ok(response.json()?)
    }

    fn crud_endpoint(&self, path: &str) -> Result<Url> {
        join_endpoint(&self.crud_base, path)
    }
}

/// Parses a base URL, normalizing it to end with a slash so joined
/// endpoint paths extend it instead of replacing its last segment.
fn parse_base_url(raw: &str) -> Result<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    Url::parse(&normalized).map_err(|_| ClientError::InvalidBaseUrl(raw.to_string()))
}

fn join_endpoint(base: &Url, path: &str) -> Result<Url> {
    base.join(path)
        .map_err(|_| ClientError::InvalidBaseUrl(format!("{}{}", base, path)))
}

fn check_status(
    endpoint: &Url,
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response> {
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Status {
            endpoint: endpoint.to_string(),
            status,
        });
    }
    Ok(response)
}
