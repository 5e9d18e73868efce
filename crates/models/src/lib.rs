use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// Settings models

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_crud_base_url")]
    pub crud_base_url: String,
    #[serde(default = "default_forecast_base_url")]
    pub forecast_base_url: String,
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    #[serde(default = "default_currency_options")]
    pub currency_options: Vec<String>,
}

fn default_crud_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_forecast_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_base_currency() -> String {
    "GBP".to_string()
}

fn default_currency_options() -> Vec<String> {
    ["GBP", "USD", "HKD", "JPY", "EUR"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            crud_base_url: default_crud_base_url(),
            forecast_base_url: default_forecast_base_url(),
            base_currency: default_base_currency(),
            currency_options: default_currency_options(),
        }
    }
}

// Bookkeeping records

/// One income or expense entry as returned by the CRUD backend.
///
/// The backend emits loosely typed rows: amounts arrive as numbers or
/// numeric strings, and any field may be absent. Deserialization absorbs
/// all of that instead of failing, so a fetched list never errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Accepts a JSON number or a numeric string; anything else becomes 0.0.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// Which of the two bookkeeping collections a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Income,
    Expense,
}

impl RecordKind {
    pub fn endpoint(&self) -> &'static str {
        match self {
            RecordKind::Income => "income",
            RecordKind::Expense => "expense",
        }
    }
}

// Chart models

/// One Monday-aligned week with its accumulated total. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekBucket {
    pub week_start: NaiveDate,
    pub total: f64,
}

/// A weekly bucket enriched with the trailing 3-week moving average.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub week_start: NaiveDate,
    pub total: f64,
    pub moving_avg: f64,
}

// Forecast models

/// One point of the 7-day rate forecast, labelled dd/mm for the chart axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub label: String,
    pub rate: f64,
}

// Budget models

/// One category's share of a monthly budget, paired with its chart colour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSlice {
    pub category: String,
    pub amount: f64,
    pub color: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount: f64,
}

// Account models

/// Occupational status as a closed set of variants.
///
/// The signup form used to keep this as free text and decide which extra
/// fields to show by substring matching on it. The enum makes the implied
/// fields explicit: study statuses carry a university, employment statuses
/// a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occupation {
    #[serde(rename = "Full Time Employed")]
    FullTimeEmployed,
    #[serde(rename = "Part Time Employed")]
    PartTimeEmployed,
    #[serde(rename = "Full Time Student")]
    FullTimeStudent,
    #[serde(rename = "Part Time Student")]
    PartTimeStudent,
    #[serde(rename = "Full Time Employed and Part Time Student")]
    FullTimeEmployedPartTimeStudent,
    #[serde(rename = "Part Time Employed and Full Time Student")]
    PartTimeEmployedFullTimeStudent,
}

impl Occupation {
    pub const ALL: [Occupation; 6] = [
        Occupation::FullTimeEmployed,
        Occupation::PartTimeEmployed,
        Occupation::FullTimeStudent,
        Occupation::PartTimeStudent,
        Occupation::FullTimeEmployedPartTimeStudent,
        Occupation::PartTimeEmployedFullTimeStudent,
    ];

    /// Whether the status implies a university field on the profile.
    pub fn involves_study(&self) -> bool {
        matches!(
            self,
            Occupation::FullTimeStudent
                | Occupation::PartTimeStudent
                | Occupation::FullTimeEmployedPartTimeStudent
                | Occupation::PartTimeEmployedFullTimeStudent
        )
    }

    /// Whether the status implies a company field on the profile.
    pub fn involves_employment(&self) -> bool {
        matches!(
            self,
            Occupation::FullTimeEmployed
                | Occupation::PartTimeEmployed
                | Occupation::FullTimeEmployedPartTimeStudent
                | Occupation::PartTimeEmployedFullTimeStudent
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Occupation::FullTimeEmployed => "Full Time Employed",
            Occupation::PartTimeEmployed => "Part Time Employed",
            Occupation::FullTimeStudent => "Full Time Student",
            Occupation::PartTimeStudent => "Part Time Student",
            Occupation::FullTimeEmployedPartTimeStudent => {
                "Full Time Employed and Part Time Student"
            }
            Occupation::PartTimeEmployedFullTimeStudent => {
                "Part Time Employed and Full Time Student"
            }
        }
    }
}

/// Payload sent to the signup endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<Occupation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl SignupForm {
    /// Drops optional fields the chosen occupation does not imply, so a
    /// stale university/company value never reaches the backend.
    pub fn normalized(mut self) -> Self {
        match self.occupation {
            Some(occupation) => {
                if !occupation.involves_study() {
                    self.university = None;
                }
                if !occupation.involves_employment() {
                    self.company = None;
                }
            }
            None => {
                self.university = None;
                self.company = None;
            }
        }
        self
    }
}

/// The signed-up account as the backend returns it on login/profile fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub occupation: Option<Occupation>,
    #[serde(default)]
    pub university: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

// Service response shapes

/// Record-list response: `{ success, income: [...] }` or `{ success, expenses: [...] }`.
#[derive(Debug, Deserialize)]
pub struct RecordsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, alias = "income", alias = "expense", alias = "expenses")]
    pub records: Vec<Record>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Plain `{ success, error? }` acknowledgement.
#[derive(Debug, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub user: Option<UserProfile>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Budget endpoint payload; the backend fills `actual` for past months and
/// `estimated` for forecasted ones, so both default to empty.
#[derive(Debug, Default, Deserialize)]
pub struct BudgetResponse {
    #[serde(default)]
    pub actual: Vec<CategoryTotal>,
    #[serde(default)]
    pub estimated: Vec<CategoryTotal>,
}
