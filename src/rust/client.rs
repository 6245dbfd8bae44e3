//! Small HTTP client for a running prediction server, plus the end-to-end
//! smoke check behind `somnia check`.

use std::fmt;

use log::{debug, info, warn};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::api::{BatchResponse, ErrorResponse, ExampleResponse, HealthResponse, OptionsResponse, PredictionResponse};
use crate::classifier::PredictionRequest;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server answered {status}: {detail}")]
    Status { status: StatusCode, detail: String },
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let text = response.text().await?;
        let detail = serde_json::from_str::<ErrorResponse>(&text)
            .map(|body| body.detail)
            .unwrap_or(text);
        Err(ClientError::Status { status, detail })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.http.get(self.url(path)).send().await?;
        Self::decode(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Self::decode(response).await
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.get("/").await
    }

    pub async fn options(&self) -> Result<OptionsResponse, ClientError> {
        self.get("/api/options").await
    }

    pub async fn example(&self) -> Result<ExampleResponse, ClientError> {
        self.get("/api/example").await
    }

    pub async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse, ClientError> {
        self.post("/api/predict", request).await
    }

    pub async fn predict_batch<B: Serialize + ?Sized>(&self, requests: &B) -> Result<BatchResponse, ClientError> {
        self.post("/api/predict/batch", requests).await
    }

    /// Posts arbitrary JSON and returns the status with the raw body, so
    /// rejected requests can be inspected.
    pub async fn post_raw(&self, path: &str, body: &Value) -> Result<(StatusCode, Value), ClientError> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        let status = response.status();
        let body = response.json().await.unwrap_or(Value::Null);
        Ok((status, body))
    }

    /// Exercises every endpoint of a running server and reports each step.
    pub async fn smoke_check(&self) -> CheckReport {
        let mut report = CheckReport::default();
        info!("Checking prediction API at {}", self.base_url);

        match self.health().await {
            Ok(health) if health.model_loaded => report.pass("health", format!("version {}", health.version)),
            Ok(_) => report.fail("health", "API is running but the model is not loaded"),
            Err(e) => report.fail("health", e.to_string()),
        }

        let options = match self.options().await {
            Ok(options) => {
                report.pass(
                    "options",
                    format!(
                        "{} genders, {} occupations, {} BMI categories",
                        options.gender.len(),
                        options.occupation.len(),
                        options.bmi_category.len()
                    ),
                );
                Some(options)
            }
            Err(e) => {
                report.fail("options", e.to_string());
                None
            }
        };

        let Some(options) = options else {
            warn!("Skipping prediction checks without options");
            return report;
        };

        let typical = typical_request(&options);
        match self.predict(&typical).await {
            Ok(r) => report.pass("predict", format!("{} ({:?}%)", r.prediction, r.confidence)),
            Err(e) => report.fail("predict", e.to_string()),
        }

        let high_risk = high_risk_request(&options);
        match self.predict(&high_risk).await {
            Ok(r) => report.pass("predict high risk", format!("{} ({:?}%)", r.prediction, r.confidence)),
            Err(e) => report.fail("predict high risk", e.to_string()),
        }

        let mut invalid = serde_json::to_value(&typical).unwrap_or(Value::Null);
        invalid["age"] = Value::from(5);
        match self.post_raw("/api/predict", &invalid).await {
            Ok((status, _)) if status.is_client_error() => report.pass("reject invalid", status.to_string()),
            Ok((status, _)) => report.fail("reject invalid", format!("expected a 4xx status, got {}", status)),
            Err(e) => report.fail("reject invalid", e.to_string()),
        }

        match self.predict_batch(&[typical, high_risk]).await {
            Ok(batch) if batch.total == 2 && batch.predictions.iter().all(|p| p.success) => {
                report.pass("batch", format!("{} predictions", batch.total))
            }
            Ok(batch) => report.fail("batch", format!("unexpected batch result {:?}", batch.predictions)),
            Err(e) => report.fail("batch", e.to_string()),
        }

        report
    }
}

fn pick(values: &[String], preferred: &str) -> String {
    values
        .iter()
        .find(|v| v.as_str() == preferred)
        .or_else(|| values.first())
        .cloned()
        .unwrap_or_else(|| preferred.to_string())
}

fn typical_request(options: &OptionsResponse) -> PredictionRequest {
    PredictionRequest {
        gender: "Male".to_string(),
        age: 30,
        occupation: pick(&options.occupation, "Software Engineer"),
        sleep_duration: 7.5,
        quality_of_sleep: 8,
        physical_activity_level: 6,
        stress_level: 5,
        bmi_category: pick(&options.bmi_category, "Normal"),
        heart_rate: 75,
        daily_steps: 8000,
        systolic_bp: 120,
        diastolic_bp: 80,
    }
}

fn high_risk_request(options: &OptionsResponse) -> PredictionRequest {
    PredictionRequest {
        gender: "Female".to_string(),
        age: 45,
        occupation: pick(&options.occupation, "Nurse"),
        sleep_duration: 5.0,
        quality_of_sleep: 4,
        physical_activity_level: 3,
        stress_level: 9,
        bmi_category: pick(&options.bmi_category, "Overweight"),
        heart_rate: 90,
        daily_steps: 3000,
        systolic_bp: 140,
        diastolic_bp: 95,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckStep {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

/// Outcome of [`ApiClient::smoke_check`].
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub steps: Vec<CheckStep>,
}

impl CheckReport {
    fn record(&mut self, name: &'static str, passed: bool, detail: impl Into<String>) {
        let detail = detail.into();
        debug!("{}: {} ({})", name, if passed { "ok" } else { "failed" }, detail);
        self.steps.push(CheckStep { name, passed, detail });
    }

    fn pass(&mut self, name: &'static str, detail: impl Into<String>) {
        self.record(name, true, detail);
    }

    fn fail(&mut self, name: &'static str, detail: impl Into<String>) {
        self.record(name, false, detail);
    }

    pub fn all_passed(&self) -> bool {
        !self.steps.is_empty() && self.steps.iter().all(|s| s.passed)
    }

    pub fn step(&self, name: &str) -> Option<&CheckStep> {
        self.steps.iter().find(|s| s.name == name)
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            let mark = if step.passed { "PASSED" } else { "FAILED" };
            writeln!(f, "{:<18} {}  {}", step.name, mark, step.detail)?;
        }
        Ok(())
    }
}
