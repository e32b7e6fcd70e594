//! Simulated ESG telemetry.
//!
//! Generates sensor-style environment, social and governance figures. The
//! `notary-cli simulate` command serializes each reading to JSON and uploads
//! it, so the document's content hash lands on the ledger.

use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use serde::Serialize;

/// One ESG reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EsgReading {
    // Environment
    /// Tonnes of CO2.
    pub carbon_emission: f64,
    /// kWh.
    pub electricity_usage: f64,
    /// Cubic metres.
    pub water_usage: f64,
    /// Percent.
    pub renewable_ratio: f64,

    // Social
    /// Percent of compliant working hours.
    pub compliance_rate: f64,
    pub incidents: u32,
    pub employee_satisfaction: f64,

    // Governance
    /// Percent.
    pub board_attendance: f64,
    pub transparency_score: f64,
    pub compliance_issues: u32,

    #[serde(serialize_with = "rfc3339_millis")]
    pub timestamp: DateTime<Utc>,
}

fn rfc3339_millis<S: serde::Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn round(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

impl EsgReading {
    /// Draw a reading from `rng`, stamped with `timestamp`.
    pub fn generate<R: Rng>(rng: &mut R, timestamp: DateTime<Utc>) -> Self {
        Self {
            carbon_emission: round(rng.gen_range(0.0..100.0), 2),
            electricity_usage: round(rng.gen_range(0.0..500.0), 1),
            water_usage: round(rng.gen_range(0.0..200.0), 1),
            renewable_ratio: round(rng.gen_range(0.0..100.0), 1),
            compliance_rate: round(rng.gen_range(90.0..100.0), 1),
            incidents: rng.gen_range(0..5),
            employee_satisfaction: round(rng.gen_range(50.0..100.0), 1),
            board_attendance: round(rng.gen_range(70.0..100.0), 1),
            transparency_score: round(rng.gen_range(50.0..100.0), 1),
            compliance_issues: rng.gen_range(0..3),
            timestamp,
        }
    }

    /// A reading from the thread RNG at the current time.
    pub fn sample() -> Self {
        Self::generate(&mut rand::thread_rng(), Utc::now())
    }

    /// Compact JSON document that gets uploaded and hashed.
    pub fn to_document(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
