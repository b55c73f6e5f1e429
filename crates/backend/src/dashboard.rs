// =============================================================================
// CSR Backend - Dashboard API
// =============================================================================
// GET /api/dashboard returns the latest row of each reading table. A section
// whose table is empty is left out of the JSON object entirely.
// =============================================================================

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::db::{CsrQualityRow, FlowRow, ReactorRow, SyngasRow};
use crate::error::AppError;
use crate::AppState;

// =============================================================================
// Response Types
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrQuality {
    pub pci: f64,
    pub pcs: f64,
    pub humidity: f64,
    pub granulometry: f64,
    pub cendres: f64,
    pub carbone: f64,
    pub densite: f64,
}

impl From<CsrQualityRow> for CsrQuality {
    fn from(row: CsrQualityRow) -> Self {
        Self {
            pci: row.pci,
            pcs: row.pcs,
            humidity: row.humidity,
            granulometry: row.granulometry,
            cendres: row.cendres,
            carbone: row.carbone,
            densite: row.densite,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reactor {
    pub temperature: f64,
}

impl From<ReactorRow> for Reactor {
    fn from(row: ReactorRow) -> Self {
        Self {
            temperature: row.temperature,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub debit: f64,
}

impl From<FlowRow> for Flow {
    fn from(row: FlowRow) -> Self {
        Self { debit: row.debit }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Syngas {
    #[serde(rename = "H2")]
    pub h2: f64,
    #[serde(rename = "CO")]
    pub co: f64,
    #[serde(rename = "CH4")]
    pub ch4: f64,
    #[serde(rename = "CO2")]
    pub co2: f64,
    pub tars: f64,
}

impl From<SyngasRow> for Syngas {
    fn from(row: SyngasRow) -> Self {
        Self {
            h2: row.h2,
            co: row.co,
            ch4: row.ch4,
            co2: row.co2,
            tars: row.tars,
        }
    }
}

/// Body of `GET /api/dashboard`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csr_quality: Option<CsrQuality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reactor: Option<Reactor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<Flow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syngas: Option<Syngas>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Latest reading of every table, assembled into one object.
pub async fn get_dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, AppError> {
    let db = &state.db;

    let response = DashboardResponse {
        csr_quality: db.latest_quality().await?.map(Into::into),
        reactor: db.latest_reactor().await?.map(Into::into),
        flow: db.latest_flow().await?.map(Into::into),
        syngas: db.latest_syngas().await?.map(Into::into),
    };

    tracing::debug!(
        quality = response.csr_quality.is_some(),
        reactor = response.reactor.is_some(),
        flow = response.flow.is_some(),
        syngas = response.syngas.is_some(),
        "Dashboard snapshot assembled"
    );

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_sections_are_omitted() {
        let body = serde_json::to_value(DashboardResponse::default()).unwrap();
        assert_eq!(body, json!({}));
    }

    #[test]
    fn test_syngas_uses_chemical_keys() {
        let response = DashboardResponse {
            syngas: Some(Syngas {
                h2: 41.0,
                co: 32.0,
                ch4: 8.0,
                co2: 14.0,
                tars: 0.6,
            }),
            ..Default::default()
        };

        let body = serde_json::to_value(response).unwrap();
        assert_eq!(
            body,
            json!({ "syngas": { "H2": 41.0, "CO": 32.0, "CH4": 8.0, "CO2": 14.0, "tars": 0.6 } })
        );
    }
}
