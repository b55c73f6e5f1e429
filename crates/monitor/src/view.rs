//! Dashboard view model
//!
//! ## Table of Contents
//! - **DashboardSnapshot**: Payload of `GET /api/dashboard`
//! - **Field**: Every text node of the dashboard page
//! - **DashboardView**: Formatted text per field plus the syngas pie chart

use std::collections::BTreeMap;

use serde::Deserialize;

// =============================================================================
// API Payload
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CsrQuality {
    pub pci: f64,
    pub pcs: f64,
    pub humidity: f64,
    pub granulometry: f64,
    pub cendres: f64,
    pub carbone: f64,
    pub densite: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Reactor {
    pub temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Flow {
    pub debit: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
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

/// Every section is optional: the API leaves out tables without rows.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    #[serde(default)]
    pub csr_quality: Option<CsrQuality>,
    #[serde(default)]
    pub reactor: Option<Reactor>,
    #[serde(default)]
    pub flow: Option<Flow>,
    #[serde(default)]
    pub syngas: Option<Syngas>,
}

// =============================================================================
// Fields
// =============================================================================

pub const PLACEHOLDER: &str = "--";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Pci,
    Pcs,
    Humidity,
    Granulometry,
    Cendres,
    Carbone,
    Densite,
    Temperature,
    Debit,
    H2,
    Co,
    Ch4,
    Co2,
    Tars,
}

impl Field {
    pub const ALL: [Field; 14] = [
        Field::Pci,
        Field::Pcs,
        Field::Humidity,
        Field::Granulometry,
        Field::Cendres,
        Field::Carbone,
        Field::Densite,
        Field::Temperature,
        Field::Debit,
        Field::H2,
        Field::Co,
        Field::Ch4,
        Field::Co2,
        Field::Tars,
    ];

    /// Element id of the text node on the dashboard page.
    pub fn element_id(self) -> &'static str {
        match self {
            Field::Pci => "pci-value",
            Field::Pcs => "pcs-value",
            Field::Humidity => "humidity-value",
            Field::Granulometry => "granulometry-value",
            Field::Cendres => "cendres-value",
            Field::Carbone => "carbone-value",
            Field::Densite => "densite-value",
            Field::Temperature => "temperature-value",
            Field::Debit => "debit-value",
            Field::H2 => "h2-value",
            Field::Co => "co-value",
            Field::Ch4 => "ch4-value",
            Field::Co2 => "co2-value",
            Field::Tars => "tars-value",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Pci => "PCI",
            Field::Pcs => "PCS",
            Field::Humidity => "Humidity",
            Field::Granulometry => "Granulometry",
            Field::Cendres => "Ash",
            Field::Carbone => "Carbon",
            Field::Densite => "Density",
            Field::Temperature => "Reactor",
            Field::Debit => "Flow",
            Field::H2 => "H2",
            Field::Co => "CO",
            Field::Ch4 => "CH4",
            Field::Co2 => "CO2",
            Field::Tars => "Tars",
        }
    }
}

/// Display text for one value, with its unit.
pub fn format_field(field: Field, value: f64) -> String {
    match field {
        Field::Pci | Field::Pcs => format!("{value:.1} MJ/kg"),
        Field::Humidity | Field::Cendres | Field::Carbone => format!("{value:.1} %"),
        Field::Granulometry => format!("{value:.0} mm"),
        Field::Densite => format!("{value:.2} t/m³"),
        Field::Temperature => format!("{value:.0} °C"),
        Field::Debit => format!("{value:.1} t/h"),
        Field::H2 | Field::Co | Field::Ch4 | Field::Co2 => format!("{value:.1} %"),
        Field::Tars => format!("{value:.1} g/Nm³"),
    }
}

// =============================================================================
// View
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: &'static str,
    pub value: f64,
    /// Share of the chart (%)
    pub share: f64,
}

/// Syngas composition chart: H2, CO, CH4 and CO2.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PieChart {
    pub slices: Vec<PieSlice>,
}

impl PieChart {
    pub fn from_syngas(syngas: &Syngas) -> Self {
        let values = [
            ("H2", syngas.h2),
            ("CO", syngas.co),
            ("CH4", syngas.ch4),
            ("CO2", syngas.co2),
        ];
        let sum: f64 = values.iter().map(|(_, v)| v.max(0.0)).sum();

        let slices = values
            .into_iter()
            .map(|(label, value)| PieSlice {
                label,
                value,
                share: if sum > 0.0 {
                    value.max(0.0) * 100.0 / sum
                } else {
                    0.0
                },
            })
            .collect();

        Self { slices }
    }
}

/// What the dashboard page currently shows.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    texts: BTreeMap<Field, String>,
    chart: PieChart,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self {
            texts: Field::ALL
                .iter()
                .map(|&f| (f, PLACEHOLDER.to_string()))
                .collect(),
            chart: PieChart::default(),
        }
    }
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self, field: Field) -> &str {
        self.texts.get(&field).map(String::as_str).unwrap_or(PLACEHOLDER)
    }

    pub fn chart(&self) -> &PieChart {
        &self.chart
    }

    /// Write every value present in `snapshot`; absent sections keep their text.
    pub fn apply(&mut self, snapshot: &DashboardSnapshot) {
        if let Some(q) = &snapshot.csr_quality {
            self.set(Field::Pci, q.pci);
            self.set(Field::Pcs, q.pcs);
            self.set(Field::Humidity, q.humidity);
            self.set(Field::Granulometry, q.granulometry);
            self.set(Field::Cendres, q.cendres);
            self.set(Field::Carbone, q.carbone);
            self.set(Field::Densite, q.densite);
        }
        if let Some(r) = &snapshot.reactor {
            self.set(Field::Temperature, r.temperature);
        }
        if let Some(f) = &snapshot.flow {
            self.set(Field::Debit, f.debit);
        }
        if let Some(s) = &snapshot.syngas {
            self.set(Field::H2, s.h2);
            self.set(Field::Co, s.co);
            self.set(Field::Ch4, s.ch4);
            self.set(Field::Co2, s.co2);
            self.set(Field::Tars, s.tars);
            self.chart = PieChart::from_syngas(s);
        }
    }

    /// One-line rendering for logs.
    pub fn summary_line(&self) -> String {
        Field::ALL
            .iter()
            .map(|&f| format!("{} {}", f.label(), self.text(f)))
            .collect::<Vec<_>>()
            .join(" | ")
    }

    fn set(&mut self, field: Field, value: f64) {
        self.texts.insert(field, format_field(field, value));
    }
}
