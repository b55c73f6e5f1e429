//! Static material lookup table
//!
//! Every object spawned on the belt carries one of these entries. The
//! accept/reject verdict is a property of the material, never computed.

use rand::Rng;
use serde::Serialize;

/// Whether a material belongs in the recovered-fuel stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accept,
    Reject,
}

/// One row of the lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Material {
    pub name: &'static str,
    /// Display color (CSS hex)
    pub color: &'static str,
    pub verdict: Verdict,
    /// Nominal detection confidence (%)
    pub confidence: f64,
    /// Nominal lower calorific value (MJ/kg)
    pub calorific_value: f64,
    /// Nominal chlorine content (% mass)
    pub chlorine: f64,
}

pub const MATERIALS: [Material; 8] = [
    Material {
        name: "Paper",
        color: "#f5f0e1",
        verdict: Verdict::Accept,
        confidence: 96.5,
        calorific_value: 14.0,
        chlorine: 0.1,
    },
    Material {
        name: "Cardboard",
        color: "#c19a6b",
        verdict: Verdict::Accept,
        confidence: 97.1,
        calorific_value: 15.5,
        chlorine: 0.1,
    },
    Material {
        name: "Wood",
        color: "#8b5a2b",
        verdict: Verdict::Accept,
        confidence: 98.0,
        calorific_value: 16.8,
        chlorine: 0.05,
    },
    Material {
        name: "Plastic PE/PP",
        color: "#4fa3e0",
        verdict: Verdict::Accept,
        confidence: 95.4,
        calorific_value: 38.0,
        chlorine: 0.2,
    },
    Material {
        name: "Textile",
        color: "#b36bd6",
        verdict: Verdict::Accept,
        confidence: 93.2,
        calorific_value: 18.5,
        chlorine: 0.3,
    },
    Material {
        name: "PVC",
        color: "#e04f4f",
        verdict: Verdict::Reject,
        confidence: 98.6,
        calorific_value: 18.0,
        chlorine: 45.0,
    },
    Material {
        name: "Metal",
        color: "#9ea7ad",
        verdict: Verdict::Reject,
        confidence: 99.4,
        calorific_value: 0.0,
        chlorine: 0.0,
    },
    Material {
        name: "Rubber",
        color: "#2f2f2f",
        verdict: Verdict::Reject,
        confidence: 94.7,
        calorific_value: 30.0,
        chlorine: 0.6,
    },
];

impl Material {
    /// Look up a material by exact name.
    pub fn by_name(name: &str) -> Option<&'static Material> {
        MATERIALS.iter().find(|m| m.name == name)
    }

    /// Uniform pseudo-random pick from the table.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> &'static Material {
        &MATERIALS[rng.gen_range(0..MATERIALS.len())]
    }

    pub fn is_accepted(&self) -> bool {
        self.verdict == Verdict::Accept
    }
}

/// Verdict for a material name, `None` if the name is not in the table.
pub fn verdict_for(name: &str) -> Option<Verdict> {
    Material::by_name(name).map(|m| m.verdict)
}
