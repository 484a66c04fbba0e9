// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Audit report returned by `POST /energy-audit/`.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplianceReport {
    pub name: String,
    #[serde(default)]
    pub power_rating: f64,
    #[serde(default)]
    pub usage_time: f64,
    #[serde(default)]
    pub total_energy_consumed: f64,
    #[serde(default)]
    pub total_energy_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompartmentReport {
    pub name: String,
    #[serde(default)]
    pub appliances: Vec<ApplianceReport>,
    #[serde(default)]
    pub total_energy_consumed: f64,
    #[serde(default)]
    pub total_energy_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// The backend reports the score either as a number or as a grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnergyScore {
    Number(f64),
    Text(String),
}

impl fmt::Display for EnergyScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnergyScore::Number(n) if n.fract() == 0.0 => write!(f, "{n:.0}"),
            EnergyScore::Number(n) => write!(f, "{n:.2}"),
            EnergyScore::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub building_type: String,
    pub num_floors: u32,
    #[serde(default)]
    pub compartments: Vec<CompartmentReport>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub total_energy_consumed: f64,
    #[serde(default)]
    pub total_energy_cost: f64,
    #[serde(default)]
    pub energy_consumption_score: Option<EnergyScore>,
}

impl AuditReport {
    /// Compartments that have at least one appliance.
    pub fn detailed_compartments(&self) -> impl Iterator<Item = &CompartmentReport> {
        self.compartments
            .iter()
            .filter(|c| !c.appliances.is_empty())
    }

    /// Plain-text rendering of the report.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Building: {} ({} floor{})\n",
            self.building_type,
            self.num_floors,
            if self.num_floors == 1 { "" } else { "s" }
        ));
        out.push_str(&format!(
            "Total consumption: {}\n",
            format_energy(self.total_energy_consumed)
        ));
        out.push_str(&format!("Total cost: {}\n", format_cost(self.total_energy_cost)));
        if let Some(score) = &self.energy_consumption_score {
            out.push_str(&format!("Energy consumption score: {score}\n"));
        }

        for compartment in self.detailed_compartments() {
            out.push_str(&format!(
                "\n{}: {}, {}\n",
                compartment.name,
                format_energy(compartment.total_energy_consumed),
                format_cost(compartment.total_energy_cost)
            ));
            for appliance in &compartment.appliances {
                out.push_str(&format!(
                    "  - {}: {}, {}\n",
                    appliance.name,
                    format_energy(appliance.total_energy_consumed),
                    format_cost(appliance.total_energy_cost)
                ));
            }
        }

        if !self.recommendations.is_empty() {
            out.push_str("\nRecommendations\n");
            for group in &self.recommendations {
                out.push_str(&format!("{}\n", group.category));
                for item in &group.recommendations {
                    out.push_str(&format!("  * {item}\n"));
                }
            }
        }
        out
    }
}

pub fn format_energy(kwh: f64) -> String {
    format!("{kwh:.2} kWh/day")
}

pub fn format_cost(naira: f64) -> String {
    format!("₦{naira:.2}/day")
}

#[cfg(test)]
pub(crate) fn sample_report() -> AuditReport {
    serde_json::from_value(serde_json::json!({
        "building_type": "Duplex",
        "num_floors": 2,
        "compartments": [
            {
                "name": "Bedroom",
                "total_energy_consumed": 1.8,
                "total_energy_cost": 403.2,
                "appliances": [
                    { "name": "Fan", "power_rating": 75, "usage_time": 8,
                      "total_energy_consumed": 0.6, "total_energy_cost": 134.4 },
                    { "name": "Fan", "power_rating": 75, "usage_time": 8,
                      "total_energy_consumed": 0.6, "total_energy_cost": 134.4 },
                    { "name": "TV", "power_rating": 100, "usage_time": 6,
                      "total_energy_consumed": 0.6, "total_energy_cost": 134.4 }
                ]
            },
            { "name": "Store", "appliances": [] },
            {
                "name": "Kitchen",
                "total_energy_consumed": 4.0,
                "total_energy_cost": 896.0,
                "appliances": [
                    { "name": "Fridge", "power_rating": 200, "usage_time": 20,
                      "total_energy_consumed": 4.0, "total_energy_cost": 896.0 }
                ]
            }
        ],
        "recommendations": [
            { "category": "Cooling", "recommendations": ["Switch fans off when rooms are empty"] }
        ],
        "total_energy_consumed": 5.8,
        "total_energy_cost": 1299.2,
        "energy_consumption_score": 72
    }))
    .unwrap()
}
