// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Audit input being assembled by the user.

use serde::{Deserialize, Serialize};

use crate::auth::UserId;

const DEFAULT_COMPARTMENT: &str = "Bedroom";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DraftError {
    #[error("Please select a building type and number of floors.")]
    MissingBuildingDetails,

    #[error("Please fill in all required fields and add at least one compartment with an appliance.")]
    Incomplete,

    #[error("Number of floors must be a whole number, got {0:?}")]
    InvalidFloors(String),

    #[error("Appliance name, power rating and usage time are required.")]
    IncompleteAppliance,

    #[error("{field} must be a number, got {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("No compartment at position {0}")]
    NoSuchCompartment(usize),

    #[error("No appliance at position {appliance} in compartment {compartment}")]
    NoSuchAppliance { compartment: usize, appliance: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appliance {
    pub name: String,
    /// Watts
    pub power_rating: f64,
    /// Hours per day
    pub usage_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compartment {
    pub name: String,
    #[serde(default)]
    pub appliances: Vec<Appliance>,
}

impl Compartment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            appliances: Vec::new(),
        }
    }
}

/// Appliance fields as typed into the form.
#[derive(Debug, Clone, Default)]
pub struct ApplianceInput {
    pub name: String,
    pub power_rating: String,
    pub usage_time: String,
}

impl ApplianceInput {
    pub fn new(
        name: impl Into<String>,
        power_rating: impl Into<String>,
        usage_time: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            power_rating: power_rating.into(),
            usage_time: usage_time.into(),
        }
    }

    fn parse(&self) -> Result<Appliance, DraftError> {
        let name = self.name.trim();
        let power = self.power_rating.trim();
        let usage = self.usage_time.trim();
        if name.is_empty() || power.is_empty() || usage.is_empty() {
            return Err(DraftError::IncompleteAppliance);
        }
        Ok(Appliance {
            name: name.to_string(),
            power_rating: parse_number("power_rating", power)?,
            usage_time: parse_number("usage_time", usage)?,
        })
    }
}

fn parse_number(field: &'static str, value: &str) -> Result<f64, DraftError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DraftError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

/// Body of `POST /energy-audit/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRequest {
    pub user: UserId,
    pub building_type: String,
    pub num_floors: u32,
    pub compartments: Vec<Compartment>,
}

/// Building and appliance data collected before requesting a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditDraft {
    #[serde(default)]
    pub building_type: String,
    #[serde(default)]
    pub floors: Option<u32>,
    #[serde(default)]
    pub compartments: Vec<Compartment>,
}

impl Default for AuditDraft {
    fn default() -> Self {
        Self {
            building_type: String::new(),
            floors: None,
            compartments: vec![Compartment::new(DEFAULT_COMPARTMENT)],
        }
    }
}

impl AuditDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_building_type(&mut self, building_type: impl Into<String>) {
        self.building_type = building_type.into();
    }

    /// Set the number of floors from form input.
    pub fn set_floors(&mut self, raw: &str) -> Result<(), DraftError> {
        let floors = raw
            .trim()
            .parse::<u32>()
            .map_err(|_| DraftError::InvalidFloors(raw.to_string()))?;
        self.floors = Some(floors);
        Ok(())
    }

    /// Add a compartment. Blank names are ignored; returns whether one was added.
    pub fn add_compartment(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.compartments.push(Compartment::new(name));
        true
    }

    pub fn remove_compartment(&mut self, index: usize) -> Result<Compartment, DraftError> {
        if index >= self.compartments.len() {
            return Err(DraftError::NoSuchCompartment(index));
        }
        Ok(self.compartments.remove(index))
    }

    pub fn add_appliance(
        &mut self,
        compartment: usize,
        input: &ApplianceInput,
    ) -> Result<(), DraftError> {
        let appliance = input.parse()?;
        self.compartment_mut(compartment)?.appliances.push(appliance);
        Ok(())
    }

    pub fn update_appliance(
        &mut self,
        compartment: usize,
        appliance: usize,
        input: &ApplianceInput,
    ) -> Result<(), DraftError> {
        let parsed = input.parse()?;
        *self.appliance_mut(compartment, appliance)? = parsed;
        Ok(())
    }

    pub fn remove_appliance(
        &mut self,
        compartment: usize,
        appliance: usize,
    ) -> Result<Appliance, DraftError> {
        self.appliance_mut(compartment, appliance)?;
        Ok(self.compartments[compartment].appliances.remove(appliance))
    }

    /// Whether the building details page is filled in.
    pub fn can_advance(&self) -> bool {
        !self.building_type.trim().is_empty() && self.floors.is_some()
    }

    /// Whether the draft can be submitted.
    pub fn is_complete(&self) -> bool {
        self.can_advance() && self.compartments.iter().any(|c| !c.appliances.is_empty())
    }

    /// Request body for `user`.
    pub fn to_request(&self, user: UserId) -> Result<AuditRequest, DraftError> {
        let num_floors = match self.floors {
            Some(floors) if self.can_advance() => floors,
            _ => return Err(DraftError::MissingBuildingDetails),
        };
        if !self.is_complete() {
            return Err(DraftError::Incomplete);
        }
        Ok(AuditRequest {
            user,
            building_type: self.building_type.trim().to_string(),
            num_floors,
            compartments: self.compartments.clone(),
        })
    }

    fn compartment_mut(&mut self, index: usize) -> Result<&mut Compartment, DraftError> {
        self.compartments
            .get_mut(index)
            .ok_or(DraftError::NoSuchCompartment(index))
    }

    fn appliance_mut(
        &mut self,
        compartment: usize,
        appliance: usize,
    ) -> Result<&mut Appliance, DraftError> {
        self.compartment_mut(compartment)?
            .appliances
            .get_mut(appliance)
            .ok_or(DraftError::NoSuchAppliance {
                compartment,
                appliance,
            })
    }
}
