// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Energy Audit
//!
//! - [`draft`]: building, compartment and appliance input, turned into the
//!   `POST /energy-audit/` body
//! - [`report`]: the backend's response and its text rendering
//! - [`chart`]: pie and stacked-bar series for the report

pub mod chart;
pub mod draft;
pub mod report;

pub use chart::{appliance_rows, compartment_shares, series_keys, BarRow, ChartData, PieSlice};
pub use draft::{Appliance, ApplianceInput, AuditDraft, AuditRequest, Compartment, DraftError};
pub use report::{format_cost, format_energy, AuditReport, EnergyScore, Recommendation};
