// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chart series derived from an [`AuditReport`].
//!
//! Rows serialize as flat objects (`{"name": "Bedroom", "Fan": 0.6, ...}`),
//! the shape stacked-bar renderers expect.

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::report::AuditReport;

pub const PALETTE: [&str; 20] = [
    "#003f5c", "#ffa600", "#2f4b7c", "#FFBB28", "#665191", "#82CA9D", "#a05195", "#FFCE56",
    "#d45087", "#36A2EB", "#f95d6a", "#4BC0C0", "#ff7c43", "#FF8042", "#0088FE", "#FF9F40",
    "#8884D8", "#9966FF", "#FF6384", "#00C49F",
];

/// Row label key; appliance keys never use it.
const LABEL_KEY: &str = "name";

pub fn color_for(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PieSlice {
    pub name: String,
    pub value: f64,
    pub color: &'static str,
}

/// One stacked bar: a compartment and the consumption of each appliance in it.
#[derive(Debug, Clone, PartialEq)]
pub struct BarRow {
    pub name: String,
    pub series: Vec<(String, f64)>,
}

impl BarRow {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.series.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    fn key_taken(&self, key: &str) -> bool {
        key == LABEL_KEY || self.series.iter().any(|(k, _)| k == key)
    }

    /// `name`, or `name N` with the smallest N >= 2 not already in the row.
    fn unique_key(&self, name: &str) -> String {
        if !self.key_taken(name) {
            return name.to_string();
        }
        (2..)
            .map(|n| format!("{name} {n}"))
            .find(|candidate| !self.key_taken(candidate))
            .unwrap_or_else(|| name.to_string())
    }
}

impl Serialize for BarRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.series.len() + 1))?;
        map.serialize_entry(LABEL_KEY, &self.name)?;
        for (key, value) in &self.series {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SeriesKey {
    pub key: String,
    pub color: &'static str,
}

/// Everything needed to draw both report charts.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ChartData {
    pub shares: Vec<PieSlice>,
    pub rows: Vec<BarRow>,
    pub series: Vec<SeriesKey>,
}

impl ChartData {
    pub fn from_report(report: &AuditReport) -> Self {
        let rows = appliance_rows(report);
        let series = series_keys(&rows)
            .into_iter()
            .enumerate()
            .map(|(i, key)| SeriesKey {
                key,
                color: color_for(i),
            })
            .collect();
        Self {
            shares: compartment_shares(report),
            rows,
            series,
        }
    }
}

/// Consumption share of each compartment.
pub fn compartment_shares(report: &AuditReport) -> Vec<PieSlice> {
    report
        .compartments
        .iter()
        .enumerate()
        .map(|(i, c)| PieSlice {
            name: c.name.clone(),
            value: c.total_energy_consumed,
            color: color_for(i),
        })
        .collect()
}

pub fn appliance_rows(report: &AuditReport) -> Vec<BarRow> {
    report
        .compartments
        .iter()
        .map(|compartment| {
            let mut row = BarRow {
                name: compartment.name.clone(),
                series: Vec::with_capacity(compartment.appliances.len()),
            };
            for appliance in &compartment.appliances {
                let key = row.unique_key(&appliance.name);
                row.series.push((key, appliance.total_energy_consumed));
            }
            row
        })
        .collect()
}

/// Distinct series keys across `rows`, in first-seen order.
pub fn series_keys(rows: &[BarRow]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for (key, _) in rows.iter().flat_map(|row| &row.series) {
        if !keys.contains(key) {
            keys.push(key.clone());
        }
    }
    keys
}
