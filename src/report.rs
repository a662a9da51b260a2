//! Per-species yield tables and the run report built from them.
//!
//! A table has one row per tree id and one column per simulated year
//! (labelled `Year {n}`), followed by a `Total` column holding each row's
//! sum.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::allocation::OrchardAllocation;
use crate::error::{OrchardError, Result};
use crate::population::TreeRecord;
use crate::species::{Species, SpeciesParams};

pub const TOTAL_COLUMN: &str = "Total";

pub fn year_label(year: u32) -> String {
    format!("Year {year}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YieldTable {
    species: Species,
    years: Vec<u32>,
    // rows[tree][column]
    rows: Vec<Vec<u64>>,
}

impl YieldTable {
    pub fn new(species: Species, tree_count: usize) -> Self {
        Self {
            species,
            years: Vec::new(),
            rows: vec![Vec::new(); tree_count],
        }
    }

    /// Append the batch generated for `year` as a new column.
    pub fn record_year(&mut self, year: u32, batch: &[TreeRecord]) -> Result<()> {
        if batch.len() != self.rows.len() {
            return Err(OrchardError::InvalidParameter(format!(
                "{} batch for {} has {} trees, table has {}",
                self.species,
                year_label(year),
                batch.len(),
                self.rows.len()
            )));
        }
        if self.years.contains(&year) {
            return Err(OrchardError::InvalidParameter(format!(
                "{} already recorded for {}",
                year_label(year),
                self.species
            )));
        }

        let mut column = Vec::with_capacity(batch.len());
        for (expected_id, tree) in batch.iter().enumerate() {
            match tree.fruits() {
                Some(fruits) if tree.id() == expected_id => column.push(fruits),
                Some(_) => {
                    return Err(OrchardError::InvalidParameter(format!(
                        "tree id {} out of order, expected {expected_id}",
                        tree.id()
                    )))
                }
                None => {
                    return Err(OrchardError::InvalidParameter(format!(
                        "tree {} has no fruit count",
                        tree.id()
                    )))
                }
            }
        }
        for (row, fruits) in self.rows.iter_mut().zip(column) {
            row.push(fruits);
        }
        self.years.push(year);
        Ok(())
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn years(&self) -> &[u32] {
        &self.years
    }

    pub fn tree_count(&self) -> usize {
        self.rows.len()
    }

    /// Year labels followed by the total column.
    pub fn columns(&self) -> Vec<String> {
        self.years
            .iter()
            .map(|&year| year_label(year))
            .chain(std::iter::once(TOTAL_COLUMN.to_string()))
            .collect()
    }

    pub fn value(&self, tree: usize, year: u32) -> Option<u64> {
        let column = self.years.iter().position(|&y| y == year)?;
        self.rows.get(tree)?.get(column).copied()
    }

    pub fn row(&self, tree: usize) -> Option<&[u64]> {
        self.rows.get(tree).map(Vec::as_slice)
    }

    pub fn row_total(&self, tree: usize) -> Option<u64> {
        self.rows.get(tree).map(|row| row.iter().sum())
    }

    pub fn year_total(&self, year: u32) -> Option<u64> {
        let column = self.years.iter().position(|&y| y == year)?;
        Some(self.rows.iter().map(|row| row[column]).sum())
    }

    pub fn grand_total(&self) -> u64 {
        self.rows.iter().flatten().sum()
    }

    fn view(&self) -> TableView<'_> {
        TableView {
            species: self.species,
            columns: self.columns(),
            rows: self
                .rows
                .iter()
                .enumerate()
                .map(|(tree, values)| RowView {
                    tree,
                    values,
                    total: values.iter().sum(),
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct TableView<'a> {
    species: Species,
    columns: Vec<String>,
    rows: Vec<RowView<'a>>,
}

#[derive(Serialize)]
struct RowView<'a> {
    tree: usize,
    values: &'a [u64],
    total: u64,
}

impl Serialize for YieldTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.view().serialize(serializer)
    }
}

impl fmt::Display for YieldTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self.columns();
        let widths: Vec<usize> = columns.iter().map(|c| c.len().max(6)).collect();
        let id_width = self.rows.len().to_string().len().max(4);

        write!(f, "{:>id_width$}", "tree")?;
        for (column, width) in columns.iter().zip(widths.iter().copied()) {
            write!(f, "  {column:>width$}")?;
        }
        writeln!(f)?;

        for (tree, row) in self.rows.iter().enumerate() {
            write!(f, "{tree:>id_width$}")?;
            let total: u64 = row.iter().sum();
            for (value, width) in row
                .iter()
                .chain(std::iter::once(&total))
                .zip(widths.iter().copied())
            {
                write!(f, "  {value:>width$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Values sampled once per species for a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesSummary {
    pub species: Species,
    pub maturation_threshold: f64,
    pub disease_onset_year: u32,
    pub disease_severity: f64,
    pub form_angle_deg: f64,
}

impl From<&SpeciesParams> for SpeciesSummary {
    fn from(params: &SpeciesParams) -> Self {
        Self {
            species: params.species,
            maturation_threshold: params.maturation_threshold,
            disease_onset_year: params.disease_onset_year,
            disease_severity: params.disease_severity,
            form_angle_deg: params.form_angle_deg,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrchardReport {
    pub scenario: String,
    pub seed: u64,
    pub horizon_years: u32,
    pub allocation: OrchardAllocation,
    pub species: Vec<SpeciesSummary>,
    pub tables: Vec<YieldTable>,
}

impl OrchardReport {
    pub fn table(&self, species: Species) -> Option<&YieldTable> {
        self.tables.iter().find(|table| table.species() == species)
    }

    pub fn total_fruit(&self) -> u64 {
        self.tables.iter().map(YieldTable::grand_total).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for OrchardReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Scenario '{}' (seed {}, {} years)",
            self.scenario, self.seed, self.horizon_years
        )?;
        for summary in &self.species {
            let species = summary.species;
            writeln!(
                f,
                "  {species:<5} land {:>3}%  trees {:>3}  matures at {:.2} years",
                self.allocation.land_percent[species],
                self.allocation.tree_counts[species],
                summary.maturation_threshold,
            )?;
        }
        for table in &self.tables {
            writeln!(f)?;
            writeln!(
                f,
                "{} yield ({} fruits in total)",
                table.species(),
                table.grand_total()
            )?;
            write!(f, "{table}")?;
        }
        Ok(())
    }
}
