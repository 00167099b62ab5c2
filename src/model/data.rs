//! Problem data: species, beds, and the crop needs to place.
//!
//! All input files are ';'-separated CSV with '#' comment lines and a single
//! header line. The needs file expands its `quantity` column into one need
//! per unit; the units of a row form a duplicate group.

use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

use crate::containers::HashMap;

/// Index of a species in the interaction matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpeciesId(pub u32);

/// Index of an interned botanical family name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FamilyId(pub u32);

/// A single crop unit to assign to a bed over a fixed period of weeks.
#[derive(Clone, Debug)]
pub struct Need {
    pub species: SpeciesId,
    /// First cultivation week (inclusive).
    pub begin: i32,
    /// Last cultivation week (inclusive).
    pub end: i32,
    pub family: FamilyId,
    pub return_delay_years: i32,
    pub forbidden_beds: Vec<i32>,
    /// When given, the need is pinned to this bed.
    pub fixed_bed: Option<i32>,
}

/// How rotation delays between disjoint needs are decided.
///
/// The legacy rule extends intervals when two needs share a botanical family;
/// the delay-matrix rule consults the ordered species-to-species entry
/// instead. An instance uses exactly one of the two.
#[derive(Debug)]
pub enum RotationRule {
    SameFamily,
    DelayMatrix(Vec<Vec<i32>>),
}

#[derive(Debug)]
pub struct ProblemData {
    pub species_names: Vec<String>,
    pub family_names: Vec<String>,
    /// Species-by-species interaction matrix; positive favours adjacency,
    /// negative forbids it.
    pub interactions: Vec<Vec<i32>>,
    /// Species-by-species precedence matrix; entry `[a][b]` < 0 means species
    /// `b` must not directly precede species `a` in a bed, 1 marks a
    /// favourable precedence.
    pub precedences: Option<Vec<Vec<i32>>>,
    pub rotation: RotationRule,
    pub needs: Vec<Need>,
    /// Need indices of each duplicate group (rows with quantity > 1).
    pub groups: Vec<Vec<usize>>,
    /// Beds are numbered 1 through `num_beds`.
    pub num_beds: usize,
    /// Adjacent bed numbers per bed, indexed by bed number minus one.
    pub adjacency: Vec<Vec<i32>>,
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("missing column {column} at line {line} of {path}")]
    MissingColumn {
        path: PathBuf,
        line: usize,
        column: usize,
    },
    #[error("invalid number '{value}' at line {line} of {path}")]
    InvalidNumber {
        path: PathBuf,
        line: usize,
        value: String,
    },
    #[error("unknown species '{0}' in the needs file")]
    UnknownSpecies(String),
    #[error("{path} must have one row per species ({expected} expected, {actual} found)")]
    MatrixShape {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },
    #[error("row with quantity {quantity} lists {listed} fixed beds at line {line} of {path}")]
    FixedBedCount {
        path: PathBuf,
        line: usize,
        quantity: usize,
        listed: usize,
    },
}

// Needs file layout.
const COL_SPECIES: usize = 1;
const COL_BEGIN: usize = 2;
const COL_END: usize = 3;
const COL_QUANTITY: usize = 4;
const COL_FORBIDDEN_BEDS: usize = 5;
const COL_FAMILY: usize = 6;
const COL_RETURN_DELAY: usize = 7;
const COL_FIXED_BED: usize = 18;

// Beds file layout.
const COL_ADJACENT_BEDS: usize = 1;

impl ProblemData {
    /// Load an instance from its CSV files. The precedence and delay
    /// matrices are optional; providing a delay matrix switches the rotation
    /// rule from the legacy same-family rule to the matrix rule.
    pub fn from_files(
        needs: &Path,
        interactions: &Path,
        beds: &Path,
        precedences: Option<&Path>,
        delays: Option<&Path>,
    ) -> Result<Self, DataError> {
        let bed_rows = read_rows(beds)?;
        let num_beds = bed_rows.len();
        let mut adjacency = Vec::with_capacity(num_beds);
        for (line, row) in bed_rows.iter().enumerate() {
            adjacency.push(parse_i32_list(field(row, COL_ADJACENT_BEDS), beds, line)?);
        }

        let interaction_rows = read_rows(interactions)?;
        let num_species = interaction_rows.len();
        let mut species_names = Vec::with_capacity(num_species);
        let mut species_to_id: HashMap<String, SpeciesId> = HashMap::default();
        let mut interaction_matrix = Vec::with_capacity(num_species);
        for (line, row) in interaction_rows.iter().enumerate() {
            let name = field(row, 0).to_owned();
            let _ = species_to_id.insert(name.clone(), SpeciesId(line as u32));
            species_names.push(name);
            interaction_matrix.push(parse_matrix_row(row, num_species, interactions, line)?);
        }

        let precedence_matrix = match precedences {
            Some(path) => Some(read_matrix(path, num_species)?),
            None => None,
        };
        let rotation = match delays {
            Some(path) => RotationRule::DelayMatrix(read_matrix(path, num_species)?),
            None => RotationRule::SameFamily,
        };

        let need_rows = read_rows(needs)?;
        let mut family_names: Vec<String> = Vec::new();
        let mut need_list = Vec::new();
        let mut groups = Vec::new();
        for (line, row) in need_rows.iter().enumerate() {
            let species_name = field(row, COL_SPECIES);
            let species = *species_to_id
                .get(species_name)
                .ok_or_else(|| DataError::UnknownSpecies(species_name.to_owned()))?;
            let begin = parse_i32(field(row, COL_BEGIN), needs, line)?;
            let end = parse_i32(field(row, COL_END), needs, line)?;
            let quantity = parse_i32(field(row, COL_QUANTITY), needs, line)?.max(0) as usize;
            let forbidden_beds = parse_i32_list(field(row, COL_FORBIDDEN_BEDS), needs, line)?;
            let family_name = field(row, COL_FAMILY);
            let family = intern_family(&mut family_names, family_name);
            let return_delay_field = field(row, COL_RETURN_DELAY);
            let return_delay_years = if return_delay_field.is_empty() {
                0
            } else {
                parse_i32(return_delay_field, needs, line)?
            };

            let fixed_beds = parse_i32_list(field(row, COL_FIXED_BED), needs, line)?;
            if !fixed_beds.is_empty() && fixed_beds.len() != quantity {
                return Err(DataError::FixedBedCount {
                    path: needs.to_owned(),
                    line,
                    quantity,
                    listed: fixed_beds.len(),
                });
            }

            let first_index = need_list.len();
            for unit in 0..quantity {
                let fixed_bed = fixed_beds.get(unit).copied().filter(|&bed| bed >= 0);
                need_list.push(Need {
                    species,
                    begin,
                    end,
                    family,
                    return_delay_years,
                    forbidden_beds: forbidden_beds.clone(),
                    fixed_bed,
                });
            }
            if quantity > 1 {
                groups.push((first_index..first_index + quantity).collect());
            }
        }

        Ok(ProblemData {
            species_names,
            family_names,
            interactions: interaction_matrix,
            precedences: precedence_matrix,
            rotation,
            needs: need_list,
            groups,
            num_beds,
            adjacency,
        })
    }

    pub fn num_needs(&self) -> usize {
        self.needs.len()
    }

    pub fn species_name(&self, species: SpeciesId) -> &str {
        &self.species_names[species.0 as usize]
    }

    pub fn interaction(&self, a: SpeciesId, b: SpeciesId) -> i32 {
        self.interactions[a.0 as usize][b.0 as usize]
    }

    /// The precedence entry for species `b` directly preceding species `a`.
    pub fn precedence(&self, a: SpeciesId, b: SpeciesId) -> Option<i32> {
        self.precedences
            .as_ref()
            .map(|matrix| matrix[a.0 as usize][b.0 as usize])
    }

    pub fn adjacent_beds(&self, bed: i32) -> &[i32] {
        &self.adjacency[(bed - 1) as usize]
    }

    pub fn beds_adjacent(&self, a: i32, b: i32) -> bool {
        self.adjacent_beds(a).contains(&b)
    }

    /// The last cultivation week over all needs.
    pub fn max_week(&self) -> i32 {
        self.needs.iter().map(|need| need.end).max().unwrap_or(0)
    }
}

fn intern_family(family_names: &mut Vec<String>, name: &str) -> FamilyId {
    if let Some(position) = family_names.iter().position(|known| known == name) {
        return FamilyId(position as u32);
    }
    family_names.push(name.to_owned());
    FamilyId((family_names.len() - 1) as u32)
}

fn read_rows(path: &Path) -> Result<Vec<csv::StringRecord>, DataError> {
    let wrap = |source| DataError::Csv {
        path: path.to_owned(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .comment(Some(b'#'))
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(wrap)?;
    reader
        .records()
        .map(|record| record.map_err(wrap))
        .collect()
}

/// A species-by-species matrix file: species name in column 0, then one
/// column per species. Empty cells read as 0.
fn read_matrix(path: &Path, num_species: usize) -> Result<Vec<Vec<i32>>, DataError> {
    let rows = read_rows(path)?;
    if rows.len() != num_species {
        return Err(DataError::MatrixShape {
            path: path.to_owned(),
            expected: num_species,
            actual: rows.len(),
        });
    }
    rows.iter()
        .enumerate()
        .map(|(line, row)| parse_matrix_row(row, num_species, path, line))
        .collect()
}

fn parse_matrix_row(
    row: &csv::StringRecord,
    num_species: usize,
    path: &Path,
    line: usize,
) -> Result<Vec<i32>, DataError> {
    (1..=num_species)
        .map(|column| {
            let cell = row.get(column).ok_or(DataError::MissingColumn {
                path: path.to_owned(),
                line,
                column,
            })?;
            if cell.is_empty() {
                Ok(0)
            } else {
                parse_i32(cell, path, line)
            }
        })
        .collect()
}

fn field<'a>(record: &'a csv::StringRecord, index: usize) -> &'a str {
    record.get(index).unwrap_or("")
}

fn parse_i32(value: &str, path: &Path, line: usize) -> Result<i32, DataError> {
    value.parse().map_err(|_| DataError::InvalidNumber {
        path: path.to_owned(),
        line,
        value: value.to_owned(),
    })
}

/// A comma-separated list of numbers; empty means the empty list.
fn parse_i32_list(value: &str, path: &Path, line: usize) -> Result<Vec<i32>, DataError> {
    if value.is_empty() {
        return Ok(Vec::new());
    }
    value
        .split(',')
        .map(|entry| parse_i32(entry.trim(), path, line))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A compact description of a need for building test instances.
    #[derive(Clone, Copy, Debug)]
    pub(crate) struct NeedSpec {
        pub(crate) species: u32,
        pub(crate) begin: i32,
        pub(crate) end: i32,
        pub(crate) family: u32,
        pub(crate) return_delay: i32,
    }

    impl NeedSpec {
        pub(crate) fn new(species: u32, begin: i32, end: i32) -> Self {
            NeedSpec {
                species,
                begin,
                end,
                family: 0,
                return_delay: 0,
            }
        }

        pub(crate) fn with_family(mut self, family: u32) -> Self {
            self.family = family;
            self
        }

        pub(crate) fn with_return_delay(mut self, years: i32) -> Self {
            self.return_delay = years;
            self
        }
    }

    /// An instance over a strip of `num_beds` consecutive beds where bed `k`
    /// is adjacent to beds `k - 1` and `k + 1`.
    pub(crate) fn data_with(specs: &[NeedSpec], num_beds: usize) -> ProblemData {
        let num_species = specs.iter().map(|spec| spec.species).max().unwrap_or(0) as usize + 1;
        let num_families = specs.iter().map(|spec| spec.family).max().unwrap_or(0) as usize + 1;

        let adjacency = (1..=num_beds as i32)
            .map(|bed| {
                let mut adjacent = Vec::new();
                if bed > 1 {
                    adjacent.push(bed - 1);
                }
                if bed < num_beds as i32 {
                    adjacent.push(bed + 1);
                }
                adjacent
            })
            .collect();

        ProblemData {
            species_names: (0..num_species).map(|s| format!("species{s}")).collect(),
            family_names: (0..num_families).map(|f| format!("family{f}")).collect(),
            interactions: vec![vec![0; num_species]; num_species],
            precedences: None,
            rotation: RotationRule::SameFamily,
            needs: specs
                .iter()
                .map(|spec| Need {
                    species: SpeciesId(spec.species),
                    begin: spec.begin,
                    end: spec.end,
                    family: FamilyId(spec.family),
                    return_delay_years: spec.return_delay,
                    forbidden_beds: Vec::new(),
                    fixed_bed: None,
                })
                .collect(),
            groups: Vec::new(),
            num_beds,
            adjacency,
        }
    }

    pub(crate) fn data_with_needs(specs: &[NeedSpec]) -> ProblemData {
        data_with(specs, 5)
    }

    #[test]
    fn families_are_interned_once() {
        let mut names = Vec::new();
        let a = intern_family(&mut names, "solanaceae");
        let b = intern_family(&mut names, "fabaceae");
        let c = intern_family(&mut names, "solanaceae");

        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(2, names.len());
    }

    #[test]
    fn an_empty_list_field_parses_to_no_entries() {
        let path = Path::new("needs.csv");
        assert!(parse_i32_list("", path, 0).unwrap().is_empty());
        assert_eq!(vec![3, 7], parse_i32_list("3,7", path, 0).unwrap());
    }
}
