//! CmdStan CSV reader.
//!
//! CmdStan writes one CSV file per chain:
//!
//! - comment lines start with `#` (configuration, adaptation info, timing),
//! - a header row names the columns,
//! - every following row is one draw.
//!
//! Columns of array-valued variables carry 1-based indices, either dotted
//! (`theta.1.2`) or bracketed (`theta[1,2]`). Sampler diagnostics end with
//! a double underscore (`lp__`, `divergent__`, ...) and become
//! `sample_stats`.
//!
//! # Deterministic Output
//!
//! Chains are stacked in the order their files are given; variables within a
//! group are ordered by name.

use ndarray::{stack, ArrayD, ArrayViewD, Axis, IxDyn};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::args::{ArgumentBag, KeywordReader};
use super::assemble::{take_variables, ArrayMap, GroupAssembler};
use super::container::InferenceData;
use super::coords::{Coords, Dims};
use super::group::GroupName;
use super::io_stan::rename_stan_stats;
use super::value::Value;
use crate::error::InferConvError;

const EXTRACTOR: &str = "from_cmdstan";

const ACCEPTED: &[&str] = &[
    "posterior",
    "posterior_predictive",
    "prior",
    "prior_predictive",
    "log_likelihood",
    "observed_data",
    "constant_data",
    "index_origin",
];

/// Extension of CmdStan output files.
pub const CSV_EXTENSION: &str = ".csv";

// ============================================================================
// Public API
// ============================================================================

/// Where a predictive group comes from: variables of the main run, or
/// separate CSV files.
#[derive(Clone, Debug, PartialEq)]
pub enum PredictiveSource {
    Variables(Vec<String>),
    Files(Vec<PathBuf>),
}

/// Arguments for [`from_cmdstan`].
#[derive(Clone, Debug, Default)]
pub struct CmdStanArgs {
    /// One CSV file per posterior chain.
    pub posterior: Vec<PathBuf>,
    /// One CSV file per prior chain.
    pub prior: Vec<PathBuf>,
    pub posterior_predictive: Option<PredictiveSource>,
    pub prior_predictive: Option<PredictiveSource>,
    pub log_likelihood: Vec<String>,
    pub observed_data: Option<ArrayMap>,
    pub constant_data: Option<ArrayMap>,
    pub coords: Option<Coords>,
    pub dims: Option<Dims>,
    pub index_origin: Option<i64>,
}

impl CmdStanArgs {
    /// Reads the extractor's keywords out of a routed argument bag.
    pub fn from_bag(bag: ArgumentBag) -> Result<Self, InferConvError> {
        let mut kw = bag.into_keywords(EXTRACTOR, ACCEPTED)?;
        let (coords, dims) = kw.take_coords_dims();
        Ok(Self {
            posterior: paths(&mut kw, "posterior")?,
            prior: paths(&mut kw, "prior")?,
            posterior_predictive: predictive(&mut kw, "posterior_predictive")?,
            prior_predictive: predictive(&mut kw, "prior_predictive")?,
            log_likelihood: kw.take_str_list("log_likelihood")?.unwrap_or_default(),
            observed_data: kw.take_array_map("observed_data")?,
            constant_data: kw.take_array_map("constant_data")?,
            coords,
            dims,
            index_origin: kw.take_int("index_origin")?,
        })
    }
}

fn paths(kw: &mut KeywordReader, key: &str) -> Result<Vec<PathBuf>, InferConvError> {
    Ok(kw
        .take_str_list(key)?
        .unwrap_or_default()
        .into_iter()
        .map(PathBuf::from)
        .collect())
}

fn predictive(
    kw: &mut KeywordReader,
    key: &str,
) -> Result<Option<PredictiveSource>, InferConvError> {
    Ok(kw.take_str_list(key)?.map(|entries| {
        if entries.iter().all(|e| e.ends_with(CSV_EXTENSION)) {
            PredictiveSource::Files(entries.into_iter().map(PathBuf::from).collect())
        } else {
            PredictiveSource::Variables(entries)
        }
    }))
}

/// Returns true if `value` names CmdStan output: a `.csv` path, or a list
/// whose first entry is one.
pub fn is_cmdstan_output(value: &Value) -> bool {
    match value {
        Value::Str(path) => path.ends_with(CSV_EXTENSION),
        Value::List(items) => matches!(items.first(), Some(Value::Str(p)) if p.ends_with(CSV_EXTENSION)),
        _ => false,
    }
}

/// Converts CmdStan CSV output into a container.
///
/// # Errors
/// Returns an error if a file cannot be read or parsed, if chains disagree on
/// columns or draw counts, or if a requested variable is missing.
pub fn from_cmdstan(args: CmdStanArgs) -> Result<InferenceData, InferConvError> {
    let mut assembler = GroupAssembler::new(
        args.coords.as_ref(),
        args.dims.as_ref(),
        args.index_origin,
        "cmdstan",
    );

    if !args.posterior.is_empty() {
        let (mut params, stats) = read_chains(&args.posterior)?;
        let predictive = resolve_predictive(
            &mut params,
            args.posterior_predictive,
            GroupName::PosteriorPredictive,
        )?;
        let log_likelihood = take_variables(
            &mut params,
            &args.log_likelihood,
            EXTRACTOR,
            GroupName::LogLikelihood,
        )?;

        assembler = assembler
            .sampled(GroupName::Posterior, params)?
            .sampled(GroupName::SampleStats, stats)?
            .sampled(GroupName::PosteriorPredictive, predictive)?
            .sampled(GroupName::LogLikelihood, log_likelihood)?;
    } else if let Some(PredictiveSource::Files(files)) = args.posterior_predictive {
        let (params, _) = read_chains(&files)?;
        assembler = assembler.sampled(GroupName::PosteriorPredictive, params)?;
    }

    if !args.prior.is_empty() {
        let (mut params, stats) = read_chains(&args.prior)?;
        let predictive =
            resolve_predictive(&mut params, args.prior_predictive, GroupName::PriorPredictive)?;

        assembler = assembler
            .sampled(GroupName::Prior, params)?
            .sampled(GroupName::SampleStatsPrior, stats)?
            .sampled(GroupName::PriorPredictive, predictive)?;
    } else if let Some(PredictiveSource::Files(files)) = args.prior_predictive {
        let (params, _) = read_chains(&files)?;
        assembler = assembler.sampled(GroupName::PriorPredictive, params)?;
    }

    Ok(assembler
        .plain(GroupName::ObservedData, args.observed_data)?
        .plain(GroupName::ConstantData, args.constant_data)?
        .finish())
}

/// Reads one chain from a CmdStan CSV file.
///
/// Returned arrays are laid out as `(draw, ...)`.
pub fn read_stan_csv(path: &Path) -> Result<ArrayMap, InferConvError> {
    let file = File::open(path).map_err(InferConvError::Io)?;
    tracing::debug!(path = %path.display(), "reading cmdstan csv");
    parse_chain(BufReader::new(file), path)
}

/// Reads one chain from a CmdStan CSV string.
///
/// Useful for testing without file I/O.
pub fn from_stan_csv_str(csv_str: &str) -> Result<ArrayMap, InferConvError> {
    from_stan_csv_slice(csv_str.as_bytes())
}

/// Reads one chain from CmdStan CSV bytes.
///
/// Useful for fuzzing and processing raw bytes without requiring UTF-8 upfront.
pub fn from_stan_csv_slice(bytes: &[u8]) -> Result<ArrayMap, InferConvError> {
    parse_chain(bytes, Path::new("<bytes>"))
}

/// Stacks per-chain arrays into `(chain, draw, ...)` arrays.
///
/// Every chain must have the same variables with the same shapes.
pub fn stack_chains(chains: Vec<ArrayMap>, path: &Path) -> Result<ArrayMap, InferConvError> {
    let Some(first) = chains.first() else {
        return Ok(ArrayMap::new());
    };

    let mut out = ArrayMap::new();
    for (name, reference) in first {
        let mut views: Vec<ArrayViewD<'_, f64>> = Vec::with_capacity(chains.len());
        for (idx, chain) in chains.iter().enumerate() {
            let values = chain.get(name).ok_or_else(|| InferConvError::StanCsvInvalid {
                path: path.to_path_buf(),
                message: format!("chain {} has no column for '{}'", idx, name),
            })?;
            if values.shape() != reference.shape() {
                return Err(InferConvError::StanCsvInvalid {
                    path: path.to_path_buf(),
                    message: format!(
                        "chain {} has shape {:?} for '{}', expected {:?}",
                        idx,
                        values.shape(),
                        name,
                        reference.shape()
                    ),
                });
            }
            views.push(values.view());
        }
        let stacked = stack(Axis(0), &views).map_err(|e| InferConvError::StanCsvInvalid {
            path: path.to_path_buf(),
            message: format!("cannot stack chains for '{}': {}", name, e),
        })?;
        out.insert(name.clone(), stacked);
    }

    if let Some((idx, extra)) = chains
        .iter()
        .enumerate()
        .find_map(|(idx, c)| c.keys().find(|k| !first.contains_key(*k)).map(|k| (idx, k)))
    {
        return Err(InferConvError::StanCsvInvalid {
            path: path.to_path_buf(),
            message: format!("chain {} has unexpected column '{}'", idx, extra),
        });
    }

    Ok(out)
}

// ============================================================================
// Reading
// ============================================================================

/// Reads every chain file and splits parameters from diagnostics.
fn read_chains(files: &[PathBuf]) -> Result<(ArrayMap, ArrayMap), InferConvError> {
    let chains = files
        .iter()
        .map(|path| read_stan_csv(path))
        .collect::<Result<Vec<_>, _>>()?;
    let label = files.first().map(PathBuf::as_path).unwrap_or(Path::new("<none>"));
    let stacked = stack_chains(chains, label)?;

    let (stats, params): (ArrayMap, ArrayMap) = stacked
        .into_iter()
        .partition(|(name, _)| name.ends_with("__"));
    Ok((params, rename_stan_stats(stats)))
}

fn resolve_predictive(
    params: &mut ArrayMap,
    source: Option<PredictiveSource>,
    group: GroupName,
) -> Result<ArrayMap, InferConvError> {
    match source {
        None => Ok(ArrayMap::new()),
        Some(PredictiveSource::Variables(names)) => {
            take_variables(params, &names, EXTRACTOR, group)
        }
        Some(PredictiveSource::Files(files)) => Ok(read_chains(&files)?.0),
    }
}

/// A column header split into variable name and 1-based indices.
#[derive(Debug, PartialEq)]
struct ColumnName {
    base: String,
    indices: Vec<usize>,
}

fn parse_column_name(column: &str) -> Option<ColumnName> {
    let column = column.trim();
    if let Some(open) = column.find('[') {
        let inner = column[open + 1..].strip_suffix(']')?;
        let indices = inner
            .split(',')
            .map(|i| i.trim().parse::<usize>().ok().filter(|&i| i > 0))
            .collect::<Option<Vec<_>>>()?;
        return Some(ColumnName {
            base: column[..open].to_string(),
            indices,
        });
    }

    let mut parts = column.split('.');
    let base = parts.next()?.to_string();
    let rest: Vec<&str> = parts.collect();
    // A dotted name only carries indices when every suffix is a positive integer.
    let indices = rest
        .iter()
        .map(|p| p.parse::<usize>().ok().filter(|&i| i > 0))
        .collect::<Option<Vec<_>>>();
    match indices {
        Some(indices) => Some(ColumnName { base, indices }),
        None => Some(ColumnName {
            base: column.to_string(),
            indices: Vec::new(),
        }),
    }
}

/// Layout of one variable across the CSV columns.
#[derive(Debug)]
struct VariableLayout {
    shape: Vec<usize>,
    /// (column index, 0-based multi-index)
    cells: Vec<(usize, Vec<usize>)>,
    seen: BTreeSet<Vec<usize>>,
}

fn parse_chain<R: Read>(reader: R, path: &Path) -> Result<ArrayMap, InferConvError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|source| InferConvError::StanCsvParse {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    if headers.is_empty() {
        return Err(InferConvError::StanCsvInvalid {
            path: path.to_path_buf(),
            message: "missing header row".to_string(),
        });
    }

    let layouts = build_layouts(&headers, path)?;

    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (row_idx, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|source| InferConvError::StanCsvParse {
            path: path.to_path_buf(),
            source,
        })?;
        let row = record
            .iter()
            .enumerate()
            .map(|(col, field)| {
                parse_number(field).ok_or_else(|| InferConvError::StanCsvInvalid {
                    path: path.to_path_buf(),
                    message: format!(
                        "draw {}: column '{}' has non-numeric value '{}'",
                        row_idx,
                        headers.get(col).unwrap_or("?"),
                        field
                    ),
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;
        rows.push(row);
    }

    let draws = rows.len();
    let mut out = ArrayMap::new();
    for (name, layout) in layouts {
        let mut shape = Vec::with_capacity(layout.shape.len() + 1);
        shape.push(draws);
        shape.extend(&layout.shape);
        let mut values = ArrayD::<f64>::from_elem(IxDyn(&shape), f64::NAN);
        for (draw, row) in rows.iter().enumerate() {
            for (col, index) in &layout.cells {
                let mut full = Vec::with_capacity(index.len() + 1);
                full.push(draw);
                full.extend(index);
                values[IxDyn(&full)] = row[*col];
            }
        }
        out.insert(name, values);
    }

    Ok(out)
}

fn build_layouts(
    headers: &csv::StringRecord,
    path: &Path,
) -> Result<BTreeMap<String, VariableLayout>, InferConvError> {
    let mut layouts: BTreeMap<String, VariableLayout> = BTreeMap::new();

    for (col, header) in headers.iter().enumerate() {
        let parsed = parse_column_name(header).ok_or_else(|| InferConvError::StanCsvInvalid {
            path: path.to_path_buf(),
            message: format!("malformed column name '{}'", header),
        })?;

        let layout = layouts
            .entry(parsed.base.clone())
            .or_insert_with(|| VariableLayout {
                shape: vec![0; parsed.indices.len()],
                cells: Vec::new(),
                seen: BTreeSet::new(),
            });
        if layout.shape.len() != parsed.indices.len() {
            return Err(InferConvError::StanCsvInvalid {
                path: path.to_path_buf(),
                message: format!(
                    "column '{}' has {} index/indices but '{}' was declared with {}",
                    header,
                    parsed.indices.len(),
                    parsed.base,
                    layout.shape.len()
                ),
            });
        }
        for (extent, &idx) in layout.shape.iter_mut().zip(&parsed.indices) {
            *extent = (*extent).max(idx);
        }
        let index: Vec<usize> = parsed.indices.iter().map(|i| i - 1).collect();
        if !layout.seen.insert(index.clone()) {
            return Err(InferConvError::StanCsvInvalid {
                path: path.to_path_buf(),
                message: format!("duplicate column '{}'", header),
            });
        }
        layout.cells.push((col, index));
    }

    for (name, layout) in &layouts {
        let expected = layout
            .shape
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n));
        if expected != Some(layout.cells.len()) {
            return Err(InferConvError::StanCsvInvalid {
                path: path.to_path_buf(),
                message: format!(
                    "variable '{}' has {} column(s) but shape {:?}",
                    name,
                    layout.cells.len(),
                    layout.shape
                ),
            });
        }
    }

    Ok(layouts)
}

fn parse_number(field: &str) -> Option<f64> {
    match field {
        "inf" | "Inf" => Some(f64::INFINITY),
        "-inf" | "-Inf" => Some(f64::NEG_INFINITY),
        "nan" | "NaN" => Some(f64::NAN),
        other => other.parse().ok(),
    }
}
