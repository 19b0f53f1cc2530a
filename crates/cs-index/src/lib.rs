#![forbid(unsafe_code)]

use cs_types::{Element, Kind, TypeError};
use thiserror::Error;

/// A selector over the positions of a series.
#[derive(Debug, Clone, PartialEq)]
pub enum Indexes {
    Position(usize),
    Positions(Vec<usize>),
    /// Selects every position whose flag is set; length must equal the target.
    Mask(Vec<bool>),
    /// Another series used as a selector: int kind lists positions, bool kind
    /// is a mask. `error` carries the poisoned state of that series.
    Series {
        kind: Kind,
        values: Vec<Element>,
        error: Option<String>,
    },
}

impl From<usize> for Indexes {
    fn from(value: usize) -> Self {
        Self::Position(value)
    }
}

impl From<Vec<usize>> for Indexes {
    fn from(value: Vec<usize>) -> Self {
        Self::Positions(value)
    }
}

impl From<&[usize]> for Indexes {
    fn from(value: &[usize]) -> Self {
        Self::Positions(value.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Indexes {
    fn from(value: [usize; N]) -> Self {
        Self::Positions(value.to_vec())
    }
}

impl From<Vec<bool>> for Indexes {
    fn from(value: Vec<bool>) -> Self {
        Self::Mask(value)
    }
}

impl From<&[bool]> for Indexes {
    fn from(value: &[bool]) -> Self {
        Self::Mask(value.to_vec())
    }
}

impl<const N: usize> From<[bool; N]> for Indexes {
    fn from(value: [bool; N]) -> Self {
        Self::Mask(value.to_vec())
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum IndexError {
    #[error("indexing error: mask length {mask} does not match series length {len}")]
    MaskLengthMismatch { mask: usize, len: usize },
    #[error("indexing error: unknown indexing mode for a {kind} series")]
    UnknownIndexShape { kind: Kind },
    #[error("indexing error: index series has errors: {message}")]
    PoisonedIndexSeries { message: String },
    #[error("indexing error: index series contains missing values")]
    MissingInIndexSeries,
    #[error("indexing error: negative position {value}")]
    NegativePosition { value: i64 },
    #[error("indexing error: {0}")]
    Type(#[from] TypeError),
}

/// Resolve `indexes` against a target of length `len` into ordered positions.
///
/// Positions are not range checked here; callers report out-of-range
/// positions themselves.
pub fn resolve_positions(len: usize, indexes: &Indexes) -> Result<Vec<usize>, IndexError> {
    match indexes {
        Indexes::Position(idx) => Ok(vec![*idx]),
        Indexes::Positions(positions) => Ok(positions.clone()),
        Indexes::Mask(mask) => mask_positions(len, mask),
        Indexes::Series {
            kind,
            values,
            error,
        } => {
            if let Some(message) = error {
                return Err(IndexError::PoisonedIndexSeries {
                    message: message.clone(),
                });
            }
            if values.iter().any(Element::is_missing) {
                return Err(IndexError::MissingInIndexSeries);
            }
            match kind {
                Kind::Int => values
                    .iter()
                    .map(|value| {
                        let raw = value.as_int()?;
                        usize::try_from(raw).map_err(|_| IndexError::NegativePosition { value: raw })
                    })
                    .collect(),
                Kind::Bool => {
                    let mask = values
                        .iter()
                        .map(Element::as_bool)
                        .collect::<Result<Vec<_>, _>>()?;
                    mask_positions(len, &mask)
                }
                Kind::Float | Kind::String => Err(IndexError::UnknownIndexShape { kind: *kind }),
            }
        }
    }
}

fn mask_positions(len: usize, mask: &[bool]) -> Result<Vec<usize>, IndexError> {
    if mask.len() != len {
        return Err(IndexError::MaskLengthMismatch {
            mask: mask.len(),
            len,
        });
    }
    Ok(mask
        .iter()
        .enumerate()
        .filter_map(|(idx, keep)| keep.then_some(idx))
        .collect())
}
