use crate::types::NodeId;
use thiserror::Error;

/// Failures of the varint layer. These carry the raw token so a report can
/// point at the offending text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
  #[error("malformed varint '{token}': {reason}")]
  MalformedVarint { token: String, reason: VarintFault },
  #[error("pair map has an odd number of elements ({count})")]
  OddPairCount { count: usize },
  #[error("malformed integer '{token}'")]
  MalformedInteger { token: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarintFault {
  /// The token ended on a continuation digit.
  NoTerminator,
  /// `decode_int` saw characters after the first terminator.
  TrailingDigits,
  /// A character outside both digit ranges.
  BadDigit(char),
  /// The value does not fit in 32 bits.
  Overflow,
}

impl std::fmt::Display for VarintFault {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      VarintFault::NoTerminator => write!(f, "no terminator digit"),
      VarintFault::TrailingDigits => write!(f, "trailing digits after terminator"),
      VarintFault::BadDigit(c) => write!(f, "invalid digit {c:?}"),
      VarintFault::Overflow => write!(f, "value out of range"),
    }
  }
}

#[derive(Debug, Error)]
pub enum DecodeError {
  #[error("{record} record has {found} fields, expected {expected}")]
  FieldArityMismatch { record: &'static str, expected: usize, found: usize },
  #[error("field '{field}': {source}")]
  Field {
    field: &'static str,
    #[source]
    source: CodecError,
  },
  #[error("field '{field}': symbol {index} out of range (table has {len})")]
  UnknownSymbol { field: &'static str, index: u32, len: usize },
  #[error("invalid payload envelope: {0}")]
  Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
  #[error("boundary needs at least 2 points, got {found}")]
  InsufficientPoints { found: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
  #[error("no substitution for pattern symbol '{symbol}'")]
  MissingSubstitution { symbol: String },
  #[error("'{pattern}' does not instantiate to '{instance}'")]
  InstanceMismatch { pattern: String, instance: String },
  #[error("step {id} is not among the visible nodes")]
  MissingNode { id: NodeId },
  #[error("step {id} has no step number")]
  MissingStepNumber { id: NodeId },
  #[error("step {id} has {args} arguments for {params} hypotheses")]
  ArityMismatch { id: NodeId, args: usize, params: usize },
  #[error(transparent)]
  Geometry(#[from] GeometryError),
}

pub trait FieldContext<T> {
  fn field(self, field: &'static str) -> Result<T, DecodeError>;
}

impl<T> FieldContext<T> for Result<T, CodecError> {
  fn field(self, field: &'static str) -> Result<T, DecodeError> {
    self.map_err(|source| DecodeError::Field { field, source })
  }
}
