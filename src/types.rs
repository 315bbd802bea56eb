use indexmap::IndexMap;
use serde_derive::Serialize;
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// A trait for newtyped integers, that can be used as index types in vectors.
pub trait Idx: Copy + Eq + std::hash::Hash + Ord {
  /// Convert from `T` to `usize`
  fn into_usize(self) -> usize;
  /// Convert from `usize` to `T`
  fn from_usize(_: usize) -> Self;
}

/// A vector indexed by a custom indexing type `I`, usually a newtyped integer.
pub struct IdxVec<I, T>(pub Vec<T>, PhantomData<I>);

impl<I, T: std::fmt::Debug> std::fmt::Debug for IdxVec<I, T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { self.0.fmt(f) }
}

impl<I, T: Clone> Clone for IdxVec<I, T> {
  fn clone(&self) -> Self { Self(self.0.clone(), PhantomData) }
}

impl<I, T> IdxVec<I, T> {
  /// The number of elements in the [`IdxVec`].
  #[must_use]
  pub fn len(&self) -> usize { self.0.len() }

  /// Returns `true` if the vector contains no elements.
  #[must_use]
  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// Get a value by index into the vector.
  pub fn get(&self, index: I) -> Option<&T>
  where I: Idx {
    self.0.get(I::into_usize(index))
  }
}

impl<I, T> From<Vec<T>> for IdxVec<I, T> {
  fn from(vec: Vec<T>) -> Self { Self(vec, PhantomData) }
}

impl<I, T> std::iter::FromIterator<T> for IdxVec<I, T> {
  fn from_iter<J: IntoIterator<Item = T>>(iter: J) -> Self { Vec::from_iter(iter).into() }
}

impl<I, T> Default for IdxVec<I, T> {
  fn default() -> Self { vec![].into() }
}

#[macro_export]
macro_rules! mk_id {
  ($($id:ident,)*) => {
    $(
      #[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde_derive::Serialize)]
      #[serde(transparent)]
      pub struct $id(pub u32);
      impl Idx for $id {
        fn from_usize(n: usize) -> Self { Self(n as u32) }
        fn into_usize(self) -> usize { self.0 as usize }
      }
      impl std::fmt::Debug for $id {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { self.0.fmt(f) }
      }
      impl std::fmt::Display for $id {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { self.0.fmt(f) }
      }
    )*
  };
}

mk_id! {
  SymId,
  NodeId,
}

/// A token sequence, e.g. `|- ( ph -> ps )`.
pub type Expr = Vec<String>;

/// Pattern variable to the tokens it was instantiated with. Iteration order
/// is the order the pairs appear in the payload, which drives color
/// assignment.
pub type Substitution = IndexMap<String, Expr>;

/// The shared string pool of one payload. Every symbol reference in the
/// payload's records is an index into this table.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable(pub IdxVec<SymId, String>);

impl SymbolTable {
  /// Splits the space-separated symbol string. The empty string is an empty table.
  pub fn parse(s: &str) -> Self {
    if s.is_empty() {
      return Self::default()
    }
    Self(s.split(' ').map(str::to_owned).collect())
  }

  pub fn len(&self) -> usize { self.0.len() }
  pub fn is_empty(&self) -> bool { self.0.is_empty() }
  pub fn get(&self, id: SymId) -> Option<&str> { self.0.get(id).map(|s| &**s) }
}

/// One step of a derivation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofNode {
  pub id: NodeId,
  /// `None` for a leaf, which has no derivation.
  pub args: Option<Vec<NodeId>>,
  pub ty: String,
  pub label: String,
  pub params: Vec<Expr>,
  pub num_of_types: usize,
  pub ret_val: Expr,
  /// `None` for a leaf.
  pub substitution: Option<Substitution>,
  pub expr: Expr,
}

impl ProofNode {
  pub fn is_leaf(&self) -> bool { self.args.is_none() }

  /// Variables declared by the type hypotheses (`wff ph`, `class A`, ...),
  /// which are the first `num_of_types` params.
  pub fn type_vars(&self) -> impl Iterator<Item = &str> {
    self.params.iter().take(self.num_of_types).filter_map(|p| p.last()).map(|v| &**v)
  }

  /// Arguments that are not syntactic-category hypotheses.
  pub fn essential_args(&self) -> &[NodeId] {
    match &self.args {
      Some(args) => args.get(self.num_of_types..).unwrap_or_default(),
      None => &[],
    }
  }
}

/// A catalog row describing one assertion of the database.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
  pub id: u32,
  pub ty: String,
  pub label: String,
  pub hypotheses: Vec<Expr>,
  pub expression: Expr,
  /// Variable symbol to syntactic category (`wff`, `class`, ...).
  pub var_types: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssertionKind {
  Theorem,
  Axiom,
}

impl AssertionKind {
  pub fn from_code(code: &str) -> Option<Self> {
    match code {
      "T" => Some(Self::Theorem),
      "A" => Some(Self::Axiom),
      _ => None,
    }
  }

  pub fn name(self) -> &'static str {
    match self {
      Self::Theorem => "Theorem",
      Self::Axiom => "Axiom",
    }
  }
}

/// Display name of an assertion type code; unknown codes are shown verbatim.
pub fn assertion_type_name(code: &str) -> &str {
  AssertionKind::from_code(code).map_or(code, |k| k.name())
}

/// A fully decoded assertion page.
#[derive(Debug, Clone, PartialEq)]
pub struct Assertion {
  pub ty: String,
  pub name: String,
  pub description: String,
  pub var_types: BTreeMap<String, String>,
  pub params: Vec<Expr>,
  pub ret_val: Expr,
  /// `None` for axioms and other assertions without a proof.
  pub proof: Option<Vec<ProofNode>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssertionIndex {
  pub elems: Vec<IndexEntry>,
}
