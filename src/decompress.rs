//! Decoding of compressed assertion and index payloads.
//!
//! A payload is a JSON envelope holding a space-separated symbol table and a
//! list of records. Each record is a fixed number of fields separated by
//! [`FIELD_DELIMITER`]; fields are decimal integers, varint lists, or
//! space-separated groups of varint lists. Every integer that names a symbol
//! is resolved against the symbol table of its payload.
//!
//! Records are independent of each other once the symbol table is built, so
//! they can be decoded lazily, in parallel, or individually skipped when
//! malformed.

use crate::error::{DecodeError, FieldContext};
use crate::types::*;
use crate::varint::*;
use serde_derive::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, trace};

pub const FIELD_DELIMITER: char = '¦';

const PROOF_NODE_FIELDS: usize = 9;
const INDEX_ENTRY_FIELDS: usize = 6;

fn split_fields<'a, const N: usize>(
  record: &'a str, name: &'static str,
) -> Result<[&'a str; N], DecodeError> {
  let fields: Vec<&str> = record.split(FIELD_DELIMITER).collect();
  let found = fields.len();
  fields.try_into().map_err(|_| DecodeError::FieldArityMismatch { record: name, expected: N, found })
}

pub struct Decompressor {
  symbols: SymbolTable,
}

impl Decompressor {
  pub fn new(symbols: SymbolTable) -> Self { Self { symbols } }

  fn sym(&self, field: &'static str, index: u32) -> Result<String, DecodeError> {
    match self.symbols.get(SymId(index)) {
      Some(s) => Ok(s.to_owned()),
      None => Err(DecodeError::UnknownSymbol { field, index, len: self.symbols.len() }),
    }
  }

  fn expr(&self, field: &'static str, ints: &[u32]) -> Result<Expr, DecodeError> {
    ints.iter().map(|&i| self.sym(field, i)).collect()
  }

  fn exprs(&self, field: &'static str, token: &str) -> Result<Vec<Expr>, DecodeError> {
    let lists = decode_list_of_lists(token).field(field)?;
    lists.iter().map(|l| self.expr(field, l)).collect()
  }

  pub fn var_types(
    &self, field: &'static str, token: &str,
  ) -> Result<BTreeMap<String, String>, DecodeError> {
    let pairs = decode_int_pair_map(token).field(field)?;
    pairs.into_iter().map(|(k, v)| Ok((self.sym(field, k)?, self.sym(field, v)?))).collect()
  }

  /// Decodes one proof record:
  /// `id ¦ args ¦ type ¦ label ¦ params ¦ numOfTypes ¦ retVal ¦ substitution ¦ expr`.
  pub fn proof_node(&self, record: &str) -> Result<ProofNode, DecodeError> {
    let [id, args, ty, label, params, num_of_types, ret_val, subst, expr] =
      split_fields::<PROOF_NODE_FIELDS>(record, "proof node")?;
    let args = match decode_int_list(args).field("args")? {
      v if v.is_empty() => None,
      v => Some(v.into_iter().map(NodeId).collect()),
    };
    let substitution = match decode_int_list_map(subst).field("substitution")? {
      v if v.is_empty() => None,
      v => Some(
        v.into_iter()
          .map(|(k, tokens)| Ok((self.sym("substitution", k)?, self.expr("substitution", &tokens)?)))
          .collect::<Result<Substitution, DecodeError>>()?,
      ),
    };
    let node = ProofNode {
      id: NodeId(decode_decimal(id).field("id")?),
      args,
      ty: self.sym("type", decode_decimal(ty).field("type")?)?,
      label: self.sym("label", decode_decimal(label).field("label")?)?,
      params: self.exprs("params", params)?,
      num_of_types: decode_decimal(num_of_types).field("numOfTypes")? as usize,
      ret_val: self.expr("retVal", &decode_int_list(ret_val).field("retVal")?)?,
      substitution,
      expr: self.expr("expr", &decode_int_list(expr).field("expr")?)?,
    };
    trace!(id = %node.id, label = %node.label, "decoded proof node");
    Ok(node)
  }

  /// Decodes one index record:
  /// `id ¦ type ¦ label ¦ hypotheses ¦ expression ¦ varTypes`.
  /// The label is stored literally rather than as a symbol reference.
  pub fn index_entry(&self, record: &str) -> Result<IndexEntry, DecodeError> {
    let [id, ty, label, hyps, expression, var_types] =
      split_fields::<INDEX_ENTRY_FIELDS>(record, "index entry")?;
    Ok(IndexEntry {
      id: decode_decimal(id).field("id")?,
      ty: self.sym("type", decode_decimal(ty).field("type")?)?,
      label: label.to_owned(),
      hypotheses: self.exprs("hypotheses", hyps)?,
      expression: self.expr("expression", &decode_int_list(expression).field("expression")?)?,
      var_types: self.var_types("varTypes", var_types)?,
    })
  }

  pub fn proof_nodes<'a>(
    &self, records: impl IntoIterator<Item = &'a str>,
  ) -> Vec<Result<ProofNode, DecodeError>> {
    records.into_iter().map(|r| self.proof_node(r)).collect()
  }

  /// Like [`Self::proof_nodes`], but splits the records across `threads`
  /// scoped threads. The result is in input order.
  pub fn proof_nodes_parallel(
    &self, records: &[String], threads: usize,
  ) -> Vec<Result<ProofNode, DecodeError>> {
    let threads = threads.clamp(1, records.len().max(1));
    if threads == 1 {
      return self.proof_nodes(records.iter().map(|s| &**s))
    }
    let chunk = (records.len() + threads - 1) / threads;
    debug!(records = records.len(), threads, "decoding proof records in parallel");
    std::thread::scope(|s| {
      let handles: Vec<_> = records
        .chunks(chunk)
        .map(|part| s.spawn(move || self.proof_nodes(part.iter().map(|r| &**r))))
        .collect();
      handles
        .into_iter()
        .flat_map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
        .collect()
    })
  }
}

#[derive(Debug, Deserialize)]
struct AssertionDto {
  /// symbol table
  s: String,
  t: String,
  n: String,
  #[serde(default)]
  d: String,
  #[serde(default)]
  v: String,
  #[serde(default)]
  pa: String,
  #[serde(default)]
  r: String,
  p: Option<Vec<String>>,
}

/// An assertion payload whose envelope and symbol table have been parsed,
/// but whose proof records are still compressed.
pub struct RawAssertion {
  dto: AssertionDto,
  decompressor: Decompressor,
}

impl RawAssertion {
  pub fn parse(raw: &str) -> Result<Self, DecodeError> {
    let dto: AssertionDto = serde_json::from_str(raw)?;
    let decompressor = Decompressor::new(SymbolTable::parse(&dto.s));
    debug!(name = %dto.n, symbols = decompressor.symbols.len(), "parsed assertion payload");
    Ok(Self { dto, decompressor })
  }

  pub fn decompressor(&self) -> &Decompressor { &self.decompressor }

  pub fn records(&self) -> &[String] { self.dto.p.as_deref().unwrap_or_default() }

  pub fn has_proof(&self) -> bool { self.dto.p.is_some() }

  /// Decodes everything except the proof records.
  pub fn header(&self) -> Result<Assertion, DecodeError> {
    let dc = &self.decompressor;
    Ok(Assertion {
      ty: self.dto.t.clone(),
      name: self.dto.n.clone(),
      description: self.dto.d.clone(),
      var_types: dc.var_types("v", &self.dto.v)?,
      params: dc.exprs("pa", &self.dto.pa)?,
      ret_val: dc.expr("r", &decode_int_list(&self.dto.r).field("r")?)?,
      proof: None,
    })
  }

  /// Decodes the whole assertion, failing on the first malformed record.
  pub fn decode(&self) -> Result<Assertion, DecodeError> {
    let mut asrt = self.header()?;
    if self.has_proof() {
      let nodes = self.decompressor.proof_nodes(self.records().iter().map(|s| &**s));
      asrt.proof = Some(nodes.into_iter().collect::<Result<_, _>>()?);
    }
    Ok(asrt)
  }
}

pub fn decompress_assertion(raw: &str) -> Result<Assertion, DecodeError> {
  RawAssertion::parse(raw)?.decode()
}

#[derive(Debug, Deserialize)]
struct IndexDto {
  strings: String,
  elems: Vec<String>,
}

pub fn decompress_index(raw: &str) -> Result<AssertionIndex, DecodeError> {
  let dto: IndexDto = serde_json::from_str(raw)?;
  let dc = Decompressor::new(SymbolTable::parse(&dto.strings));
  let elems = dto.elems.iter().map(|e| dc.index_entry(e)).collect::<Result<_, _>>()?;
  Ok(AssertionIndex { elems })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::CodecError;

  fn table() -> Decompressor { Decompressor::new(SymbolTable::parse("|- ph ps ( -> ) ax-1 $a wff")) }

  fn join(fields: &[&str]) -> String { fields.join(&FIELD_DELIMITER.to_string()) }

  fn rec(fields: &[String]) -> String {
    join(&fields.iter().map(|s| &**s).collect::<Vec<_>>())
  }

  #[test]
  fn proof_node_fields() {
    // ax-1 applied with ph := ps, ps := ph
    let r = rec(&[
      "7".into(),
      encode_list(&[3, 4]),
      "7".into(),
      "6".into(),
      format!("{} {}", encode_list(&[8, 1]), encode_list(&[8, 2])),
      "2".into(),
      encode_list(&[0, 1]),
      format!("{} {} {} {}", encode_int(1), encode_list(&[2]), encode_int(2), encode_list(&[1])),
      encode_list(&[0, 2]),
    ]);
    let node = table().proof_node(&r).unwrap();
    assert_eq!(node.id, NodeId(7));
    assert_eq!(node.args, Some(vec![NodeId(3), NodeId(4)]));
    assert_eq!(node.ty, "$a");
    assert_eq!(node.label, "ax-1");
    assert_eq!(node.params, vec![vec!["wff", "ph"], vec!["wff", "ps"]]);
    assert_eq!(node.args.as_ref().map(Vec::len), Some(node.params.len()));
    assert_eq!(node.num_of_types, 2);
    assert_eq!(node.ret_val, vec!["|-", "ph"]);
    let subst = node.substitution.unwrap();
    assert_eq!(subst.keys().collect::<Vec<_>>(), ["ph", "ps"]);
    assert_eq!(subst["ph"], vec!["ps"]);
    assert_eq!(node.expr, vec!["|-", "ps"]);
  }

  #[test]
  fn leaf_has_absent_args_and_substitution() {
    let r = rec(&[
      "1".into(),
      String::new(),
      "7".into(),
      "1".into(),
      String::new(),
      "0".into(),
      String::new(),
      String::new(),
      encode_list(&[8, 1]),
    ]);
    let node = table().proof_node(&r).unwrap();
    assert!(node.is_leaf());
    assert_eq!(node.substitution, None);
    assert!(node.params.is_empty());
    assert!(node.ret_val.is_empty());
    assert_eq!(node.expr, vec!["wff", "ph"]);
  }

  #[test]
  fn wrong_arity() {
    let err = table().proof_node(&join(&["1", "", "7"])).unwrap_err();
    assert!(matches!(
      err,
      DecodeError::FieldArityMismatch { record: "proof node", expected: 9, found: 3 }
    ));
    let err = table().index_entry("1").unwrap_err();
    assert!(matches!(err, DecodeError::FieldArityMismatch { expected: 6, found: 1, .. }));
  }

  #[test]
  fn errors_name_their_field() {
    let mut fields = vec!["1", "", "7", "1", "", "0", "", "", "R"];
    let err = table().proof_node(&join(&fields)).unwrap_err();
    assert!(matches!(err, DecodeError::Field { field: "expr", .. }));
    fields[8] = "#";
    fields[7] = "# $ %";
    let err = table().proof_node(&join(&fields)).unwrap_err();
    assert!(matches!(
      err,
      DecodeError::Field { field: "substitution", source: CodecError::OddPairCount { count: 3 } }
    ));
    fields[7] = "";
    fields[3] = "99";
    let err = table().proof_node(&join(&fields)).unwrap_err();
    assert!(matches!(err, DecodeError::UnknownSymbol { field: "label", index: 99, len: 9 }));
  }

  #[test]
  fn bad_record_does_not_affect_siblings() {
    let good = join(&["1", "", "7", "1", "", "0", "", "", "#"]);
    let recs = [good.as_str(), "garbage", good.as_str()];
    let out = table().proof_nodes(recs);
    assert!(out[0].is_ok() && out[1].is_err() && out[2].is_ok());
  }

  #[test]
  fn parallel_matches_sequential() {
    let recs: Vec<String> =
      (0..37).map(|i| join(&[&i.to_string(), "", "7", "1", "", "0", "", "", "$"])).collect();
    let dc = table();
    let seq: Vec<_> =
      dc.proof_nodes(recs.iter().map(|s| &**s)).into_iter().map(Result::unwrap).collect();
    let par: Vec<_> = dc.proof_nodes_parallel(&recs, 4).into_iter().map(Result::unwrap).collect();
    assert_eq!(seq, par);
    assert_eq!(par[36].id, NodeId(36));
  }

  #[test]
  fn index_payload() {
    let elem = rec(&[
      "12".into(),
      "7".into(),
      "ax-1".into(),
      String::new(),
      encode_list(&[0, 3, 1, 4, 2, 5]),
      encode_list(&[1, 9, 2, 9]),
    ]);
    let raw = serde_json::json!({ "strings": "|- ph ps ( -> ) ax-1 $a wff wff", "elems": [elem] });
    let idx = decompress_index(&raw.to_string()).unwrap();
    let e = &idx.elems[0];
    assert_eq!(e.id, 12);
    assert_eq!(e.ty, "$a");
    assert_eq!(e.label, "ax-1");
    assert!(e.hypotheses.is_empty());
    assert_eq!(e.expression.join(" "), "|- ( ph -> ps )");
    assert_eq!(e.var_types["ph"], "wff");
  }

  #[test]
  fn assertion_without_proof() {
    let raw = serde_json::json!({
      "s": "|- ph wff", "t": "A", "n": "ax-x", "d": "an axiom",
      "v": encode_list(&[1, 2]), "pa": "", "r": encode_list(&[0, 1]),
    });
    let a = decompress_assertion(&raw.to_string()).unwrap();
    assert_eq!(a.name, "ax-x");
    assert_eq!(a.ret_val, vec!["|-", "ph"]);
    assert_eq!(a.var_types["ph"], "wff");
    assert!(a.params.is_empty());
    assert_eq!(a.proof, None);
  }

  #[test]
  fn envelope_must_be_json() {
    assert!(matches!(decompress_assertion("{"), Err(DecodeError::Json(_))));
  }
}
