//! Alignment of a pattern with its instantiation.
//!
//! Both sides of a proof-step row are drawn as space-joined token text. For
//! each substituted variable of the pattern we compute the character range
//! it occupies in the pattern text and the range its replacement occupies
//! in the instantiated text, so the two can be boxed and connected.

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::types::Substitution;
use indexmap::IndexMap;
use serde_derive::Serialize;

/// Colors of the substituted variables of one proof step. Shared by every
/// row of the step so a variable keeps its color across the diagram.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubstColors {
  colors: IndexMap<String, String>,
  fallback: String,
}

impl SubstColors {
  /// Hands out palette colors in the substitution's own order.
  pub fn assign(subst: Option<&Substitution>, cfg: &LayoutConfig) -> Self {
    let colors = subst
      .into_iter()
      .flat_map(|s| s.keys())
      .enumerate()
      .map(|(i, sym)| (sym.clone(), cfg.subst_color(i).to_owned()))
      .collect();
    Self { colors, fallback: cfg.subst_fallback.clone() }
  }

  pub fn color(&self, sym: &str) -> &str { self.colors.get(sym).unwrap_or(&self.fallback) }
}

/// Character ranges (inclusive) of one substituted variable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanMapping {
  pub symbol: String,
  pub color: String,
  pub pattern_begin: usize,
  pub pattern_end: usize,
  pub arg_begin: usize,
  pub arg_end: usize,
}

/// Inclusive character range of every token in the space-joined text.
pub fn token_offsets<S: AsRef<str>>(tokens: &[S]) -> Vec<(usize, usize)> {
  let mut out = Vec::with_capacity(tokens.len());
  let mut next = 0;
  for tok in tokens {
    let len = tok.as_ref().chars().count();
    out.push((next, (next + len).saturating_sub(1)));
    next += len + 1;
  }
  out
}

/// Number of characters of the space-joined text.
pub fn text_len<S: AsRef<str>>(tokens: &[S]) -> usize {
  tokens.iter().map(|t| t.as_ref().chars().count()).sum::<usize>() + tokens.len().saturating_sub(1)
}

/// Maps every substituted occurrence in `pattern`.
pub fn map_substitution(
  pattern: &[String], subst: &Substitution, colors: &SubstColors,
) -> Vec<SpanMapping> {
  let mut instance: Vec<&str> = vec![];
  // (symbol, pattern token index, first and last instance token index)
  let mut occurrences = vec![];
  for (i, tok) in pattern.iter().enumerate() {
    match subst.get(tok) {
      // An empty replacement occupies no text and cannot be boxed.
      Some(sub) if !sub.is_empty() => {
        occurrences.push((tok, i, instance.len(), instance.len() + sub.len() - 1));
        instance.extend(sub.iter().map(|s| &**s))
      }
      Some(_) => {}
      None => instance.push(tok.as_str()),
    }
  }
  let inst_offsets = token_offsets(&instance);
  let pat_offsets = token_offsets(pattern);
  occurrences
    .into_iter()
    .map(|(sym, i, begin, end)| SpanMapping {
      symbol: sym.clone(),
      color: colors.color(sym).to_owned(),
      pattern_begin: pat_offsets[i].0,
      pattern_end: pat_offsets[i].1,
      arg_begin: inst_offsets[begin].0,
      arg_end: inst_offsets[end].1,
    })
    .collect()
}

/// Maps one row pair. Ordinarily `top` is the instantiated text and
/// `bottom` the pattern; with `swap` the pattern is on top, as in the
/// conclusion row.
pub fn map_rows(
  top: &[String], bottom: &[String], subst: &Substitution, colors: &SubstColors, swap: bool,
) -> Vec<SpanMapping> {
  map_substitution(if swap { top } else { bottom }, subst, colors)
}

/// Checks that substituting into `pattern` yields exactly `instance`. A
/// token for which `is_var` holds but which has no replacement is reported
/// as [`LayoutError::MissingSubstitution`] unless it appears literally.
pub fn check_instance(
  pattern: &[String], subst: &Substitution, instance: &[String], is_var: impl Fn(&str) -> bool,
) -> Result<(), LayoutError> {
  let mismatch = || LayoutError::InstanceMismatch {
    pattern: pattern.join(" "),
    instance: instance.join(" "),
  };
  let mut rest = instance;
  for tok in pattern {
    match subst.get(tok) {
      Some(sub) => match rest.strip_prefix(&**sub) {
        Some(r) => rest = r,
        None => return Err(mismatch()),
      },
      None => match rest.split_first() {
        Some((first, r)) if first == tok => rest = r,
        _ if is_var(tok.as_str()) =>
          return Err(LayoutError::MissingSubstitution { symbol: tok.clone() }),
        _ => return Err(mismatch()),
      },
    }
  }
  if rest.is_empty() {
    Ok(())
  } else {
    Err(mismatch())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn toks(s: &str) -> Vec<String> { s.split_whitespace().map(str::to_owned).collect() }

  fn subst(pairs: &[(&str, &str)]) -> Substitution {
    pairs.iter().map(|&(k, v)| (k.to_owned(), toks(v))).collect()
  }

  #[test]
  fn offsets_count_separators() {
    assert_eq!(token_offsets(&["ph", "->", "x"]), vec![(0, 1), (3, 4), (6, 6)]);
    assert_eq!(token_offsets::<&str>(&[]), vec![]);
    assert_eq!(text_len(&["ph", "->", "x"]), 7);
    assert_eq!(text_len::<&str>(&[]), 0);
    assert_eq!(text_len(&["¬", "ph"]), 4);
  }

  #[test]
  fn single_variable() {
    let s = subst(&[("ph", "A B")]);
    let colors = SubstColors::assign(Some(&s), &LayoutConfig::default());
    let spans = map_substitution(&toks("ph ps"), &s, &colors);
    assert_eq!(spans, vec![SpanMapping {
      symbol: "ph".into(),
      color: "green".into(),
      pattern_begin: 0,
      pattern_end: 1,
      arg_begin: 0,
      arg_end: 2,
    }]);
    // "A B ps"[0..=2] == "A B", "ph ps"[0..=1] == "ph"
    assert_eq!(&"A B ps"[0..=2], "A B");
  }

  #[test]
  fn repeated_and_shifted_occurrences() {
    let s = subst(&[("ph", "( x = y )"), ("ps", "T.")]);
    let colors = SubstColors::assign(Some(&s), &LayoutConfig::default());
    let pattern = toks("|- ( ph -> ( ps -> ph ) )");
    let spans = map_substitution(&pattern, &s, &colors);
    let instance = "|- ( ( x = y ) -> ( T. -> ( x = y ) ) )";
    let pattern_text = pattern.join(" ");
    let got: Vec<_> = spans
      .iter()
      .map(|m| {
        (
          &pattern_text[m.pattern_begin..=m.pattern_end],
          &instance[m.arg_begin..=m.arg_end],
          m.color.as_str(),
        )
      })
      .collect();
    assert_eq!(got, vec![
      ("ph", "( x = y )", "green"),
      ("ps", "T.", "orange"),
      ("ph", "( x = y )", "green"),
    ]);
  }

  #[test]
  fn swap_uses_top_row_as_pattern() {
    let s = subst(&[("ph", "A")]);
    let colors = SubstColors::assign(Some(&s), &LayoutConfig::default());
    let (pat, inst) = (toks("|- ph"), toks("|- A"));
    assert_eq!(map_rows(&pat, &inst, &s, &colors, true), map_substitution(&pat, &s, &colors));
    assert_eq!(map_rows(&inst, &pat, &s, &colors, false), map_substitution(&pat, &s, &colors));
  }

  #[test]
  fn palette_overflow_uses_fallback() {
    let names: Vec<String> = (0..12).map(|i| format!("v{i}")).collect();
    let s: Substitution = names.iter().map(|n| (n.clone(), toks("x"))).collect();
    let colors = SubstColors::assign(Some(&s), &LayoutConfig::default());
    assert_eq!(colors.color("v0"), "green");
    assert_eq!(colors.color("v9"), "magenta");
    assert_eq!(colors.color("v10"), "black");
    assert_eq!(colors.color("absent"), "black");
  }

  #[test]
  fn instance_check() {
    let s = subst(&[("ph", "A B")]);
    let is_var = |t: &str| t == "ph" || t == "ps";
    assert_eq!(check_instance(&toks("|- ph"), &s, &toks("|- A B"), is_var), Ok(()));
    assert_eq!(
      check_instance(&toks("|- ph ps"), &s, &toks("|- A B C"), is_var),
      Err(LayoutError::MissingSubstitution { symbol: "ps".into() })
    );
    assert!(matches!(
      check_instance(&toks("|- ph"), &s, &toks("|- A C"), is_var),
      Err(LayoutError::InstanceMismatch { .. })
    ));
    assert!(matches!(
      check_instance(&toks("|- ph"), &s, &toks("|- A B C"), is_var),
      Err(LayoutError::InstanceMismatch { .. })
    ));
  }

  #[test]
  fn wrong_constant_is_a_mismatch() {
    let s = subst(&[("ph", "A"), ("ps", "B")]);
    let is_var = |t: &str| t == "ph" || t == "ps";
    let err = check_instance(&toks("|- ( ph -> ps )"), &s, &toks("|- ( A <-> B )"), is_var);
    assert_eq!(
      err,
      Err(LayoutError::InstanceMismatch {
        pattern: "|- ( ph -> ps )".into(),
        instance: "|- ( A <-> B )".into(),
      })
    );
  }
}
