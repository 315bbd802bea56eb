//! Self-terminating base-46 integers.
//!
//! Every digit of a number is one ASCII character. The digits of a number
//! are written most significant first; all of them come from the
//! continuation range except the last, which comes from the terminator
//! range. A list of integers is therefore just the concatenation of its
//! encoded elements, and the empty string is the empty list.

use crate::error::{CodecError, VarintFault};
use itertools::Itertools;

pub const BASE: u32 = 46;
/// `#` through `P` encode the final digit of a number.
pub const TERMINATOR_BASE: u32 = '#' as u32;
/// `Q` through `~` encode every other digit.
pub const CONTINUATION_BASE: u32 = 'Q' as u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Digit {
  pub terminator: bool,
  pub value: u32,
}

pub fn classify(c: char) -> Option<Digit> {
  let c = c as u32;
  if (TERMINATOR_BASE..TERMINATOR_BASE + BASE).contains(&c) {
    Some(Digit { terminator: true, value: c - TERMINATOR_BASE })
  } else if (CONTINUATION_BASE..CONTINUATION_BASE + BASE).contains(&c) {
    Some(Digit { terminator: false, value: c - CONTINUATION_BASE })
  } else {
    None
  }
}

fn digit_char(base: u32, value: u32) -> char {
  // `value < BASE` and both ranges are ASCII
  char::from_u32(base + value).unwrap_or('?')
}

pub fn encode(n: u32, out: &mut String) {
  let mut digits = vec![digit_char(TERMINATOR_BASE, n % BASE)];
  let mut rest = n / BASE;
  while rest > 0 {
    digits.push(digit_char(CONTINUATION_BASE, rest % BASE));
    rest /= BASE;
  }
  out.extend(digits.into_iter().rev())
}

pub fn encode_int(n: u32) -> String {
  let mut out = String::new();
  encode(n, &mut out);
  out
}

pub fn encode_list(ns: &[u32]) -> String {
  let mut out = String::new();
  ns.iter().for_each(|&n| encode(n, &mut out));
  out
}

fn malformed(token: &str, reason: VarintFault) -> CodecError {
  CodecError::MalformedVarint { token: token.to_owned(), reason }
}

/// Iterates over the numbers of a concatenated varint string.
struct Numbers<'a> {
  token: &'a str,
  chars: std::str::Chars<'a>,
}

impl Iterator for Numbers<'_> {
  type Item = Result<u32, CodecError>;

  fn next(&mut self) -> Option<Self::Item> {
    let mut acc: u32 = 0;
    let mut started = false;
    for c in self.chars.by_ref() {
      let Some(d) = classify(c) else {
        return Some(Err(malformed(self.token, VarintFault::BadDigit(c))))
      };
      started = true;
      let Some(v) = acc.checked_mul(BASE).and_then(|a| a.checked_add(d.value)) else {
        return Some(Err(malformed(self.token, VarintFault::Overflow)))
      };
      acc = v;
      if d.terminator {
        return Some(Ok(acc))
      }
    }
    if started {
      Some(Err(malformed(self.token, VarintFault::NoTerminator)))
    } else {
      None
    }
  }
}

fn numbers(token: &str) -> Numbers<'_> { Numbers { token, chars: token.chars() } }

/// Decodes a token that holds exactly one number.
pub fn decode_int(token: &str) -> Result<u32, CodecError> {
  let mut it = numbers(token);
  let n = it.next().unwrap_or_else(|| Err(malformed(token, VarintFault::NoTerminator)))?;
  match it.next() {
    None => Ok(n),
    Some(_) => Err(malformed(token, VarintFault::TrailingDigits)),
  }
}

pub fn decode_int_list(token: &str) -> Result<Vec<u32>, CodecError> { numbers(token).collect() }

/// Decodes a run of varints as interleaved key/value pairs, preserving order.
pub fn decode_int_pair_map(token: &str) -> Result<Vec<(u32, u32)>, CodecError> {
  let ints = decode_int_list(token)?;
  if ints.len() % 2 != 0 {
    return Err(CodecError::OddPairCount { count: ints.len() })
  }
  Ok(ints.into_iter().tuples().collect())
}

/// Decodes space-separated tokens alternating a single key and a list value.
pub fn decode_int_list_map(token: &str) -> Result<Vec<(u32, Vec<u32>)>, CodecError> {
  if token.is_empty() {
    return Ok(vec![])
  }
  let parts = token.split(' ').collect_vec();
  if parts.len() % 2 != 0 {
    return Err(CodecError::OddPairCount { count: parts.len() })
  }
  parts.into_iter().tuples().map(|(k, v)| Ok((decode_int(k)?, decode_int_list(v)?))).collect()
}

/// Decodes space-separated lists. The empty string is an empty outer list.
pub fn decode_list_of_lists(token: &str) -> Result<Vec<Vec<u32>>, CodecError> {
  if token.is_empty() {
    return Ok(vec![])
  }
  token.split(' ').map(decode_int_list).collect()
}

/// Decodes a plain decimal integer field.
pub fn decode_decimal(token: &str) -> Result<u32, CodecError> {
  token.parse().map_err(|_| CodecError::MalformedInteger { token: token.to_owned() })
}
