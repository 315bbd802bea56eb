use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;

const DEFAULT_SCALE: f64 = 10.;

const SUBST_PALETTE: [&str; 10] =
  ["green", "orange", "#03a9f4", "pink", "brown", "lawngreen", "olive", "blue", "red", "magenta"];

const TYPE_COLORS: [(&str, &str); 4] =
  [("wff", "blue"), ("term", "black"), ("setvar", "red"), ("class", "magenta")];

/// Font metrics, spacing and colors of a diagram. Distances are in diagram
/// units; the `*_gap` and `*_offset` fields are multiples of a character
/// width or height as noted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
  pub font_family: String,
  pub font_size: f64,
  pub char_width: f64,
  pub char_height: f64,
  /// Padding around each text box.
  pub margin: f64,
  pub stroke_width: f64,
  /// Diagram units per output pixel.
  pub px_size: f64,
  /// Distance from a concrete row down to its pattern row, in char heights.
  pub param_gap: f64,
  /// Horizontal space between hypothesis columns, in char widths.
  pub row_gap: f64,
  /// Height of a step label above its row, in char heights.
  pub label_offset: f64,
  /// Space between the hypotheses and the conclusion, in char heights.
  pub conclusion_gap: f64,
  /// Colors handed out to substituted variables, in order.
  pub subst_palette: Vec<String>,
  /// Color for substituted variables beyond the palette.
  pub subst_fallback: String,
  /// Syntactic category to text color.
  pub type_colors: BTreeMap<String, String>,
  pub type_fallback: String,
  pub text_color: String,
  pub rule_color: String,
}

impl Default for LayoutConfig {
  fn default() -> Self { Self::with_scale(DEFAULT_SCALE) }
}

impl LayoutConfig {
  pub fn with_scale(scale: f64) -> Self {
    let font_size = scale * 2.;
    let char_width = font_size * 0.6;
    Self {
      font_family: "courier".into(),
      font_size,
      char_width,
      char_height: char_width * 0.85,
      margin: scale * 0.5,
      stroke_width: scale * 0.1,
      px_size: 1.5,
      param_gap: 6.,
      row_gap: 5.,
      label_offset: 3.,
      conclusion_gap: 4.,
      subst_palette: SUBST_PALETTE.iter().map(|s| s.to_string()).collect(),
      subst_fallback: "black".into(),
      type_colors: TYPE_COLORS.iter().map(|&(k, v)| (k.into(), v.into())).collect(),
      type_fallback: "gold".into(),
      text_color: "black".into(),
      rule_color: "black".into(),
    }
  }

  /// Replaces the metrics derived from the scale, keeping spacing and colors.
  pub fn rescale(&mut self, scale: f64) {
    let m = Self::with_scale(scale);
    self.font_size = m.font_size;
    self.char_width = m.char_width;
    self.char_height = m.char_height;
    self.margin = m.margin;
    self.stroke_width = m.stroke_width;
  }

  /// Color of the `i`-th substituted variable of a step.
  pub fn subst_color(&self, i: usize) -> &str {
    self.subst_palette.get(i).map_or(&*self.subst_fallback, |s| s.as_str())
  }

  pub fn type_color(&self, ty: &str) -> &str {
    self.type_colors.get(ty).map_or(&*self.type_fallback, |s| s.as_str())
  }

  /// Width of `chars` characters of text.
  pub fn text_width(&self, chars: usize) -> f64 { chars as f64 * self.char_width }
}
