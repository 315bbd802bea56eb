//! Inference-rule diagrams for single proof steps.
//!
//! A step is drawn the way an inference rule is written on paper: the
//! hypotheses side by side on top, the conclusion below, and a bar in
//! between. Each hypothesis column shows the concrete expression of the
//! argument step above the hypothesis pattern of the applied assertion. The
//! conclusion row is mirrored, with the conclusion pattern above the
//! concrete result, so that both pattern rows face the bar. Every
//! substituted variable is boxed in its pattern and in its replacement and
//! the two boxes are connected.

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::geometry::{merge_all, Boundary, Point, Vector, EX};
use crate::subst::{check_instance, map_rows, text_len, SpanMapping, SubstColors};
use crate::types::{NodeId, ProofNode, Substitution};
use serde_derive::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Vertical padding of a replacement box, in char heights.
const ARG_SPAN_PAD: f64 = 1.2;
/// Vertical padding of a pattern variable box, in char heights.
const PARAM_SPAN_PAD: f64 = 0.4;
/// Extra room above a step label and below a pattern row, in char heights.
const ROW_PAD: f64 = 2.;

/// Variable symbol to text color.
pub type VarColors = HashMap<String, String>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
  /// Joins a pattern variable to its replacement.
  Connector,
  /// The bar between hypotheses and conclusion.
  Rule,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Primitive {
  Text {
    key: String,
    pos: Point,
    text: String,
    color: String,
    bold: bool,
    /// Step the text refers to, for clickable step labels.
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<NodeId>,
  },
  Rect {
    key: String,
    bounds: Boundary,
    color: String,
    stroke_width: f64,
  },
  Line {
    key: String,
    from: Point,
    to: Point,
    color: String,
    stroke_width: f64,
    kind: LineKind,
  },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Diagram {
  pub primitives: Vec<Primitive>,
  pub boundary: Boundary,
}

impl Diagram {
  /// Output size in pixels.
  pub fn surface_size(&self, cfg: &LayoutConfig) -> (f64, f64) {
    (self.boundary.width() / cfg.px_size, self.boundary.height() / cfg.px_size)
  }

  pub fn lines(&self, kind: LineKind) -> impl Iterator<Item = &Primitive> {
    (self.primitives.iter())
      .filter(move |p| matches!(p, Primitive::Line { kind: k, .. } if *k == kind))
  }
}

/// Access to the steps that are currently shown.
pub trait StepLookup: Sync {
  fn node(&self, id: NodeId) -> Option<&ProofNode>;
  /// 1-based display ordinal of a step.
  fn step_number(&self, id: NodeId) -> Option<usize>;
}

pub struct LayoutContext<'a> {
  pub steps: &'a dyn StepLookup,
  pub var_colors: &'a VarColors,
  pub hide_types: bool,
  pub config: &'a LayoutConfig,
}

struct Row {
  boundary: Boundary,
  top: Boundary,
  bottom: Boundary,
}

struct Layouter<'a> {
  ctx: &'a LayoutContext<'a>,
  cfg: &'a LayoutConfig,
  node: &'a ProofNode,
  subst: &'a Substitution,
  colors: SubstColors,
  vars: HashSet<&'a str>,
  out: Vec<Primitive>,
}

impl Layouter<'_> {
  fn text(&mut self, key: String, pos: Point, text: &str, link: Option<NodeId>) {
    let color = self.ctx.var_colors.get(text);
    self.out.push(Primitive::Text {
      key,
      pos,
      text: text.to_owned(),
      color: color.unwrap_or(&self.cfg.text_color).clone(),
      bold: color.is_some(),
      link,
    })
  }

  /// Writes `expr` token by token along the unit vector `ex`.
  fn expr(&mut self, key: &str, ex: Vector, expr: &[String]) {
    let mut cur = ex;
    for (i, tok) in expr.iter().enumerate() {
      self.text(format!("{key}-{i}"), cur.start, tok, None);
      cur = cur.shift(self.cfg.char_width * (tok.chars().count() + 1) as f64);
    }
  }

  fn span_box(
    &self, ex: Vector, begin: usize, end: usize, pad: f64,
  ) -> Result<Boundary, LayoutError> {
    let cw = self.cfg.char_width;
    let bottom = ex.shift(cw * begin as f64).scale(cw * (end + 1 - begin) as f64);
    let left = ex.translate_to(bottom.start).rotate(90.).scale(self.cfg.char_height);
    Ok(Boundary::from_points(&[left.end, bottom.end])?.grow_y(self.cfg.char_height * pad))
  }

  /// Boxes one substituted variable on both rows and connects the boxes.
  /// `arg_ex` runs along the instantiated row, `param_ex` along the pattern.
  fn mapping(
    &mut self, key: &str, arg_ex: Vector, param_ex: Vector, m: &SpanMapping, swap: bool,
  ) -> Result<(), LayoutError> {
    let arg = self.span_box(arg_ex, m.arg_begin, m.arg_end, ARG_SPAN_PAD)?;
    let param = self.span_box(param_ex, m.pattern_begin, m.pattern_end, PARAM_SPAN_PAD)?;
    let stroke_width = self.cfg.stroke_width;
    for (suffix, bounds) in [("arg", arg), ("param", param)] {
      let key = format!("{key}-{suffix}");
      self.out.push(Primitive::Rect { key, bounds, color: m.color.clone(), stroke_width });
    }
    // the instantiated row is above the pattern unless swapped
    let (from_y, to_y) = if swap { (arg.min_y, param.max_y) } else { (arg.max_y, param.min_y) };
    self.out.push(Primitive::Line {
      key: format!("{key}-line"),
      from: Point::new(arg.center_x(), from_y),
      to: Point::new(param.center_x(), to_y),
      color: m.color.clone(),
      stroke_width,
      kind: LineKind::Connector,
    });
    Ok(())
  }

  /// Lays out a `top` row above a `bottom` row starting at `ex`. Without
  /// `swap` the top row is the instantiation and the bottom the pattern.
  #[allow(clippy::too_many_arguments)]
  fn row(
    &mut self, key: &str, ex: Vector, center_x: Option<f64>, step: Option<NodeId>,
    top: &[String], bottom: &[String], swap: bool,
  ) -> Result<Row, LayoutError> {
    let (cw, ch) = (self.cfg.char_width, self.cfg.char_height);
    let mut top_ex = ex;
    let mut bottom_ex = ex.translate(Some(&ex.rotate(-90.)), Some(self.cfg.param_gap * ch));
    let top_len = cw * text_len(top) as f64;
    let bottom_len = cw * text_len(bottom) as f64;

    match center_x {
      Some(cx) => {
        top_ex = top_ex.shift(cx - top_len / 2. - top_ex.start.x);
        bottom_ex = bottom_ex.shift(cx - bottom_len / 2. - bottom_ex.start.x);
      }
      None if top_len < bottom_len => top_ex = top_ex.shift((bottom_len - top_len) / 2.),
      None => bottom_ex = bottom_ex.shift((top_len - bottom_len) / 2.),
    }

    let text_box = |ex: Vector, len: f64| -> Result<Boundary, LayoutError> {
      let base = ex.scale(len);
      let left = ex.rotate(90.).scale(ch);
      Ok(Boundary::from_points(&[left.end, base.end])?.add_absolute_margin(self.cfg.margin))
    };
    let top_box = text_box(top_ex, top_len)?;
    let bottom_box = text_box(bottom_ex, bottom_len)?;

    let label = Point::new(top_ex.start.x, top_ex.start.y - self.cfg.label_offset * ch);
    if let Some(id) = step {
      let n = self.ctx.steps.step_number(id).ok_or(LayoutError::MissingStepNumber { id })?;
      self.text(format!("{key}-arg-idx"), label, &n.to_string(), Some(id));
    }

    let (pattern, instance) = if swap { (top, bottom) } else { (bottom, top) };
    if !self.node.is_leaf() {
      let vars = &self.vars;
      check_instance(pattern, self.subst, instance, |t| vars.contains(t))?;
    }
    let (arg_ex, param_ex) = if swap { (bottom_ex, top_ex) } else { (top_ex, bottom_ex) };
    for (i, m) in map_rows(top, bottom, self.subst, &self.colors, swap).iter().enumerate() {
      self.mapping(&format!("{key}-mapping-{i}"), arg_ex, param_ex, m, swap)?;
    }

    self.expr(&format!("{key}-arg-text"), top_ex.normalize(), top);
    self.expr(&format!("{key}-param-text"), bottom_ex.normalize(), bottom);

    let boundary = top_box.merge(&bottom_box).add_points(&[
      label.with_y(|y| y - ROW_PAD * ch),
      bottom_ex.start.with_y(|y| y + ROW_PAD * ch),
    ]);
    Ok(Row { boundary, top: top_box, bottom: bottom_box })
  }

  fn run(mut self) -> Result<Diagram, LayoutError> {
    let (node, steps, cfg) = (self.node, self.ctx.steps, self.cfg);
    let (cw, ch) = (cfg.char_width, cfg.char_height);
    let args = node.args.as_deref().unwrap_or_default();
    if args.len() != node.params.len() {
      let (args, params) = (args.len(), node.params.len());
      return Err(LayoutError::ArityMismatch { id: node.id, args, params })
    }

    let first = if self.ctx.hide_types { node.num_of_types.min(args.len()) } else { 0 };
    let mut hyps: Option<Boundary> = None;
    let mut patterns: Option<Boundary> = None;
    let mut ex = EX;
    for (i, (&id, param)) in args.iter().zip(&node.params).enumerate().skip(first) {
      let arg = steps.node(id).ok_or(LayoutError::MissingNode { id })?;
      let row = self.row(&format!("argAndParam-{i}"), ex, None, Some(id), &arg.expr, param, false)?;
      ex = ex.shift(row.boundary.width() + cw * cfg.row_gap);
      hyps = merge_all([hyps, Some(row.boundary)]);
      patterns = merge_all([patterns, Some(row.bottom)]);
    }

    let concl_ex = match hyps {
      None => EX,
      Some(b) => EX.translate(
        Some(&EX.rotate(-90.)),
        Some(b.max_y - EX.start.y + cfg.conclusion_gap * ch),
      ),
    };
    let center_x = patterns.map(|b| b.center_x());
    let concl =
      self.row("assertion", concl_ex, center_x, None, &node.ret_val, &node.expr, true)?;
    let mut boundary = hyps.map_or(concl.boundary, |b| b.merge(&concl.boundary));

    let rule = patterns.map_or(concl.top, |p| p.merge(&concl.top));
    let mid_y = match patterns {
      Some(_) => rule.center_y(),
      None => {
        let y = concl.top.min_y - ch;
        boundary = boundary.add_points(&[Point::new(concl.top.min_x, y - ch)]);
        y
      }
    };
    self.out.push(Primitive::Line {
      key: "rule-line".into(),
      from: Point::new(rule.min_x, mid_y),
      to: Point::new(rule.max_x, mid_y),
      color: cfg.rule_color.clone(),
      stroke_width: cfg.stroke_width,
      kind: LineKind::Rule,
    });

    debug!(id = %node.id, label = %node.label, primitives = self.out.len(), "laid out step");
    Ok(Diagram { primitives: self.out, boundary })
  }
}

/// Lays out one proof step. Arguments of `node` are resolved through
/// `ctx.steps`; the first `num_of_types` of them are skipped when
/// `ctx.hide_types` is set.
pub fn layout_step(node: &ProofNode, ctx: &LayoutContext<'_>) -> Result<Diagram, LayoutError> {
  let empty = Substitution::new();
  Layouter {
    ctx,
    cfg: ctx.config,
    node,
    subst: node.substitution.as_ref().unwrap_or(&empty),
    colors: SubstColors::assign(node.substitution.as_ref(), ctx.config),
    vars: node.type_vars().collect(),
    out: vec![],
  }
  .run()
}
