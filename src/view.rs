//! Selection and numbering of the steps of a proof that are shown.

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::layout::{layout_step, Diagram, LayoutContext, StepLookup, VarColors};
use crate::types::{NodeId, ProofNode};
use std::collections::{BTreeMap, HashMap, HashSet};

/// The visible steps of a proof, in proof order. Nodes are borrowed from
/// the decoded proof and referenced by id only.
pub struct ProofView<'a> {
  steps: Vec<&'a ProofNode>,
  index: HashMap<NodeId, usize>,
  hide_types: bool,
}

impl<'a> ProofView<'a> {
  /// With `hide_types`, only the final step and the steps used as
  /// non-type arguments somewhere in the proof are kept.
  pub fn new(proof: &'a [ProofNode], hide_types: bool) -> Self {
    let steps: Vec<_> = if hide_types {
      let required: HashSet<NodeId> = (proof.last().map(|n| n.id).into_iter())
        .chain(proof.iter().flat_map(|n| n.essential_args().iter().copied()))
        .collect();
      proof.iter().filter(|n| required.contains(&n.id)).collect()
    } else {
      proof.iter().collect()
    };
    let index = steps.iter().enumerate().map(|(i, n)| (n.id, i)).collect();
    Self { steps, index, hide_types }
  }

  pub fn steps(&self) -> &[&'a ProofNode] { &self.steps }

  pub fn layout(
    &self, node: &ProofNode, var_colors: &VarColors, config: &LayoutConfig,
  ) -> Result<Diagram, LayoutError> {
    let ctx = LayoutContext { steps: self, var_colors, hide_types: self.hide_types, config };
    layout_step(node, &ctx)
  }
}

impl StepLookup for ProofView<'_> {
  fn node(&self, id: NodeId) -> Option<&ProofNode> { self.index.get(&id).map(|&i| self.steps[i]) }

  fn step_number(&self, id: NodeId) -> Option<usize> { self.index.get(&id).map(|i| i + 1) }
}

/// Colors every variable by its syntactic category.
pub fn var_colors(var_types: &BTreeMap<String, String>, cfg: &LayoutConfig) -> VarColors {
  var_types.iter().map(|(var, ty)| (var.clone(), cfg.type_color(ty).to_owned())).collect()
}
