use mm_diagram::decompress::FIELD_DELIMITER;
use mm_diagram::error::DecodeError;
use mm_diagram::layout::LineKind;
use mm_diagram::types::NodeId;
use mm_diagram::varint::{encode_int, encode_list};
use mm_diagram::view::var_colors;
use mm_diagram::{
  decompress_assertion, decompress_index, LayoutConfig, Primitive, ProofView, RawAssertion,
};
use serde_json::json;

const SYMBOLS: &str = "|- A B ( -> ) wff ph ps ax-mp $a $e min maj wa wb";

fn record(fields: &[String]) -> String { fields.join(&FIELD_DELIMITER.to_string()) }

fn leaf(id: u32, label: u32, expr: &[u32]) -> String {
  let (id, label, e) = (id.to_string(), label.to_string(), String::new);
  record(&[id, e(), "11".into(), label, e(), "0".into(), e(), e(), encode_list(expr)])
}

/// `ax-mp` applied to the hypotheses `|- A` and `|- ( A -> B )`.
fn modus_ponens_payload(extra: Option<&str>) -> String {
  let mut p = vec![
    leaf(1, 14, &[6, 1]),
    leaf(2, 15, &[6, 2]),
    leaf(3, 12, &[0, 1]),
    leaf(4, 13, &[0, 3, 1, 4, 2, 5]),
  ];
  p.extend(extra.map(str::to_owned));
  let params = [&[6, 7][..], &[6, 8], &[0, 7], &[0, 3, 7, 4, 8, 5]].map(encode_list).join(" ");
  let subst =
    format!("{} {} {} {}", encode_int(7), encode_list(&[1]), encode_int(8), encode_list(&[2]));
  p.push(record(&[
    "5".into(),
    encode_list(&[1, 2, 3, 4]),
    "10".into(),
    "9".into(),
    params,
    "2".into(),
    encode_list(&[0, 8]),
    subst,
    encode_list(&[0, 2]),
  ]));
  let hyps = [&[0, 1][..], &[0, 3, 1, 4, 2, 5]].map(encode_list).join(" ");
  json!({
    "s": SYMBOLS,
    "t": "T",
    "n": "mpdemo",
    "d": "Modus ponens on concrete formulas.",
    "v": encode_list(&[7, 6, 8, 6]),
    "pa": hyps,
    "r": encode_list(&[0, 2]),
    "p": p,
  })
  .to_string()
}

#[test]
fn decode_whole_assertion() {
  let asrt = decompress_assertion(&modus_ponens_payload(None)).unwrap();
  assert_eq!(asrt.name, "mpdemo");
  assert_eq!(asrt.params.len(), 2);
  assert_eq!(asrt.ret_val, vec!["|-", "B"]);
  assert_eq!(asrt.var_types["ph"], "wff");
  let proof = asrt.proof.unwrap();
  assert_eq!(proof.len(), 5);
  let mp = &proof[4];
  assert_eq!(mp.label, "ax-mp");
  assert_eq!(mp.ty, "$a");
  assert_eq!(mp.essential_args(), &[NodeId(3), NodeId(4)]);
  assert_eq!(mp.substitution.as_ref().unwrap()["ps"], vec!["B"]);
  assert!(proof[..4].iter().all(|n| n.is_leaf()));
}

#[test]
fn single_axiom_step() {
  let node = record(&["0", "", "2", "2", "", "0", "#", "", "#"].map(String::from));
  let payload = json!({ "s": "ph ps ax-1", "t": "T", "n": "demo", "p": [node] }).to_string();
  let proof = decompress_assertion(&payload).unwrap().proof.unwrap();
  assert_eq!(proof[0].label, "ax-1");
  assert_eq!(proof[0].expr, vec!["ph"]);

  let cfg = LayoutConfig::default();
  let view = ProofView::new(&proof, true);
  let d = view.layout(&proof[0], &Default::default(), &cfg).unwrap();
  assert_eq!(d.lines(LineKind::Rule).count(), 1);
  let text_width = cfg.char_width * 2.;
  assert!((d.boundary.width() - (text_width + 2. * cfg.margin)).abs() < 1e-9);
}

#[test]
fn strict_decode_rejects_bad_record() {
  let payload = modus_ponens_payload(Some("6¦¦11"));
  assert!(matches!(
    decompress_assertion(&payload),
    Err(DecodeError::FieldArityMismatch { expected: 9, found: 3, .. })
  ));
}

#[test]
fn layout_visible_steps() {
  let payload = modus_ponens_payload(Some("garbage"));
  let raw = RawAssertion::parse(&payload).unwrap();
  let asrt = raw.header().unwrap();
  let decoded = raw.decompressor().proof_nodes_parallel(raw.records(), 3);
  assert_eq!(decoded.len(), 6);
  assert!(decoded[4].is_err());
  let nodes: Vec<_> = decoded.into_iter().filter_map(Result::ok).collect();

  let cfg = LayoutConfig::default();
  let view = ProofView::new(&nodes, true);
  let ids: Vec<_> = view.steps().iter().map(|n| n.id).collect();
  assert_eq!(ids, [NodeId(3), NodeId(4), NodeId(5)]);

  let colors = var_colors(&asrt.var_types, &cfg);
  let mp = view.steps()[2];
  let d = view.layout(mp, &colors, &cfg).unwrap();
  assert_eq!(d.lines(LineKind::Rule).count(), 1);
  // ph once and ph, ps in the second hypothesis, ps in the conclusion
  assert_eq!(d.lines(LineKind::Connector).count(), 4);

  let links: Vec<_> = (d.primitives.iter())
    .filter_map(|p| match p {
      Primitive::Text { text, link: Some(id), .. } => Some((text.as_str(), *id)),
      _ => None,
    })
    .collect();
  assert_eq!(links, [("1", NodeId(3)), ("2", NodeId(4))]);

  for p in &d.primitives {
    if let Primitive::Text { text, pos, color, bold, .. } = p {
      let b = &d.boundary;
      assert!(b.min_x <= pos.x && pos.x <= b.max_x && b.min_y <= pos.y && pos.y <= b.max_y);
      if text == "ph" || text == "ps" {
        assert!(*bold);
        assert_eq!(color, "blue");
      }
    }
  }
  let (w, h) = d.surface_size(&cfg);
  assert!(w > 0. && h > 0.);
}

#[test]
fn layout_with_types_shown() {
  let payload = modus_ponens_payload(None);
  let asrt = decompress_assertion(&payload).unwrap();
  let proof = asrt.proof.unwrap();
  let cfg = LayoutConfig::default();
  let view = ProofView::new(&proof, false);
  assert_eq!(view.steps().len(), 5);
  let d = view.layout(&proof[4], &Default::default(), &cfg).unwrap();
  // one box pair per variable occurrence: ph, ps, ph, ph, ps, ps
  assert_eq!(d.lines(LineKind::Connector).count(), 6);
}

#[test]
fn assertion_without_proof() {
  let payload = json!({ "s": SYMBOLS, "t": "A", "n": "ax-mp", "r": encode_list(&[0, 8]) });
  let raw = RawAssertion::parse(&payload.to_string()).unwrap();
  assert!(!raw.has_proof());
  assert!(raw.records().is_empty());
  let asrt = raw.decode().unwrap();
  assert!(asrt.proof.is_none());
  assert!(asrt.var_types.is_empty());
  assert_eq!(asrt.ret_val, vec!["|-", "ps"]);
}

#[test]
fn index_payload() {
  let entry = record(&[
    "42".into(),
    "10".into(),
    "ax-mp".into(),
    [&[0, 7][..], &[0, 3, 7, 4, 8, 5]].map(encode_list).join(" "),
    encode_list(&[0, 8]),
    encode_list(&[7, 6, 8, 6]),
  ]);
  let payload = json!({ "strings": SYMBOLS, "elems": [entry] }).to_string();
  let index = decompress_index(&payload).unwrap();
  let e = &index.elems[0];
  assert_eq!(e.id, 42);
  assert_eq!(e.label, "ax-mp");
  assert_eq!(e.ty, "$a");
  assert_eq!(e.hypotheses[1].join(" "), "|- ( ph -> ps )");
  assert_eq!(e.expression, vec!["|-", "ps"]);
  assert_eq!(e.var_types.len(), 2);
}
