use closetag_lib::{
  Configuration,
  CursorPlacement,
  ExcludedTags,
  Outcome,
  Position,
  SkipReason,
  TagEngine,
  balancer::find_unclosed_tags,
  host::{
    Document,
    EditorHost,
  },
  position::split_lines,
};

/// Replays typing `text` into `doc`, notifying the engine the way a host
/// does: arm on `>`, then report the change.
fn type_into(engine: &mut TagEngine, doc: &mut Document, text: &str) -> Vec<Outcome> {
  let mut outcomes = Vec::new();
  for ch in text.chars() {
    doc.type_text(ch.encode_utf8(&mut [0; 4])).unwrap();
    if ch == '>' {
      engine.arm();
    }
    let outcome = engine.handle_editor_changed(doc).unwrap();
    if let Some(token) = outcome.guard() {
      // the host re-notifies for the inserted closing tag before the guard
      // clears
      assert!(!engine.handle_editor_changed(doc).unwrap().is_inserted());
      engine.clear_debounce(token);
    }
    outcomes.push(outcome);
  }
  outcomes
}

fn unclosed(text: &str, config: &Configuration) -> Vec<String> {
  let lines: Vec<_> = split_lines(text).collect();
  find_unclosed_tags(&lines, config)
    .into_iter()
    .map(|record| record.name)
    .collect()
}

#[test]
fn typing_nested_markup_keeps_it_balanced() {
  let mut engine = TagEngine::default();
  let mut doc = Document::new("");

  type_into(&mut engine, &mut doc, "<ul><li>one");
  assert_eq!(doc.text(), "<ul><li>one</li></ul>");
  assert_eq!(doc.cursor(), Position::new(0, 11));
  assert!(unclosed(&doc.text(), engine.config()).is_empty());
}

#[test]
fn typing_with_after_placement() {
  let mut engine = TagEngine::new(Configuration {
    cursor_placement: CursorPlacement::After,
    ..Configuration::default()
  });
  let mut doc = Document::new("");

  type_into(&mut engine, &mut doc, "<b>x");
  assert_eq!(doc.text(), "<b></b>x");
}

#[test]
fn void_and_self_closed_tags_are_left_alone() {
  let mut engine = TagEngine::default();
  let mut doc = Document::new("");

  let outcomes = type_into(&mut engine, &mut doc, "<img src=\"a.png\"><br/><Hr><x-y />");
  assert!(outcomes.iter().all(|outcome| !outcome.is_inserted()));
  assert_eq!(doc.text(), "<img src=\"a.png\"><br/><Hr><x-y />");
}

#[test]
fn paste_closes_the_trailing_tag_only() {
  let mut engine = TagEngine::default();
  let mut doc = Document::new("");

  doc.type_text("<p>intro <em>").unwrap();
  engine.arm();
  engine.handle_editor_changed(&mut doc).unwrap();
  assert_eq!(doc.text(), "<p>intro <em></em>");
}

#[test]
fn excluded_tags_never_close_or_count() {
  let config = Configuration {
    excluded_tags: ExcludedTags::parse("Details"),
    ..Configuration::default()
  };
  let mut engine = TagEngine::new(config.clone());
  let mut doc = Document::new("");

  type_into(&mut engine, &mut doc, "<DETAILS>");
  assert_eq!(doc.text(), "<DETAILS>");
  assert!(unclosed(&doc.text(), &config).is_empty());
  assert_eq!(
    engine.close_nearest_unclosed_tag(&mut doc).unwrap(),
    Outcome::Skipped(SkipReason::NothingUnclosed)
  );
}

#[test]
fn markdown_code_is_respected() {
  let mut engine = TagEngine::new(Configuration {
    skip_fenced_code_blocks: true,
    ..Configuration::default()
  });
  let mut doc = Document::new("");

  type_into(&mut engine, &mut doc, "Use `<div>` here\n```html\n<div>\n```\n<p>");
  assert_eq!(
    doc.text(),
    "Use `<div>` here\n```html\n<div>\n```\n<p></p>"
  );
}

#[test]
fn fenced_close_still_matches_outer_open() {
  let config = Configuration {
    skip_fenced_code_blocks: true,
    ..Configuration::default()
  };
  assert_eq!(unclosed("<div>\n```\n<span></div>\n```", &config), Vec::<String>::new());
  assert_eq!(unclosed("<div>\n```\n<span>\n```", &config), vec!["div"]);
}

#[test]
fn earlier_close_consumes_a_later_open() {
  let mut engine = TagEngine::default();
  let mut doc = Document::with_cursor_at_end("</p>\n<div>\n<p>");

  let outcome = engine.close_nearest_unclosed_tag(&mut doc).unwrap();
  assert!(matches!(outcome, Outcome::Inserted { ref closing, .. } if closing == "</div>"));
  assert_eq!(doc.text(), "</p>\n<div>\n<p></div>");
}

#[test]
fn close_command_walks_back_through_open_tags() {
  let mut engine = TagEngine::new(Configuration {
    cursor_placement: CursorPlacement::After,
    ..Configuration::default()
  });
  let mut doc = Document::with_cursor_at_end("<article>\n<h1>Title</h1>\n<section>\n<p>text");

  let mut closed = Vec::new();
  while let Outcome::Inserted { closing, .. } = engine.close_nearest_unclosed_tag(&mut doc).unwrap() {
    closed.push(closing);
  }

  assert_eq!(closed, vec!["</p>", "</section>", "</article>"]);
  assert_eq!(
    doc.text(),
    "<article>\n<h1>Title</h1>\n<section>\n<p>text</p></section></article>"
  );
  assert_eq!(doc.cursor(), Position::new(3, 31));
}
