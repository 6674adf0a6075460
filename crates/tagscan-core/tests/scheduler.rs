use pretty_assertions::assert_eq;
use std::time::{Duration, Instant};
use tagscan_core::{
    DecorationMap, PollOutcome, Position, ScanConfig, ScanScheduler, SourceDocument, TagEngine,
    TextRange,
};

fn large_document() -> SourceDocument {
    let mut text = String::new();
    for i in 0..1000 {
        match i {
            10 => text.push_str("// TODO early\n"),
            505 => text.push_str("    // ! visible\n"),
            _ => text.push_str(&format!("let v{i} = {i};\n")),
        }
    }
    let mut doc = SourceDocument::new("rust", &text);
    doc.set_visible_ranges(vec![TextRange::lines(500, 510)]);
    doc
}

#[test]
fn test_viewport_pass_then_full_document_pass() {
    let mut engine = TagEngine::with_defaults();
    let doc = large_document();
    let mut sink = DecorationMap::new();
    let mut scheduler = ScanScheduler::new();

    let t0 = Instant::now();
    scheduler.request(&engine, t0);
    let debounce_due = t0 + Duration::from_millis(100);
    assert_eq!(
        scheduler.poll(t0, &mut engine, &doc, &mut sink),
        PollOutcome::Waiting(debounce_due)
    );
    assert_eq!(sink.updates(), 0);

    assert_eq!(
        scheduler.poll(debounce_due, &mut engine, &doc, &mut sink),
        PollOutcome::ViewportApplied
    );
    assert_eq!(
        sink.get("!"),
        &[TextRange::new(Position::new(505, 7), Position::new(505, 16))]
    );
    assert!(sink.get("todo").is_empty());

    let refine_due = debounce_due + Duration::from_millis(100);
    assert_eq!(scheduler.next_deadline(), Some(refine_due));
    assert_eq!(
        scheduler.poll(refine_due, &mut engine, &doc, &mut sink),
        PollOutcome::DocumentApplied
    );
    assert_eq!(
        sink.get("todo"),
        &[TextRange::new(Position::new(10, 3), Position::new(10, 13))]
    );
    assert_eq!(sink.get("!").len(), 1);

    assert_eq!(
        scheduler.poll(refine_due, &mut engine, &doc, &mut sink),
        PollOutcome::Idle
    );
    assert!(scheduler.is_idle());
}

#[test]
fn test_new_request_supersedes_pending_refinement() {
    let mut engine = TagEngine::with_defaults();
    let doc = large_document();
    let mut sink = DecorationMap::new();
    let mut scheduler = ScanScheduler::new();

    let t0 = Instant::now();
    scheduler.request_after(Duration::ZERO, t0);
    assert_eq!(
        scheduler.poll(t0, &mut engine, &doc, &mut sink),
        PollOutcome::ViewportApplied
    );

    let t1 = t0 + Duration::from_millis(50);
    scheduler.request(&engine, t1);
    assert_eq!(
        scheduler.poll(t0 + Duration::from_millis(100), &mut engine, &doc, &mut sink),
        PollOutcome::Waiting(t1 + Duration::from_millis(100))
    );
    assert!(sink.get("todo").is_empty());
}

#[test]
fn test_configuration_change_cancels_refinement() {
    let mut engine = TagEngine::with_defaults();
    let doc = large_document();
    let mut sink = DecorationMap::new();
    let mut scheduler = ScanScheduler::new();

    let t0 = Instant::now();
    scheduler.request_after(Duration::ZERO, t0);
    assert_eq!(
        scheduler.poll(t0, &mut engine, &doc, &mut sink),
        PollOutcome::ViewportApplied
    );
    let updates = sink.updates();

    engine.refresh(ScanConfig::default());
    let due = scheduler.next_deadline().unwrap();
    assert_eq!(
        scheduler.poll(due, &mut engine, &doc, &mut sink),
        PollOutcome::Cancelled
    );
    assert_eq!(sink.updates(), updates);
    assert!(scheduler.is_idle());
}

#[test]
fn test_small_document_skips_refinement() {
    let mut engine = TagEngine::with_defaults();
    let doc = SourceDocument::new("go", "package main\n// ? question\n");
    let mut sink = DecorationMap::new();
    let mut scheduler = ScanScheduler::new();

    let t0 = Instant::now();
    scheduler.request_after(Duration::ZERO, t0);
    assert_eq!(
        scheduler.poll(t0, &mut engine, &doc, &mut sink),
        PollOutcome::ViewportApplied
    );
    assert_eq!(sink.get("?").len(), 1);
    assert!(scheduler.is_idle());

    let tags: Vec<&str> = sink.tag_names().collect();
    assert_eq!(tags, vec!["!", "*", "//", "?", "todo"]);
}
