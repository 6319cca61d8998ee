//! Property-based invariant tests for measuring, shaping and diffing.
//!
//! 1. Diffing a frame against itself yields no operations.
//! 2. Applying a diff to a simulated terminal reproduces the next frame.
//! 3. Measuring is pure, and a single line measures one row high.
//! 4. Wrapping keeps every character and respects the width.
//! 5. Truncating to the end fills the width exactly and ends in an ellipsis.
//! 6. The static prefix only grows and never changes.

use flexframe::terminal::TerminalWriter;
use flexframe::text::ELLIPSIS;
use flexframe::{
    diff, full_rewrite, measure, wrap_or_truncate, Compositor, DiffStrategy, Frame, Geometry, GeometryMap, Node,
    NodeId, TextCache, TextWrap,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn line_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop_oneof![Just("a"), Just("b"), Just(" "), Just("日"), Just("z")], 0..16)
        .prop_map(|glyphs| glyphs.concat())
}

fn frame_strategy() -> impl Strategy<Value = Frame> {
    prop::collection::vec(line_strategy(), 0..8).prop_map(|rows| Frame::from_text(&rows))
}

fn strategy_strategy() -> impl Strategy<Value = DiffStrategy> {
    prop_oneof![Just(DiffStrategy::Line), Just(DiffStrategy::Run)]
}

fn screen_after(previous: &Frame, next: &Frame, strategy: DiffStrategy) -> Vec<String> {
    let mut parser = vt100::Parser::new(24, 80, 0);
    let mut writer = TerminalWriter::new(Vec::new());
    writer.apply(&full_rewrite(previous, 0)).unwrap();
    writer.apply(&diff(previous, next, strategy)).unwrap();
    writer.flush().unwrap();
    parser.process(writer.get_ref());
    let rows = previous.rows().max(next.rows());
    parser.screen().rows(0, 80).take(rows).map(|row| row.trim_end().to_owned()).collect()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Idempotence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn diff_against_self_is_empty(frame in frame_strategy(), strategy in strategy_strategy()) {
        prop_assert!(diff(&frame, &frame, strategy).is_empty());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Completeness
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn diff_reproduces_next_frame(
        previous in frame_strategy(),
        next in frame_strategy(),
        strategy in strategy_strategy(),
    ) {
        let rows = previous.rows().max(next.rows());
        let mut expected: Vec<String> = next.plain_lines().iter().map(|l| l.trim_end().to_owned()).collect();
        expected.resize(rows, String::new());
        prop_assert_eq!(screen_after(&previous, &next, strategy), expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Measurement purity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn measure_is_pure(text in "[a-z 日\n]{0,40}") {
        prop_assert_eq!(measure(&text), measure(&text));
    }

    #[test]
    fn single_line_is_one_row(text in "[a-z 日]{1,40}") {
        prop_assert_eq!(measure(&text).height, 1);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4 & 5. Wrap vs truncate
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn wrap_keeps_characters(text in "[a-z ]{1,60}", width in 1usize..20) {
        let wrapped = wrap_or_truncate(&text, width, TextWrap::Wrap);
        for line in wrapped.split('\n') {
            prop_assert!(measure(line).width <= width, "{line:?} wider than {width}");
        }
        prop_assert_eq!(wrapped.replace('\n', ""), text);
    }

    #[test]
    fn truncate_end_fills_width(text in "[a-z ]{2,60}", width in 1usize..20) {
        prop_assume!(text.len() > width);
        let cut = wrap_or_truncate(&text, width, TextWrap::TruncateEnd);
        prop_assert_eq!(measure(&cut).width, width);
        prop_assert!(cut.ends_with(ELLIPSIS));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Static monotonicity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn static_prefix_only_grows(batches in prop::collection::vec(0usize..3, 1..6)) {
        let mut compositor = Compositor::new();
        let mut text = TextCache::new();
        let mut layout = GeometryMap::new().with(NodeId(0), Geometry::new(0, 0, 20, 1));
        layout.insert(NodeId(1), Geometry::new(0, 0, 20, 1));

        let mut logged = 0u64;
        let mut before: Option<Frame> = None;
        for (pass, batch) in batches.into_iter().enumerate() {
            logged += batch as u64;
            let mut tree = Node::root(NodeId(0));
            for id in 100..100 + logged {
                layout.insert(NodeId(id), Geometry::new(0, 0, 20, 1));
                tree = tree.child(Node::text_with(NodeId(id), format!("entry {id}")).into_static());
            }
            tree = tree.child(Node::text_with(NodeId(1), format!("pass {pass}")));

            text.advance_epoch();
            let frame = compositor.commit(compositor.composite(&tree, &layout, &mut text).unwrap());
            prop_assert_eq!(frame.static_rows(), usize::try_from(logged).unwrap());
            if let Some(before) = before {
                prop_assert!(frame.static_rows() >= before.static_rows());
                prop_assert_eq!(&frame.static_lines()[..before.static_rows()], before.static_lines());
            }
            before = Some(frame);
        }
    }
}
