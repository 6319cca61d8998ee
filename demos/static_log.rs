//! Static Log Demo: Build output scrolling above a live status box.
//!
//! Each finished step is appended as a static node, written once into the
//! scrollback. Below it a bordered box with a spinner and a progress line
//! is redrawn every pass with minimal cell runs.
//!
//! A real application gets geometry from a flexbox solver. This demo stacks
//! children in a column by hand, asking the pass to measure text so wrapped
//! lines get the rows they need.
//!
//! Set `RUST_LOG=flexframe=debug` to see per-pass statistics on stderr.

use flexframe::{
    BorderStyle, DiffStrategy, Edges, Geometry, GeometryMap, Node, NodeId, NodeKind, Pass, Renderer, RendererConfig,
    Style, TextWrap,
};
use std::io::Write;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const WIDTH: u16 = 60;
const STEPS: &[&str] = &[
    "Resolving dependencies",
    "Compiling unicode-width v0.2.0",
    "Compiling crossterm v0.28.1",
    "Compiling a crate whose name is long enough that the log line has to wrap onto a second row",
    "Running tests",
    "Packaging",
];
const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Clamp a measured row count into solver units.
fn rows(height: usize) -> i32 {
    i32::try_from(height).unwrap_or(i32::MAX)
}

/// Stack the children of `root` in a column, measuring text nodes.
fn column_layout<W: Write>(pass: &mut Pass<'_, W>, root: &Node) -> flexframe::Result<GeometryMap> {
    let width = i32::from(WIDTH);
    let mut layout = GeometryMap::new();
    let mut y = 0;
    for child in &root.children {
        let height = if child.kind == NodeKind::Box {
            // Border plus padding on each side, one measured block per child.
            let mut inner = 0;
            for text in &child.children {
                let size = pass.measure_text_node(text, usize::from(WIDTH - 4))?;
                layout.insert(text.id, Geometry::new(2, 1 + inner, width - 4, rows(size.height)));
                inner += rows(size.height);
            }
            let outer = Geometry::new(0, y, width, inner + 2)
                .with_border(Edges::all(1))
                .with_padding(Edges::new(0, 1, 0, 1));
            layout.insert(child.id, outer);
            inner + 2
        } else {
            let size = pass.measure_text_node(child, usize::from(WIDTH))?;
            layout.insert(child.id, Geometry::new(0, y, width, rows(size.height)));
            rows(size.height)
        };
        // Static children go to the scrollback, not into the root's rows.
        if !child.is_static() {
            y += height;
        }
    }
    layout.insert(root.id, Geometry::new(0, 0, width, y));
    Ok(layout)
}

fn build_tree(done: usize, tick: usize) -> Node {
    let mut root = Node::root(NodeId(0));
    for (i, step) in STEPS.iter().take(done).enumerate() {
        let line = Node::text(NodeId(100 + i as u64))
            .child(Node::virtual_text(NodeId(200 + i as u64)).styled(Style::new().color("green")).child(Node::leaf("✔ ")))
            .child(Node::leaf(*step));
        root = root.child(line.into_static());
    }

    let status = if done < STEPS.len() {
        format!("{} {}", SPINNER[tick % SPINNER.len()], STEPS[done])
    } else {
        "Finished".to_owned()
    };
    let progress = format!("{done}/{} steps", STEPS.len());
    root.child(
        Node::boxed(NodeId(1))
            .styled(Style::new().border(BorderStyle::Round).border_color("cyan"))
            .child(Node::text_with(NodeId(2), status).styled(Style::new().color("yellow")))
            .child(Node::text_with(NodeId(3), progress).styled(Style::new().wrap(TextWrap::TruncateEnd))),
    )
}

fn main() -> flexframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut renderer = Renderer::stdout(RendererConfig::default().with_incremental(DiffStrategy::Run));

    for tick in 0..=STEPS.len() * 8 {
        let done = (tick / 8).min(STEPS.len());
        let tree = build_tree(done, tick);
        let mut pass = renderer.begin_pass()?;
        let layout = column_layout(&mut pass, &tree)?;
        pass.commit(&tree, &layout)?;
        std::thread::sleep(Duration::from_millis(80));
    }

    let stats = renderer.stats().clone();
    renderer.unmount()?;
    println!(
        "{} passes, {} ops, {} bytes written",
        stats.passes, stats.ops_emitted, stats.bytes_written
    );
    Ok(())
}
