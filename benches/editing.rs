//! Benchmarks for text view editing paths: typing, undo, layout, hit-testing
//!
//! Run with: cargo bench editing

use std::rc::Rc;

use richedit::editable::{AttributedBuffer, TextPosition, TextRange};
use richedit::geometry::{EdgeInsets, Point, Rect, Size};
use richedit::layout::{Container, LayoutEngine};
use richedit::messages::{EditMsg, InputMsg, ResponderMsg, ViewportMsg};
use richedit::protocol::TextInput;
use richedit::{update, MonospaceLayoutEngine, MonospaceMetrics, Services, TextView};

#[global_allocator]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

fn main() {
    divan::main();
}

fn sample_text(lines: usize) -> String {
    "The quick brown fox jumps over the lazy dog.\n".repeat(lines)
}

fn make_view(lines: usize) -> TextView {
    let engine = Rc::new(MonospaceLayoutEngine::new(MonospaceMetrics::default()));
    let mut view = TextView::new(&Services::new(), engine);
    update(&mut view, ViewportMsg::SetFrame(Rect::new(0.0, 0.0, 390.0, 844.0)).into());
    view.set_text(&sample_text(lines));
    update(&mut view, ResponderMsg::Become.into());
    view
}

// ============================================================================
// Typing
// ============================================================================

#[divan::bench(args = [10, 100, 1000])]
fn type_one_char_at_end(bencher: divan::Bencher, lines: usize) {
    let mut view = make_view(lines);
    bencher.bench_local(|| {
        let cmd = update(&mut view, InputMsg::InsertText("x".into()).into());
        divan::black_box(cmd)
    });
}

#[divan::bench(args = [10, 100, 1000])]
fn type_word_in_middle(bencher: divan::Bencher, lines: usize) {
    let mut view = make_view(lines);
    let middle = view.text().chars().count() / 2;
    view.set_selected_range(middle..middle);
    view.flush();
    bencher.bench_local(|| {
        for ch in ["h", "e", "l", "l", "o"] {
            update(&mut view, InputMsg::InsertText(ch.into()).into());
        }
    });
}

#[divan::bench(args = [10, 100])]
fn marked_text_composition(bencher: divan::Bencher, lines: usize) {
    let mut view = make_view(lines);
    bencher.bench_local(|| {
        for text in ["k", "ka", "kan"] {
            view.set_marked_text(text, TextRange::with_range(text.len(), 0));
        }
        view.unmark_text();
    });
}

// ============================================================================
// Undo
// ============================================================================

#[divan::bench(args = [10, 100, 1000])]
fn undo_redo_cycle(bencher: divan::Bencher, lines: usize) {
    let mut view = make_view(lines);
    update(&mut view, InputMsg::InsertText("edit".into()).into());
    bencher.bench_local(|| {
        update(&mut view, EditMsg::Undo.into());
        update(&mut view, EditMsg::Redo.into());
    });
}

// ============================================================================
// Layout and hit-testing
// ============================================================================

#[divan::bench(args = [10, 100, 1000])]
fn full_layout(bencher: divan::Bencher, lines: usize) {
    let engine = MonospaceLayoutEngine::new(MonospaceMetrics::default());
    let text = AttributedBuffer::from_text(&sample_text(lines));
    let container = Container::new(Size::new(390.0, 1_048_576.0), EdgeInsets::DEFAULT);
    bencher.bench_local(|| divan::black_box(engine.layout(&text, &container)));
}

#[divan::bench(args = [10, 1000])]
fn closest_position(bencher: divan::Bencher, lines: usize) {
    let mut view = make_view(lines);
    let point = Point::new(120.0, 6.0 + 16.0 * (lines as f64 / 2.0));
    bencher.bench_local(|| divan::black_box(view.closest_position(point)));
}

#[divan::bench(args = [10, 1000])]
fn selection_rects_half_text(bencher: divan::Bencher, lines: usize) {
    let mut view = make_view(lines);
    let len = view.text().chars().count();
    let range = TextRange::with_range(len / 4, len / 2);
    bencher.bench_local(|| divan::black_box(view.selection_rects(range)));
}

#[divan::bench]
fn caret_rect_end_of_text() {
    let mut view = make_view(1000);
    let end = view.text().chars().count();
    divan::black_box(view.caret_rect(TextPosition::new(end)));
}
