//! Benchmarks for attributed buffer operations
//!
//! Run with: cargo bench buffer_operations

use richedit::editable::{AttributeKey, AttributeValue, AttributedBuffer, Attributes, Color, Font};
use richedit::services::{DataDetector, DetectorTypes, RegexDataDetector};

#[global_allocator]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

fn main() {
    divan::main();
}

fn plain(lines: usize) -> AttributedBuffer {
    AttributedBuffer::from_text(&"The quick brown fox jumps over the lazy dog.\n".repeat(lines))
}

/// Every other word colored, so the run list is long
fn striped(lines: usize) -> AttributedBuffer {
    let mut buffer = plain(lines);
    let red = AttributeValue::Color(Color::rgb(200, 0, 0));
    let mut offset = 0;
    while offset + 5 < buffer.len() {
        buffer.set_attribute(AttributeKey::ForegroundColor, red.clone(), offset..offset + 5);
        offset += 10;
    }
    buffer
}

// ============================================================================
// Replace operations
// ============================================================================

#[divan::bench(args = [100, 1000, 10_000])]
fn insert_middle(bencher: divan::Bencher, lines: usize) {
    bencher
        .with_inputs(|| plain(lines))
        .bench_local_values(|mut buffer| {
            let pos = buffer.len() / 2;
            buffer.replace(pos..pos, divan::black_box("inserted text"));
            buffer
        });
}

#[divan::bench(args = [100, 1000])]
fn insert_middle_striped(bencher: divan::Bencher, lines: usize) {
    bencher
        .with_inputs(|| striped(lines))
        .bench_local_values(|mut buffer| {
            let pos = buffer.len() / 2;
            buffer.replace(pos..pos, divan::black_box("x"));
            buffer
        });
}

#[divan::bench]
fn delete_range_striped() {
    let mut buffer = striped(1000);
    let start = buffer.len() / 2;
    buffer.replace(start..start + 100, "");
    divan::black_box(buffer);
}

#[divan::bench]
fn replace_attributed_middle() {
    let mut buffer = striped(1000);
    let insert = AttributedBuffer::with_attributes(
        "styled insert",
        Attributes::new().with(AttributeKey::Font, AttributeValue::Font(Font::system(20.0))),
    );
    let pos = buffer.len() / 2;
    buffer.replace_attributed(pos..pos + 4, &insert);
    divan::black_box(buffer);
}

// ============================================================================
// Attribute queries
// ============================================================================

#[divan::bench(args = [10, 1000, 40_000])]
fn attributes_at(offset: usize) {
    let buffer = striped(1000);
    divan::black_box(buffer.attributes_at(offset));
}

#[divan::bench]
fn longest_effective_range_middle() {
    let buffer = striped(1000);
    let offset = buffer.len() / 2;
    divan::black_box(buffer.longest_effective_range(&AttributeKey::ForegroundColor, offset));
}

#[divan::bench]
fn attribute_spans_whole_text() {
    let buffer = striped(1000);
    divan::black_box(buffer.attribute_spans(&AttributeKey::ForegroundColor, 0..buffer.len()));
}

#[divan::bench]
fn set_all_attributes() {
    let mut buffer = striped(1000);
    buffer.set_all_attributes(AttributeKey::Font, AttributeValue::Font(Font::system(14.0)));
    divan::black_box(buffer);
}

// ============================================================================
// Data detection
// ============================================================================

#[divan::bench(args = [10, 100])]
fn detect_links(lines: usize) {
    let text = "Call 555-123-4567 or visit https://example.com/docs on 2024-05-01.\n".repeat(lines);
    let detector = RegexDataDetector::new(DetectorTypes::all());
    if let Some(detector) = detector {
        divan::black_box(detector.detect(&text));
    }
}
