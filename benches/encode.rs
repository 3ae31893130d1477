use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gifscribe::glyph::FontSpec;
use gifscribe::Converter;

const TEXT: &str = "The quick brown fox jumps over the lazy dog. 0123456789";

fn convert_text(crit: &mut Criterion) {
    let conv = Converter::default().with_loop_count(Some(0));
    crit.bench_function("convert_48pt", |b| {
        b.iter(|| {
            let mut gif = Vec::with_capacity(1 << 16);
            conv.convert_str(black_box(TEXT), &mut gif).unwrap();
            black_box(gif);
        })
    });
    let conv = Converter::default().with_font(FontSpec::new("Monospace", 12));
    crit.bench_function("convert_12pt", |b| {
        b.iter(|| {
            let mut gif = Vec::with_capacity(1 << 14);
            conv.convert_str(black_box(TEXT), &mut gif).unwrap();
            black_box(gif);
        })
    });
}

criterion_group!(benches, convert_text);
criterion_main!(benches);
