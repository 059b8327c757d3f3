//! Benchmarks for fusion, chart sampling, and waveform synthesis at varying
//! observation counts.
//!
//! Run with: `cargo bench --bench fusion_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use etho::analyze::{AnalysisResult, FusionEngine};
use etho::annotate::{TimelineSampler, WaveformSynthesizer};

/// Build an analysis result with `n` observations per source, spread across
/// a video of `n` seconds so roughly half of the lower sources collide.
fn generate_analysis(n: usize) -> AnalysisResult {
    let timeline: Vec<String> = (0..n)
        .map(|i| format!(r#"{{"timestamp": {i}, "event": "Ears forward {i}"}}"#))
        .collect();
    let lines: Vec<String> = (0..n)
        .map(|i| format!(r#"{{"timestamp": {}.5, "pet_pov": "Thinking {i}"}}"#, i))
        .collect();
    let vocal: Vec<String> = (0..n)
        .map(|i| {
            format!(
                r#"{{"timestamp_start": "{}:{:02}", "type": "Bark", "subtype": "demand"}}"#,
                (i * 2) / 60,
                (i * 2) % 60
            )
        })
        .collect();

    let json = format!(
        r#"{{
            "overall_assessment": {{"distress_score": 55}},
            "timeline": [{}],
            "interpret_lines": [{}],
            "audio_analysis": {{"vocalizations_detected": [{}]}}
        }}"#,
        timeline.join(","),
        lines.join(","),
        vocal.join(",")
    );
    AnalysisResult::from_json(&json).expect("generated analysis should parse")
}

fn bench_fusion(c: &mut Criterion) {
    let mut group = c.benchmark_group("fuse");
    let engine = FusionEngine::new();

    for n in [10, 100, 1000] {
        let analysis = generate_analysis(n);
        group.throughput(Throughput::Elements(n as u64 * 3));
        group.bench_with_input(BenchmarkId::from_parameter(n), &analysis, |b, a| {
            b.iter(|| engine.fuse(black_box(a)));
        });
    }

    group.finish();
}

fn bench_chart(c: &mut Criterion) {
    let mut group = c.benchmark_group("chart_sample");
    let sampler = TimelineSampler::new();

    for n in [10, 100, 1000] {
        let markers = FusionEngine::new().fuse(&generate_analysis(n));
        #[allow(clippy::cast_precision_loss)]
        let duration = n as f64;
        group.bench_with_input(BenchmarkId::from_parameter(n), &markers, |b, m| {
            b.iter(|| sampler.sample(black_box(m), duration, 55.0));
        });
    }

    group.finish();
}

fn bench_waveform(c: &mut Criterion) {
    let mut group = c.benchmark_group("waveform_synthesize");
    let synth = WaveformSynthesizer::new();

    for n in [10, 100, 1000] {
        let analysis = generate_analysis(n);
        let events = synth.intervals(&analysis.audio_analysis, Some("front door"));
        #[allow(clippy::cast_precision_loss)]
        let duration = (n * 2) as f64;
        group.bench_with_input(BenchmarkId::from_parameter(n), &events, |b, e| {
            b.iter(|| synth.synthesize(black_box(e), duration));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fusion, bench_chart, bench_waveform);
criterion_main!(benches);
