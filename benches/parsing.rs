use criterion::{black_box, criterion_group, criterion_main, Criterion};
use exercise_segment_sync::analysis::parse_analysis_response;
use exercise_segment_sync::{extract_video_id, parse_timestamp_range, validate_submission, Config};

/// Benchmark timestamp range parsing
fn bench_timestamp_parsing(c: &mut Criterion) {
    c.bench_function("parse_timestamp_range", |b| {
        b.iter(|| {
            black_box(parse_timestamp_range(black_box("00:01:00-00:02:30")));
        })
    });

    c.bench_function("parse_malformed_range", |b| {
        b.iter(|| {
            black_box(parse_timestamp_range(black_box("bad-00:00:10")));
        })
    });
}

/// Benchmark video URL handling
fn bench_video_urls(c: &mut Criterion) {
    let urls = [
        "https://youtu.be/dQw4w9WgXcQ",
        "https://youtube.com/watch?v=dQw4w9WgXcQ&t=5",
        "https://www.youtube.com/embed/dQw4w9WgXcQ",
        "not a url",
    ];

    c.bench_function("extract_video_id", |b| {
        b.iter(|| {
            for url in &urls {
                black_box(extract_video_id(black_box(url)));
            }
        })
    });

    c.bench_function("validate_submission", |b| {
        b.iter(|| {
            for url in &urls {
                let _ = black_box(validate_submission(black_box(url)));
            }
        })
    });
}

/// Benchmark decoding an analysis response
fn bench_analysis_response(c: &mut Criterion) {
    let body = serde_json::to_string(
        &(0..50)
            .map(|i| {
                serde_json::json!({
                    "name_of_exercise": format!("Exercise {}", i),
                    "description": "Controlled tempo",
                    "timestamp": format!("00:{:02}:00-00:{:02}:30", i, i),
                })
            })
            .collect::<Vec<_>>(),
    )
    .unwrap();

    c.bench_function("parse_analysis_response", |b| {
        b.iter(|| {
            black_box(parse_analysis_response(black_box(&body)).unwrap());
        })
    });
}

/// Benchmark configuration validation
fn bench_config_operations(c: &mut Criterion) {
    c.bench_function("config_validation", |b| {
        let config = Config::default();
        b.iter(|| config.validate())
    });
}

criterion_group!(
    benches,
    bench_timestamp_parsing,
    bench_video_urls,
    bench_analysis_response,
    bench_config_operations
);
criterion_main!(benches);
