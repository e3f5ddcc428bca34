//! Performance benchmarks for navgate
//!
//! Run with: cargo bench

use criterion::{criterion_group, criterion_main, Criterion};
use navgate::{
    AttemptParams, Decision, NavigationAttempt, NoEmbedderThrottles, NoopDelegate, Origin,
    PageTransition, Referrer, RenderContextId, ResponseHeaders, ScriptedThrottle,
};
use std::rc::Rc;

fn attempt_with_throttles(count: usize) -> NavigationAttempt {
    let mut attempt = NavigationAttempt::new(
        AttemptParams::new("https://example.com/"),
        Rc::new(NoopDelegate),
        Box::new(NoEmbedderThrottles),
    );
    for _ in 0..count {
        attempt.register_throttle(ScriptedThrottle::new("bench").boxed());
    }
    attempt
}

fn bench_attempt_creation(c: &mut Criterion) {
    c.bench_function("NavigationAttempt::new", |b| {
        b.iter(|| {
            NavigationAttempt::new(
                AttemptParams::new("https://example.com/"),
                Rc::new(NoopDelegate),
                Box::new(NoEmbedderThrottles),
            )
        });
    });
}

fn bench_start_stage(c: &mut Criterion) {
    let mut group = c.benchmark_group("start_stage");
    for count in [1, 8, 64] {
        group.bench_function(format!("{} throttles", count), |b| {
            b.iter(|| {
                let mut attempt = attempt_with_throttles(count);
                attempt.will_start_request(
                    "GET",
                    Referrer::default(),
                    false,
                    PageTransition::Link,
                    false,
                    Box::new(|_| {}),
                );
                attempt.state()
            });
        });
    }
    group.finish();
}

fn bench_defer_resume(c: &mut Criterion) {
    c.bench_function("defer and resume", |b| {
        b.iter(|| {
            let mut attempt = attempt_with_throttles(4);
            attempt.register_throttle(
                ScriptedThrottle::new("deferrer").on_start(Decision::Defer).boxed(),
            );
            attempt.will_start_request(
                "GET",
                Referrer::default(),
                false,
                PageTransition::Link,
                false,
                Box::new(|_| {}),
            );
            attempt.resume();
            attempt.state()
        });
    });
}

fn bench_ancestor_policy_evaluation(c: &mut Criterion) {
    let headers = ResponseHeaders::new()
        .with("Content-Type", "text/html")
        .with("X-Frame-Options", "SAMEORIGIN");

    c.bench_function("ancestor policy response stage", |b| {
        b.iter(|| {
            let mut attempt = NavigationAttempt::new(
                AttemptParams::new("https://widget.example.com/embed").subframe(vec![
                    Origin::parse("https://widget.example.com/").unwrap(),
                ]),
                Rc::new(NoopDelegate),
                Box::new(NoEmbedderThrottles),
            );
            attempt.will_start_request(
                "GET",
                Referrer::default(),
                false,
                PageTransition::AutoSubframe,
                false,
                Box::new(|_| {}),
            );
            attempt.will_process_response(RenderContextId(1), Some(headers.clone()), Box::new(|_| {}));
            attempt.state()
        });
    });
}

criterion_group!(
    benches,
    bench_attempt_creation,
    bench_start_stage,
    bench_defer_resume,
    bench_ancestor_policy_evaluation,
);
criterion_main!(benches);
