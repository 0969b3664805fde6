use ap_signature::header;
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

const MASTODON_HEADER: &str = r#"keyId="https://example.com/@alice#main-key",algorithm="rsa-sha256",headers="(request-target) date host digest",signature="CzoFhKVnsKCJtVl1KzWcM/3GekMRf8oe6MvubQ6LWA2Md+eRHXsLAY55ZaT5HnNjxG9p4S08rWAoFcGgHKH5nBHxGsmB9EAR8LW3h3aUNQUH9lL2kZGRwa48DdqUYoEq8G5/5OciKz0gkRXwJIKxvPUH+PqHhZVUIlgPKNJ5mE96PtCI06899TtQTS+A/T/maxYpZYb57QFHAJncl8JVvG1HNvNbJayCR0hy5ZT4rHxO7qutnaliH0seNQxHff/3mRopFutZBgCU8wsTSp0/OHPnbq65T6NhIdYikugMQOtpikiWF0Py011OQwB1iqGc5o60aRj08t75DCg//ChuiQ==""#;
const CAVAGE_HEADER: &str = r#"keyId="Test",algorithm="rsa-sha256",created=1402170695, expires=1402170699,headers="(request-target) (created) (expires) host date content-type digest content-length",signature="vSdrb+dS3EceC9bcwHSo4MlyKS59iFIrhgYkz8+oVLEEzmYZZvRs8rgOp+63LEM3v+MFHB32NfpB2bEKBIvB1q52LaEUHFv120V01IL+TAD48XaERZFukWgHoBTLMhYS2Gb51gWxpeIq8knRmPnYePbF5MOkR0Zkly4zKH7s1dE=""#;

fn signature_header(c: &mut Criterion) {
    c.bench_function("parse_signature_header", |b| {
        b.iter(|| {
            let _ = black_box(header::parse(black_box(MASTODON_HEADER)));
        });
    });
}

fn authorization_header(c: &mut Criterion) {
    let authorization = format!("Signature {CAVAGE_HEADER}");

    c.bench_function("parse_authorization_header", |b| {
        b.iter(|| {
            let _ = black_box(header::parse(black_box(&authorization)));
        });
    });
}

criterion_group!(parse_signature_header, signature_header, authorization_header);
criterion_main!(parse_signature_header);
