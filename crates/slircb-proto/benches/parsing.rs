//! Benchmarks for IRC message parsing and action encoding.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use slircb_proto::{encode, Action, Message};

/// Simple PING message
const SIMPLE_MESSAGE: &str = "PING :irc.example.com";

/// Message with prefix
const PREFIX_MESSAGE: &str = ":nick!user@host PRIVMSG #channel :Hello, world!";

/// Numeric response
const NUMERIC_RESPONSE: &str =
    ":irc.server.net 001 nickname :Welcome to the IRC Network nickname!user@host";

fn benchmark_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Message Parsing");

    group.bench_function("simple_ping", |b| {
        b.iter(|| {
            let msg: Message = black_box(SIMPLE_MESSAGE).parse().unwrap();
            black_box(msg)
        })
    });

    group.bench_function("with_prefix", |b| {
        b.iter(|| {
            let msg: Message = black_box(PREFIX_MESSAGE).parse().unwrap();
            black_box(msg)
        })
    });

    group.bench_function("numeric_response", |b| {
        b.iter(|| {
            let msg: Message = black_box(NUMERIC_RESPONSE).parse().unwrap();
            black_box(msg)
        })
    });

    group.finish();
}

fn benchmark_serialization(c: &mut Criterion) {
    let msg: Message = PREFIX_MESSAGE.parse().unwrap();

    c.bench_function("serialize_privmsg", |b| {
        b.iter(|| black_box(&msg).to_string())
    });
}

fn benchmark_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("Action Encoding");

    let origin: Message = PREFIX_MESSAGE.parse().unwrap();
    let long_text = "lorem ipsum dolor sit amet consectetur ".repeat(40);

    group.bench_function("privmsg_short", |b| {
        b.iter(|| encode(Action::privmsg("#channel", "Hello, world!"), None).unwrap())
    });

    group.bench_function("privmsg_long_split", |b| {
        b.iter(|| encode(Action::privmsg("#channel", long_text.clone()), None).unwrap())
    });

    group.bench_function("reply", |b| {
        b.iter(|| encode(Action::reply("Hello back!"), Some(black_box(&origin))).unwrap())
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_parsing,
    benchmark_serialization,
    benchmark_encoding
);
criterion_main!(benches);
