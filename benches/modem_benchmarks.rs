// ABOUTME: Benchmark suite for the emulated modem's hot paths
// ABOUTME: Measures GSM text coding, command table lookup, reply encoding and framing

use bytes::BytesMut;
use chrono::{FixedOffset, TimeZone};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ctc_heatpump::codec::{self, Encodable};
use ctc_heatpump::command::CommandTable;
use ctc_heatpump::datatypes::{PhoneNumber, Reply, ScTimestamp};
use ctc_heatpump::frame;
use ctc_heatpump::session::ScriptedTransport;
use std::time::Duration;

const TELEMETRY: &str = "Driftdata: Rum 21.5 Ute -3.0 Fram 35.2 Retur 30.1 Tappvarmvatten 52 [ok] {ok} 5€";

fn sample_texts() -> Vec<(&'static str, String)> {
    vec![
        ("short", "rum21".to_string()),
        ("telemetry", TELEMETRY.to_string()),
        ("long", TELEMETRY.repeat(5)),
    ]
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("gsm_encode");
    group.measurement_time(Duration::from_secs(5));

    for (name, text) in sample_texts() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &text, |b, text| {
            let mut buf = BytesMut::with_capacity(1024);
            b.iter(|| {
                buf.clear();
                codec::encode_into(black_box(text), &mut buf);
            })
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("gsm_decode");
    group.measurement_time(Duration::from_secs(5));

    for (name, text) in sample_texts() {
        let bytes = codec::encode(&text);
        group.bench_with_input(BenchmarkId::from_parameter(name), &bytes, |b, bytes| {
            b.iter(|| codec::decode(black_box(bytes)))
        });
    }

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("command_lookup");
    let table = CommandTable::standard();

    group.bench_function("exact", |b| {
        b.iter(|| table.lookup(black_box(b"at+cmgl=\"REC UNREAD\"\r\n")))
    });

    group.bench_function("delete_pattern", |b| {
        b.iter(|| table.lookup(black_box(b"at+cmgd= 16\r\n")))
    });

    group.bench_function("send_pattern", |b| {
        b.iter(|| table.lookup(black_box(b"at+cmgs=\"+46701111111\"\r\n")))
    });

    group.bench_function("miss", |b| {
        b.iter(|| table.lookup(black_box(b"at+cgmi\r\n")))
    });

    group.finish();
}

fn bench_replies(c: &mut Criterion) {
    let mut group = c.benchmark_group("reply_encode");
    let at = FixedOffset::east_opt(3600)
        .unwrap()
        .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
        .unwrap();
    let header = Reply::CmglHeader {
        index: 1,
        sender: PhoneNumber::new("+46701111111").unwrap(),
        timestamp: ScTimestamp::from_datetime(&at),
    };
    let cpms = Reply::Cpms { slots: 16, used: 1 };
    let text = Reply::Text("aktiveranummer".to_string());

    group.bench_function("cmgl_header", |b| b.iter(|| black_box(&header).to_bytes()));
    group.bench_function("cpms", |b| b.iter(|| black_box(&cpms).to_bytes()));
    group.bench_function("text", |b| b.iter(|| black_box(&text).to_bytes()));

    group.finish();
}

fn bench_framing(c: &mut Criterion) {
    let mut group = c.benchmark_group("framing");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();

    let clean = b"at+cmgl=\"REC UNREAD\"\r\n".to_vec();
    let mut noisy = b"\r\nATZ\r\n~~~~~~~~~~~~~~~~~~~~\r\n".repeat(4);
    noisy.extend_from_slice(&clean);

    for (name, input) in [("clean", clean), ("noisy", noisy)] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &input, |b, input| {
            b.iter(|| {
                runtime.block_on(async {
                    let mut transport = ScriptedTransport::new(black_box(input));
                    frame::read_command(&mut transport).await.unwrap()
                })
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_encode,
    bench_decode,
    bench_lookup,
    bench_replies,
    bench_framing
);
criterion_main!(benches);
