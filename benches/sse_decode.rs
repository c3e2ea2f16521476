use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use topicstream::core::sse::SseDecoder;

fn make_body(events: usize, payload: &str) -> Vec<u8> {
    let mut body = String::new();
    for i in 0..events {
        if i % 16 == 0 {
            body.push_str(": keep-alive\n");
        }
        body.push_str("data: ");
        body.push_str(payload);
        body.push_str("\r\n\r\n");
    }
    body.push_str("data: [DONE]\n\n");
    body.into_bytes()
}

fn decode_in_chunks(body: &[u8], chunk_size: usize) -> usize {
    let mut decoder = SseDecoder::new();
    let mut dispatched = 0;
    for chunk in body.chunks(chunk_size) {
        dispatched += decoder.feed(chunk).len();
    }
    dispatched
}

fn bench_sse_decode(c: &mut Criterion) {
    let payload = "lorem ipsum dolor sit amet consectetur adipiscing elit ";

    for &events in &[200usize, 2000usize] {
        let body = make_body(events, payload);
        let mut group = c.benchmark_group(format!("sse_decode_events{events}"));
        group.throughput(Throughput::Bytes(body.len() as u64));

        // Small reads model a slow trickle; large ones a buffered burst.
        for &chunk_size in &[7usize, 64, 4096] {
            group.bench_with_input(
                BenchmarkId::new("chunk", chunk_size),
                &chunk_size,
                |b, &chunk_size| b.iter(|| decode_in_chunks(black_box(&body), chunk_size)),
            );
        }
        group.finish();
    }
}

criterion_group!(benches, bench_sse_decode);
criterion_main!(benches);
