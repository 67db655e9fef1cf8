//! Stream benchmarks.
//!
//! Compares buffered against unbuffered byte-at-a-time output, and
//! measures bulk round-trips through the memory backend.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use xio_core::{BufMode, Stream};

fn bench_put_buffered(c: &mut Criterion) {
    c.bench_function("put_4k_buffered", |b| {
        b.iter(|| {
            let mut stream = Stream::memory();
            for byte in 0..4096u32 {
                stream.put(black_box(byte as u8)).unwrap();
            }
            stream.flush().unwrap();
        });
    });
}

fn bench_put_unbuffered(c: &mut Criterion) {
    c.bench_function("put_4k_unbuffered", |b| {
        b.iter(|| {
            let mut stream = Stream::memory();
            stream.set_buffer(None, BufMode::None, 0).unwrap();
            for byte in 0..4096u32 {
                stream.put(black_box(byte as u8)).unwrap();
            }
        });
    });
}

fn bench_bulk_roundtrip(c: &mut Criterion) {
    let payload = vec![0xabu8; 64 * 1024];
    c.bench_function("roundtrip_64k", |b| {
        b.iter(|| {
            let mut stream = Stream::memory();
            stream.write(black_box(&payload));
            stream.rewind().unwrap();
            let mut out = vec![0u8; payload.len()];
            black_box(stream.read(&mut out));
        });
    });
}

criterion_group!(
    benches,
    bench_put_buffered,
    bench_put_unbuffered,
    bench_bulk_roundtrip
);
criterion_main!(benches);
