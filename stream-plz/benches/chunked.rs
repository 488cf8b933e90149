use std::hint::black_box;
use std::io::Cursor;

use criterion::{Criterion, criterion_group, criterion_main};
use stream_plz::chunked::ChunkState;

// 256 chunks of 1 KiB each plus the terminal chunk.
fn chunked_wire() -> Vec<u8> {
    let mut wire = Vec::with_capacity(256 * 1032);
    for _ in 0..256 {
        wire.extend_from_slice(b"400\r\n");
        wire.extend_from_slice(&[b'x'; 1024]);
        wire.extend_from_slice(b"\r\n");
    }
    wire.extend_from_slice(b"0\r\n\r\n");
    wire
}

fn bench_chunked_decode(c: &mut Criterion) {
    let wire = chunked_wire();
    c.bench_function("chunked_decode_256k", |b| {
        b.iter(|| {
            let mut reader = Cursor::new(wire.as_slice());
            let mut state = ChunkState::default();
            let mut out = [0u8; 4096];
            let mut total = 0usize;
            loop {
                let read = state.read(&mut reader, &mut out).unwrap();
                if read == 0 {
                    break;
                }
                total += read;
            }
            black_box(total)
        })
    });
}

criterion_group!(benches, bench_chunked_decode);
criterion_main!(benches);
