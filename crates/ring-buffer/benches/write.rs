use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ring_buffer::{PositionTracker, SampleRing};

fn bench_write(c: &mut Criterion) {
    let ring = SampleRing::with_default_capacity();
    c.bench_function("sample_ring_write", |b| {
        let mut sample = 0u8;
        b.iter(|| {
            ring.write(black_box(sample));
            sample = sample.wrapping_add(1);
        })
    });
}

fn bench_poll_and_copy(c: &mut Criterion) {
    let ring = SampleRing::with_default_capacity();
    let mut tracker = PositionTracker::new(&ring);
    let mut out = Vec::with_capacity(256);
    c.bench_function("poll_and_copy_160", |b| {
        b.iter(|| {
            for i in 0..160u8 {
                ring.write(i);
            }
            let available = tracker.poll(&ring);
            out.clear();
            ring.copy_range(available.start, available.len, &mut out);
            black_box(out.len())
        })
    });
}

criterion_group!(benches, bench_write, bench_poll_and_copy);
criterion_main!(benches);
