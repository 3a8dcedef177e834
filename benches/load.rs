use criterion::{criterion_group, criterion_main, Criterion};
use ipu3_aiq::binary::BinaryResource;
use std::io::Write;

pub fn benchmark_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");
    for size in [4 * 1024, 64 * 1024, 512 * 1024, 4 * 1024 * 1024].iter() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&vec![0x5a; *size]).unwrap();
        file.flush().unwrap();

        group.bench_with_input(format!("{}KB", size / 1024), &file, |b, file| {
            b.iter(|| BinaryResource::load(file.path()).unwrap())
        });
    }
}

criterion_group!(benches, benchmark_load);
criterion_main!(benches);
