use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use motio_image::{Image, ImageSize};
use motio_imgproc::motion::{calc_global_orientation, calc_motion_gradient, segment_motion};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// A motion history with random timestamps in the last second.
fn random_mhi(size: ImageSize) -> Image<f32, 1> {
    let mut rng = StdRng::seed_from_u64(42);
    let data = (0..size.area())
        .map(|_| {
            if rng.random_bool(0.3) {
                0.0
            } else {
                (rng.random_range(0..10) as f32) * 0.1 + 1.0
            }
        })
        .collect();
    Image::new(size, data).unwrap()
}

fn bench_motion(c: &mut Criterion) {
    let mut group = c.benchmark_group("Motion");

    for (width, height) in [(256, 224), (512, 448), (1024, 896)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{width}x{height}");
        let size = ImageSize {
            width: *width,
            height: *height,
        };
        let mhi = random_mhi(size);
        let mask = Image::<u8, 1>::from_size_val(size, 0).unwrap();
        let orientation = Image::<f32, 1>::from_size_val(size, 0.0).unwrap();
        let labels = Image::<u32, 1>::from_size_val(size, 0).unwrap();

        group.bench_with_input(
            BenchmarkId::new("calc_motion_gradient", &parameter_string),
            &(&mhi, &mask, &orientation),
            |b, i| {
                let (src, mut mask, mut orientation) = (i.0, i.1.clone(), i.2.clone());
                b.iter(|| {
                    black_box(calc_motion_gradient(
                        src,
                        &mut mask,
                        &mut orientation,
                        0.05,
                        0.5,
                        3,
                    ))
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("calc_global_orientation", &parameter_string),
            &(&mhi, &mask, &orientation),
            |b, i| {
                let (src, mask, orientation) = i;
                b.iter(|| black_box(calc_global_orientation(orientation, mask, src, 1.9, 1.0)))
            },
        );

        group.bench_with_input(
            BenchmarkId::new("segment_motion", &parameter_string),
            &(&mhi, &labels),
            |b, i| {
                let (src, mut labels) = (i.0, i.1.clone());
                b.iter(|| black_box(segment_motion(src, &mut labels, 1.9, 0.5)))
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_motion);
criterion_main!(benches);
