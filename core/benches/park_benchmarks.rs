use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use park::{from_iter, Park, ParkConfig, Payload, StageContext};
use tokio::runtime::Runtime;

const ITEMS: u64 = 1_000;

// --- Helper: CPU-bound stage ---
fn build_config(lanes: usize, stages: usize, iterations: u64) -> ParkConfig<u64> {
  let mut builder = ParkConfig::builder().lanes(lanes).queue_capacity(32);
  for i in 0..stages {
    builder = builder.stage(format!("spin_{i}"), move |_ctx: StageContext, p: Payload<u64>| async move {
      let mut value = p.write();
      for _ in 0..iterations {
        *value = value.wrapping_mul(31).wrapping_add(7);
      }
      Ok::<_, anyhow::Error>(())
    });
  }
  builder.build().unwrap()
}

async fn run_once(config: ParkConfig<u64>) -> usize {
  let park = Park::with_config(config);
  let (succeeded, _failed) = park.start(from_iter(0..ITEMS)).unwrap().collect().await;
  park.wait(None).await.unwrap();
  succeeded.len()
}

fn bench_lane_scaling(c: &mut Criterion) {
  let mut group = c.benchmark_group("LaneScaling");
  let rt = Runtime::new().unwrap();
  group.throughput(Throughput::Elements(ITEMS));

  for lanes in [1usize, 2, 4, 8].iter() {
    group.bench_with_input(BenchmarkId::from_parameter(lanes), lanes, |b, &lanes| {
      b.to_async(&rt).iter_batched(
        || build_config(lanes, 3, 100),
        |config| async move { criterion::black_box(run_once(config).await) },
        criterion::BatchSize::SmallInput,
      );
    });
  }
  group.finish();
}

fn bench_stage_depth(c: &mut Criterion) {
  let mut group = c.benchmark_group("StageDepth");
  let rt = Runtime::new().unwrap();
  group.throughput(Throughput::Elements(ITEMS));

  for stages in [0usize, 1, 5, 10].iter() {
    group.bench_with_input(BenchmarkId::from_parameter(stages), stages, |b, &stages| {
      b.to_async(&rt).iter_batched(
        || build_config(2, stages, 1),
        |config| async move { criterion::black_box(run_once(config).await) },
        criterion::BatchSize::SmallInput,
      );
    });
  }
  group.finish();
}

fn bench_payload_access(c: &mut Criterion) {
  let mut group = c.benchmark_group("PayloadAccess");
  let payload = Payload::new(0u64);

  group.bench_function("read_lock", |b| {
    b.iter(|| {
      let guard = payload.read();
      criterion::black_box(*guard);
    })
  });
  group.bench_function("write_lock", |b| {
    b.iter(|| {
      let mut guard = payload.write();
      *guard = guard.wrapping_add(1);
      criterion::black_box(*guard);
    })
  });
  group.finish();
}

criterion_group!(benches, bench_lane_scaling, bench_stage_depth, bench_payload_access);
criterion_main!(benches);
