//! Benchmarks for the analysis pipeline.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use candlesight::prelude::*;

/// Generate realistic pseudo-random candles
fn generate_series(n: usize) -> CandleSeries {
  let mut candles = Vec::with_capacity(n);
  let mut price = 100.0;

  for i in 0..n {
    let change = ((i * 7 + 13) % 100) as f64 / 50.0 - 1.0; // Deterministic "random"
    let volatility = 2.0 + ((i * 3) % 10) as f64 / 5.0;
    let volume = 1_000.0 + ((i * 11) % 17) as f64 * 100.0;

    let o = price;
    let c = price + change;
    let h = o.max(c) + volatility * 0.5;
    let l = o.min(c) - volatility * 0.5;

    candles.push(Candle::new(i as i64 * 60_000, o, h, l, c, volume));
    price = c;
  }

  CandleSeries::new(candles).unwrap()
}

fn ticker_for(series: &CandleSeries) -> TickerSnapshot {
  TickerSnapshot::new(series.last().close, 2_000.0, 5_000_000.0).unwrap()
}

fn bench_analyze(c: &mut Criterion) {
  let series = generate_series(120);
  let ticker = ticker_for(&series);
  let engine = EngineBuilder::new().with_all_patterns().build().unwrap();
  let external = ExternalSignals::default();

  c.bench_function("analyze_120_candles", |b| {
    b.iter(|| {
      let _ = black_box(engine.analyze(black_box(&series), black_box(&ticker), &external));
    })
  });
}

fn bench_indicators(c: &mut Criterion) {
  let series = generate_series(120);
  let ticker = ticker_for(&series);
  let engine = EngineBuilder::new().without_patterns().build().unwrap();

  c.bench_function("indicators_120_candles", |b| {
    b.iter(|| {
      let _ = black_box(engine.indicators(black_box(&series), black_box(&ticker)));
    })
  });
}

fn bench_patterns(c: &mut Criterion) {
  let series = generate_series(120);
  let engine = EngineBuilder::new().with_all_patterns().build().unwrap();

  c.bench_function("detect_patterns", |b| {
    b.iter(|| {
      let _ = black_box(engine.detect_patterns(black_box(series.candles())));
    })
  });
}

fn bench_scaling(c: &mut Criterion) {
  let engine = EngineBuilder::new().with_all_patterns().build().unwrap();
  let external = ExternalSignals::default();

  let mut group = c.benchmark_group("scaling");

  for size in [101, 500, 1000, 5000].iter() {
    let series = generate_series(*size);
    let ticker = ticker_for(&series);

    group.bench_with_input(BenchmarkId::new("analyze", size), size, |b, _| {
      b.iter(|| {
        let _ = black_box(engine.analyze(black_box(&series), &ticker, &external));
      })
    });
  }

  group.finish();
}

fn bench_parallel(c: &mut Criterion) {
  let engine = EngineBuilder::new().with_all_patterns().build().unwrap();
  let snapshots: Vec<MarketSnapshot> = (0..16)
    .map(|_| {
      let series = generate_series(120);
      let ticker = ticker_for(&series);
      MarketSnapshot { series, ticker, external: ExternalSignals::default() }
    })
    .collect();
  let symbols: Vec<String> = (0..16).map(|i| format!("SYM{i}")).collect();
  let inputs: Vec<(&str, &MarketSnapshot)> =
    symbols.iter().map(String::as_str).zip(snapshots.iter()).collect();

  c.bench_function("analyze_parallel_16_symbols", |b| {
    b.iter(|| {
      let _ = black_box(analyze_parallel(black_box(&engine), black_box(inputs.clone())));
    })
  });
}

fn bench_param_sweep(c: &mut Criterion) {
  let series = generate_series(120);
  let ticker = ticker_for(&series);
  let external = ExternalSignals::default();
  let engines: Vec<SignalEngine> = AnalysisConfig::default()
    .sweep("near_level_pct")
    .unwrap()
    .into_iter()
    .map(|config| EngineBuilder::new().config(config).build().unwrap())
    .collect();

  c.bench_function("sweep_near_level_pct", |b| {
    b.iter(|| {
      for engine in &engines {
        let _ = black_box(engine.analyze(black_box(&series), &ticker, &external));
      }
    })
  });
}

criterion_group!(
  benches,
  bench_analyze,
  bench_indicators,
  bench_patterns,
  bench_scaling,
  bench_parallel,
  bench_param_sweep
);

criterion_main!(benches);
