use std::time::{Duration, Instant};

use anyhow::Context as _;
use framelane::source::blank_source;
use framelane::{
    AsyncRenderConfig, Engine, EngineOpts, Fps, Frame, FrameFormat, FrameSource, RawSink,
    RenderOpts, collect, drain, render_to_sink,
};
use serde_json::json;
use sha2::Digest as _;

#[derive(Clone, Debug)]
struct BenchArgs {
    width: u32,
    height: u32,
    frames: u64,
    warmup: u32,
    repeats: u32,
    lanes: Vec<u32>,
    threads: Option<usize>,
    work: u32,
    json: bool,
}

#[derive(Clone, Debug, Default)]
struct RunMetrics {
    interleaved: Duration,
    stacked: Duration,
    drain: Duration,
    sink: Duration,
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> anyhow::Result<()> {
    let args = parse_args()?;

    if args.width == 0 || args.height == 0 {
        anyhow::bail!("--width/--height must be > 0");
    }
    if !args.width.is_multiple_of(2) || !args.height.is_multiple_of(2) {
        anyhow::bail!("--width/--height must be even (4:2:0 frames)");
    }
    if args.frames == 0 {
        anyhow::bail!("--frames must be > 0");
    }
    if let Some(n) = args.threads
        && n == 0
    {
        anyhow::bail!("--threads must be >= 1 when set");
    }

    let engine = Engine::new(EngineOpts {
        threads: args.threads,
    })
    .context("create engine")?;
    let source = blank_source(
        args.frames,
        args.width,
        args.height,
        FrameFormat::YUV420P8,
        Fps::default(),
    );

    eprintln!(
        "bench: {repeats} run(s) ({profile} build), {frames} frames {w}x{h}, threads={threads}, work={work}",
        repeats = args.repeats,
        profile = if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        },
        frames = args.frames,
        w = args.width,
        h = args.height,
        threads = engine.threads(),
        work = args.work,
    );

    // The sink path is single-lane, so its output digest is the reference for every lane count.
    let reference = sink_digest(&engine, &source)?;
    eprintln!("reference sha256: {reference}");

    let mut report = Vec::with_capacity(args.lanes.len());
    for &lanes in &args.lanes {
        for i in 0..args.warmup {
            run_once(&engine, &source, lanes, &args, &reference)
                .with_context(|| format!("warmup {i} ({lanes} lanes)"))?;
        }
        let mut runs = Vec::<RunMetrics>::with_capacity(args.repeats as usize);
        for i in 0..args.repeats {
            runs.push(
                run_once(&engine, &source, lanes, &args, &reference)
                    .with_context(|| format!("run {i} ({lanes} lanes)"))?,
            );
        }
        eprintln!("\nlanes={lanes}");
        report.push(json!({
            "lanes": lanes,
            "percentiles_ms": report_percentiles(&runs),
        }));
    }

    if args.json {
        let doc = json!({
            "frames": args.frames,
            "width": args.width,
            "height": args.height,
            "threads": engine.threads(),
            "work": args.work,
            "reference_sha256": reference,
            "runs": report,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    }
    Ok(())
}

fn run_once(
    engine: &Engine,
    source: &dyn FrameSource,
    lanes: u32,
    args: &BenchArgs,
    reference: &str,
) -> anyhow::Result<RunMetrics> {
    let mut m = RunMetrics::default();

    for parallel_input in [false, true] {
        let opts = RenderOpts::with_config(AsyncRenderConfig {
            lanes,
            one_pixel_frame: false,
            parallel_input,
        });
        let t0 = Instant::now();
        let sums = collect(engine, source, &opts, |n, f| Ok(busy_checksum(n, f, args.work)))?;
        let elapsed = t0.elapsed();
        let expected = collect(engine, source, &RenderOpts::default(), |n, f| {
            Ok(busy_checksum(n, f, args.work))
        })?;
        if sums != expected {
            anyhow::bail!(
                "{} render with {lanes} lanes disagrees with the single-lane render",
                if parallel_input { "stacked" } else { "interleaved" }
            );
        }
        if parallel_input {
            m.stacked = elapsed;
        } else {
            m.interleaved = elapsed;
        }
    }

    let t0 = Instant::now();
    let stats = drain(
        engine,
        source,
        &RenderOpts::with_config(AsyncRenderConfig::with_lanes(lanes)),
        None,
    )?;
    m.drain = t0.elapsed();
    if stats.frames_total != args.frames {
        anyhow::bail!(
            "drain covered {} of {} frames",
            stats.frames_total,
            args.frames
        );
    }

    let t0 = Instant::now();
    let digest = sink_digest(engine, source)?;
    m.sink = t0.elapsed();
    if digest != reference {
        anyhow::bail!("sink output changed between runs ({digest} != {reference})");
    }

    Ok(m)
}

fn sink_digest(engine: &Engine, source: &dyn FrameSource) -> anyhow::Result<String> {
    let mut sink = RawSink::new(Vec::new());
    render_to_sink(engine, source, &RenderOpts::default(), &mut sink, None)?;
    Ok(sha256_hex(&sink.into_inner()))
}

/// Deterministic per-frame work standing in for a real filter callback.
fn busy_checksum(n: u64, frame: &Frame, rounds: u32) -> u64 {
    let mut state = n ^ 0x9E37_79B9_7F4A_7C15;
    for _ in 0..rounds {
        for &b in frame.plane(0) {
            state = (state ^ u64::from(b)).wrapping_mul(0x0100_0000_01B3);
        }
    }
    state
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

fn parse_args() -> anyhow::Result<BenchArgs> {
    let mut args = std::env::args().skip(1);

    let mut out = BenchArgs {
        width: 640,
        height: 360,
        frames: 600,
        warmup: 1,
        repeats: 20,
        lanes: vec![1, 2, 4, 8],
        threads: None,
        work: 1,
        json: false,
    };

    while let Some(a) = args.next() {
        match a.as_str() {
            "--width" => out.width = parse_u32(args.next(), "--width")?,
            "--height" => out.height = parse_u32(args.next(), "--height")?,
            "--frames" => out.frames = u64::from(parse_u32(args.next(), "--frames")?),
            "--warmup" => out.warmup = parse_u32(args.next(), "--warmup")?,
            "--repeats" => out.repeats = parse_u32(args.next(), "--repeats")?,
            "--work" => out.work = parse_u32(args.next(), "--work")?,
            "--threads" => out.threads = Some(parse_usize(args.next(), "--threads")?),
            "--lanes" => {
                let v = args.next().ok_or_else(|| {
                    anyhow::anyhow!("missing value for --lanes (expected e.g. 1,2,4)")
                })?;
                out.lanes = v
                    .split(',')
                    .map(|s| {
                        s.trim()
                            .parse::<u32>()
                            .with_context(|| format!("parse --lanes entry '{s}'"))
                    })
                    .collect::<anyhow::Result<_>>()?;
            }
            "--json" => out.json = true,
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => anyhow::bail!("unknown arg '{a}' (try --help)"),
        }
    }

    if out.lanes.is_empty() {
        anyhow::bail!("--lanes must name at least one lane count");
    }
    Ok(out)
}

fn print_help() {
    eprintln!(
        r#"framelane-bench

Renders a synthetic source repeatedly per lane count and reports p50/p90/p99 per mode.

Usage:
  cargo run -q --release
  cargo run -q --release -- --frames 2000 --lanes 1,4,16
  cargo run -q --release -- --threads 4 --work 8 --json

Args:
  --width N        (default 640; must be even)
  --height N       (default 360; must be even)
  --frames N       (default 600)
  --warmup N       (default 1)
  --repeats N      (default 20)
  --lanes LIST     comma-separated lane counts (default 1,2,4,8)
  --threads N      engine worker threads (default auto)
  --work N         checksum passes over the luma plane per frame (default 1)
  --json           print a JSON report on stdout
"#
    );
}

fn parse_u32(v: Option<String>, flag: &str) -> anyhow::Result<u32> {
    let v = v.ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))?;
    v.parse::<u32>()
        .with_context(|| format!("parse {flag} value '{v}'"))
}

fn parse_usize(v: Option<String>, flag: &str) -> anyhow::Result<usize> {
    let v = v.ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))?;
    v.parse::<usize>()
        .with_context(|| format!("parse {flag} value '{v}'"))
}

fn report_percentiles(runs: &[RunMetrics]) -> serde_json::Value {
    type Getter = fn(&RunMetrics) -> Duration;
    type Field = (&'static str, Getter);

    fn collect(runs: &[RunMetrics], f: fn(&RunMetrics) -> Duration) -> Vec<Duration> {
        let mut v = runs.iter().map(f).collect::<Vec<_>>();
        v.sort_by_key(|d| d.as_nanos());
        v
    }

    fn p(v: &[Duration], p: f64) -> Duration {
        if v.is_empty() {
            return Duration::ZERO;
        }
        let n = v.len();
        let rank = (p * (n as f64)).ceil().clamp(1.0, n as f64) as usize;
        v[rank - 1]
    }

    fn fmt_ms(d: Duration) -> String {
        format!("{:.3}ms", d.as_secs_f64() * 1000.0)
    }

    let fields: &[Field] = &[
        ("interleaved", |m| m.interleaved),
        ("stacked", |m| m.stacked),
        ("drain", |m| m.drain),
        ("sink", |m| m.sink),
    ];

    eprintln!("percentiles across runs (p50/p90/p99):");
    let mut out = serde_json::Map::new();
    for (name, getter) in fields {
        let v = collect(runs, *getter);
        let p50 = p(&v, 0.50);
        let p90 = p(&v, 0.90);
        let p99 = p(&v, 0.99);
        eprintln!(
            "  {name:12} p50={p50:>10}  p90={p90:>10}  p99={p99:>10}",
            name = *name,
            p50 = fmt_ms(p50),
            p90 = fmt_ms(p90),
            p99 = fmt_ms(p99)
        );
        out.insert(
            (*name).to_string(),
            json!([
                p50.as_secs_f64() * 1000.0,
                p90.as_secs_f64() * 1000.0,
                p99.as_secs_f64() * 1000.0
            ]),
        );
    }
    serde_json::Value::Object(out)
}
