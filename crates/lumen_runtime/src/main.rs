//! Lumen Engine Runtime
//!
//! Headless binary that boots the probe store from settings and drives a
//! churn-and-sort frame loop, reporting timings at the end.

use std::path::PathBuf;

use anyhow::{Context, Result};
use lumen_core::components::{IrradianceProbeManager, IrradianceProbeRef, SORT_SPAN};
use lumen_core::dod::{ComponentDescriptor, EntityRef};
use lumen_core::math::DeterministicRng;
use lumen_metrics::{FrameTimer, SpanProfiler};
use lumen_services::Settings;
use tracing_subscriber::EnvFilter;

const DEFAULT_SETTINGS_PATH: &str = "lumen.json";
const MAX_PRIORITY: u32 = 16;

fn main() -> Result<()> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH));
    let settings = Settings::load_or_default(&path)?;

    // RUST_LOG wins over the settings file
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.logging.filter)
            .with_context(|| format!("invalid log filter {:?}", settings.logging.filter))?,
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Lumen Engine v{}", lumen_core::VERSION);
    tracing::info!(path = %path.display(), ?settings, "Settings loaded");

    let mut probes = IrradianceProbeManager::new(settings.probes.capacity)
        .with_parallel_sort_threshold(settings.probes.sort_parallel_threshold);
    let mut rng = DeterministicRng::new(settings.runtime.seed);
    let mut next_entity = 0u64;

    while !probes.is_full() {
        spawn_probe(&mut probes, &mut rng, &mut next_entity)?;
    }
    tracing::info!(count = probes.len(), "Probe store populated");

    if let Some(&first) = probes.active_refs().first() {
        let snapshot = probes.compile_descriptor(first, false)?;
        tracing::debug!("First probe: {}", serde_json::to_string(&snapshot)?);
    }

    let mut profiler = SpanProfiler::new();
    let mut timer = FrameTimer::new(60);

    for frame in 0..settings.runtime.frames {
        timer.begin();

        for _ in 0..settings.runtime.churn_per_frame {
            let live = probes.active_refs();
            if live.is_empty() {
                break;
            }
            let victim = live[rng.next_below(live.len() as u32) as usize];
            probes.destroy_irradiance_probe(victim)?;
            spawn_probe(&mut probes, &mut rng, &mut next_entity)?;
        }

        let mut order = probes.active_refs();
        probes
            .sort_by_priority_profiled(&mut order, &mut profiler)
            .with_context(|| format!("sort failed on frame {frame}"))?;
        check_order(&probes, &order)?;

        timer.end();
    }

    let sort = profiler.stats(SORT_SPAN);
    tracing::info!(
        frames = settings.runtime.frames,
        avg_ms = timer.frame_time_ms(),
        fps = timer.fps(),
        "Frame loop finished"
    );
    tracing::info!(
        calls = sort.calls,
        mean_us = sort.mean().as_secs_f64() * 1e6,
        max_us = sort.max.as_secs_f64() * 1e6,
        "{SORT_SPAN}"
    );
    for (name, stats) in profiler.iter() {
        tracing::debug!(span = name, calls = stats.calls, total = ?stats.total, "Span");
    }

    Ok(())
}

fn spawn_probe(
    probes: &mut IrradianceProbeManager,
    rng: &mut DeterministicRng,
    next_entity: &mut u64,
) -> Result<IrradianceProbeRef> {
    let probe = probes.create_irradiance_probe(EntityRef::from_raw(*next_entity))?;
    *next_entity += 1;
    *probes.priority_mut(probe)? = rng.next_below(MAX_PRIORITY);
    *probes.radius_mut(probe)? = 5.0 + rng.next_f32() * 30.0;
    Ok(probe)
}

fn check_order(probes: &IrradianceProbeManager, order: &[IrradianceProbeRef]) -> Result<()> {
    let mut last = 0;
    for &probe in order {
        let priority = probes.priority(probe)?;
        anyhow::ensure!(priority >= last, "probe {probe} out of order");
        last = priority;
    }
    Ok(())
}
