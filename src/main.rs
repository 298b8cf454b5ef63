use anyhow::{bail, Result};
use clap::Parser;
use std::path::Path;

use tracing_indicatif::style::ProgressStyle;
use tracing::{info, info_span, Span};
use tracing_indicatif::span_ext::IndicatifSpanExt;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use knob_touch_rust::config::*;
use knob_touch_rust::gesture::GestureRenderer;
use knob_touch_rust::store::Store;

#[derive(Parser)]
pub struct Args {
    /// Recording folder holding a data.jsonl, repeat to merge several
    #[clap(short, long, required = true)]
    pub input: Vec<String>,
    #[clap(short, long, default_value = "gesture-images")]
    pub output: String,
    #[clap(flatten)]
    pub config: Config,
}

fn main() -> Result<()> {
    // parse the config
    let args = Args::parse();

    // setup logging
    let indicatif_layer = IndicatifLayer::new();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(indicatif_layer.get_stdout_writer()))
        .with(indicatif_layer)
        .init();

    if !(args.config.match_threshold > 0.) {
        bail!("match threshold must be positive, got {}", args.config.match_threshold);
    }
    if !(args.config.pressure_full_scale > 0.) {
        bail!("pressure full scale must be positive, got {}", args.config.pressure_full_scale);
    }

    // load and merge the recordings
    let store = Store::open(args.input.as_slice())?;
    let renderer = GestureRenderer::new(&args.config, Path::new(&args.output));

    let header_span = info_span!("header");
    header_span.pb_set_style(&ProgressStyle::default_bar());
    header_span.pb_set_length(store.task_count() as u64);
    let header_span_enter = header_span.enter();

    let mut saved = 0;
    for participant in store.participants() {
        for task in store.session_tasks(participant) {
            if renderer.process_task(&store, task)?.is_some() {
                saved += 1;
            }
            Span::current().pb_inc(1);
        }
    }

    std::mem::drop(header_span_enter);
    std::mem::drop(header_span);

    info!("All gesture images have been generated ({} saved)", saved);
    Ok(())
}
