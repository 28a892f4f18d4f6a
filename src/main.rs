use mapscope_cv::{FrameCycle, TrackerConfig, TrackerSession};
use std::env;
use std::process;
use std::sync::atomic::AtomicBool;

mod source;

use source::ImageSequenceSource;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let Some(frames_dir) = args.next() else {
        eprintln!("usage: mapscope <frames-dir> [config.json]");
        process::exit(2);
    };

    let config = match args.next() {
        Some(path) => TrackerConfig::load(path)?,
        None => TrackerConfig::default(),
    };

    let session = TrackerSession::from_config(config)?;
    let source = ImageSequenceSource::open(&frames_dir)?;
    let mut cycle = FrameCycle::new(session, source);

    let stop = AtomicBool::new(false);
    let end = cycle.run(&stop, |report| match serde_json::to_string(report) {
        Ok(line) => println!("{line}"),
        Err(e) => log::error!("failed to serialize report: {e}"),
    })?;

    log::info!("cycle ended: {:?}", end);
    Ok(())
}
