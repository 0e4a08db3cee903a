mod controls;
mod cube;
mod viewer;

use anyhow::{Context, Result};
use vantage_engine::core::Engine;
use vantage_engine::logging::{LoggingConfig, init_logging};
use vantage_engine::platform::{PlatformConfig, WinitPlatform};
use vantage_engine::time::{FrameScheduler, SchedulerConfig};

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let engine = Engine::new()?;
    let mut platform = WinitPlatform::new(PlatformConfig {
        title: "Vantage".to_string(),
        ..PlatformConfig::default()
    })
    .context("failed to open the viewer window")?;

    viewer::install(&engine);

    let mut scheduler = FrameScheduler::new(&engine, SchedulerConfig::default());
    scheduler.run(&mut platform)?;

    let stats = scheduler.stats();
    log::info!("exiting after {} frames", stats.frames);
    Ok(())
}
