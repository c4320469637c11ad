//! Container-build entrypoint: pre-download model artifacts so runtime
//! containers need no hub access. A non-zero exit aborts the image build.

use std::path::Path;

use anyhow::Result;

use pipeline_bootstrap::{config, prefetch, telemetry};

fn main() -> Result<()> {
    telemetry::init();
    let config = config::Config::load()?;

    tracing::info!("starting model downloads");
    prefetch::prefetch_model(&config.model.name, Path::new(&config.model.models_root))?;
    tracing::info!("all models downloaded");

    Ok(())
}
