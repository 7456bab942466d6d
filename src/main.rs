use anyhow::Result;
use clap::Parser;

use canvas_sketches::cli::Cli;
use canvas_sketches::core::{run_export, run_preview, RunOptions, SketchFactory};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let kind = cli.sketch;

    let mut settings = kind.settings();
    if let Some(path) = &cli.settings {
        settings = settings.with_file(path)?;
    }
    settings.validate()?;

    let seed = cli.seed.unwrap_or_else(rand::random::<u64>);
    log::info!("Sketch '{}' with seed {}", kind.name(), seed);

    let options = RunOptions {
        name: kind.name().to_string(),
        settings,
        assets: cli.assets.clone(),
        seed,
        show_ui: !cli.no_ui,
    };
    let factory: SketchFactory = Box::new(move |context| kind.create(context));

    match &cli.export {
        Some(dir) => {
            let paths = run_export(&options, dir, &factory)?;
            println!("Wrote {} frame(s) to {}", paths.len(), dir.display());
        }
        None => {
            println!("{} - drag to orbit, right-drag to pan, scroll to zoom, Space to pause, Escape to quit", kind.name());
            run_preview(options, factory)?;
        }
    }

    Ok(())
}
