use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use argh::FromArgs;
use indicatif::{ProgressBar, ProgressStyle};
use particle_links::{
    resolve, Engine, EngineState, FixedSurface, ImageSink, ManualScheduler, PartialSettings,
};

const BACKGROUND: image::Rgba<u8> = image::Rgba([16, 16, 24, 255]);

#[derive(FromArgs)]
/// Render an animated field of linked particles to PNG frames.
struct Args {
    /// surface width in pixels
    #[argh(option, default = "1920")]
    width: u32,

    /// surface height in pixels
    #[argh(option, default = "1080")]
    height: u32,

    /// number of frames to render
    #[argh(option, default = "600")]
    frames: usize,

    /// JSON file with any of the particle settings (camelCase keys)
    #[argh(option)]
    settings: Option<PathBuf>,

    /// seed for reproducible particles
    #[argh(option)]
    seed: Option<u64>,

    /// frame on which the pointer enters the surface
    #[argh(option)]
    hover_from: Option<usize>,

    /// frame on which the pointer leaves the surface
    #[argh(option)]
    hover_to: Option<usize>,

    /// directory the frames are written to
    #[argh(option, default = "PathBuf::from(\"./frames\")")]
    output: PathBuf,

    /// print the resolved settings as JSON and exit
    #[argh(switch)]
    print_settings: bool,
}

fn load_settings(path: Option<&PathBuf>) -> Result<PartialSettings> {
    let Some(path) = path else {
        return Ok(PartialSettings::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading settings from {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing settings in {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: Args = argh::from_env();
    let partial = load_settings(args.settings.as_ref())?;

    if args.print_settings {
        let settings = resolve(&partial, args.width, args.height)?;
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    fs::create_dir_all(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;

    let surface = FixedSurface {
        width: args.width,
        height: args.height,
    };
    let sink = ImageSink::new(BACKGROUND);
    let scheduler = ManualScheduler::default();
    let mut engine = match args.seed {
        Some(seed) => Engine::with_seed(surface, sink, scheduler, partial, seed),
        None => Engine::new(surface, sink, scheduler, partial),
    };

    engine.start();
    if engine.state() != EngineState::Running {
        bail!("the particle engine did not start");
    }

    let pbar = ProgressBar::new(args.frames as u64);
    pbar.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}/{eta_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}",
        )?,
    );
    let mut frame = 0;
    while frame < args.frames && engine.scheduler_mut().take_pending() {
        if args.hover_from == Some(frame) {
            engine.on_pointer_enter();
        }
        if args.hover_to == Some(frame) {
            engine.on_pointer_leave();
        }
        engine.on_tick();

        let path = args.output.join(format!("frames_{:0>8}.png", frame));
        engine
            .sink()
            .save(&path)
            .with_context(|| format!("saving {}", path.display()))?;

        frame += 1;
        pbar.inc(1);
    }
    engine.stop();
    pbar.finish();
    Ok(())
}
