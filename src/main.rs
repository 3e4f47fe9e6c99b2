use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use partbox::config::{LogLevel, Settings};
use partbox::constants::SETTINGS_FILENAME;
use partbox::format::MARKED_LIST_FILENAME;
use partbox::model::PreviewPoint;
use partbox::state::{Anchor, Command, CommandOutcome, ImageHeaderProbe, ProjectState, Workspace};

#[derive(Parser)]
#[command(name = "partbox")]
#[command(version, about = "Particle box editor for downsampled micrograph previews", long_about = None)]
struct Cli {
    /// Settings snapshot read on start and rewritten on exit
    #[arg(long, value_name = "FILE", default_value = SETTINGS_FILENAME)]
    settings: PathBuf,

    /// Log level (error, warn, info, debug, trace); overrides the settings file
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the particles of an image in both coordinate spaces
    Inspect {
        /// Preview image (its .box file sits next to it)
        image: PathBuf,

        /// Source raster size, overriding the settings
        #[arg(long, value_name = "WxH")]
        source: Option<String>,
    },

    /// Toggle a particle at a preview position
    Add {
        image: PathBuf,

        /// Preview position
        #[arg(long, value_name = "X,Y")]
        at: String,

        /// Centre the box on the position instead of anchoring its corner there
        #[arg(long)]
        centered: bool,

        #[arg(long, value_name = "WxH")]
        source: Option<String>,
    },

    /// Erase every particle under a brush centred at a preview position
    Erase {
        image: PathBuf,

        #[arg(long, value_name = "X,Y")]
        at: String,

        /// Brush side length in preview pixels
        #[arg(long, value_name = "N")]
        brush: Option<u32>,

        #[arg(long, value_name = "WxH")]
        source: Option<String>,
    },

    /// Change the box size of every particle, keeping box centres fixed
    Resize {
        image: PathBuf,

        /// New box size in source pixels (positive, even)
        #[arg(long, value_name = "N")]
        to: i64,

        #[arg(long, value_name = "WxH")]
        source: Option<String>,
    },

    /// Toggle an image's mark and append new marks to the list in its folder
    Mark { image: PathBuf },

    /// Print the settings as JSON, or move them in and out of a JSON file
    Config {
        /// Write the current settings to this JSON file
        #[arg(long, value_name = "FILE", conflicts_with = "import")]
        export: Option<PathBuf>,

        /// Replace the settings snapshot with this JSON file
        #[arg(long, value_name = "FILE")]
        import: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load_snapshot(&cli.settings)
        .with_context(|| format!("reading settings {:?}", cli.settings))?;
    let level = cli.log_level.unwrap_or(settings.log_level);
    env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .parse_default_env()
        .init();

    match cli.command {
        Commands::Inspect { image, source } => {
            let ws = open(&image, settings, source.as_deref())?;
            print_particles(&ws);
            ws.close(&cli.settings)?;
        }
        Commands::Add {
            image,
            at,
            centered,
            source,
        } => {
            let mut ws = open(&image, settings, source.as_deref())?;
            let anchor = if centered { Anchor::Centered } else { Anchor::Corner };
            let outcome = ws.apply(Command::AddPoint {
                at: parse_point(&at)?,
                anchor,
            })?;
            report(&outcome);
            ws.close(&cli.settings)?;
        }
        Commands::Erase {
            image,
            at,
            brush,
            source,
        } => {
            let mut ws = open(&image, settings, source.as_deref())?;
            if let (Some(size), Some(session)) = (brush, ws.session_mut()) {
                *session.brush_mut() = partbox::model::EraseBrush::new(size);
            }
            let outcome = ws.apply(Command::EraseAt(parse_point(&at)?))?;
            report(&outcome);
            ws.close(&cli.settings)?;
        }
        Commands::Resize { image, to, source } => {
            let mut ws = open(&image, settings, source.as_deref())?;
            let outcome = ws.apply(Command::ResizeBoxTo(to))?;
            report(&outcome);
            ws.close(&cli.settings)?;
        }
        Commands::Mark { image } => {
            let mut ws = open(&image, settings, None)?;
            let marked = ws.toggle_mark();
            println!(
                "{} {}",
                if marked { "Marked" } else { "Unmarked" },
                image.display()
            );
            let list = ws.project().folder.join(MARKED_LIST_FILENAME);
            for name in ws.write_marked(&list)? {
                println!("Entry written to {}: {}", list.display(), name);
            }
            ws.close(&cli.settings)?;
        }
        Commands::Config { export, import } => match (export, import) {
            (Some(path), _) => {
                std::fs::write(&path, settings.to_json()?)
                    .with_context(|| format!("writing {:?}", path))?;
                log::info!("Exported settings to {:?}", path);
            }
            (None, Some(path)) => {
                let json = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {:?}", path))?;
                let imported = Settings::from_json(&json)?;
                imported.save_snapshot(&cli.settings)?;
                log::info!("Imported settings from {:?} into {:?}", path, cli.settings);
            }
            (None, None) => println!("{}", settings.to_json()?),
        },
    }

    Ok(())
}

/// Open the folder containing `image` with `image` as the current session.
fn open(image: &Path, settings: Settings, source: Option<&str>) -> Result<Workspace> {
    let folder = match image.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let name = image
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("not an image path: {:?}", image))?;

    let project = ProjectState::from_folder(folder)?;
    let mut ws = Workspace::new(project, settings, ImageHeaderProbe);
    if let Some(source) = source {
        let (w, h) = parse_size(source)?;
        ws.recalibrate(w, h)?;
    }
    let report = ws.select_image(name)?;
    if let Some(warning) = report.warning {
        eprintln!("warning: {}", warning);
    }
    Ok(ws)
}

fn print_particles(ws: &Workspace) {
    let Some(session) = ws.session() else {
        return;
    };
    let cal = session.calibration();
    println!(
        "source {}x{}  preview {}x{}  scale {:.4}",
        cal.source_width(),
        cal.source_height(),
        cal.preview_width(),
        cal.preview_height(),
        cal.scale_factor()
    );
    println!(
        "box size {} ({:.1} A, {} px on preview)",
        session.box_size(),
        session.box_size().angstroms(ws.settings().angpix),
        session.preview_box()
    );
    for annotation in session.store().iter() {
        let source = annotation.source.resolve(annotation.preview, cal);
        println!(
            "{:>6} {:>6}  ->  {:>6} {:>6}{}",
            annotation.preview.x,
            annotation.preview.y,
            source.x,
            source.y,
            if annotation.source.is_resolved() { "" } else { "  (unresolved)" }
        );
    }
}

fn report(outcome: &CommandOutcome) {
    match outcome {
        CommandOutcome::Toggled(t) => println!("{:?}", t),
        CommandOutcome::Erased(keys) => println!("Erased {} particle(s)", keys.len()),
        CommandOutcome::Resized {
            box_size,
            collisions,
        } => println!("Box size now {} ({} merged)", box_size, collisions),
        CommandOutcome::Saved(s) => println!("Saved: {:?}", s),
        CommandOutcome::Loaded(r) => println!("Loaded {} particle(s)", r.particles),
    }
}

fn parse_point(s: &str) -> Result<PreviewPoint> {
    let Some((x, y)) = s.split_once(',') else {
        bail!("expected X,Y but got '{}'", s);
    };
    Ok(PreviewPoint::new(
        x.trim().parse().with_context(|| format!("bad x in '{}'", s))?,
        y.trim().parse().with_context(|| format!("bad y in '{}'", s))?,
    ))
}

fn parse_size(s: &str) -> Result<(u32, u32)> {
    let Some((w, h)) = s.split_once(['x', 'X', ',']) else {
        bail!("expected WxH but got '{}'", s);
    };
    Ok((
        w.trim().parse().with_context(|| format!("bad width in '{}'", s))?,
        h.trim().parse().with_context(|| format!("bad height in '{}'", s))?,
    ))
}
