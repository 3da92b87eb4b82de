use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use facesift_core::encoder::{ARCFACE_MODEL_FILE, SCRFD_MODEL_FILE};
use facesift_core::FaceEncoder;
use facesift_pipeline::{
    decode, packager, scanner, spawn_session, Config, Pipeline, ProgressEvent, ReferenceFace,
    RunOutcome, RunState,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "facesift",
    about = "Find the photos a person appears in and package the matches"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match a folder of photos against a reference face
    Run {
        /// Reference face photo, or a saved reference JSON from `encode`
        #[arg(short, long)]
        reference: PathBuf,
        /// Folder of candidate photos
        #[arg(short, long)]
        folder: PathBuf,
        /// Write matched photos to this ZIP archive
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Copy matched photos into this directory
        #[arg(long)]
        copy_to: Option<PathBuf>,
        /// Maximum embedding distance for a match
        #[arg(short, long)]
        threshold: Option<f32>,
        /// Descend into subdirectories of the folder
        #[arg(long)]
        recursive: bool,
        /// Comma-separated list of recognized extensions (default: png,jpg,jpeg)
        #[arg(long)]
        extensions: Option<String>,
    },
    /// Encode a reference photo and save its embedding as JSON
    Encode {
        /// Photo of the person to look for
        photo: PathBuf,
        /// Where to write the reference JSON
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Check that the required model files are present
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();

    match cli.command {
        Commands::Run {
            reference,
            folder,
            output,
            copy_to,
            threshold,
            recursive,
            extensions,
        } => {
            if let Some(t) = threshold {
                config.distance_threshold = t;
            }
            if recursive {
                config.recursive = true;
            }
            if let Some(list) = extensions {
                config.set_extensions(&list);
            }
            run(&config, &reference, &folder, output, copy_to).await
        }
        Commands::Encode { photo, output } => encode(&config, &photo, &output),
        Commands::Doctor => doctor(&config),
    }
}

async fn run(
    config: &Config,
    reference_path: &Path,
    folder: &Path,
    output: Option<PathBuf>,
    copy_to: Option<PathBuf>,
) -> Result<()> {
    let candidates = scanner::scan(folder, &config.extensions, config.recursive)?;
    println!("Found {} candidate photos in {}", candidates.len(), folder.display());

    let mut encoder = FaceEncoder::load(&config.model_dir)
        .with_context(|| format!("loading models from {}", config.model_dir.display()))?;
    let reference = load_reference(&mut encoder, reference_path)?;
    println!("Reference face ready ({})", reference.source.display());

    let mut pipeline = Pipeline::new(encoder, config.distance_threshold);
    pipeline.set_reference(reference);
    let mut session = spawn_session(pipeline, candidates);

    // Ctrl-C trips the cooperative cancel flag; the run stops at the next
    // candidate boundary with its partial results intact.
    let flag = session.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nCancelling after the current photo...");
            flag.cancel();
        }
    });

    let mut outcome: Option<RunOutcome> = None;
    while let Some(event) = session.events.recv().await {
        match event {
            ProgressEvent::Started { total } => {
                println!("Processing {total} photos");
            }
            ProgressEvent::Processed {
                processed,
                total,
                path,
                verdict,
            } => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                println!("[{processed}/{total}] {name}: {verdict}");
            }
            ProgressEvent::Finished(o) => outcome = Some(o),
            ProgressEvent::Failed(message) => anyhow::bail!(message),
        }
    }

    let outcome = outcome.context("pipeline ended without a result")?;
    let s = &outcome.summary;
    if outcome.state == RunState::Cancelled {
        println!(
            "Cancelled: {} of {} processed, {} matched, {} without a face, {} errors",
            s.processed, s.total, s.matched, s.no_face, s.errored
        );
    } else {
        println!(
            "Done: {} processed, {} matched, {} without a face, {} errors",
            s.processed, s.matched, s.no_face, s.errored
        );
    }

    let matched_paths = outcome.matches.paths();
    if let Some(dest) = output {
        let written = packager::write_zip(&matched_paths, &dest)?;
        println!("Wrote {written} photos to {}", dest.display());
    }
    if let Some(dest_dir) = copy_to {
        let copied = packager::copy_to_dir(&matched_paths, &dest_dir)?;
        println!("Copied {copied} photos into {}", dest_dir.display());
    }

    Ok(())
}

/// Build the reference face from a saved JSON file or a photo.
fn load_reference(encoder: &mut FaceEncoder, path: &Path) -> Result<ReferenceFace> {
    if path.extension().is_some_and(|e| e == "json") {
        return Ok(ReferenceFace::load(path)?);
    }
    let photo = decode::load_rgb(path).context("decoding the reference photo")?;
    let embedding = encoder
        .encode(&photo)
        .with_context(|| format!("encoding the reference face in {}", path.display()))?;
    Ok(ReferenceFace::new(path.to_path_buf(), embedding))
}

fn encode(config: &Config, photo_path: &Path, output: &Path) -> Result<()> {
    let mut encoder = FaceEncoder::load(&config.model_dir)
        .with_context(|| format!("loading models from {}", config.model_dir.display()))?;
    let photo = decode::load_rgb(photo_path).context("decoding the reference photo")?;
    let embedding = encoder
        .encode(&photo)
        .with_context(|| format!("encoding the face in {}", photo_path.display()))?;

    let reference = ReferenceFace::new(photo_path.to_path_buf(), embedding);
    reference.save(output)?;
    println!("Saved reference for {} to {}", photo_path.display(), output.display());
    Ok(())
}

fn doctor(config: &Config) -> Result<()> {
    println!("Model directory: {}", config.model_dir.display());
    let mut all_present = true;
    for file in [SCRFD_MODEL_FILE, ARCFACE_MODEL_FILE] {
        let path = config.model_dir.join(file);
        let status = if path.exists() { "ok" } else { "MISSING" };
        if !path.exists() {
            all_present = false;
        }
        println!("  {file}: {status}");
    }
    if !all_present {
        println!("Download the missing models from insightface and place them in the model directory.");
    }
    println!("Distance threshold: {}", config.distance_threshold);
    println!("Extensions: {}", config.extensions.join(", "));
    Ok(())
}
