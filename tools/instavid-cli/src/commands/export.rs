//! Export a scene to video.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use instavid_common::clock::MonotonicClock;
use instavid_common::config::AppConfig;
use instavid_editor::EditorEvent;
use instavid_project_model::{ExportFormat, ResolutionTier};
use instavid_render_engine::{
    command_exists, CancellationToken, EncoderSink, FfmpegSink, PngSequenceSink,
};

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Path to the scene file
    pub path: PathBuf,

    /// Output directory (defaults to the configured one)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output resolution: 720, 1080 or 4k
    #[arg(long)]
    pub resolution: Option<ResolutionTier>,

    /// Frames per second: 24, 30 or 60
    #[arg(long)]
    pub fps: Option<u32>,

    /// Container: webm or mp4
    #[arg(long)]
    pub format: Option<ExportFormat>,

    /// Leave out the typing sound track
    #[arg(long)]
    pub no_audio: bool,

    /// Write numbered PNG frames instead of invoking the encoder
    #[arg(long)]
    pub frames_only: bool,

    /// Output file name (defaults to a timestamped name)
    #[arg(long)]
    pub name: Option<String>,

    /// Jitter and audio seed
    #[arg(long, default_value = "0")]
    pub seed: u64,
}

pub async fn run(config: &AppConfig, args: ExportArgs) -> anyhow::Result<()> {
    let scene = super::load_scene(&args.path)?;
    let fonts = super::load_fonts(config);
    let mut editor =
        super::open_editor(&scene, MonotonicClock::start(), fonts).with_seed(args.seed);

    let mut settings = editor.export_settings().clone();
    if let Some(resolution) = args.resolution {
        settings.resolution = resolution;
    }
    if let Some(fps) = args.fps {
        settings.fps = fps;
    }
    if let Some(format) = args.format {
        settings.format = format;
    }
    if args.no_audio {
        settings.include_audio = false;
    }
    editor.set_export_settings(settings.clone())?;

    let output_dir = args.output.unwrap_or_else(|| config.output_dir.clone());
    let (width, height) = settings.resolution.dimensions();
    println!("Exporting '{}'", scene.name);
    println!("  Resolution: {}x{} @ {} fps", width, height, settings.fps);
    println!("  Duration: {:.1}s", editor.duration());

    let mut sink: Box<dyn EncoderSink> = if args.frames_only {
        let dir = output_dir.join(format!("{}-frames", super::slug(&scene.name)));
        println!("  Frames: {}", dir.display());
        Box::new(PngSequenceSink::new(dir))
    } else {
        let binary = &config.export.encoder_binary;
        if !command_exists(binary) {
            anyhow::bail!("Encoder '{binary}' not found on PATH (use --frames-only to skip encoding)");
        }
        println!("  Format: {}", settings.format.extension());
        let mut ffmpeg = FfmpegSink::new(&output_dir)
            .with_binary(binary.clone())
            .with_bitrate(u64::from(config.export.video_bitrate));
        if let Some(name) = args.name {
            ffmpeg = ffmpeg.with_file_name(name);
        }
        Box::new(ffmpeg)
    };

    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let _progress = editor.subscribe(|event| {
        if let EditorEvent::ExportProgress { percent, status } = event {
            print!("\r  [{:>5.1}%] {:<40}", percent, status);
            let _ = std::io::stdout().flush();
        }
    });

    let result = editor.export(sink.as_mut(), Some(&cancel)).await;
    watcher.abort();
    println!();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) if e.is_transient() => {
            anyhow::bail!("Export stopped: {e} (nothing was written; run the command again)")
        }
        Err(e) => anyhow::bail!("Export failed: {e}"),
    };
    println!("Export complete:");
    println!("  Output: {}", outcome.path.display());
    println!("  Frames: {}", outcome.frames);
    println!("  Audio: {}", if outcome.has_audio { "typing track" } else { "none" });
    println!("  Took: {:.1}s", outcome.elapsed_secs);
    Ok(())
}
