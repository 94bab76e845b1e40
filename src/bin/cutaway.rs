use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use cutaway::{
    CancelToken, EffectKind, JobError, JobOpts, RendererChoice, Stage, SurfaceEngine, check_dom,
    process_video,
};

#[derive(Parser, Debug)]
#[command(name = "cutaway", version, about = "Overlay animated effects onto a video")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the effects in CONFIG over VIDEO and encode the result (requires `ffmpeg`).
    Process(ProcessArgs),
    /// Report which renderer automatic negotiation would select.
    CheckRenderer(DomArgs),
}

#[derive(Args, Debug)]
struct DomArgs {
    /// Directory holding `<kind>.html` templates.
    #[arg(long = "templates")]
    templates: Option<PathBuf>,

    /// Command that starts the DOM driver process, e.g. `node capture.js`.
    #[arg(long)]
    dom_driver: Option<String>,
}

#[derive(Args, Debug)]
struct ProcessArgs {
    /// Base video.
    video: PathBuf,
    /// Subtitles of the base video.
    subtitles: PathBuf,
    /// Effects document (JSON).
    config: PathBuf,
    /// Output video path.
    #[arg(default_value = "output.mp4")]
    output: PathBuf,

    #[arg(long, value_enum, default_value_t = RendererChoice::Auto)]
    renderer: RendererChoice,

    /// Worker threads for rendering and compositing.
    #[arg(long)]
    threads: Option<usize>,

    /// Font file used by the raster renderer.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Fail instead of replacing an existing output file.
    #[arg(long, default_value_t = false)]
    no_clobber: bool,

    #[command(flatten)]
    dom: DomArgs,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.cmd {
        Command::Process(args) => cmd_process(args),
        Command::CheckRenderer(args) => cmd_check_renderer(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn job_opts(dom: DomArgs) -> Result<JobOpts, JobError> {
    let mut opts = JobOpts::from_env().map_err(|source| JobError {
        stage: Stage::Validate,
        source,
    })?;
    if let Some(dir) = dom.templates {
        opts.templates_dir = dir;
    }
    if let Some(cmd) = dom.dom_driver {
        opts.dom_driver = Some(cmd);
    }
    Ok(opts)
}

fn cmd_process(args: ProcessArgs) -> Result<(), JobError> {
    let mut opts = job_opts(args.dom)?;
    opts.renderer = args.renderer;
    if args.threads.is_some() {
        opts.threads = args.threads;
    }
    if args.font.is_some() {
        opts.font = args.font;
    }
    opts.overwrite = !args.no_clobber;

    let stats = process_video(
        &args.video,
        &args.subtitles,
        &args.config,
        &args.output,
        &opts,
        &CancelToken::new(),
    )?;
    println!(
        "wrote {} ({} frames, {} layers, {} renderer)",
        args.output.display(),
        stats.frames_composited,
        stats.layers_built,
        stats.backend
    );
    Ok(())
}

fn cmd_check_renderer(args: DomArgs) -> Result<(), JobError> {
    let opts = job_opts(args)?;
    let engine = match opts.dom_driver.as_deref() {
        Some(cmd) => Some(cutaway::DriverEngine::new(
            cutaway::DriverCommand::parse(cmd).map_err(|source| JobError {
                stage: Stage::Negotiate,
                source,
            })?,
        )),
        None => None,
    };
    match check_dom(
        engine.as_ref().map(|e| e as &dyn SurfaceEngine),
        &opts.templates_dir,
        &EffectKind::ALL,
    ) {
        Ok(()) => println!("renderer: dom"),
        Err(e) => println!("renderer: raster ({e})"),
    }
    Ok(())
}
