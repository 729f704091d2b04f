use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use pixview::{
    AnimatedImageRenderer, Animator as _, CpuCanvas, DrawingSession as _, FrameAnimator,
    HqDisplayItem, Interpolation, Origin, Point, RenderConfig, Renderer, RendererEnv,
    RendererOpts, SharedViewState, Size, ViewState,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pixview", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Present one frame of an image file headlessly and write it as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Canvas width in pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Zoom factor; fits the image into the canvas when omitted.
    #[arg(long)]
    zoom: Option<f64>,

    /// Treat frames as pages and show this one (0-based).
    #[arg(long)]
    page: Option<i64>,

    /// Animation time to show, in milliseconds.
    #[arg(long, default_value_t = 0)]
    elapsed_ms: u64,

    /// JSON file with `render` and `opts` sections.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Paint the checkerboard behind transparent images.
    #[arg(long)]
    checkered: bool,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct CliConfig {
    render: RenderConfig,
    opts: Option<RendererOpts>,
}

// Upper bound on waiting for a background repaint beyond the debounce interval.
const REPAINT_GRACE: Duration = Duration::from_secs(10);

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start tokio runtime")?;
    match cli.cmd {
        Command::Frame(args) => rt.block_on(cmd_frame(args)),
    }
}

fn read_config(path: Option<&Path>) -> anyhow::Result<CliConfig> {
    let Some(path) = path else {
        return Ok(CliConfig::default());
    };
    let f =
        std::fs::File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
    serde_json::from_reader(std::io::BufReader::new(f)).with_context(|| "parse config JSON")
}

/// Scale that fits `image` into `canvas`, never enlarging past 1:1.
fn fit_scale(image: Size, canvas: Size) -> f64 {
    if image.width <= 0.0 || image.height <= 0.0 {
        return 1.0;
    }
    (canvas.width / image.width)
        .min(canvas.height / image.height)
        .min(1.0)
}

async fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = read_config(args.config.as_deref())?;
    let mut render = cfg.render;
    render.checkered_background |= args.checkered;
    let opts = cfg.opts.unwrap_or_else(RendererOpts::from_env);

    let bytes: Arc<[u8]> = std::fs::read(&args.in_path)
        .with_context(|| format!("read image '{}'", args.in_path.display()))?
        .into();
    let item = pixview::load_hq_item(bytes, Origin::Disk, args.page.is_some())
        .with_context(|| format!("decode '{}'", args.in_path.display()))?;
    let transparent = pixview::supports_transparency(&args.in_path);

    let repaint = Arc::new(tokio::sync::Notify::new());
    let view_slot = SharedViewState::default();
    let env = {
        let repaint = Arc::clone(&repaint);
        RendererEnv::new(
            tokio::runtime::Handle::current(),
            move || repaint.notify_one(),
            opts,
        )?
        .with_view(view_slot.clone())
    };

    let renderer = match &item {
        HqDisplayItem::Animated(_) => {
            animated_at(&item, transparent, env, Duration::from_millis(args.elapsed_ms)).await?
        }
        _ => pixview::create_renderer(&item, transparent, &render, env).await?,
    };

    if let Renderer::MultiPage(pages) = &renderer {
        pages.initial_load().await?;
        if let Some(page) = args.page.filter(|&p| p != 0) {
            pages
                .load_page(page)
                .await
                .with_context(|| format!("load page {page}"))?;
        }
    }

    let canvas_size = Size::new(f64::from(args.width), f64::from(args.height));
    let image_size = renderer.source_bounds();
    let scale = args
        .zoom
        .unwrap_or_else(|| fit_scale(image_size, canvas_size));
    let view = ViewState::new(
        image_size,
        Point::new(canvas_size.width / 2.0, canvas_size.height / 2.0),
        scale,
        canvas_size,
    );
    view_slot.publish(view);

    if renderer.kind() == pixview::RendererKind::Static {
        renderer.restart_offscreen_draw_timer();
        tokio::time::timeout(opts.offscreen_debounce() + REPAINT_GRACE, repaint.notified())
            .await
            .context("off-screen composite did not finish")?;
    }

    let mut canvas = CpuCanvas::new(args.width, args.height)?;
    canvas.set_transform(view.mat);
    renderer.draw(&mut canvas, &view, Interpolation::Linear, &render);
    let frame = canvas.finish();
    renderer.dispose();

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let rgba = frame.to_rgba_image();
    image::save_buffer_with_format(
        &args.out,
        rgba.as_raw(),
        frame.width(),
        frame.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

/// Animated renderer whose first presented frame is the one at `elapsed`.
async fn animated_at(
    item: &HqDisplayItem,
    transparent: bool,
    env: RendererEnv,
    elapsed: Duration,
) -> anyhow::Result<Renderer> {
    let bytes = item
        .file_bytes()
        .cloned()
        .context("animated item without file bytes")?;
    let animator = tokio::task::spawn_blocking(move || FrameAnimator::from_bytes(&bytes))
        .await
        .context("decode animation frames")??;
    animator.update(elapsed)?;
    Ok(Renderer::Animated(AnimatedImageRenderer::new(
        Box::new(animator),
        transparent,
        env,
    )))
}
