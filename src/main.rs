use clap::{Parser, Subcommand};
use respimg::config::{self, RespimgConfig};
use respimg::imaging::RustEncoder;
use respimg::request::ImageRequest;
use respimg::store::DiskStore;
use respimg::{generate, output, plan, validate};
use std::path::PathBuf;
use std::sync::Arc;

/// Fields of one image reference. Anything omitted falls back to the
/// config file's `[defaults]`.
#[derive(clap::Args, Clone)]
struct RequestArgs {
    /// Source filename inside the image directory (e.g. hero.png)
    #[arg(long)]
    src: Option<String>,

    /// Alt text
    #[arg(long)]
    alt: Option<String>,

    /// Directory holding the source and its variants
    #[arg(long)]
    image_dir: Option<String>,

    /// Prefix prepended to image-dir for filesystem access
    #[arg(long)]
    input_dir: Option<String>,

    /// Variant widths in pixels
    #[arg(long, value_delimiter = ',')]
    widths: Option<Vec<u32>>,

    /// sizes attribute
    #[arg(long)]
    sizes: Option<String>,

    /// class attribute on <img>
    #[arg(long)]
    class: Option<String>,

    /// id attribute on <img>
    #[arg(long)]
    id: Option<String>,

    /// Display width attribute on <img>
    #[arg(long)]
    width: Option<u32>,

    /// Display height attribute on <img>
    #[arg(long)]
    height: Option<u32>,

    /// JPEG and WebP quality (1-100)
    #[arg(long)]
    quality: Option<u32>,

    /// Rebuild variants even if all exist
    #[arg(long)]
    overwrite: bool,

    /// Log every written variant with its size
    #[arg(long)]
    debug: bool,

    /// Width whose JPEG becomes <img src> (default: smallest)
    #[arg(long)]
    fallback_width: Option<u32>,
}

impl RequestArgs {
    fn into_request(self, config: &RespimgConfig) -> ImageRequest {
        ImageRequest {
            source: self.src,
            alt: self.alt,
            class: self.class,
            id: self.id,
            width: self.width,
            height: self.height,
            sizes: self.sizes,
            input_dir: self.input_dir,
            image_dir: self.image_dir,
            widths: self.widths,
            quality: self.quality,
            // Unset switches defer to the config file
            overwrite: self.overwrite.then_some(true),
            debug: self.debug.then_some(true),
            fallback_src_width: self.fallback_width,
        }
        .with_defaults(&config.defaults)
    }
}

#[derive(Parser)]
#[command(name = "respimg")]
#[command(about = "Responsive image variants and <picture> markup for static sites")]
#[command(long_about = "\
Responsive image variants and <picture> markup for static sites

For one source image, writes a JPEG and a WebP variant per requested width
next to the source, and prints the <picture> element that references them.
Variants are only rebuilt when some are missing or --overwrite is given.

  respimg render --src hero.png --alt \"Hero\" --input-dir ./site/ \\
      --image-dir /img/ --widths 320,640,1024 --sizes 100vw

writes ./site//img/hero-{320,640,1024}.{jpeg,webp} and prints markup using
img/hero-320.jpeg as the fallback src.

Run 'respimg gen-config' to generate a documented respimg.toml.")]
#[command(version)]
struct Cli {
    /// Config file (optional)
    #[arg(long, default_value = "respimg.toml", global = true)]
    config: PathBuf,

    /// Debug-level logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print <picture> markup and write any missing variants
    Render(RequestArgs),
    /// Show the variants and decision without encoding
    Plan {
        #[command(flatten)]
        request: RequestArgs,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print a stock respimg.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Render(args) => {
            let config = config::load_config(&cli.config)?;
            init_thread_pool(&config.processing);
            let request = args.into_request(&config);
            let encoder = Arc::new(RustEncoder::new());

            let (tx, rx) = std::sync::mpsc::channel();
            let rendered = generate::generate(&request, &encoder, &DiskStore, Some(tx))?;
            println!("{}", rendered.html);

            // Keep the process alive until every detached encode has reported
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_process_event(&event) {
                        eprintln!("{}", line);
                    }
                }
            });
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
        }
        Command::Plan { request, json } => {
            let config = config::load_config(&cli.config)?;
            let request = validate::validate(&request.into_request(&config), &DiskStore)?;
            let plan = plan::plan(&request, &DiskStore);
            if json {
                let value = serde_json::json!({ "request": request, "plan": plan });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                output::print_plan(&request, &plan);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
