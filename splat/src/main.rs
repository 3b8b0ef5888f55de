use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use glam::UVec2;
use log::{info, warn};
use splat_lib::fixture::ring_fixture_ply;
use splat_lib::nav::{Command, NavConfig, Reply, Robot};
use splat_lib::raster::{render, Framebuffer};
use splat_lib::shading::{BlendMode, FootprintModel, RenderConfig};
use splat_lib::{load_scene_async, ColumnStore, PlyFormat, Scene, SplatCollection};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(
    name = "splat",
    version = "0.1",
    author = "Denis Avvakumov",
    about = "Inspects, renders and drives through Gaussian splat PLY files"
)]
struct Cli {
    #[command(subcommand)]
    command: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Print the header and a summary of the decoded splats.
    Info {
        #[arg(short = 'i', long = "input", value_name = "INPUT")]
        input: PathBuf,
    },
    /// Render one frame to a PNG.
    Render {
        #[arg(short = 'i', long = "input", value_name = "INPUT")]
        input: PathBuf,

        #[arg(short = 'o', long = "output", value_name = "OUTPUT")]
        output: PathBuf,

        #[command(flatten)]
        view: ViewArgs,
    },
    /// Write the two-ring test scene.
    Fixture {
        #[arg(short = 'o', long = "output", value_name = "OUTPUT")]
        output: PathBuf,

        #[arg(
            short = 'f',
            long = "format",
            default_value = "binary_little_endian",
            value_parser = parse_format,
            help = "ascii, binary_little_endian or binary_big_endian."
        )]
        format: PlyFormat,
    },
    /// Read JSON commands from stdin, render a frame per command and print
    /// a JSON reply per frame.
    Drive {
        #[arg(short = 'i', long = "input", value_name = "INPUT")]
        input: PathBuf,

        #[arg(
            short = 'd',
            long = "out-dir",
            value_name = "DIR",
            default_value = "frames",
            help = "Directory the frames are written to."
        )]
        out_dir: PathBuf,

        #[arg(long = "step", value_name = "STEP", help = "Default forward distance.")]
        step: Option<f32>,

        #[command(flatten)]
        view: ViewArgs,
    },
}

#[derive(Args, Debug)]
struct ViewArgs {
    #[arg(
        short = 'c',
        long = "config",
        value_name = "CONFIG",
        help = "JSON render configuration; the flags below override it."
    )]
    config: Option<PathBuf>,

    #[arg(long = "footprint", value_name = "MODEL", help = "covariance or ellipse.")]
    footprint: Option<FootprintModel>,

    #[arg(long = "blend", value_name = "MODE", help = "normal or additive.")]
    blend: Option<BlendMode>,

    #[arg(long = "sh-degree", value_name = "DEGREE")]
    sh_degree: Option<u32>,

    #[arg(long = "point-scale", value_name = "SCALE")]
    point_scale: Option<f32>,

    #[arg(long = "chi-scale", value_name = "SCALE")]
    chi_scale: Option<f32>,

    #[arg(long = "width", default_value = "800")]
    width: u32,

    #[arg(long = "height", default_value = "600")]
    height: u32,

    #[arg(long = "fov", default_value = "60", help = "Vertical field of view in degrees.")]
    fov: f32,

    #[arg(
        long = "point-size",
        default_value = "0.02",
        help = "Splat size used for plain point clouds."
    )]
    point_size: f32,
}

impl ViewArgs {
    fn render_config(&self) -> Result<RenderConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading config '{}'", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing config '{}'", path.display()))?
            }
            None => RenderConfig::default(),
        };
        if let Some(footprint) = self.footprint {
            config.footprint = footprint;
        }
        if let Some(blend) = self.blend {
            config.blend = blend;
        }
        if let Some(degree) = self.sh_degree {
            config.sh_degree = degree;
        }
        if let Some(scale) = self.point_scale {
            config.point_scale = scale;
        }
        if let Some(scale) = self.chi_scale {
            config.chi_scale = scale;
        }
        Ok(config)
    }

    fn viewport(&self) -> UVec2 {
        UVec2::new(self.width.max(1), self.height.max(1))
    }

    fn nav_config(&self) -> NavConfig {
        NavConfig {
            fov_y: self.fov.to_radians(),
            ..Default::default()
        }
    }
}

fn parse_format(token: &str) -> Result<PlyFormat, String> {
    PlyFormat::parse(token).ok_or_else(|| format!("unknown PLY format '{token}'"))
}

async fn load(path: &Path, point_size: f32) -> Result<SplatCollection> {
    let mut file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("opening '{}'", path.display()))?;

    let start = Instant::now();
    let scene = load_scene_async(&mut file)
        .await
        .with_context(|| format!("decoding '{}'", path.display()))?;
    info!(
        "Loaded {} {} from '{}' in {} ms",
        scene.len(),
        match scene {
            Scene::Splats(_) => "splats",
            Scene::Points(_) => "points",
        },
        path.display(),
        start.elapsed().as_millis()
    );

    Ok(match scene {
        Scene::Splats(collection) => collection,
        Scene::Points(cloud) => SplatCollection {
            format: PlyFormat::Ascii,
            vertex_count: cloud.len(),
            properties: Vec::new(),
            splats: cloud.to_splats(point_size),
        },
    })
}

fn save_png(frame: &Framebuffer, path: &Path) -> Result<()> {
    let image = image::RgbImage::from_raw(frame.width, frame.height, frame.to_rgb8())
        .ok_or_else(|| anyhow!("frame buffer does not match {}x{}", frame.width, frame.height))?;
    image
        .save(path)
        .with_context(|| format!("writing '{}'", path.display()))
}

fn info_mode(input: &Path) -> Result<()> {
    let raw_data = fs::read(input).with_context(|| format!("reading '{}'", input.display()))?;
    let header = splat_lib::header::parse_header(&raw_data)
        .with_context(|| format!("parsing header of '{}'", input.display()))?;

    println!("Input: {}", input.display());
    println!(
        "Format: {} | Vertices: {} | Header: {} bytes",
        header.format.as_str(),
        header.vertex_count,
        header.header_len
    );
    for property in &header.properties {
        println!("  property {} {}", property.ty.as_str(), property.name);
    }

    match splat_lib::decode_scene(&raw_data)? {
        Scene::Splats(collection) => {
            println!("Decoded {} splats", collection.len());
            if let Ok((min, max)) = collection.bounds() {
                println!("Bounds: {min} .. {max}");
            }
            let mean_opacity = collection.splats.iter().map(|s| s.opacity).sum::<f32>()
                / collection.len().max(1) as f32;
            println!("Mean opacity: {mean_opacity:.3}");
        }
        Scene::Points(cloud) => {
            println!("Decoded {} points (no Gaussian attributes)", cloud.len());
        }
    }
    Ok(())
}

fn render_mode(rt: &tokio::runtime::Runtime, input: &Path, output: &Path, view: &ViewArgs) -> Result<()> {
    let config = view.render_config()?;
    let collection = rt.block_on(load(input, view.point_size))?;
    let (min, max) = collection.bounds()?;

    let nav = view.nav_config();
    let camera = Robot::framing(min, max, &nav).camera(&nav, view.viewport());

    let start = Instant::now();
    let (frame, stats) = render(&ColumnStore::from_splats(&collection.splats), &camera, &config);
    info!(
        "Render Time: {} ms ({} drawn, {} culled)",
        start.elapsed().as_millis(),
        stats.drawn,
        stats.culled
    );

    save_png(&frame, output)?;
    info!("Successfully wrote to '{}'.", output.display());
    Ok(())
}

fn fixture_mode(output: &Path, format: PlyFormat) -> Result<()> {
    let bytes = ring_fixture_ply(format)?;
    fs::write(output, &bytes).with_context(|| format!("writing '{}'", output.display()))?;
    info!(
        "Wrote {} byte {} fixture to '{}'.",
        bytes.len(),
        format.as_str(),
        output.display()
    );
    Ok(())
}

async fn drive_mode(input: &Path, out_dir: &Path, step: Option<f32>, view: &ViewArgs) -> Result<()> {
    let config = view.render_config()?;
    let collection = load(input, view.point_size).await?;
    let columns = collection.columns();
    let viewport = view.viewport();

    let mut nav = view.nav_config();
    if let Some(step) = step {
        nav.step = step;
    }
    let (min, max) = collection.bounds()?;
    let mut robot = Robot::framing(min, max, &nav);

    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("creating '{}'", out_dir.display()))?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut index = 0;
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let reply = match serde_json::from_str::<Command>(&line) {
            Ok(command) => {
                robot.apply(command, &nav);
                let (frame, _) = render(&columns, &robot.camera(&nav, viewport), &config);
                let path = out_dir.join(format!("frame_{index:05}.png"));
                match save_png(&frame, &path) {
                    Ok(()) => {
                        let reply = robot.frame_reply(index, viewport, path.display().to_string());
                        index += 1;
                        reply
                    }
                    Err(err) => Reply::Error {
                        message: format!("{err:#}"),
                    },
                }
            }
            Err(err) => {
                warn!("Rejected command {line:?}: {err}");
                Reply::Error {
                    message: err.to_string(),
                }
            }
        };
        println!("{}", serde_json::to_string(&reply)?);
    }
    info!("Input closed after {} frames", index);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match &cli.command {
        Mode::Info { input } => info_mode(input),
        Mode::Render {
            input,
            output,
            view,
        } => render_mode(&rt, input, output, view),
        Mode::Fixture { output, format } => fixture_mode(output, *format),
        Mode::Drive {
            input,
            out_dir,
            step,
            view,
        } => rt.block_on(drive_mode(input, out_dir, *step, view)),
    }
}
