use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

use stitchview::{
    DesignId, FsFetcher, GarmentColor, GarmentKind, GarmentVariant, PlacementState, PreviewStage,
    Side, SizeClass, ViewportSize, catalog,
};

#[derive(Parser, Debug)]
#[command(name = "stitchview", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite one mockup preview frame as a PNG.
    Preview(PreviewArgs),
    /// List the built-in design assets.
    Designs,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Garment kind.
    #[arg(long, value_enum)]
    garment: GarmentChoice,

    /// Garment color as a #RRGGBB token.
    #[arg(long, default_value = "#FFFFFF")]
    color: String,

    /// Which side of the garment to show.
    #[arg(long, value_enum, default_value_t = SideChoice::Front)]
    side: SideChoice,

    /// Design id from the built-in table (see `designs`).
    #[arg(long)]
    design: Option<u32>,

    /// Design size class.
    #[arg(long, value_enum, default_value_t = SizeChoice::Medium)]
    size: SizeChoice,

    /// Horizontal design position in percent (clamped to 10..90).
    #[arg(long, default_value_t = 50.0)]
    x: f64,

    /// Vertical design position in percent (clamped to 10..90).
    #[arg(long, default_value_t = 50.0)]
    y: f64,

    /// Design rotation in degrees (wrapped into 0..360).
    #[arg(long, default_value_t = 0)]
    rotation: u16,

    /// Directory holding garment templates and design images.
    #[arg(long)]
    assets: PathBuf,

    /// Output width in pixels.
    #[arg(long, default_value_t = 600)]
    width: u32,

    /// Output height in pixels.
    #[arg(long, default_value_t = 800)]
    height: u32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum GarmentChoice {
    Shirt,
    Hoodie,
}

impl From<GarmentChoice> for GarmentKind {
    fn from(c: GarmentChoice) -> Self {
        match c {
            GarmentChoice::Shirt => GarmentKind::Shirt,
            GarmentChoice::Hoodie => GarmentKind::Hoodie,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq)]
enum SideChoice {
    Front,
    Back,
}

impl From<SideChoice> for Side {
    fn from(c: SideChoice) -> Self {
        match c {
            SideChoice::Front => Side::Front,
            SideChoice::Back => Side::Back,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq)]
enum SizeChoice {
    Small,
    Medium,
    Large,
}

impl From<SizeChoice> for SizeClass {
    fn from(c: SizeChoice) -> Self {
        match c {
            SizeChoice::Small => SizeClass::Small,
            SizeChoice::Medium => SizeClass::Medium,
            SizeChoice::Large => SizeClass::Large,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Preview(args) => cmd_preview(args),
        Command::Designs => cmd_designs(),
    }
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let viewport = ViewportSize::new(args.width, args.height)?;
    let mut stage = PreviewStage::new(viewport)?;

    let color = GarmentColor::parse(&args.color)
        .with_context(|| format!("parse color token '{}'", args.color))?;
    stage.set_variant(GarmentVariant {
        kind: args.garment.into(),
        color,
        side: args.side.into(),
    });

    if let Some(id) = args.design {
        let design = catalog::design_by_id(DesignId(id))
            .with_context(|| format!("unknown design id {id} (see `stitchview designs`)"))?;
        stage.select_design(design.clone())?;

        let mut placement = PlacementState::default();
        placement.set_position(args.x, args.y);
        placement.set_rotation(args.rotation);
        placement.set_size_class(args.size.into());
        stage.restore_placement(placement);
    }

    let fetcher = FsFetcher::new(&args.assets);
    stage.pump_assets(&fetcher);
    let frame = stage.composite()?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_designs() -> anyhow::Result<()> {
    for d in catalog::designs() {
        println!(
            "{:>3}  {:<18} {:?}  scale {:.2}  {}",
            d.id.0, d.display_name, d.category, d.intrinsic_scale, d.image
        );
    }
    Ok(())
}
