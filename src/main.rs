use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use terragen::config::{Params, Seed, Size, WorldShape};
use terragen::output::WorldgenOutput;
use terragen::render;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliShape {
    Freeform,
    Circle,
    Rectangle,
}

impl From<CliShape> for WorldShape {
    fn from(value: CliShape) -> Self {
        match value {
            CliShape::Freeform => WorldShape::Freeform,
            CliShape::Circle => WorldShape::Circle,
            CliShape::Rectangle => WorldShape::Rectangle,
        }
    }
}

/// Generate a planar world and write its layers as PNGs plus world.json
#[derive(Parser, Debug)]
#[command(name = "terragen", version, about)]
struct Cli {
    /// Seed, a number or any text
    #[arg(long, default_value = "42")]
    seed: String,

    #[arg(long, default_value_t = 250)]
    width: usize,

    #[arg(long, default_value_t = 200)]
    height: usize,

    /// Water surface height of the sea (1-255)
    #[arg(long, default_value_t = 102)]
    sealevel: i64,

    #[arg(long, value_enum, default_value_t = CliShape::Freeform)]
    shape: CliShape,

    /// Island falloff power (1-5)
    #[arg(long, default_value_t = 2.0)]
    shape_power: f32,

    /// Output directory
    #[arg(long, value_name = "DIR", default_value = "artifacts")]
    out: PathBuf,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let params = Params {
        seed: Seed::from(cli.seed.as_str()),
        size: Size {
            width: cli.width,
            height: cli.height,
        },
        sealevel: cli.sealevel,
        world_shape: cli.shape.into(),
        world_shape_power: cli.shape_power,
        ..Params::default()
    };

    eprintln!(
        "Generating {}x{} world with seed={}, sealevel={}",
        cli.width,
        cli.height,
        params.seed.value(),
        params.sealevel
    );

    let (world, timings) = match terragen::generate(&params) {
        Ok(done) => done,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };

    eprintln!("\nTimings:");
    for t in &timings {
        eprintln!("  {:20} {:8.1} ms", t.name, t.ms);
    }

    std::fs::create_dir_all(&cli.out).expect("failed to create output directory");

    let (w, h) = (world.w as u32, world.h as u32);
    for (name, rgba) in render::render_layers(&world) {
        let path = cli.out.join(format!("{name}.png"));
        image::save_buffer(&path, &rgba, w, h, image::ColorType::Rgba8)
            .expect("failed to save image");
        eprintln!("Saved {}", path.display());
    }

    let output = WorldgenOutput::from_world(&world);
    let path = cli.out.join("world.json");
    let file = std::fs::File::create(&path).expect("failed to create world.json");
    serde_json::to_writer(std::io::BufWriter::new(file), &output)
        .expect("failed to write world.json");
    eprintln!("Saved {}", path.display());

    eprintln!(
        "\n{} basins, ocean {:.1}%",
        output.drainage_basins.len(),
        output.stats.ocean_fraction * 100.0
    );
    for (biome, share) in &output.stats.biome_fractions {
        eprintln!("  {:22} {:5.1}%", biome, share * 100.0);
    }
    eprintln!("\nDone.");
}
