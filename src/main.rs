use std::path::PathBuf;
use std::str::FromStr;

use chrono::Local;
use clap::Parser as ClapParser;
use log::LevelFilter;
use mimalloc::MiMalloc;

use dock::dock_config::DockConfig;
use dock::dock_optimizer::DockOptimizer;
use dock::dock_parse::DockParse;
use dock::error::DockError;
use dock::io::json_instance::JsonSolution;
use dock::io::svg_export::{self, SvgRenderer};
use dock::io;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(ClapParser)]
#[command(name = "dock", about = "Docks rigid shapes so that equally labeled landmarks meet")]
struct Cli {
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    #[arg(short, long, value_name = "FOLDER", default_value = ".")]
    output: PathBuf,
    #[arg(short, long, default_value = "info")]
    log_level: String,
    /// Write every n-th evaluated configuration as svg to `<output>/frames`
    #[arg(long, value_name = "N")]
    frames: Option<usize>,
}

fn main() -> Result<(), DockError> {
    let args = Cli::parse();
    let level = LevelFilter::from_str(&args.log_level).unwrap_or(LevelFilter::Info);
    io::init_logger(level)?;

    let config = match &args.config {
        Some(path) => io::read_config(path)?,
        None => {
            log::warn!("[MAIN] no config file provided, using default config");
            DockConfig::default()
        }
    };
    log::info!("[MAIN] config: {:?}", config);

    let json_instance = io::read_json_instance(&args.input)?;
    let shapes = DockParse::new(config.center_shapes).parse(&json_instance)?;
    let optimizer = DockOptimizer::new(shapes, config);

    let solution = match args.frames {
        Some(interval) => {
            let folder = args.output.join("frames");
            std::fs::create_dir_all(&folder)?;
            let mut renderer = SvgRenderer::with_folder(folder, interval);
            optimizer.solve_with_renderer(&mut renderer)?
        }
        None => optimizer.solve()?,
    };

    std::fs::create_dir_all(&args.output)?;
    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let json_path = args.output.join(format!("solution_{timestamp}.json"));
    let svg_path = args.output.join(format!("solution_{timestamp}.svg"));

    io::write_json_solution(&JsonSolution::new(&solution, json_instance.name.clone()), &json_path)?;
    io::write_svg(
        &svg_export::configuration_to_svg(&optimizer.shapes, &solution.configuration),
        &svg_path,
    )?;

    Ok(())
}
