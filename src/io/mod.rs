use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::SystemTime;

use log::LevelFilter;

use crate::dock_config::DockConfig;
use crate::error::Result;
use crate::io::json_instance::{JsonInstance, JsonSolution};
use crate::EPOCH;

pub mod json_instance;
pub mod svg_export;

pub fn init_logger(level_filter: LevelFilter) -> Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            let handle = std::thread::current();
            let thread_name = handle.name().unwrap_or("-");

            let duration = EPOCH.elapsed();
            let sec = duration.as_secs() % 60;
            let min = (duration.as_secs() / 60) % 60;
            let hours = (duration.as_secs() / 60) / 60;

            let prefix = format!(
                "[{}] [{:0>2}:{:0>2}:{:0>2}] <{}>",
                record.level(),
                hours,
                min,
                sec,
                thread_name,
            );

            out.finish(format_args!("{:<27}{}", prefix, message))
        })
        .level(level_filter)
        .chain(std::io::stdout())
        .apply()?;
    log::info!("[EPOCH]: {}", humantime::format_rfc3339_seconds(SystemTime::now()));
    Ok(())
}

pub fn read_json_instance(path: &Path) -> Result<JsonInstance> {
    let file = File::open(path)?;
    let instance = serde_json::from_reader(BufReader::new(file))?;
    log::info!("[IO] read instance from {}", path.display());
    Ok(instance)
}

/// Reads a [`DockConfig`], missing fields fall back to their defaults
pub fn read_config(path: &Path) -> Result<DockConfig> {
    let file = File::open(path)?;
    let config = serde_json::from_reader(BufReader::new(file))?;
    log::info!("[IO] read config from {}", path.display());
    Ok(config)
}

pub fn write_json_solution(solution: &JsonSolution, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), solution)?;
    log::info!("[IO] solution written to file://{}", path.display());
    Ok(())
}

pub fn write_svg(document: &svg::Document, path: &Path) -> Result<()> {
    svg::save(path, document)?;
    log::info!("[IO] svg written to file://{}", path.display());
    Ok(())
}
