#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use std::process::ExitCode;

use dungeon_rooms::{Dungeon, DungeonConfig, Result, Stage};

fn run() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => DungeonConfig::from_path(path)?,
        None => DungeonConfig::default(),
    };

    let mut stage = Stage::from_config(&config)?;
    let mut dungeon_generator = Dungeon::new(&mut stage, &config)?;
    dungeon_generator.generate();
    println!("{stage}");
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
