//! Cube Roll entry point
//!
//! The web build is driven from JavaScript through `cube_roll::web`. Natively
//! this is a small command-line player:
//!
//! ```text
//! cube-roll <level.json> [--store <file>] [--reset] [<cube>:<direction> | undo]...
//! ```

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::str::FromStr;

    use clap::Parser;
    use cube_roll::persistence::{JsonFileStore, StorageError};
    use cube_roll::sim::{Board, Direction, MoveResult};
    use cube_roll::{EngineConfig, LevelError, LevelSession};

    const DEFAULT_STORE: &str = "cube-roll-save.json";

    #[derive(Debug, thiserror::Error)]
    pub enum CliError {
        #[error(transparent)]
        Level(#[from] LevelError),
        #[error("save file: {0}")]
        Storage(#[from] StorageError),
    }

    /// One scripted input
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Step {
        Roll(usize, Direction),
        Undo,
    }

    impl FromStr for Step {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            if s.eq_ignore_ascii_case("undo") {
                return Ok(Step::Undo);
            }
            let (cube, dir) = s
                .split_once(':')
                .ok_or_else(|| format!("expected <cube>:<direction>, got '{s}'"))?;
            let cube = cube
                .parse::<usize>()
                .map_err(|e| format!("bad cube index '{cube}': {e}"))?;
            Ok(Step::Roll(cube, dir.parse()?))
        }
    }

    /// Play a Cube Roll level from the command line
    #[derive(Parser, Debug)]
    #[command(name = "cube-roll")]
    #[command(about = "Roll coloured cubes onto matching goals", long_about = None)]
    #[command(version)]
    struct Args {
        /// Level definition JSON
        level: PathBuf,

        /// Save file holding move history and best completions
        #[arg(long, default_value = DEFAULT_STORE)]
        store: PathBuf,

        /// Discard the saved move history before playing
        #[arg(long)]
        reset: bool,

        /// Moves to play in order: `<cube>:<direction>` or `undo`
        steps: Vec<Step>,
    }

    /// Level identity used for storage keys: the file stem, as the web build uses the URL
    fn level_name(path: &Path) -> String {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| cube_roll::consts::DEFAULT_LEVEL.to_string())
    }

    fn draw(board: &Board) -> String {
        let mut out = String::new();
        for y in 0..board.size() {
            for x in 0..board.size() {
                let pos = glam::IVec2::new(x, y);
                let cell = match (board.cube_index_at(pos), board.goal_at(pos)) {
                    (Some(i), _) => {
                        let top = board.cubes()[i].orientation.top().as_str();
                        format!("{i}{}", top.chars().next().unwrap_or('?'))
                    }
                    (None, Some(goal)) => {
                        format!("*{}", goal.required_top.as_str().chars().next().unwrap_or('?'))
                    }
                    (None, None) => " .".to_string(),
                };
                out.push_str(&format!("{cell:>3}"));
            }
            out.push('\n');
        }
        out
    }

    pub fn run() -> Result<(), CliError> {
        let args = Args::parse();
        let name = level_name(&args.level);
        let json = fs::read_to_string(&args.level).map_err(|e| LevelError::Unreadable {
            name: name.clone(),
            reason: e.to_string(),
        })?;

        let store = JsonFileStore::open(&args.store)?;
        let config = EngineConfig::load(&store);
        let mut session = LevelSession::load(name, &json, store, config, args.reset)?;

        for step in args.steps {
            let accepted = match step {
                Step::Roll(cube, dir) => match session.request_move(cube, dir) {
                    MoveResult::Accepted(_) => true,
                    MoveResult::Rejected(reason) => {
                        println!("cube {cube} {dir}: rejected ({reason:?})");
                        false
                    }
                },
                Step::Undo => {
                    let started = session.undo().is_some();
                    if !started {
                        println!("undo: nothing to undo");
                    }
                    started
                }
            };
            if accepted {
                if let Some(settled) = session.tick(1.0) {
                    if settled.best_recorded {
                        println!("new best: {} moves", session.move_count());
                    }
                }
            }
        }

        println!("{} ({})", session.display_name(), session.name());
        print!("{}", draw(session.board()));
        println!("moves: {}", session.move_count());
        if let Some(stars) = session.star_rating() {
            println!("stars: {stars}");
        }
        println!("solved: {}", session.is_satisfied());
        if let Some(best) = session.best_completion() {
            println!("best: {} moves", best.move_count());
        }
        println!("saved to {}", session.store().path().display());
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Cube Roll (native) starting...");

    if let Err(e) = native::run() {
        log::error!("{e}");
        eprintln!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is cube_roll::web::start, this is just to satisfy the compiler
}
