mod ui;

use clap::{error::ErrorKind, ArgAction, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use keysprint::{
    config::{Config, ConfigStore, FileConfigStore},
    controller::{Phase, SessionController},
    error::SessionError,
    input,
    kv::{KvStore, MemoryKvStore, SqliteKvStore},
    logging::{init_logging, LogConfig},
    observer::TracingObserver,
    runtime::{terminal_events, AppEvent, EventSource, Runner},
    score_store::{ScoreStore, SessionRecord},
    word_bank::BuiltinBank,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
};
use tracing::{info, warn};

/// timed typing test with live wpm, accuracy and a local best score
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct Cli {
    /// number of seconds to run the test
    #[clap(short = 's', long)]
    secs: Option<u64>,

    /// built-in word bank to draw from
    #[clap(short = 'b', long, value_enum)]
    bank: Option<BuiltinBank>,

    /// json word bank ({"name": "...", "words": [...]}), overrides --bank
    #[clap(long)]
    words_file: Option<PathBuf>,

    /// ui refresh interval in milliseconds
    #[clap(long)]
    tick_ms: Option<u64>,

    /// log verbosity, repeat for more (-v info, -vv debug, -vvv trace)
    #[clap(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    /// forget the stored best score and exit
    #[clap(long)]
    clear_best: bool,

    /// write the effective settings to the config file
    #[clap(long)]
    save: bool,
}

impl Cli {
    /// Layer command line values over the stored configuration.
    fn apply(&self, mut config: Config) -> Config {
        if let Some(secs) = self.secs {
            config.duration_secs = secs;
        }
        if let Some(bank) = self.bank {
            config.word_bank = bank.to_string();
            config.words_file = None;
        }
        if let Some(path) = &self.words_file {
            config.words_file = Some(path.clone());
        }
        if let Some(tick_ms) = self.tick_ms {
            config.tick_ms = tick_ms;
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

pub struct App {
    pub controller: SessionController<Box<dyn KvStore>>,
    pub best: Option<SessionRecord>,
    /// One-line notice shown under the words until the next session starts.
    pub status: Option<String>,
}

impl App {
    pub fn new(config: &Config, store: Box<dyn KvStore>) -> Result<Self, SessionError> {
        let controller = SessionController::with_store(config.session_config()?, store)?
            .with_observer(Box::new(TracingObserver));
        let best = controller.best();

        Ok(Self {
            controller,
            best,
            status: None,
        })
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Action {
        if key.kind == KeyEventKind::Release {
            return Action::Continue;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return Action::Quit,
            KeyCode::Char('c') if ctrl => return Action::Quit,
            KeyCode::Tab => {
                self.controller.reset();
                self.status = None;
            }
            KeyCode::Char('n') if ctrl => {
                if let Err(e) = self.controller.regenerate() {
                    self.report(e);
                }
            }
            KeyCode::Char('x') if ctrl => {
                self.controller.clear_best();
                self.best = None;
                self.status = Some("high score reset".to_string());
            }
            _ => {
                if let Some(key) = input::from_key_event(&key) {
                    let before = self.controller.phase();
                    if let Err(e) = self.controller.handle_key(key) {
                        self.report(e);
                    }
                    self.after_transition(before);
                }
            }
        }

        Action::Continue
    }

    pub fn on_tick(&mut self) {
        let Some(handle) = self.controller.tick_handle() else {
            return;
        };
        let before = self.controller.phase();
        self.controller.tick(handle);
        self.after_transition(before);
    }

    fn after_transition(&mut self, before: Phase) {
        match (before, self.controller.phase()) {
            (Phase::Running, Phase::Finished) => self.best = self.controller.best(),
            (_, Phase::Running) if before != Phase::Running => self.status = None,
            _ => {}
        }
    }

    fn report(&mut self, e: SessionError) {
        warn!(error = %e, "session request rejected");
        self.status = Some(e.to_string());
    }
}

fn open_store() -> Box<dyn KvStore> {
    match SqliteKvStore::open_default() {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!(error = %e, "score database unavailable, best score will not persist");
            Box::new(MemoryKvStore::new())
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&LogConfig::from_verbosity(cli.verbose)) {
        eprintln!("logging disabled: {e}");
    }

    let config_store = FileConfigStore::new();
    let config = cli.apply(config_store.load());
    if cli.save {
        config_store.save(&config)?;
        info!(path = %config_store.path().display(), "settings saved");
    }

    if cli.clear_best {
        ScoreStore::new(open_store()).clear();
        println!("high score reset");
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut app = match App::new(&config, open_store()) {
        Ok(app) => app,
        Err(e) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, e).exit();
        }
    };

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(terminal_events(), config.tick_interval());
    let res = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn start_tui<B: Backend, E: EventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        let Some(event) = runner.step() else {
            break;
        };
        match event {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => {}
            AppEvent::Key(key) => {
                if app.on_key(key) == Action::Quit {
                    break;
                }
            }
        }
    }

    Ok(())
}
