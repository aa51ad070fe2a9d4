use crossterm::event::{self, Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use parakeet::config::{self, ClientConfig, Command};
use parakeet::constants::FRAME_INTERVAL_MS;
use parakeet::game::{process_input, process_tick, ParakeetGame, ParakeetInput};
use parakeet::highscore::{LocalBest, ScoreClient, ScoreReporter};
use parakeet::ui::{render_game, Hud};
use parakeet::utils::build_info;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::{Duration, Instant};

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let command = match config::parse_args(&args, |key| std::env::var(key).ok()) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{}", message);
            eprintln!("Run 'parakeet --help' for usage.");
            std::process::exit(1);
        }
    };

    match command {
        Command::Version => {
            println!("{}", build_info::version_line());
            Ok(())
        }
        Command::Help => {
            println!("{}", config::USAGE);
            Ok(())
        }
        Command::Serve(server_config) => {
            init_logging("info");
            run_server(server_config)
        }
        Command::Play(client_config) => {
            // Anything chattier than warnings would draw over the game
            init_logging("warn");
            run_game(client_config)
        }
    }
}

fn init_logging(default_filter: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

#[cfg(feature = "server")]
fn run_server(server_config: config::ServerConfig) -> io::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(parakeet::server::start_server(server_config))
}

#[cfg(not(feature = "server"))]
fn run_server(_server_config: config::ServerConfig) -> io::Result<()> {
    eprintln!("This build has no backend. Rebuild with `--features server`.");
    std::process::exit(1);
}

fn run_game(client_config: ClientConfig) -> io::Result<()> {
    let local = LocalBest::open_default()?;
    let client = if client_config.offline {
        None
    } else {
        Some(ScoreClient::new(&client_config.server_url))
    };
    let mut reporter = ScoreReporter::new(local, client);
    let mut hud = Hud::new(reporter.local_best(), client_config.offline);
    reporter.refresh();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(event::EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = game_loop(&mut terminal, &mut reporter, &mut hud);

    // Restore the terminal even if the loop failed
    disable_raw_mode()?;
    terminal.backend_mut().execute(event::DisableMouseCapture)?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn game_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    reporter: &mut ScoreReporter,
    hud: &mut Hud,
) -> io::Result<()> {
    let mut game = ParakeetGame::new();
    let mut rng = rand::thread_rng();
    let frame_interval = Duration::from_millis(FRAME_INTERVAL_MS);
    let mut last_frame = Instant::now();

    loop {
        let timeout = frame_interval.saturating_sub(last_frame.elapsed());
        if event::poll(timeout)? {
            let input = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => map_key(key.code),
                Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                    ParakeetInput::Flap
                }
                _ => ParakeetInput::Other,
            };
            if !process_input(&mut game, input) {
                return Ok(());
            }
        }

        if last_frame.elapsed() < frame_interval {
            continue;
        }
        last_frame = Instant::now();

        let result = process_tick(&mut game, &mut rng);
        if let Some(score) = result.round_ended() {
            reporter.round_ended(score);
            hud.local_best = reporter.local_best();
        }
        for update in reporter.poll_updates() {
            hud.apply(update);
        }

        let snapshot = game.snapshot();
        terminal.draw(|frame| {
            render_game(frame, frame.size(), &snapshot, &game.config, hud);
        })?;
    }
}

fn map_key(code: KeyCode) -> ParakeetInput {
    match code {
        KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter => ParakeetInput::Flap,
        KeyCode::Char('r') | KeyCode::Char('R') => ParakeetInput::Restart,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => ParakeetInput::Quit,
        _ => ParakeetInput::Other,
    }
}
