mod poll;
mod state;
mod theme;
mod ui;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use poll::{poll_loop, PollCommand, PollEvent, EVENT_QUEUE_CAPACITY};
use ratatui::{backend::CrosstermBackend, Terminal};
use runnerdeck_core::MonitorTarget;
use runnerdeck_github::GithubClient;
use state::{Action, App};
use std::io;
use std::process::Command;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

const COMMAND_QUEUE_CAPACITY: usize = 8;

/// Live view of GitHub Actions self-hosted runners and their current jobs.
#[derive(Debug, Parser)]
#[command(name = "runnerdeck", version)]
struct Args {
    /// Monitor runners for an organization
    #[arg(long, conflicts_with = "repo")]
    org: Option<String>,

    /// Monitor runners for one repository (owner/repo)
    #[arg(long)]
    repo: Option<String>,

    /// Poll interval in seconds
    #[arg(long, default_value_t = 5)]
    interval: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    // Everything that can fail at startup happens before the terminal is
    // touched, so errors land on a normal screen.
    let target = resolve_target(&args)?;
    let client = GithubClient::from_env().context("failed to create GitHub client")?;

    let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
    let (event_tx, mut event_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
    let period = Duration::from_secs(args.interval.max(1));
    let poll_handle = tokio::spawn(poll_loop(
        client,
        target.clone(),
        period,
        command_rx,
        event_tx,
    ));

    let mut terminal = setup_terminal()?;
    let mut app = App::new(target);
    let result = run_app(&mut terminal, &mut app, &mut event_rx, &command_tx).await;

    // Stop the poller before leaving the alternate screen; aborting also
    // cancels an in-flight fetch.
    poll_handle.abort();
    let _ = poll_handle.await;
    restore_terminal(&mut terminal)?;
    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut mpsc::Receiver<PollEvent>,
    commands: &mpsc::Sender<PollCommand>,
) -> Result<()> {
    let mut input = EventStream::new();
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;
        tokio::select! {
            Some(event) = events.recv() => {
                app.apply_event(event);
            }
            maybe_input = input.next() => {
                let Some(input_event) = maybe_input.transpose()? else {
                    break;
                };
                match input_event {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        match app.handle_key(key) {
                            Action::Quit => break,
                            Action::Refresh => {
                                let _ = commands.try_send(PollCommand::Refresh);
                            }
                            Action::None => {}
                        }
                    }
                    // A resize redraws on the next pass of the loop.
                    _ => {}
                }
            }
        }
    }
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn resolve_target(args: &Args) -> Result<MonitorTarget> {
    if let Some(org) = &args.org {
        return Ok(MonitorTarget::Organization { org: org.clone() });
    }
    if let Some(repo) = &args.repo {
        return MonitorTarget::parse_repo(repo).map_err(Into::into);
    }
    ambient_repository()
        .ok_or_else(|| anyhow!("not in a git repository and no --repo or --org given"))
}

fn ambient_repository() -> Option<MonitorTarget> {
    let output = Command::new("git")
        .args(["remote", "get-url", "origin"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let url = String::from_utf8(output.stdout).ok()?;
    parse_remote_url(url.trim())
}

/// Accepts the two GitHub remote shapes: `git@host:owner/repo(.git)` and
/// `http(s)://host/owner/repo(.git)`.
fn parse_remote_url(url: &str) -> Option<MonitorTarget> {
    let path = if let Some((_, rest)) = url.split_once('@') {
        rest.split_once(':').map(|(_, path)| path)?
    } else if let Some(rest) = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
    {
        rest.split_once('/').map(|(_, path)| path)?
    } else {
        return None;
    };
    let path = path.trim_end_matches('/').trim_end_matches(".git");
    MonitorTarget::parse_repo(path).ok()
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_enabled = matches!(
        std::env::var("RUNNERDECK_LOG_STDOUT").ok().as_deref(),
        Some("1") | Some("true") | Some("TRUE") | Some("yes") | Some("YES")
    );
    // Stray log lines tear the alternate screen, so logs are discarded
    // unless explicitly routed to stdout.
    if stdout_enabled {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::sink)
            .try_init();
    }
}
