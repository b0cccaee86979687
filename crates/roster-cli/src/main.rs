//! `roster`: terminal client for the Roster school administration API.
//!
//! # Usage
//!
//! ```
//! roster --url http://localhost:5000 --email admin@school.edu --password secret
//! roster --config ~/.config/roster/config.toml
//! roster --email admin@school.edu --password secret signup \
//!   --full-name "Meera Iyer" --organization "Celestial High" --mobile 9876543210
//! roster --email admin@school.edu --password secret passwd --new-password s3cret!
//! ```
#![allow(async_fn_in_trait)]

mod app;
mod client;
mod module;
mod session;
mod ui;

use std::{
  fs::File,
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::Duration,
};

use anyhow::{Context, Result, bail};
use app::App;
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use roster_core::user::{PasswordChange, Signup, normalize_email};
use serde::Deserialize;

const DEFAULT_URL: &str = "http://localhost:5000";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "roster", about = "Terminal client for the Roster school administration API")]
struct Args {
  /// Path to a TOML config file (url, email, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the roster server (default: http://localhost:5000).
  #[arg(long, env = "ROSTER_URL")]
  url: Option<String>,

  /// Administrator email.
  #[arg(long, env = "ROSTER_EMAIL")]
  email: Option<String>,

  /// Administrator password (plaintext).
  #[arg(long, env = "ROSTER_PASSWORD")]
  password: Option<String>,

  /// Append diagnostic logs to this file.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Register a new administrator account with --email and --password.
  Signup {
    #[arg(long)]
    full_name:    String,
    #[arg(long)]
    organization: String,
    #[arg(long)]
    mobile:       String,
  },
  /// Change the password of --email, authenticating with --password.
  Passwd {
    #[arg(long)]
    new_password: String,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  email:    String,
  #[serde(default)]
  password: String,
}

fn read_config(path: &Path) -> Result<ConfigFile> {
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading config file {}", path.display()))?;
  toml::from_str(&raw).context("parsing config file")
}

/// A CLI flag, else a non-empty config-file value.
fn pick(flag: Option<String>, file: &str) -> Option<String> {
  flag.or_else(|| (!file.is_empty()).then(|| file.to_owned()))
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // The terminal belongs to the UI, so logs only ever go to a file.
  if let Some(path) = &args.log_file {
    let file = File::options()
      .create(true)
      .append(true)
      .open(path)
      .with_context(|| format!("opening log file {}", path.display()))?;
    tracing_subscriber::fmt()
      .with_env_filter(
        tracing_subscriber::EnvFilter::try_from_default_env()
          .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
      )
      .with_writer(Mutex::new(file))
      .with_ansi(false)
      .init();
  }

  let file_cfg = match &args.config {
    Some(path) => read_config(path)?,
    None => ConfigFile::default(),
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: pick(args.url, &file_cfg.url).unwrap_or_else(|| DEFAULT_URL.to_string()),
  };
  let email = pick(args.email, &file_cfg.email);
  let password = pick(args.password, &file_cfg.password);

  let client = ApiClient::new(api_config)?;

  match args.command {
    Some(Command::Signup { full_name, organization, mobile }) => {
      let (Some(email), Some(password)) = (email, password) else {
        bail!("signup needs --email and --password");
      };
      let body = Signup {
        full_name,
        organization_name: organization,
        email: normalize_email(&email),
        mobile_no: mobile,
        password,
      };
      body.validate()?;
      let user = client.signup(&body).await?;
      println!("Account created successfully");
      println!("  {} <{}>", user.full_name, user.email);
      println!("  {}", user.organization_name);
      Ok(())
    }
    Some(Command::Passwd { new_password }) => {
      let (Some(email), Some(current_password)) = (email, password) else {
        bail!("passwd needs --email and the current --password");
      };
      let body = PasswordChange { current_password, new_password };
      body.validate()?;
      let message = client
        .change_password(&normalize_email(&email), &body)
        .await?;
      println!("{message}");
      Ok(())
    }
    None => run_tui(client, email, password).await,
  }
}

// ─── TUI ──────────────────────────────────────────────────────────────────────

async fn run_tui(client: ApiClient, email: Option<String>, password: Option<String>) -> Result<()> {
  let mut app = App::new(client);
  let auto_sign_in = email.is_some() && password.is_some();
  app.login.email = email.unwrap_or_default();
  app.login.password = password.unwrap_or_default();
  if !app.login.email.is_empty() {
    app.login.on_password = true;
  }

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  if auto_sign_in {
    app.sign_in().await;
  }

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && !app.handle_key(key).await
    {
      break;
    }
  }

  Ok(())
}
