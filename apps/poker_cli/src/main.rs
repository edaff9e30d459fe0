use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use clap::Parser;
use client_core::{
    action::Action,
    selectors,
    services::{FsFileReader, HttpRoomService},
    settings::JsonFileSettings,
    time_util, AddressBar, ClientEvent, EngineDependencies, SyncEngine,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::{broadcast, mpsc},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod prompt;
mod transport;

use config::{default_client_settings_path, load_settings, websocket_url};
use prompt::PromptCommand;
use transport::TransportEvent;

#[derive(Parser, Debug)]
struct Args {
    /// Room to open on startup.
    #[arg(long)]
    room: Option<String>,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    avatar: Option<u32>,
    #[arg(long)]
    user_id: Option<String>,
    #[arg(long)]
    settings_path: Option<PathBuf>,
}

/// Location changes are fed back to the engine from the main loop.
struct ChannelAddressBar {
    locations: mpsc::UnboundedSender<String>,
}

impl AddressBar for ChannelAddressBar {
    fn push(&self, path: &str) {
        let _ = self.locations.send(path.to_string());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(v) = args.server_url {
        settings.server_url = v;
    }
    if let Some(v) = args.username {
        settings.username = Some(v);
    }
    if let Some(v) = args.email {
        settings.email = Some(v);
    }
    if let Some(v) = args.avatar {
        settings.avatar = Some(v);
    }
    if let Some(v) = args.user_id {
        settings.user_id = Some(v);
    }
    if let Some(v) = args.settings_path {
        settings.settings_path = Some(v);
    }

    let settings_path = match settings.settings_path.clone() {
        Some(path) => path,
        None => default_client_settings_path()?,
    };
    let client_settings = Arc::new(JsonFileSettings::open(&settings_path)?);
    let rooms = Arc::new(HttpRoomService::new(&settings.server_url)?);
    let ws_url = websocket_url(&settings.server_url)?;
    info!(server_url = %settings.server_url, %ws_url, "starting planning poker client");

    let (sink, mut transport) = transport::spawn(
        ws_url,
        Duration::from_millis(settings.reconnect_delay_ms),
    );
    let (locations_tx, mut locations) = mpsc::unbounded_channel();
    let deps = EngineDependencies {
        commands: Arc::new(sink),
        address_bar: Arc::new(ChannelAddressBar {
            locations: locations_tx.clone(),
        }),
        rooms,
        files: Arc::new(FsFileReader),
        settings: client_settings,
        next_story: selectors::find_next_story_id_to_estimate,
    };
    let (mut engine, mut completions) = SyncEngine::new(deps, settings.preset())?;
    let mut client_events = engine.subscribe_events();

    let initial = args.room.map(|room| format!("/{room}")).unwrap_or_else(|| "/".into());
    let _ = locations_tx.send(initial);
    println!("{}", prompt::HELP);

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(event) = transport.recv() => match event {
                TransportEvent::Connected { reconnect: true } => engine.socket_reconnected(),
                TransportEvent::Connected { reconnect: false } => {}
                TransportEvent::Event(event) => engine.dispatch_event(event),
                TransportEvent::Disconnected => warn!("connection lost; reconnecting"),
            },
            Some(path) = locations.recv() => engine.location_changed(&path),
            Some(completion) = completions.recv() => {
                // already published as a fault
                let _ = engine.handle_completion(completion);
            }
            line = stdin.next_line() => {
                let Some(line) = line? else { break };
                match PromptCommand::parse(&line) {
                    Ok(PromptCommand::Quit) => break,
                    Ok(PromptCommand::Help) => println!("{}", prompt::HELP),
                    Ok(PromptCommand::Log) => print_action_log(&engine),
                    Ok(PromptCommand::State) => print_state(&engine),
                    Ok(command) => prompt::execute(command, &mut engine),
                    Err(err) => eprintln!("{err}"),
                }
            }
        }
        render(&engine, &mut client_events);
    }

    Ok(())
}

fn render(engine: &SyncEngine, client_events: &mut broadcast::Receiver<ClientEvent>) {
    loop {
        match client_events.try_recv() {
            Ok(ClientEvent::Applied(Action::Transition(_))) => {
                if let Some(entry) = engine.action_log().entries().last() {
                    let marker = if entry.is_error { "!" } else { " " };
                    println!(
                        "{marker} {} {}",
                        time_util::format_time(entry.at.timestamp_millis()),
                        entry.message
                    );
                }
            }
            Ok(ClientEvent::Applied(Action::StatusFetched(status))) => {
                println!(
                    "authority {} up {} with {} rooms",
                    status.version,
                    time_util::seconds_to_days_hours_minutes(status.uptime),
                    status.total_rooms
                );
            }
            Ok(ClientEvent::Fault(message)) => eprintln!("error: {message}"),
            Ok(_) => {}
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "renderer lagged behind client events");
            }
            Err(_) => break,
        }
    }
}

fn print_action_log(engine: &SyncEngine) {
    for entry in engine.action_log().entries() {
        println!(
            "{} {}",
            time_util::format_date_time_utc(entry.at),
            entry.message
        );
    }
}

fn print_state(engine: &SyncEngine) {
    let session = engine.session();
    let Some(room_id) = &session.room_id else {
        println!("not in a room");
        return;
    };
    println!("room {room_id}");
    for user in session.users.values() {
        let name = user.username.as_deref().unwrap_or(user.id.as_str());
        let own = if session.is_own(Some(&user.id)) { " (you)" } else { "" };
        println!("  user {name}{own}");
    }
    for story in selectors::active_stories(session) {
        let selected = if session.selected_story.as_ref() == Some(&story.id) { "*" } else { " " };
        let own = selectors::own_estimate(session, &story.id)
            .map(|value| format!(" your estimate {value}"))
            .unwrap_or_default();
        println!("{selected} {} {}{own}", story.id, story.title);
    }
}
