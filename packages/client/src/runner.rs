//! Interactive client session.

use std::{io::Write, sync::Arc, time::Duration};

use jubensha_server::infrastructure::dto::websocket::{
    GameStartedData, HostChangedData, PhaseChangedData, PlayerJoinedData, PlayerLeftData,
    PlayerReadyData, RoomDto,
};
use rustyline::{DefaultEditor, error::ReadlineError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{Mutex, mpsc};

use crate::{
    command::{Command, HELP},
    error::ClientError,
    formatter::MessageFormatter,
    phase::PhaseCursor,
    session::{GameClient, PushedEvent},
};

/// What the client currently knows about its room.
#[derive(Debug, Clone, Default)]
pub struct SessionView {
    pub player_id: Option<String>,
    pub room: Option<RoomDto>,
    pub phases: PhaseCursor,
}

impl SessionView {
    /// Fold a pushed event into the view.
    pub fn apply(&mut self, event: &PushedEvent) {
        let snapshot = match event.kind.as_str() {
            "room:playerJoined" => decode::<PlayerJoinedData>(&event.data).map(|d| d.room),
            "room:playerLeft" => decode::<PlayerLeftData>(&event.data).map(|d| d.room),
            "room:hostChanged" => decode::<HostChangedData>(&event.data).map(|d| d.room),
            "room:playerReady" => decode::<PlayerReadyData>(&event.data).map(|d| d.room),
            "game:started" => decode::<GameStartedData>(&event.data).map(|d| d.room),
            "game:phaseChanged" => {
                if let (Some(data), Some(room)) =
                    (decode::<PhaseChangedData>(&event.data), self.room.as_mut())
                {
                    room.current_phase = data.phase;
                }
                None
            }
            _ => None,
        };
        if let Some(room) = snapshot {
            self.room = Some(room);
        }
    }

    /// Phase to request for `/phase` without a token.
    pub fn next_phase(&self) -> String {
        let current = self
            .room
            .as_ref()
            .map(|room| room.current_phase.as_str())
            .unwrap_or_default();
        self.phases.next(current).to_string()
    }

    fn enter(&mut self, player_id: String, room: RoomDto, phases: PhaseCursor) {
        self.player_id = Some(player_id);
        self.room = Some(room);
        self.phases = phases;
    }

    fn leave(&mut self) {
        *self = Self::default();
    }
}

fn decode<T: DeserializeOwned>(data: &Value) -> Option<T> {
    serde_json::from_value(data.clone()).ok()
}

/// Redisplay the prompt after receiving a message
fn redisplay_prompt(prompt: &str) {
    print!("{}> ", prompt);
    std::io::stdout().flush().ok();
}

/// Run the interactive client until `/quit`, Ctrl+C or the connection drops
pub async fn run_client(
    url: String,
    name: Option<String>,
    timeout: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let (client, mut events) = GameClient::connect_with_timeout(&url, timeout).await?;
    let view = Arc::new(Mutex::new(SessionView::default()));
    let prompt = name.clone().unwrap_or_else(|| "jubensha".to_string());

    println!("\nConnected to {}. Type /help for commands. Press Ctrl+C to exit.\n", url);

    // Spawn a task to render pushed events
    let view_for_events = view.clone();
    let prompt_for_events = prompt.clone();
    let mut event_task = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            view_for_events.lock().await.apply(&event);
            print!("{}", MessageFormatter::format_event(&event));
            redisplay_prompt(&prompt_for_events);
        }
    });

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let prompt_for_readline = format!("{}> ", prompt);
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt_for_readline) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    // Spawn a task to execute commands
    let client_for_commands = client.clone();
    let mut command_task = tokio::spawn(async move {
        while let Some(line) = input_rx.recv().await {
            let command = match Command::parse(&line) {
                Ok(command) => command,
                Err(usage) => {
                    println!("! {}", usage);
                    continue;
                }
            };
            if command == Command::Quit {
                break;
            }
            if let Err(e) = execute(&client_for_commands, &view, name.as_deref(), command).await {
                println!("! {}", e);
                if matches!(e, ClientError::Closed) {
                    break;
                }
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut event_task => {
            command_task.abort();
            tracing::info!("Connection closed by server");
        }
        _ = &mut command_task => {
            event_task.abort();
            client.close();
        }
    }

    Ok(())
}

async fn execute(
    client: &GameClient,
    view: &Mutex<SessionView>,
    name: Option<&str>,
    command: Command,
) -> Result<(), ClientError> {
    match command {
        Command::Create {
            script_id,
            max_players,
        } => {
            let reply = client.create_room(&script_id, max_players, name).await?;
            let phases = load_phases(client, &script_id).await;
            println!("{}", MessageFormatter::format_room(&reply.room, Some(&reply.player.id)));
            println!("Share room id {} with the other players.", reply.room_id);
            view.lock().await.enter(reply.player.id, reply.room, phases);
        }
        Command::Join { room_id } => {
            let reply = client.join_room(&room_id, name).await?;
            let phases = load_phases(client, &reply.room.script_id).await;
            println!("{}", MessageFormatter::format_room(&reply.room, Some(&reply.player.id)));
            view.lock().await.enter(reply.player.id, reply.room, phases);
        }
        Command::Leave => {
            client.leave_room().await?;
            view.lock().await.leave();
            println!("Left the room.");
        }
        Command::Ready(ready) => {
            client.set_ready(ready).await?;
        }
        Command::Start => {
            client.start_game().await?;
        }
        Command::Phase(token) => {
            let phase = match token {
                Some(token) => token,
                None => view.lock().await.next_phase(),
            };
            client.update_phase(&phase).await?;
        }
        Command::Clue(clue_id) => {
            client.report_clue(&clue_id).await?;
        }
        Command::Scripts => {
            let reply = client.list_scripts().await?;
            for script in reply.scripts {
                println!(
                    "{} - {} ({}-{} players, {} min)",
                    script.id,
                    script.title,
                    script.min_players,
                    script.max_players,
                    script.estimated_time
                );
            }
        }
        Command::Room => {
            let view = view.lock().await;
            match &view.room {
                Some(room) => {
                    println!("{}", MessageFormatter::format_room(room, view.player_id.as_deref()))
                }
                None => println!("Not in a room."),
            }
        }
        Command::Help => println!("{}", HELP),
        Command::Chat(message) => {
            let reply = client.send_chat(&message).await?;
            if !reply.success {
                println!("! Join a room to chat.");
            }
        }
        Command::Quit => {}
    }
    Ok(())
}

async fn load_phases(client: &GameClient, script_id: &str) -> PhaseCursor {
    match client.get_script(script_id).await {
        Ok(reply) => PhaseCursor::from_script(&reply.script),
        Err(e) => {
            tracing::debug!("Using default phases for '{}': {}", script_id, e);
            PhaseCursor::default()
        }
    }
}
