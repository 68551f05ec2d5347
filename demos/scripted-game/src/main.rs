//! Plays one five-player game through the frame API and prints every
//! frame a client would see. `RUST_LOG=debug` shows the engine's log.

use std::collections::HashMap;

use lycan::prelude::*;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::EnvFilter;

const NAMES: [&str; 5] = ["ana", "bo", "cy", "di", "eve"];

struct Client {
    connection: ConnectionRef,
    name: &'static str,
    player: PlayerId,
    role: Option<Role>,
    inbox: UnboundedReceiver<ServerEvent>,
}

async fn request(
    server: &Server,
    connection: ConnectionRef,
    frame: ClientFrame,
) -> Result<ServerFrame, LycanError> {
    let bytes = server.codec().encode(&frame)?;
    let reply = server.handle_frame(connection, &bytes).await?;
    Ok(server.codec().decode(&reply)?)
}

async fn play(
    server: &Server,
    client: &Client,
    command: ClientCommand,
) -> Result<ServerFrame, LycanError> {
    let reply = request(server, client.connection, ClientFrame::Game { command }).await?;
    if let ServerFrame::Error { message, .. } = &reply {
        tracing::warn!(player = client.name, %message, "command rejected");
    }
    Ok(reply)
}

/// Prints what each client received since the last call, and notes role
/// cards as they arrive.
fn flush(server: &Server, clients: &mut [Client]) -> Result<(), LycanError> {
    for client in clients.iter_mut() {
        while let Ok(event) = client.inbox.try_recv() {
            if let ServerEvent::RoleAssigned { reveal } = &event {
                client.role = Some(reveal.role);
            }
            if matches!(event, ServerEvent::State { .. }) {
                continue;
            }
            let bytes = server.encode_event(&event)?;
            println!("{:>4} <- {}", client.name, String::from_utf8_lossy(&bytes));
        }
    }
    Ok(())
}

fn seat(clients: &[Client], role: Role) -> Option<usize> {
    clients.iter().position(|c| c.role == Some(role))
}

async fn confirm_living(
    server: &Server,
    clients: &[Client],
    command: ClientCommand,
) -> Result<(), LycanError> {
    let snapshot = match request(server, clients[0].connection, ClientFrame::State).await? {
        ServerFrame::State { snapshot } => snapshot,
        _ => return Ok(()),
    };
    let voting = matches!(command, ClientCommand::ConfirmVote);
    let quorum: HashMap<PlayerId, bool> = snapshot
        .players
        .iter()
        .map(|p| (p.id, p.alive && (p.can_vote || !voting)))
        .collect();
    for client in clients {
        if quorum.get(&client.player).copied().unwrap_or(false) {
            play(server, client, command.clone()).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), LycanError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let server = Server::new(RoomConfig::default(), JsonCodec);

    let mut clients = Vec::new();
    let mut room = None;
    for (i, name) in NAMES.into_iter().enumerate() {
        let connection = ConnectionRef(i as u64);
        let inbox = server.connect(connection).await;
        let frame = match room {
            None => ClientFrame::CreateRoom { name: name.into() },
            Some(room) => ClientFrame::JoinRoom {
                room,
                name: name.into(),
            },
        };
        let ServerFrame::Seated { room: seated, player } =
            request(&server, connection, frame).await?
        else {
            tracing::error!(name, "could not take a seat");
            return Ok(());
        };
        room = Some(seated);
        clients.push(Client {
            connection,
            name,
            player,
            role: None,
            inbox,
        });
    }

    play(
        &server,
        &clients[0],
        ClientCommand::SetRoles {
            roles: vec![
                RoleCount::new(Role::Werewolf, 1),
                RoleCount::new(Role::Seer, 1),
                RoleCount::new(Role::Villager, 3),
            ],
        },
    )
    .await?;
    play(&server, &clients[0], ClientCommand::StartGame).await?;
    flush(&server, &mut clients)?;

    let (Some(wolf), Some(seer), Some(victim)) = (
        seat(&clients, Role::Werewolf),
        seat(&clients, Role::Seer),
        seat(&clients, Role::Villager),
    ) else {
        tracing::error!("role cards missing");
        return Ok(());
    };

    // Night 1: the wolf hunts, the seer looks at the wolf.
    play(
        &server,
        &clients[wolf],
        ClientCommand::NightAction {
            kind: NightActionKind::Kill,
            target: Some(clients[victim].player),
            second_target: None,
        },
    )
    .await?;
    play(
        &server,
        &clients[seer],
        ClientCommand::NightAction {
            kind: NightActionKind::Check,
            target: Some(clients[wolf].player),
            second_target: None,
        },
    )
    .await?;
    confirm_living(&server, &clients, ClientCommand::ConfirmNight).await?;
    flush(&server, &mut clients)?;

    // Day 1: talk, then everyone votes for the wolf.
    confirm_living(&server, &clients, ClientCommand::ConfirmDay).await?;
    for (i, client) in clients.iter().enumerate() {
        if i == victim {
            continue;
        }
        let target = if i == wolf {
            clients[seer].player
        } else {
            clients[wolf].player
        };
        play(&server, client, ClientCommand::Vote { target }).await?;
    }
    confirm_living(&server, &clients, ClientCommand::ConfirmVote).await?;
    flush(&server, &mut clients)?;

    if let ServerFrame::State { snapshot } =
        request(&server, clients[seer].connection, ClientFrame::State).await?
    {
        for line in &snapshot.log {
            println!("log: {line}");
        }
        match snapshot.winner {
            Some(winner) => println!("winner: {winner}"),
            None => println!("no winner yet (phase {})", snapshot.phase),
        }
    }
    Ok(())
}
