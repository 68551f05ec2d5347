//! End-to-end tests: JSON frames in, JSON frames out.

use lycan::prelude::*;
use serde_json::{Value, json};
use tokio::sync::mpsc;

async fn call(server: &Server, connection: u64, frame: Value) -> Value {
    let bytes = serde_json::to_vec(&frame).unwrap();
    let reply = server
        .handle_frame(ConnectionRef(connection), &bytes)
        .await
        .unwrap();
    serde_json::from_slice(&reply).unwrap()
}

fn player_of(seated: &Value) -> u64 {
    assert_eq!(seated["type"], "seated", "unexpected reply: {seated}");
    seated["player"].as_u64().unwrap()
}

/// Opens a room with four connected players; connection 0 hosts.
async fn lobby(
    server: &Server,
) -> (u64, Vec<u64>, Vec<mpsc::UnboundedReceiver<ServerEvent>>) {
    let mut inboxes = Vec::new();
    for c in 0..4 {
        inboxes.push(server.connect(ConnectionRef(c)).await);
    }
    let seated = call(server, 0, json!({"type": "create_room", "name": "ana"})).await;
    let room = seated["room"].as_u64().unwrap();
    let mut players = vec![player_of(&seated)];
    for (c, name) in [(1, "bo"), (2, "cy"), (3, "di")] {
        let seated = call(
            server,
            c,
            json!({"type": "join_room", "room": room, "name": name}),
        )
        .await;
        players.push(player_of(&seated));
    }
    (room, players, inboxes)
}

#[tokio::test]
async fn test_lobby_and_start_over_frames() {
    let server = Server::new(RoomConfig::default(), JsonCodec);
    let (room, _players, mut inboxes) = lobby(&server).await;

    let rooms = call(&server, 1, json!({"type": "list_rooms"})).await;
    assert_eq!(rooms["rooms"][0]["room_id"], room);
    assert_eq!(rooms["rooms"][0]["player_count"], 4);

    let reply = call(
        &server,
        0,
        json!({"type": "game", "command": {
            "type": "set_roles",
            "roles": [
                {"role": "werewolf", "count": 1},
                {"role": "seer", "count": 1},
                {"role": "villager", "count": 2}
            ]
        }}),
    )
    .await;
    assert_eq!(reply["type"], "reply");

    let reply = call(
        &server,
        0,
        json!({"type": "game", "command": {"type": "start_game"}}),
    )
    .await;
    assert_eq!(reply["reply"]["phase"], "night");
    assert_eq!(reply["reply"]["day"], 1);

    // Every player got exactly one role card, and the cards add up.
    let mut dealt = Vec::new();
    for inbox in &mut inboxes {
        let mut cards = Vec::new();
        while let Ok(event) = inbox.try_recv() {
            if let ServerEvent::RoleAssigned { reveal } = event {
                cards.push(reveal.role);
            }
        }
        assert_eq!(cards.len(), 1);
        dealt.extend(cards);
    }
    dealt.sort();
    assert_eq!(
        dealt,
        vec![Role::Villager, Role::Villager, Role::Werewolf, Role::Seer]
    );

    let rooms = call(&server, 1, json!({"type": "list_rooms"})).await;
    assert_eq!(rooms["rooms"], json!([]));
}

#[tokio::test]
async fn test_rejections_come_back_as_error_frames() {
    let server = Server::new(RoomConfig::default(), JsonCodec);
    lobby(&server).await;

    let reply = call(
        &server,
        2,
        json!({"type": "game", "command": {"type": "start_game"}}),
    )
    .await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["kind"], "unauthorized");

    let reply = call(
        &server,
        1,
        json!({"type": "create_room", "name": "twice"}),
    )
    .await;
    assert_eq!(reply["type"], "error");
}

#[tokio::test]
async fn test_unopened_connection_is_rejected() {
    let server = Server::new(RoomConfig::default(), JsonCodec);
    let reply = call(&server, 77, json!({"type": "list_rooms"})).await;
    assert_eq!(reply["type"], "rooms");

    let reply = call(&server, 77, json!({"type": "create_room", "name": "x"})).await;
    assert_eq!(reply["type"], "error");
    assert!(reply.get("kind").is_none());
}

#[tokio::test]
async fn test_malformed_frame_is_a_protocol_error() {
    let server = Server::new(RoomConfig::default(), JsonCodec);
    server.connect(ConnectionRef(1)).await;
    let result = server.handle_frame(ConnectionRef(1), b"{not json").await;
    assert!(matches!(result, Err(LycanError::Protocol(_))));
}

#[tokio::test]
async fn test_disconnect_frees_the_seat() {
    let server = Server::new(RoomConfig::default(), JsonCodec);
    let (_room, players, _inboxes) = lobby(&server).await;

    server.disconnect(ConnectionRef(0)).await.unwrap();

    let state = call(&server, 1, json!({"type": "state"})).await;
    let seated: Vec<u64> = state["snapshot"]["players"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_u64().unwrap())
        .collect();
    assert_eq!(seated, players[1..].to_vec());
    assert_eq!(state["snapshot"]["is_host"], true);

    // Disconnecting an unknown connection is a no-op.
    server.disconnect(ConnectionRef(0)).await.unwrap();
}

#[tokio::test]
async fn test_leave_then_rejoin_elsewhere() {
    let server = Server::new(RoomConfig::default(), JsonCodec);
    lobby(&server).await;

    let reply = call(&server, 3, json!({"type": "leave"})).await;
    assert_eq!(reply["type"], "left");
    let seated = call(&server, 3, json!({"type": "create_room", "name": "di"})).await;
    assert_eq!(seated["type"], "seated");
}

#[test]
fn test_encode_event() {
    let server = Server::new(RoomConfig::default(), JsonCodec);
    let bytes = server
        .encode_event(&ServerEvent::RolesUpdated { roles: Vec::new() })
        .unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        value,
        json!({"type": "event", "event": {"type": "roles_updated", "roles": []}})
    );
}

#[tokio::test]
async fn test_two_rooms_answer_side_by_side() {
    let server = Server::new(RoomConfig::default(), JsonCodec);
    let _inbox_a = server.connect(ConnectionRef(10)).await;
    let _inbox_b = server.connect(ConnectionRef(11)).await;
    call(&server, 10, json!({"type": "create_room", "name": "ana"})).await;
    call(&server, 11, json!({"type": "create_room", "name": "bo"})).await;

    let (a, b, rooms) = tokio::join!(
        call(&server, 10, json!({"type": "state"})),
        call(&server, 11, json!({"type": "game", "command": {"type": "start_game"}})),
        call(&server, 10, json!({"type": "list_rooms"})),
    );

    assert_eq!(a["snapshot"]["players"][0]["name"], "ana");
    assert_eq!(b["kind"], "malformed_configuration");
    assert_eq!(rooms["rooms"].as_array().unwrap().len(), 2);
    assert_eq!(rooms["rooms"][0]["listening"], 1);
}
