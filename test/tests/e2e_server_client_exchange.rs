/// END-TO-END: one server, two clients, frames exchanged through the
/// container managers the way a transport would carry them.

use std::sync::{Arc, Mutex};

use deltasync_shared::{
    ChangeRecord, Color, ContainerManager, FrameKind, HostType, SyncType, Value, Vec2Int,
};
use deltasync_test::{
    assert_converged, assert_flushed, blocks_baseline, deliver_to_client, protocol, tick_client,
    tick_server, GridPoint, LevelState,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn managers() -> (ContainerManager, ContainerManager, ContainerManager) {
    let registry = protocol();
    (
        ContainerManager::new(HostType::Server, registry.clone()),
        ContainerManager::new(HostType::Client, registry.clone()),
        ContainerManager::new(HostType::Client, registry),
    )
}

fn level() -> LevelState {
    LevelState {
        seed: 42,
        origin: GridPoint::new(0, 0),
        heights: vec![1, 2, 3],
        visible: true,
        cache: 0,
    }
}

#[test]
fn new_containers_reach_every_client() {
    init_logger();
    let (mut server, mut alice, mut bob) = managers();

    let blocks = server.create(blocks_baseline().to_value()).unwrap();
    let level = server.create(level().to_value()).unwrap();

    let sent = tick_server(&mut server, &mut [&mut alice, &mut bob]).unwrap();
    assert_eq!(sent, 2);

    for client in [&alice, &bob] {
        assert_eq!(client.containers().count(), 2);
        assert_converged!(server, client, blocks);
        assert_converged!(server, client, level);
        assert_eq!(client.container(blocks).host(), HostType::Client);
    }
    assert_flushed!(server, blocks);
    assert_flushed!(server, level);

    // nothing left to announce
    assert_eq!(tick_server(&mut server, &mut [&mut alice, &mut bob]), Ok(0));
}

#[test]
fn server_edits_converge_on_clients() {
    init_logger();
    let (mut server, mut alice, mut bob) = managers();
    let id = server.create(blocks_baseline().to_value()).unwrap();
    tick_server(&mut server, &mut [&mut alice, &mut bob]).unwrap();

    let seen: Arc<Mutex<Vec<ChangeRecord>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    alice
        .container_mut(id)
        .unwrap()
        .on_change(move |changes| sink.lock().unwrap().extend_from_slice(changes));

    assert_eq!(server.apply_path(id, "Color/1", Color::BLACK), Ok(true));
    assert_eq!(server.apply_path(id, "Size", Vec2Int::new(3, 2)), Ok(true));

    let frames = server.send_tick().frames;
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].kind, FrameKind::Partial);
    assert_flushed!(server, id);

    let changes = deliver_to_client(&frames, &mut alice).unwrap();
    deliver_to_client(&frames, &mut bob).unwrap();

    // both fields dirty, so the struct went out as a full rewrite
    assert_eq!(
        changes,
        vec![
            ChangeRecord::new("Size", Vec2Int::new(3, 2).into()),
            ChangeRecord::new(
                "Color",
                Value::array([Color::RED, Color::BLACK, Color::GREEN, Color::WHITE]),
            ),
        ]
    );
    assert_eq!(*seen.lock().unwrap(), changes);
    assert_converged!(server, alice, id);
    assert_converged!(server, bob, id);
    assert_flushed!(alice, id);

    // a single element goes out as an element diff
    server.apply_path(id, "Color/2", Color::BLUE).unwrap();
    let frames = server.send_tick().frames;
    let changes = deliver_to_client(&frames, &mut alice).unwrap();
    assert_eq!(changes, vec![ChangeRecord::new("Color/2", Color::BLUE.into())]);
    assert_converged!(server, alice, id);
}

#[test]
fn client_edits_are_rebroadcast() {
    init_logger();
    let (mut server, mut alice, mut bob) = managers();
    let id = server.create(blocks_baseline().to_value()).unwrap();
    tick_server(&mut server, &mut [&mut alice, &mut bob]).unwrap();

    assert_eq!(alice.apply_path(id, "Color/0", Color::WHITE), Ok(true));
    assert_eq!(tick_client(&mut alice, &mut server), Ok(1));
    assert_flushed!(alice, id);

    // the server holds the change until its own tick
    assert!(server.container(id).is_dirty());
    assert_eq!(
        server.container(id).current().field(1),
        Some(&Value::array([
            Color::WHITE,
            Color::BLUE,
            Color::GREEN,
            Color::WHITE
        ]))
    );

    assert_eq!(tick_server(&mut server, &mut [&mut alice, &mut bob]), Ok(1));
    assert_converged!(server, alice, id);
    assert_converged!(server, bob, id);
    assert_flushed!(server, id);
}

#[test]
fn server_edits_survive_an_inbound_client_frame() {
    init_logger();
    let (mut server, mut alice, mut bob) = managers();
    let id = server.create(blocks_baseline().to_value()).unwrap();
    tick_server(&mut server, &mut [&mut alice, &mut bob]).unwrap();

    // the server edit is still unsent when alice's frame arrives
    server.apply_path(id, "Size", Vec2Int::new(7, 7)).unwrap();
    alice.apply_path(id, "Color/0", Color::WHITE).unwrap();
    tick_client(&mut alice, &mut server).unwrap();

    let root = server.container(id).dirty_flags().root();
    assert!(root.is_field_dirty(0));
    assert!(root.is_field_dirty(1));

    assert_eq!(tick_server(&mut server, &mut [&mut alice, &mut bob]), Ok(1));
    let size = bob.container(id).current().field(0).cloned();
    assert_eq!(size, Some(Vec2Int::new(7, 7).into()));
    assert_converged!(server, alice, id);
    assert_converged!(server, bob, id);
    assert_flushed!(server, id);
}

#[test]
fn client_edits_survive_an_inbound_server_frame() {
    init_logger();
    let (mut server, mut alice, mut bob) = managers();
    let id = server.create(blocks_baseline().to_value()).unwrap();
    tick_server(&mut server, &mut [&mut alice, &mut bob]).unwrap();

    alice.apply_path(id, "Size", Vec2Int::new(4, 1)).unwrap();
    server.apply_path(id, "Color/1", Color::BLACK).unwrap();
    tick_server(&mut server, &mut [&mut alice, &mut bob]).unwrap();

    // alice still owes the server her resize
    assert!(alice.container(id).is_dirty());
    assert_eq!(tick_client(&mut alice, &mut server), Ok(1));
    tick_server(&mut server, &mut [&mut alice, &mut bob]).unwrap();

    let size = bob.container(id).current().field(0).cloned();
    assert_eq!(size, Some(Vec2Int::new(4, 1).into()));
    assert_converged!(server, alice, id);
    assert_converged!(server, bob, id);
}

#[test]
fn nested_and_list_paths_replicate() {
    init_logger();
    let (mut server, mut alice, mut bob) = managers();
    let id = server.create(level().to_value()).unwrap();
    tick_server(&mut server, &mut [&mut alice, &mut bob]).unwrap();

    assert_eq!(server.apply_path(id, "Origin/X", 7), Ok(true));
    assert_eq!(server.apply_path(id, "Heights/2", 9), Ok(true));
    tick_server(&mut server, &mut [&mut alice, &mut bob]).unwrap();

    bob.apply_path(id, "Heights", Value::list([5, 6, 7, 8])).unwrap();
    tick_client(&mut bob, &mut server).unwrap();
    tick_server(&mut server, &mut [&mut alice, &mut bob]).unwrap();

    let replicated = LevelState::from_value(alice.container(id).current().clone()).unwrap();
    assert_eq!(replicated.origin, GridPoint::new(7, 0));
    assert_eq!(replicated.heights, vec![5, 6, 7, 8]);
    assert_converged!(server, alice, id);
    assert_converged!(server, bob, id);
}

#[test]
fn no_op_edits_send_nothing() {
    init_logger();
    let (mut server, mut alice, mut bob) = managers();
    let id = server.create(blocks_baseline().to_value()).unwrap();
    tick_server(&mut server, &mut [&mut alice, &mut bob]).unwrap();

    assert_eq!(server.apply_path(id, "Color/0", Color::RED), Ok(false));
    assert_eq!(server.apply_path(id, "Size", Vec2Int::new(2, 2)), Ok(false));
    assert_eq!(tick_server(&mut server, &mut [&mut alice, &mut bob]), Ok(0));
}

#[test]
fn destroyed_containers_send_nothing() {
    init_logger();
    let (mut server, mut alice, mut bob) = managers();
    let id = server.create(blocks_baseline().to_value()).unwrap();
    tick_server(&mut server, &mut [&mut alice, &mut bob]).unwrap();

    let destroyed = Arc::new(Mutex::new(None));
    let sink = destroyed.clone();
    server
        .container_mut(id)
        .unwrap()
        .on_destroy(move |id| *sink.lock().unwrap() = Some(id));

    server.apply_path(id, "Color/3", Color::BLACK).unwrap();
    server.destroy(id).unwrap();

    assert_eq!(*destroyed.lock().unwrap(), Some(id));
    assert!(!server.contains(id));
    assert_eq!(tick_server(&mut server, &mut [&mut alice, &mut bob]), Ok(0));

    alice.destroy(id).unwrap();
    assert!(!alice.contains(id));
    assert!(bob.contains(id));
}
