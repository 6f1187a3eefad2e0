/// Block grid scenarios, end to end through containers: a single recolor
/// that the server observes as exactly one change, a tick mixing a recolor,
/// a resize and a wholesale replacement, and an out-of-range write.

use std::sync::{Arc, Mutex};

use deltasync_shared::{
    ChangeRecord, Codec, Color, DirtyFlags, FieldCategory, HostType, MutationError,
    StateContainer, StateError, SyncConfig, SyncType, Value, Vec2Int,
};
use deltasync_test::{blocks_baseline, protocol, GameBlocksState};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn expected_frame() -> Vec<u8> {
    let mut frame = vec![
        1, // type id
        1, // bitmap diff
        0b0000_0010, // Color
        0, // element diff
        0b0000_0001, // element 0
    ];
    for _ in 0..4 {
        frame.extend_from_slice(&1.0f32.to_le_bytes());
    }
    frame
}

#[test]
fn recolor_produces_the_expected_frame() {
    init_logger();
    let registry = protocol();
    let mut client = StateContainer::new(
        1,
        HostType::Client,
        registry.clone(),
        SyncConfig::default(),
        blocks_baseline().to_value(),
    )
    .unwrap();

    assert_eq!(client.apply_path("Color/0", Color::WHITE), Ok(true));

    let frame = client.write_partial_frame().unwrap();
    assert_eq!(frame, expected_frame());
}

#[test]
fn server_applies_the_recolor() {
    init_logger();
    let registry = protocol();
    let mut client = StateContainer::new(
        1,
        HostType::Client,
        registry.clone(),
        SyncConfig::default(),
        blocks_baseline().to_value(),
    )
    .unwrap();
    let mut server = StateContainer::new(
        1,
        HostType::Server,
        registry,
        SyncConfig::default(),
        blocks_baseline().to_value(),
    )
    .unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    server.on_change(move |changes| sink.lock().unwrap().push(changes.to_vec()));

    client.apply_path("Color/0", Color::WHITE).unwrap();
    let frame = client.write_partial_frame().unwrap();
    client.flush();
    server.accept_partial_frame(&frame).unwrap();

    let colors = server.dirty_flags().root().array(0).unwrap();
    assert!(colors.is_dirty(0));
    assert!(!colors.is_dirty(1));

    server.sync_changes().unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![vec![ChangeRecord::new("Color/0", Color::WHITE.into())]]
    );

    let state = GameBlocksState::from_value(server.current().clone()).unwrap();
    assert_eq!(
        state.color,
        vec![Color::WHITE, Color::BLUE, Color::GREEN, Color::WHITE]
    );
    assert!(!server.is_dirty());
}

#[test]
fn frame_decodes_against_a_fresh_baseline() {
    init_logger();
    let registry = protocol();
    let codec = Codec::new(&registry);
    let schema = registry.schema_for(GameBlocksState::TYPE_NAME).unwrap();

    let mut receiver = blocks_baseline().to_value();
    let mut dirty = DirtyFlags::new(&schema, &receiver);
    codec
        .apply_partial_frame(&mut receiver, &mut dirty, &expected_frame())
        .unwrap();

    let mut expected = blocks_baseline();
    expected.color[0] = Color::WHITE;
    assert_eq!(GameBlocksState::from_value(receiver).unwrap(), expected);
}

#[test]
fn writing_the_same_color_sends_nothing() {
    init_logger();
    let mut client = StateContainer::new(
        1,
        HostType::Client,
        protocol(),
        SyncConfig::default(),
        blocks_baseline().to_value(),
    )
    .unwrap();

    assert_eq!(client.apply_path("Color/1", Color::BLUE), Ok(false));
    assert!(!client.is_dirty());
    assert!(client.write_partial_frame().is_err());
}

#[test]
fn recolor_resize_and_replace_in_one_tick() {
    init_logger();
    let registry = protocol();
    let mut server = StateContainer::new(
        1,
        HostType::Server,
        registry.clone(),
        SyncConfig::default(),
        blocks_baseline().to_value(),
    )
    .unwrap();

    assert_eq!(server.apply_path("Color/0", Color::WHITE), Ok(true));
    assert_eq!(server.apply_path("Size", Vec2Int::new(2, 1)), Ok(true));
    assert_eq!(
        server.apply_path("Color", Value::array([Color::RED, Color::WHITE])),
        Ok(true)
    );

    let expected = GameBlocksState {
        size: Vec2Int::new(2, 1),
        color: vec![Color::RED, Color::WHITE],
    };
    assert_eq!(
        GameBlocksState::from_value(server.current().clone()).unwrap(),
        expected
    );

    let schema = registry.schema_for(GameBlocksState::TYPE_NAME).unwrap();
    let size = schema.field_by_name("Size").unwrap();
    let color = schema.field_by_name("Color").unwrap();
    let root = server.dirty_flags().root();
    assert_eq!(size.category, FieldCategory::Scalar);
    assert!(root.is_field_dirty(size.index));
    assert!(root.partial(size).is_none());
    let colors = root.partial(color).unwrap();
    assert!(colors.is_fully_replaced());
    assert_eq!(colors.len(), 2);

    let frame = server.write_partial_frame().unwrap();
    let codec = Codec::new(&registry);
    let mut receiver = blocks_baseline().to_value();
    let mut dirty = DirtyFlags::new(&schema, &receiver);
    codec
        .apply_partial_frame(&mut receiver, &mut dirty, &frame)
        .unwrap();

    assert_eq!(GameBlocksState::from_value(receiver).unwrap(), expected);
    assert!(dirty.is_dirty());
    assert!(dirty.root().partial(color).unwrap().is_fully_replaced());
}

#[test]
fn out_of_range_block_is_rejected() {
    init_logger();
    let mut client = StateContainer::new(
        1,
        HostType::Client,
        protocol(),
        SyncConfig::default(),
        blocks_baseline().to_value(),
    )
    .unwrap();
    let before = client.dirty_flags().clone();

    assert_eq!(
        client.apply_path("Color/99", Color::BLACK),
        Err(StateError::Mutation(MutationError::IndexOutOfBounds {
            index: 99,
            len: 4
        }))
    );
    assert_eq!(client.dirty_flags(), &before);
    assert!(!client.is_dirty());
    assert_eq!(client.current(), &blocks_baseline().to_value());
}
