/// Full-rewrite and full-replacement decisions driven by dirtiness ratios

use deltasync_shared::{
    ArrayDiffMode, Codec, Color, DirtyCollection, DirtyFlags, PathMutator, StructDiffMode,
    StructValue, SyncConfig, SyncType, Vec2Int,
};
use deltasync_test::{protocol, GameBlocksState, GridPoint, LevelState};

fn ten_blocks() -> StructValue {
    GameBlocksState {
        size: Vec2Int::new(5, 2),
        color: vec![Color::BLACK; 10],
    }
    .to_value()
}

fn recolor(count: usize) -> (StructValue, DirtyFlags) {
    let registry = protocol();
    let schema = registry.schema_for(GameBlocksState::TYPE_NAME).unwrap();
    let mutator = PathMutator::new(&registry);

    let mut value = ten_blocks();
    let mut dirty = DirtyFlags::new(&schema, &value);
    for index in 0..count {
        let path = format!("Color/{}", index);
        assert!(mutator
            .apply_path(&mut value, &mut dirty, &path, Color::WHITE.into())
            .unwrap());
    }
    (value, dirty)
}

#[test]
fn array_below_threshold_uses_element_diff() {
    let registry = protocol();
    let codec = Codec::new(&registry);
    let (value, dirty) = recolor(8);

    assert_eq!(dirty.root().array(0).unwrap().dirtiness_ratio(), 0.8);

    let frame = codec.to_partial_frame(&value, &dirty).unwrap();
    assert_eq!(frame[1], StructDiffMode::BitmapDiff as u8);
    assert_eq!(frame[3], ArrayDiffMode::ElementDiff as u8);
    // two bitmap bytes, then eight colors
    assert_eq!(frame.len(), 4 + 2 + 8 * 16);
}

#[test]
fn array_at_threshold_is_replaced() {
    let registry = protocol();
    let codec = Codec::new(&registry);
    let (value, dirty) = recolor(9);

    let frame = codec.to_partial_frame(&value, &dirty).unwrap();
    assert_eq!(frame[3], ArrayDiffMode::FullyReplaced as u8);
    assert_eq!(&frame[4..8], &10i32.to_le_bytes());
    assert_eq!(frame.len(), 8 + 10 * 16);
}

#[test]
fn both_thresholds_are_configurable() {
    let registry = protocol();
    let config = SyncConfig {
        struct_rewrite_threshold: 0.5,
        array_replace_threshold: 1.0,
    };
    let codec = Codec::with_config(&registry, config);
    let (value, dirty) = recolor(1);

    // one of two fields is dirty
    let frame = codec.to_partial_frame(&value, &dirty).unwrap();
    assert_eq!(frame[1], StructDiffMode::FullRewrite as u8);

    let full = codec.to_full_frame(&value).unwrap();
    assert_eq!(&frame[2..], &full[1..]);
}

#[test]
fn every_field_dirty_rewrites_the_struct() {
    let registry = protocol();
    let codec = Codec::new(&registry);
    let schema = registry.schema_for(LevelState::TYPE_NAME).unwrap();
    let mutator = PathMutator::new(&registry);

    let level = LevelState {
        seed: 1,
        origin: GridPoint::new(0, 0),
        heights: vec![1, 2, 3],
        visible: false,
        cache: 99,
    };
    let mut value = level.to_value();
    let mut dirty = DirtyFlags::new(&schema, &value);

    mutator.apply_path(&mut value, &mut dirty, "Seed", 2u32.into()).unwrap();
    mutator.apply_path(&mut value, &mut dirty, "Origin/Y", 4i32.into()).unwrap();
    mutator.apply_path(&mut value, &mut dirty, "Heights/1", 7i32.into()).unwrap();
    assert!(dirty.dirtiness_ratio() < 0.9);

    mutator.apply_path(&mut value, &mut dirty, "Visible", true.into()).unwrap();
    assert_eq!(dirty.dirtiness_ratio(), 1.0);

    let frame = codec.to_partial_frame(&value, &dirty).unwrap();
    assert_eq!(frame[0], 3);
    assert_eq!(frame[1], StructDiffMode::FullRewrite as u8);

    // the unsynchronized cache keeps the receiver's own value
    let mut receiver = LevelState { cache: 5, ..level }.to_value();
    let mut receiver_dirty = DirtyFlags::new(&schema, &receiver);
    codec
        .apply_partial_frame(&mut receiver, &mut receiver_dirty, &frame)
        .unwrap();

    let received = LevelState::from_value(receiver).unwrap();
    assert_eq!(received.seed, 2);
    assert_eq!(received.origin, GridPoint::new(0, 4));
    assert_eq!(received.heights, vec![1, 7, 3]);
    assert!(received.visible);
    assert_eq!(received.cache, 5);
    assert!(receiver_dirty.root().is_all_dirty());
}
