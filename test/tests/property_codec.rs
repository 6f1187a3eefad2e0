/// PROPERTY-BASED TESTS: codec and dirty tracking invariants
///
/// Key invariants:
/// 1. A full frame decodes back to the value it was written from
/// 2. A partial frame applied to the shared baseline reproduces the sender's value
/// 3. Writing the value already at a path changes nothing
/// 4. Flushing twice is the same as flushing once

use proptest::prelude::*;

use deltasync_shared::{
    Codec, Color, DirtyCollection, HostType, StateContainer, StructValue, SyncConfig, SyncType,
    Value, Vec2Int,
};
use deltasync_test::{protocol, GameBlocksState, GridPoint, LevelState};

#[derive(Clone, Debug)]
enum Edit {
    Size(Vec2Int),
    Block(usize, Color),
    Replace(Vec<Color>),
}

fn color_strategy() -> impl Strategy<Value = Color> {
    (0.0f32..1.0, 0.0f32..1.0, 0.0f32..1.0, 0.0f32..1.0)
        .prop_map(|(r, g, b, a)| Color::new(r, g, b, a))
}

fn size_strategy() -> impl Strategy<Value = Vec2Int> {
    (-64i32..64, -64i32..64).prop_map(|(x, y)| Vec2Int::new(x, y))
}

fn blocks_strategy() -> impl Strategy<Value = GameBlocksState> {
    (size_strategy(), prop::collection::vec(color_strategy(), 0..24))
        .prop_map(|(size, color)| GameBlocksState { size, color })
}

fn level_strategy() -> impl Strategy<Value = LevelState> {
    (
        any::<u32>(),
        (any::<i32>(), any::<i32>()),
        prop::collection::vec(any::<i32>(), 0..16),
        any::<bool>(),
        any::<u64>(),
    )
        .prop_map(|(seed, (x, y), heights, visible, cache)| LevelState {
            seed,
            origin: GridPoint::new(x, y),
            heights,
            visible,
            cache,
        })
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        size_strategy().prop_map(Edit::Size),
        (0usize..32, color_strategy()).prop_map(|(index, color)| Edit::Block(index, color)),
        prop::collection::vec(color_strategy(), 0..24).prop_map(Edit::Replace),
    ]
}

fn apply(container: &mut StateContainer, edit: &Edit) {
    match edit {
        Edit::Size(size) => {
            container.apply_path("Size", *size).unwrap();
        }
        Edit::Block(index, color) => {
            let len = container.current().field(1).map_or(0, Value::element_count);
            if len > 0 {
                let path = format!("Color/{}", index % len);
                container.apply_path(&path, *color).unwrap();
            }
        }
        Edit::Replace(colors) => {
            container
                .apply_path("Color", Value::array(colors.iter().copied()))
                .unwrap();
        }
    }
}

fn container(host: HostType, value: StructValue) -> StateContainer {
    StateContainer::new(0, host, protocol(), SyncConfig::default(), value).unwrap()
}

proptest! {
    #[test]
    fn prop_full_frame_round_trips(state in blocks_strategy()) {
        let registry = protocol();
        let codec = Codec::new(&registry);
        let value = state.to_value();

        let frame = codec.to_full_frame(&value).unwrap();
        prop_assert_eq!(codec.full_frame_len(&value).unwrap(), frame.len());
        prop_assert_eq!(codec.from_full_frame(&frame).unwrap(), value);
    }

    #[test]
    fn prop_synced_fields_round_trip(level in level_strategy()) {
        let registry = protocol();
        let codec = Codec::new(&registry);

        let decoded = codec.from_full_frame(&codec.to_full_frame(&level.to_value()).unwrap()).unwrap();
        let decoded = LevelState::from_value(decoded).unwrap();

        prop_assert_eq!(decoded.seed, level.seed);
        prop_assert_eq!(decoded.origin, level.origin);
        prop_assert_eq!(&decoded.heights, &level.heights);
        prop_assert_eq!(decoded.visible, level.visible);
        // never on the wire
        prop_assert_eq!(decoded.cache, 0);
    }

    #[test]
    fn prop_partial_frame_reproduces_sender(
        baseline in blocks_strategy(),
        edits in prop::collection::vec(edit_strategy(), 0..12),
    ) {
        let mut sender = container(HostType::Client, baseline.to_value());
        let mut receiver = container(HostType::Server, baseline.to_value());

        for edit in &edits {
            apply(&mut sender, edit);
        }

        if sender.is_dirty() {
            let frame = sender.write_partial_frame().unwrap();
            receiver.accept_partial_frame(&frame).unwrap();
        }
        prop_assert_eq!(receiver.current(), sender.current());
    }

    #[test]
    fn prop_rewriting_current_values_is_a_no_op(state in blocks_strategy(), index in 0usize..32) {
        let mut container = container(HostType::Server, state.to_value());

        prop_assert_eq!(container.apply_path("Size", state.size), Ok(false));
        prop_assert_eq!(
            container.apply_path("Color", Value::array(state.color.iter().copied())),
            Ok(false)
        );
        if !state.color.is_empty() {
            let index = index % state.color.len();
            let path = format!("Color/{}", index);
            prop_assert_eq!(container.apply_path(&path, state.color[index]), Ok(false));
        }

        prop_assert!(!container.is_dirty());
        prop_assert!(container.dirty_flags().root().is_clear());
    }

    #[test]
    fn prop_flush_is_idempotent(
        baseline in blocks_strategy(),
        edits in prop::collection::vec(edit_strategy(), 1..8),
    ) {
        let mut container = container(HostType::Server, baseline.to_value());
        for edit in &edits {
            apply(&mut container, edit);
        }

        container.flush();
        let once = container.dirty_flags().clone();
        container.flush();

        prop_assert_eq!(container.dirty_flags(), &once);
        prop_assert!(!container.is_dirty());
        prop_assert_eq!(container.dirty_flags().dirtiness_ratio(), 0.0);
        prop_assert_eq!(container.baseline(), container.current());
    }
}
