//! Property tests for the variation resolver, block ordering and rendering.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use rinos_shop::core::block::{Block, BlockId, BlockType, Configuration};
use rinos_shop::core::page::{self, MoveDirection, Page, PageId};
use rinos_shop::core::render::render;
use rinos_shop::core::variation::{Combination, Resolution, Selection, compute_options, resolve};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

const KINDS: [&str; 3] = ["Farbe", "Größe", "Rahmen"];
const VALUES: [&str; 3] = ["A", "B", "C"];

fn pair() -> impl Strategy<Value = (String, String)> {
    (prop::sample::select(KINDS.to_vec()), prop::sample::select(VALUES.to_vec()))
        .prop_map(|(kind, value)| (kind.to_string(), value.to_string()))
}

/// Combination lists with distinct article numbers and distinct variation sets.
fn combinations() -> impl Strategy<Value = Vec<Combination>> {
    let set = prop::collection::btree_map(
        prop::sample::select(KINDS.to_vec()),
        prop::sample::select(VALUES.to_vec()),
        1..=3,
    );
    prop::collection::vec(set, 1..8).prop_map(|sets| {
        let mut unique: Vec<BTreeMap<&str, &str>> = Vec::new();
        for set in sets {
            if !unique.contains(&set) {
                unique.push(set);
            }
        }
        unique
            .into_iter()
            .enumerate()
            .map(|(index, set)| Combination::new(format!("ART{index}"), set))
            .collect()
    })
}

#[derive(Debug, Clone)]
enum Op {
    Add(usize),
    Remove(usize),
    Move(usize, bool),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..BlockType::ALL.len()).prop_map(Op::Add),
        (0..16usize).prop_map(Op::Remove),
        (0..16usize, any::<bool>()).prop_map(|(index, up)| Op::Move(index, up)),
    ]
}

fn page_with(kinds: &[BlockType]) -> Page {
    kinds.iter().fold(
        Page::draft(PageId(1), "Test", "test").unwrap(),
        |current, kind| page::add_block(&current, *kind, Configuration::new()).0,
    )
}

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<f64>().prop_map(Value::from),
        ".{0,12}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::btree_map("[a-z_]{1,8}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

fn configuration() -> impl Strategy<Value = Configuration> {
    let keys = prop::sample::select(vec![
        "title", "columns", "overlay_opacity", "height", "custom_height", "images", "items",
        "faqs", "features", "products", "product_ids", "video_url", "content", "panels",
        "duration", "once", "gap",
    ]);
    prop::collection::btree_map(keys, json_value(), 0..6)
        .prop_map(|map| map.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

proptest! {
    #[test]
    fn options_hold_exactly_the_carried_pairs(combinations in combinations()) {
        let options = compute_options(&combinations);
        let carried: BTreeSet<(String, String)> = combinations
            .iter()
            .flat_map(|c| c.variations.iter().map(|p| (p.kind.clone(), p.value.clone())))
            .collect();
        let offered: BTreeSet<(String, String)> = options
            .iter()
            .flat_map(|(kind, values)| values.iter().map(move |v| (kind.clone(), v.clone())))
            .collect();
        prop_assert_eq!(offered, carried);
        for values in options.values() {
            let unique: BTreeSet<_> = values.iter().collect();
            prop_assert_eq!(unique.len(), values.len());
        }
    }

    #[test]
    fn resolve_is_deterministic(
        combinations in combinations(),
        pairs in prop::collection::vec(pair(), 0..3),
    ) {
        let selection: Selection = pairs.into_iter().collect();
        prop_assert_eq!(resolve(&combinations, &selection), resolve(&combinations, &selection));
    }

    #[test]
    fn narrowing_a_resolved_selection(
        combinations in combinations(),
        pick in any::<prop::sample::Index>(),
        keep in prop::collection::vec(any::<bool>(), 3),
        extra in pair(),
    ) {
        let target = pick.get(&combinations);
        let selection: Selection = target
            .selection()
            .into_iter()
            .zip(keep.iter().cycle())
            .filter(|(_, keep)| **keep)
            .map(|(pair, _)| pair)
            .collect();

        if let Resolution::Resolved { article_number } = resolve(&combinations, &selection) {
            let resolved = combinations
                .iter()
                .find(|c| c.article_number == article_number)
                .unwrap();
            let (kind, value) = extra;
            if selection.contains_key(&kind) {
                return Ok(());
            }
            let mut narrowed = selection.clone();
            narrowed.insert(kind.clone(), value.clone());
            let outcome = resolve(&combinations, &narrowed);
            if resolved.value_of(&kind) == Some(value.as_str()) {
                prop_assert_eq!(outcome.article_number(), Some(&article_number));
            } else {
                prop_assert!(!outcome.is_resolved());
            }
        }
    }

    #[test]
    fn block_orders_stay_dense(ops in prop::collection::vec(op(), 0..40)) {
        let mut current = page_with(&[]);
        for op in ops {
            current = match op {
                Op::Add(kind) => {
                    page::add_block(&current, BlockType::ALL[kind], Configuration::new()).0
                }
                Op::Remove(index) => match current.blocks.get(index).map(|b| b.id) {
                    Some(id) => page::remove_block(&current, id).unwrap(),
                    None => current,
                },
                Op::Move(index, up) => match current.blocks.get(index).map(|b| b.id) {
                    Some(id) => {
                        let direction = if up { MoveDirection::Up } else { MoveDirection::Down };
                        page::move_block(&current, id, direction).unwrap()
                    }
                    None => current,
                },
            };
            prop_assert!(page::has_dense_order(&current));
        }
    }

    #[test]
    fn moving_past_the_ends_is_a_no_op(
        kinds in prop::collection::vec(prop::sample::select(BlockType::ALL.to_vec()), 1..8),
    ) {
        let current = page_with(&kinds);
        let first = current.blocks[0].id;
        let last = current.blocks[current.blocks.len() - 1].id;

        prop_assert_eq!(&page::move_block(&current, first, MoveDirection::Up).unwrap(), &current);
        prop_assert_eq!(&page::move_block(&current, last, MoveDirection::Down).unwrap(), &current);
    }

    #[test]
    fn render_accepts_any_block(
        block_type in prop_oneof![
            prop::sample::select(BlockType::ALL.to_vec()).prop_map(|k| k.as_str().to_string()),
            ".{0,20}",
        ],
        configuration in configuration(),
        is_visible in any::<bool>(),
    ) {
        let block = Block {
            id: BlockId(1),
            block_type: block_type.clone(),
            order: 0,
            is_visible,
            configuration,
        };
        let descriptor = render(&block);
        prop_assert_eq!(descriptor.is_unknown(), BlockType::parse(&block_type).is_none());
    }
}
