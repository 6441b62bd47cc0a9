use super::*;

use std::f64::consts::FRAC_PI_2;

use crate::format::PixelFormat;

fn sample_set() -> (TileSet, TileId) {
    let mut set = TileSet::new();
    let root = set.create();
    set.set_pos(root, 1.5, 2.0).unwrap();
    set.set_pivot(root, 1.0, 1.0).unwrap();
    set.set_rotation(root, FRAC_PI_2).unwrap();

    let mut chain = Chain::new(3, "RGB u8".parse::<PixelFormat>().unwrap()).unwrap();
    for pos in 0..3 {
        let element = chain.element_mut(pos).unwrap();
        element.x = pos as i32;
        element.y = 1;
        element.channel = pos as u32;
        element.gain = 1000 * (pos as u16 + 1);
    }
    set.set_chain(root, chain).unwrap();

    let child = set.create();
    set.set_pos(child, 4.0, 0.0).unwrap();
    set.append_child(root, child).unwrap();
    (set, root)
}

#[test]
fn rotation_is_persisted_in_degrees() {
    let (set, root) = sample_set();
    let prefs = snapshot_tile(&set, root).unwrap();
    assert!((prefs.rotation - 90.0).abs() < 1e-9);

    let mut restored = TileSet::new();
    let id = restore_tile(&mut restored, &prefs).unwrap();
    assert!((restored.rotation(id).unwrap() - FRAC_PI_2).abs() < 1e-12);
}

#[test]
fn tile_tree_round_trips_through_a_value_tree() {
    let (set, root) = sample_set();
    let prefs = snapshot_tile(&set, root).unwrap();
    let value = to_value(&prefs).unwrap();
    let decoded = from_value(value).unwrap();
    assert_eq!(decoded, prefs);

    let mut restored = TileSet::new();
    let id = restore_tile(&mut restored, &decoded).unwrap();
    assert_eq!(restored.pos(id), Some((1.5, 2.0)));
    assert_eq!(restored.pivot(id), Some((1.0, 1.0)));

    let chain = restored.chain(id).unwrap();
    assert_eq!(chain.led_count(), 3);
    assert_eq!(chain.format().to_string(), "RGB u8");
    assert_eq!(chain.element(2).unwrap().gain, 3000);
    assert_eq!(chain.element(1).unwrap().channel, 1);

    let child = restored.children(id).next().unwrap();
    assert_eq!(restored.pos(child), Some((4.0, 0.0)));
}

#[test]
fn chain_snapshot_carries_wiring_not_samples() {
    let (set, root) = sample_set();
    let prefs = snapshot_chain(set.chain(root).unwrap());
    assert_eq!(prefs.ledcount, 3);
    assert_eq!(prefs.format, "RGB u8");
    assert_eq!(prefs.elements.len(), 3);
    assert_eq!(prefs.elements[2].x, 2);

    let restored = restore_chain(&prefs).unwrap();
    assert_eq!(restored.elements(), set.chain(root).unwrap().elements());
    assert!(restored.buffer().iter().all(|&b| b == 0));
}

#[test]
fn restore_rejects_unknown_format_names() {
    let prefs = ChainPrefs {
        ledcount: 3,
        format: "HSV f16".into(),
        elements: Vec::new(),
    };
    assert!(restore_chain(&prefs).is_err());
}
