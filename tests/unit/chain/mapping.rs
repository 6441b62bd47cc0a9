use super::*;

fn fmt(name: &str) -> PixelFormat {
    name.parse().unwrap()
}

fn place(chain: &mut Chain, pos: usize, x: i32, y: i32, channel: u32) {
    let element = chain.element_mut(pos).unwrap();
    element.x = x;
    element.y = y;
    element.channel = channel;
}

#[test]
fn map_caches_linear_component_offsets() {
    let frame = Frame::new(4, 3, fmt("RGB u8")).unwrap();
    let mut chain = Chain::new(3, fmt("RGB u8")).unwrap();
    place(&mut chain, 0, 0, 0, 0);
    place(&mut chain, 1, 2, 1, 1);
    place(&mut chain, 2, 3, 2, 2);

    let mapped = chain.map_from_frame(&frame).unwrap();
    assert_eq!(mapped, 3);
    assert_eq!(chain.map_offset(0), Some(0));
    // (4*1 + 2) * 3 + 1
    assert_eq!(chain.map_offset(1), Some(19));
    // (4*2 + 3) * 3 + 2
    assert_eq!(chain.map_offset(2), Some(35));
}

#[test]
fn out_of_bounds_elements_stay_unmapped() {
    let frame = Frame::new(2, 2, fmt("RGB u8")).unwrap();
    let mut chain = Chain::new(3, fmt("RGB u8")).unwrap();
    place(&mut chain, 0, 1, 1, 0);
    place(&mut chain, 1, 2, 0, 0); // x past the frame
    place(&mut chain, 2, 0, -1, 0); // negative y

    let mapped = chain.map_from_frame(&frame).unwrap();
    assert_eq!(mapped, 1);
    assert!(chain.map_offset(0).is_some());
    assert_eq!(chain.map_offset(1), None);
    assert_eq!(chain.map_offset(2), None);
}

#[test]
fn channel_past_component_count_stays_unmapped() {
    let frame = Frame::new(2, 2, fmt("RGB u8")).unwrap();
    let mut chain = Chain::new(3, fmt("RGB u8")).unwrap();
    place(&mut chain, 0, 0, 0, 3);
    let mapped = chain.map_from_frame(&frame).unwrap();
    assert_eq!(mapped, 2);
    assert_eq!(chain.map_offset(0), None);
}

#[test]
fn fill_copies_samples_in_element_order() {
    let mut frame = Frame::new(4, 2, fmt("RGB u8")).unwrap();
    for (i, b) in frame.buffer_mut().iter_mut().enumerate() {
        *b = i as u8;
    }

    let mut chain = Chain::new(3, fmt("RGB u8")).unwrap();
    place(&mut chain, 0, 0, 0, 0);
    place(&mut chain, 1, 3, 0, 2);
    place(&mut chain, 2, 1, 1, 1);

    chain.map_from_frame(&frame).unwrap();
    chain.fill_from_frame(&mut frame).unwrap();

    // frame byte at (x,y,channel) == (4*y + x)*3 + channel
    assert_eq!(chain.sample(0).unwrap(), 0);
    assert_eq!(chain.sample(1).unwrap(), 11);
    assert_eq!(chain.sample(2).unwrap(), 16);
}

#[test]
fn fill_skips_unmapped_elements() {
    let mut frame = Frame::new(2, 2, fmt("RGB u8")).unwrap();
    frame.buffer_mut().fill(7);

    let mut chain = Chain::new(3, fmt("RGB u8")).unwrap();
    place(&mut chain, 0, 0, 0, 0);
    place(&mut chain, 1, 9, 9, 0); // unmapped
    place(&mut chain, 2, 1, 1, 2);

    chain.set_sample(1, 42).unwrap();
    chain.map_from_frame(&frame).unwrap();
    chain.fill_from_frame(&mut frame).unwrap();

    assert_eq!(chain.sample(0).unwrap(), 7);
    assert_eq!(chain.sample(1).unwrap(), 42);
    assert_eq!(chain.sample(2).unwrap(), 7);
}

#[test]
fn fill_converts_differing_formats_once() {
    let mut frame = Frame::new(2, 1, fmt("RGBA u8")).unwrap();
    // two RGBA pixels
    frame
        .buffer_mut()
        .copy_from_slice(&[10, 20, 30, 255, 40, 50, 60, 255]);

    let mut chain = Chain::new(3, fmt("RGB u16")).unwrap();
    place(&mut chain, 0, 0, 0, 0);
    place(&mut chain, 1, 0, 0, 1);
    place(&mut chain, 2, 1, 0, 2);

    chain.map_from_frame(&frame).unwrap();
    chain.fill_from_frame(&mut frame).unwrap();

    assert_eq!(chain.sample(0).unwrap(), 10 * 257);
    assert_eq!(chain.sample(1).unwrap(), 20 * 257);
    assert_eq!(chain.sample(2).unwrap(), 60 * 257);
}

#[test]
fn fill_normalizes_foreign_endianness_and_flips_the_flag() {
    let value: u16 = 0x1234;
    let foreign_big = !host_big_endian();
    let component = if foreign_big {
        value.to_be_bytes()
    } else {
        value.to_le_bytes()
    };
    let buf = vec![component[0], component[1]];
    let mut frame = Frame::with_buffer(1, 1, fmt("Y u16"), buf, foreign_big).unwrap();

    let mut chain = Chain::new(1, fmt("Y u16")).unwrap();
    place(&mut chain, 0, 0, 0, 0);
    chain.map_from_frame(&frame).unwrap();
    chain.fill_from_frame(&mut frame).unwrap();

    assert_eq!(frame.is_big_endian(), host_big_endian());
    assert_eq!(chain.sample(0).unwrap(), i64::from(value));
}

#[test]
fn fill_before_map_copies_nothing() {
    let mut frame = Frame::new(2, 2, fmt("RGB u8")).unwrap();
    frame.buffer_mut().fill(9);
    let mut chain = Chain::new(3, fmt("RGB u8")).unwrap();
    chain.fill_from_frame(&mut frame).unwrap();
    assert!(chain.buffer().iter().all(|&b| b == 0));
}
