use super::*;

fn fmt(name: &str) -> PixelFormat {
    name.parse().unwrap()
}

#[test]
fn widening_scales_max_to_max() {
    let conv = converter(fmt("RGB u8"), fmt("RGB u16")).unwrap();
    let src = [255u8, 0, 128];
    let mut dst = [0u8; 6];
    conv.apply(&src, &mut dst, 1).unwrap();

    let r = read_component(&dst[0..], ComponentType::U16);
    let g = read_component(&dst[2..], ComponentType::U16);
    let b = read_component(&dst[4..], ComponentType::U16);
    assert_eq!((r, g, b), (65_535, 0, 128 * 257));
}

#[test]
fn narrowing_scales_back() {
    let conv = converter(fmt("RGB u16"), fmt("RGB u8")).unwrap();
    let mut src = [0u8; 6];
    write_component(&mut src[0..], ComponentType::U16, 65_535);
    write_component(&mut src[2..], ComponentType::U16, 257);
    let mut dst = [0u8; 3];
    conv.apply(&src, &mut dst, 1).unwrap();
    assert_eq!(dst, [255, 1, 0]);
}

#[test]
fn rgb_bgr_reorders_channels() {
    let conv = converter(fmt("RGB u8"), fmt("BGR u8")).unwrap();
    let src = [1u8, 2, 3, 4, 5, 6];
    let mut dst = [0u8; 6];
    conv.apply(&src, &mut dst, 2).unwrap();
    assert_eq!(dst, [3, 2, 1, 6, 5, 4]);
}

#[test]
fn luminance_fans_out_and_averages_back() {
    let conv = converter(fmt("Y u8"), fmt("RGB u8")).unwrap();
    let src = [7u8];
    let mut dst = [0u8; 3];
    conv.apply(&src, &mut dst, 1).unwrap();
    assert_eq!(dst, [7, 7, 7]);

    let conv = converter(fmt("RGB u8"), fmt("Y u8")).unwrap();
    let src = [10u8, 20, 30];
    let mut dst = [0u8; 1];
    conv.apply(&src, &mut dst, 1).unwrap();
    assert_eq!(dst, [20]);
}

#[test]
fn missing_alpha_reads_as_opaque() {
    let conv = converter(fmt("RGB u8"), fmt("RGBA u8")).unwrap();
    let src = [9u8, 8, 7];
    let mut dst = [0u8; 4];
    conv.apply(&src, &mut dst, 1).unwrap();
    assert_eq!(dst, [9, 8, 7, 255]);
}

#[test]
fn apply_validates_buffer_sizes() {
    let conv = converter(fmt("RGB u8"), fmt("RGB u16")).unwrap();
    let src = [0u8; 3];
    let mut dst = [0u8; 6];
    assert!(conv.apply(&src, &mut dst, 2).is_err());
    let mut small = [0u8; 4];
    assert!(conv.apply(&src, &mut small, 1).is_err());
}
