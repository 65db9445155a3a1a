use super::*;

fn black() -> Rgba8Premul {
    Rgba8Premul::from_straight_rgba(0, 0, 0, 255)
}

fn identity(opacity: f64) -> DrawParams {
    DrawParams {
        transform: Affine::IDENTITY,
        opacity,
    }
}

#[test]
fn new_surface_is_cleared_to_background() {
    let s = CpuSurface::new(4, 3, black()).unwrap();
    assert_eq!(s.viewport(), Size::new(4.0, 3.0));
    assert_eq!(s.data().len(), 4 * 3 * 4);
    assert_eq!(s.pixel(3, 2), Some([0, 0, 0, 255]));
    assert_eq!(s.pixel(4, 0), None);
    assert!(CpuSurface::new(0, 3, black()).is_err());
}

#[test]
fn identity_draw_copies_opaque_frame() {
    let mut s = CpuSurface::new(2, 2, black()).unwrap();
    let frame = DecodedFrame::solid(2, 2, [200, 10, 20, 255]).unwrap();
    s.draw(&frame, &identity(1.0)).unwrap();
    for y in 0..2 {
        for x in 0..2 {
            assert_eq!(s.pixel(x, y), Some([200, 10, 20, 255]));
        }
    }
    assert_eq!(s.draw_count(), 1);
}

#[test]
fn scaled_draw_uses_nearest_sample() {
    let mut s = CpuSurface::new(4, 2, black()).unwrap();
    let frame = DecodedFrame::from_rgba8_premul(
        2,
        1,
        vec![255, 0, 0, 255, 0, 0, 255, 255],
    )
    .unwrap();
    let params = DrawParams {
        transform: Affine::scale(2.0),
        opacity: 1.0,
    };
    s.draw(&frame, &params).unwrap();
    assert_eq!(s.pixel(0, 0), Some([255, 0, 0, 255]));
    assert_eq!(s.pixel(1, 1), Some([255, 0, 0, 255]));
    assert_eq!(s.pixel(2, 0), Some([0, 0, 255, 255]));
    assert_eq!(s.pixel(3, 1), Some([0, 0, 255, 255]));
}

#[test]
fn uncovered_pixels_show_background() {
    let mut s = CpuSurface::new(4, 4, black()).unwrap();
    let frame = DecodedFrame::solid(2, 2, [255, 255, 255, 255]).unwrap();
    s.draw(&frame, &identity(1.0)).unwrap();
    assert_eq!(s.pixel(0, 0), Some([255, 255, 255, 255]));
    assert_eq!(s.pixel(3, 3), Some([0, 0, 0, 255]));
}

#[test]
fn opacity_blends_with_background() {
    let mut s = CpuSurface::new(1, 1, black()).unwrap();
    let frame = DecodedFrame::solid(1, 1, [255, 255, 255, 255]).unwrap();
    s.draw(&frame, &identity(0.5)).unwrap();
    let [r, g, b, a] = s.pixel(0, 0).unwrap();
    assert!((127..=129).contains(&r));
    assert_eq!(r, g);
    assert_eq!(g, b);
    assert_eq!(a, 255);

    s.draw(&frame, &identity(0.0)).unwrap();
    assert_eq!(s.pixel(0, 0), Some([0, 0, 0, 255]));
}

#[test]
fn resize_reallocates_and_clears() {
    let mut s = CpuSurface::new(2, 2, black()).unwrap();
    let frame = DecodedFrame::solid(2, 2, [9, 9, 9, 255]).unwrap();
    s.draw(&frame, &identity(1.0)).unwrap();
    s.resize(Size::new(3.0, 5.0)).unwrap();
    assert_eq!((s.width(), s.height()), (3, 5));
    assert_eq!(s.data().len(), 3 * 5 * 4);
    assert_eq!(s.pixel(0, 0), Some([0, 0, 0, 255]));
    assert!(s.resize(Size::new(0.0, 5.0)).is_err());
    assert_eq!((s.width(), s.height()), (3, 5));
}

#[test]
fn to_rgba_image_unpremultiplies() {
    let s = CpuSurface::new(1, 1, Rgba8Premul::from_straight_rgba(255, 0, 0, 128)).unwrap();
    let img = s.to_rgba_image().unwrap();
    let px = img.get_pixel(0, 0).0;
    assert_eq!(px[3], 128);
    assert!(px[0] >= 254);
    assert_eq!(px[1], 0);
}

#[test]
fn overlay_composites_over_existing_pixels() {
    let mut s = CpuSurface::new(2, 1, black()).unwrap();
    let under = DecodedFrame::solid(2, 1, [200, 0, 0, 255]).unwrap();
    s.draw(&under, &identity(1.0)).unwrap();

    // Half-width frame at half opacity only touches the left pixel.
    let over_frame = DecodedFrame::solid(1, 1, [0, 0, 200, 255]).unwrap();
    s.overlay(&over_frame, &identity(0.5)).unwrap();
    let [r, g, b, a] = s.pixel(0, 0).unwrap();
    assert!((99..=101).contains(&r));
    assert_eq!(g, 0);
    assert!((99..=101).contains(&b));
    assert_eq!(a, 255);
    assert_eq!(s.pixel(1, 0), Some([200, 0, 0, 255]));

    s.overlay(&over_frame, &identity(0.0)).unwrap();
    assert_eq!(s.pixel(1, 0), Some([200, 0, 0, 255]));
    assert_eq!(s.draw_count(), 1);
}
