use dpmatch::lowlevel::{Lattice, SubRect};
use dpmatch::{DpEngine, DpMatchError, EngineConfig, Rgb, RgbImage, ScanlineContext};

fn zero(_x: usize, _y: usize, _ctx: &ScanlineContext<'_>) -> f64 {
    0.0
}

#[test]
fn rgb_image_rejects_empty_dimensions() {
    let err = RgbImage::new(Vec::new(), 0, 1).err().unwrap();
    assert_eq!(
        err,
        DpMatchError::InvalidDimensions {
            width: 0,
            height: 1,
        }
    );

    let err = RgbImage::filled(3, 0, Rgb::gray(1)).err().unwrap();
    assert_eq!(
        err,
        DpMatchError::InvalidDimensions {
            width: 3,
            height: 0,
        }
    );
}

#[test]
fn rgb_image_buffer_must_match_shape() {
    let err = RgbImage::new(vec![Rgb::default(); 3], 2, 2).err().unwrap();
    assert_eq!(err, DpMatchError::BufferTooSmall { needed: 4, got: 3 });

    let err = RgbImage::new(vec![Rgb::default(); 5], 2, 2).err().unwrap();
    assert_eq!(
        err,
        DpMatchError::InvalidDimensions {
            width: 2,
            height: 2,
        }
    );
}

#[test]
fn rgb_image_rows_are_scanlines() {
    let data = (0u8..6).map(Rgb::gray).collect();
    let img = RgbImage::new(data, 3, 2).unwrap();
    assert_eq!(img.width(), 3);
    assert_eq!(img.height(), 2);
    assert_eq!(img.get(0, 1), Some(Rgb::gray(3)));
    assert_eq!(img.get(2, 1), Some(Rgb::gray(5)));
    assert!(img.get(3, 0).is_none());
    assert!(img.get(0, 2).is_none());
}

#[test]
fn rgb_image_set_is_bounds_checked() {
    let mut img = RgbImage::filled(2, 2, Rgb::gray(9)).unwrap();
    img.set(1, 0, Rgb::new(1, 2, 3)).unwrap();
    assert_eq!(img.get(1, 0), Some(Rgb::new(1, 2, 3)));
    assert_eq!(
        img.set(0, 2, Rgb::default()),
        Err(DpMatchError::IndexOutOfBounds {
            index: 2,
            len: 2,
            context: "row",
        })
    );
}

#[test]
fn sub_rect_outside_lattice_is_rejected() {
    let lattice = Lattice::new(4, 3).unwrap();
    let err = SubRect::new(0, 0, 4, 2)
        .validate(lattice.width(), lattice.height())
        .err()
        .unwrap();
    assert_eq!(
        err,
        DpMatchError::InvalidRect {
            sx: 0,
            sy: 0,
            ex: 4,
            ey: 2,
            width: 4,
            height: 3,
        }
    );
}

#[test]
fn engine_rejects_empty_shapes() {
    let cfg = EngineConfig {
        workers: 1,
        ..EngineConfig::default()
    };
    let err = DpEngine::new(zero, cfg.clone(), 0, 5, 2).err().unwrap();
    assert_eq!(
        err,
        DpMatchError::InvalidDimensions {
            width: 0,
            height: 5,
        }
    );
    let err = DpEngine::new(
        zero,
        EngineConfig {
            workers: 0,
            ..cfg
        },
        5,
        5,
        2,
    )
    .err()
    .unwrap();
    assert_eq!(err, DpMatchError::InvalidInput("worker count must be at least 1"));
}

#[test]
fn engine_config_defaults() {
    let cfg = EngineConfig::default();
    assert_eq!(cfg.left_range, 40);
    assert_eq!(cfg.right_range, 40);
    assert_eq!(cfg.interpolation_threshold, 5);
    assert!(cfg.workers >= 1);
}

#[test]
fn engine_accessors_reflect_construction_and_setters() {
    let zero = |_x: usize, _y: usize, _ctx: &ScanlineContext<'_>| 0.0;
    let cfg = EngineConfig {
        left_range: 3,
        right_range: 1,
        interpolation_threshold: 2,
        workers: 3,
    };
    let mut engine = DpEngine::new(zero, cfg, 6, 4, 5).unwrap();
    assert_eq!(engine.worker_count(), 3);
    assert_eq!(engine.scanlines(), 5);
    assert_eq!(engine.primary_width(), 6);
    assert_eq!(engine.reference_width(), 4);
    assert_eq!(engine.interpolation_threshold(), 2);
    assert_eq!(
        (engine.window().left_range, engine.window().right_range),
        (3, 1)
    );

    engine.set_window(7, 8);
    engine.set_interpolation_threshold(9);
    assert_eq!(
        (engine.window().left_range, engine.window().right_range),
        (7, 8)
    );
    assert_eq!(engine.interpolation_threshold(), 9);
}
