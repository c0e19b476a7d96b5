use camera_canny::{
    canny, hysteresis, CannyError, CannyParams, EdgeMap, EdgePipeline, RidgeField, Thresholds,
    BORDER_WIDTH,
};

/// Two uniform regions meeting along the vertical line between columns `split - 1` and `split`.
fn vertical_step(width: u32, height: u32, split: u32, dark: u8, bright: u8) -> Vec<u8> {
    (0..height)
        .flat_map(|_| (0..width).map(move |x| if x < split { dark } else { bright }))
        .collect()
}

/// Two uniform regions meeting along the horizontal line between rows `split - 1` and `split`.
fn horizontal_step(width: u32, height: u32, split: u32, dark: u8, bright: u8) -> Vec<u8> {
    (0..height)
        .flat_map(|y| (0..width).map(move |_| if y < split { dark } else { bright }))
        .collect()
}

/// Deterministic texture: blocks, a disc and low-amplitude noise.
fn textured(width: u32, height: u32) -> Vec<u8> {
    let mut state = 0x2545_f491_u32;
    let mut next_noise = move || {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (state >> 27) as i32 - 16
    };

    let (cx, cy, r) = (width as i32 / 2, height as i32 / 2, height as i32 / 4);
    let mut pixels = Vec::with_capacity((width * height) as usize);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let mut v = if (x / 16 + y / 12) % 2 == 0 { 60 } else { 150 };
            if (x - cx).pow(2) + (y - cy).pow(2) < r * r {
                v = 230;
            }
            pixels.push((v + next_noise()).clamp(0, 255) as u8);
        }
    }
    pixels
}

#[test]
fn uniform_frames_have_no_edges() {
    for value in [0u8, 17, 128, 255] {
        let pixels = vec![value; 40 * 30];
        for (sigma, tlow, thigh) in [(0.5, 0.1, 0.2), (1.0, 0.5, 0.9), (3.0, 1.0, 1.0)] {
            let params = CannyParams::new(sigma, tlow, thigh).unwrap();
            let output = canny(&pixels, 40, 30, &params).unwrap();
            assert_eq!(
                output.edges.edge_count(),
                0,
                "value {value} sigma {sigma} tlow {tlow} thigh {thigh}"
            );
        }
    }
}

#[test]
fn vertical_step_is_marked_along_the_step_only() {
    let (width, height, split) = (32, 24, 16);
    let pixels = vertical_step(width, height, split, 40, 200);
    let params = CannyParams::new(1.2, 0.5, 0.9).unwrap();
    let edges = canny(&pixels, width, height, &params).unwrap().edges;

    for (x, _) in edges.edge_points() {
        assert!(x == split - 1 || x == split, "edge at column {x}");
    }
    for y in BORDER_WIDTH..height - BORDER_WIDTH {
        assert!(
            edges.is_edge(split - 1, y) || edges.is_edge(split, y),
            "row {y} has no edge"
        );
    }
}

#[test]
fn horizontal_step_is_marked_along_the_step_only() {
    let (width, height, split) = (30, 40, 13);
    let pixels = horizontal_step(width, height, split, 220, 10);
    let params = CannyParams::new(2.0, 0.4, 0.7).unwrap();
    let edges = canny(&pixels, width, height, &params).unwrap().edges;

    for (_, y) in edges.edge_points() {
        assert!(y == split - 1 || y == split, "edge at row {y}");
    }
    for x in BORDER_WIDTH..width - BORDER_WIDTH {
        assert!(edges.is_edge(x, split - 1) || edges.is_edge(x, split));
    }
}

/// Dark where `a * x + b * y < c`; the true step lies on `a * x + b * y = c - 0.5`.
fn oblique_step(width: u32, height: u32, (a, b, c): (i32, i32, i32)) -> Vec<u8> {
    (0..height as i32)
        .flat_map(|y| (0..width as i32).map(move |x| if a * x + b * y < c { 30 } else { 210 }))
        .collect()
}

#[test]
fn diagonal_step_is_marked_along_the_step_only() {
    let (width, height) = (48u32, 48u32);
    // A 45 degree line and a slope of 1/3, both running into the frame border
    for ((a, b, c), min_edges) in [((1, 1, 40), 40), ((1, 3, 70), 30)] {
        let pixels = oblique_step(width, height, (a, b, c));
        let norm = ((a * a + b * b) as f32).sqrt();

        for sigma in [0.6, 1.0, 1.5, 2.0] {
            for (tlow, thigh) in [(0.5, 0.9), (0.1, 0.3)] {
                let params = CannyParams::new(sigma, tlow, thigh).unwrap();
                let edges = canny(&pixels, width, height, &params).unwrap().edges;

                assert!(
                    edges.edge_count() >= min_edges,
                    "line ({a}, {b}, {c}) sigma {sigma}: only {} edges",
                    edges.edge_count()
                );
                for (x, y) in edges.edge_points() {
                    let offset = (a * x as i32 + b * y as i32) as f32 - (c as f32 - 0.5);
                    let distance = offset.abs() / norm;
                    assert!(
                        distance <= 1.0,
                        "line ({a}, {b}, {c}) sigma {sigma}: edge at ({x}, {y}) is {distance} px away"
                    );
                }
            }
        }
    }
}

#[test]
fn output_is_strictly_binary() {
    let pixels = textured(64, 48);
    let params = CannyParams::new(1.0, 0.3, 0.8).unwrap();
    let edges = canny(&pixels, 64, 48, &params).unwrap().edges;

    assert!(edges.edge_count() > 0);
    assert!(edges
        .as_raw()
        .iter()
        .all(|&v| v == EdgeMap::EDGE || v == EdgeMap::BACKGROUND));
}

#[test]
fn repeated_runs_are_byte_identical() {
    let pixels = textured(80, 60);
    let params = CannyParams::new(1.4, 0.35, 0.75)
        .unwrap()
        .with_direction(true);
    let pipeline = EdgePipeline::new(80, 60, params).unwrap();

    let first = pipeline.process(&pixels).unwrap();
    let second = pipeline.process(&pixels).unwrap();
    assert_eq!(first.edges.as_raw(), second.edges.as_raw());
    assert_eq!(first.direction, second.direction);

    // Same result regardless of how many worker threads share the rows
    let single = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap()
        .install(|| pipeline.process(&pixels).unwrap());
    assert_eq!(single.edges.as_raw(), first.edges.as_raw());
}

#[test]
fn lowering_tlow_never_loses_edges() {
    let pixels = textured(96, 72);
    let mut previous = 0;
    for tlow in [0.8, 0.6, 0.45, 0.3, 0.2, 0.1, 0.05] {
        let params = CannyParams::new(1.0, tlow, 0.8).unwrap();
        let count = canny(&pixels, 96, 72, &params).unwrap().edges.edge_count();
        assert!(count >= previous, "tlow {tlow}: {count} < {previous}");
        previous = count;
    }
}

#[test]
fn strong_isolated_ridge_survives_alone_and_weak_isolated_ridge_vanishes() {
    let (width, height) = (20u32, 20u32);
    let mut magnitudes = vec![0.0f32; (width * height) as usize];
    magnitudes[(5 * width + 5) as usize] = 200.0;
    magnitudes[(15 * width + 15) as usize] = 60.0;
    let ridges = RidgeField::from_raw(width, height, magnitudes).unwrap();

    let edges = hysteresis(&ridges, Thresholds::new(0.25, 0.9).unwrap()).unwrap();

    assert_eq!(edges.edge_points(), vec![(5, 5)]);
}

#[test]
fn outer_ring_is_always_background() {
    let (width, height) = (50u32, 40u32);
    let pixels = textured(width, height);
    for sigma in [0.3, 1.0, 2.5] {
        let params = CannyParams::new(sigma, 0.05, 0.1).unwrap();
        let edges = canny(&pixels, width, height, &params).unwrap().edges;

        for (x, y) in edges.edge_points() {
            assert!(
                x >= BORDER_WIDTH
                    && y >= BORDER_WIDTH
                    && x < width - BORDER_WIDTH
                    && y < height - BORDER_WIDTH,
                "sigma {sigma}: edge on border at ({x}, {y})"
            );
        }
    }
}

#[test]
fn configuration_errors_are_raised_before_any_frame() {
    assert!(matches!(
        CannyParams::new(-0.5, 0.3, 0.8),
        Err(CannyError::InvalidSigma(_))
    ));
    assert!(matches!(
        CannyParams::new(1.0, 0.3, 1.2),
        Err(CannyError::InvalidThreshold { .. })
    ));
    assert!(matches!(
        CannyParams::new(1.0, 0.9, 0.3),
        Err(CannyError::InvertedThresholds { .. })
    ));
}

#[test]
fn malformed_frames_are_rejected_per_call() {
    let params = CannyParams::new(1.0, 0.5, 0.9).unwrap();
    let pipeline = EdgePipeline::new(16, 16, params).unwrap();

    assert!(matches!(
        pipeline.process(&[0u8; 255]),
        Err(CannyError::BufferSize {
            expected: 256,
            actual: 255,
            ..
        })
    ));
    assert!(matches!(
        canny(&[], 16, 16, &params),
        Err(CannyError::EmptyFrame { .. })
    ));

    // A rejected frame does not disturb the next one
    let good = vertical_step(16, 16, 8, 0, 255);
    assert!(pipeline.process(&good).unwrap().edges.edge_count() > 0);
}

#[test]
fn tiny_frames_are_all_background() {
    let params = CannyParams::new(1.0, 0.5, 0.9).unwrap();
    for (w, h) in [(1, 1), (2, 5), (3, 3)] {
        let pixels: Vec<u8> = (0..w * h).map(|i| (i * 97 % 256) as u8).collect();
        let edges = canny(&pixels, w, h, &params).unwrap().edges;
        assert_eq!(edges.edge_count(), 0, "{w}x{h}");
    }
}
