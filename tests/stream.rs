use std::io::Cursor;

use camera_canny::{
    canny, CannyParams, EdgePipeline, PgmSequenceWriter, RawVideoSource, RunConfig, Runner,
    StreamError,
};

const WIDTH: u32 = 40;
const HEIGHT: u32 = 30;

fn step_frame(split: u32) -> Vec<u8> {
    (0..HEIGHT)
        .flat_map(|_| (0..WIDTH).map(move |x| if x < split { 30 } else { 210 }))
        .collect()
}

fn runner(max_frames: usize) -> Runner {
    let params = CannyParams::new(1.0, 0.4, 0.8).unwrap();
    Runner::new(
        EdgePipeline::new(WIDTH, HEIGHT, params).unwrap(),
        RunConfig { max_frames },
    )
}

#[test]
fn raw_stream_to_numbered_pgm_files() {
    let frames: Vec<Vec<u8>> = [10, 18, 26].iter().map(|&s| step_frame(s)).collect();
    let mut source = RawVideoSource::new(Cursor::new(frames.concat()), WIDTH, HEIGHT).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let mut sink = PgmSequenceWriter::create(dir.path()).unwrap();
    let stats = runner(10).run(&mut source, &mut sink).unwrap();

    assert_eq!(stats.frames_processed(), 3);
    assert_eq!(stats.frames_skipped, 0);
    assert!(!sink.edge_path(4).exists());

    let params = CannyParams::new(1.0, 0.4, 0.8).unwrap();
    for (i, pixels) in frames.iter().enumerate() {
        let written = image::open(sink.edge_path(i + 1)).unwrap().into_luma8();
        let expected = canny(pixels, WIDTH, HEIGHT, &params).unwrap().edges;
        assert_eq!(written.as_raw(), expected.as_raw(), "frame {}", i + 1);
    }
}

#[test]
fn frame_limit_leaves_the_rest_of_the_stream_unread() {
    let bytes = [step_frame(5), step_frame(15), step_frame(25)].concat();
    let mut source = RawVideoSource::new(Cursor::new(bytes), WIDTH, HEIGHT).unwrap();

    let stats = runner(2)
        .run(&mut source, &mut camera_canny::NullSink)
        .unwrap();

    assert_eq!(stats.frames_processed(), 2);
    let rest = source.into_inner();
    assert_eq!(rest.position(), 2 * (WIDTH * HEIGHT) as u64);
}

#[test]
fn truncated_stream_aborts_the_run() {
    let mut bytes = step_frame(20);
    bytes.extend_from_slice(&step_frame(20)[..100]);
    let mut source = RawVideoSource::new(Cursor::new(bytes), WIDTH, HEIGHT).unwrap();

    let err = runner(5)
        .run(&mut source, &mut camera_canny::NullSink)
        .unwrap_err();

    assert!(matches!(
        err,
        StreamError::TruncatedFrame { read: 100, .. }
    ));
}
