use std::borrow::Cow;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::process::{Command, Output};

fn peek(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_uwu-peek"))
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn write_gif(path: &Path, width: u16, height: u16) {
    let file = BufWriter::new(File::create(path).unwrap());
    let palette = [0, 0, 0, 255, 255, 255];
    let mut encoder = gif::Encoder::new(file, width, height, &palette).unwrap();

    let mut frame = gif::Frame::default();
    frame.width = width;
    frame.height = height;
    frame.buffer = Cow::Owned(vec![1; width as usize * height as usize]);
    encoder.write_frame(&frame).unwrap();
}

#[test]
fn missing_file_exits_nonzero_with_the_path_on_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.gif");
    let path = path.to_str().unwrap();

    let out = peek(&["-i", path]);
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("unreadable resource"), "{}", stderr);
    assert!(stderr.contains(path), "{}", stderr);
}

#[test]
fn garbage_file_is_reported_as_unrecognized() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.gif");
    std::fs::write(&path, b"just some text, not a picture").unwrap();

    let out = peek(&["-i", path.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unrecognized format"));
}

#[test]
fn gif_report_goes_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tiny.gif");
    write_gif(&path, 5, 4);

    let out = peek(&["-i", path.to_str().unwrap()]);
    assert!(out.status.success());

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("<GIF image mode=P size=5x4 at 0x"), "{}", stdout);
}

#[test]
fn export_flag_writes_the_image() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tiny.gif");
    let png = dir.path().join("tiny.png");
    write_gif(&path, 3, 2);

    let out = peek(&["-i", path.to_str().unwrap(), "-e", png.to_str().unwrap()]);
    assert!(out.status.success());

    let written = image::open(&png).unwrap().to_rgba8();
    assert_eq!(written.dimensions(), (3, 2));
    assert_eq!(written.get_pixel(2, 1).0, [255, 255, 255, 255]);
}
