use std::fs;
use std::path::PathBuf;

use image::{Rgb, RgbImage};

use phototopgn::board::PieceKind;
use phototopgn::error::{Error, Result};
use phototopgn::game::{GameController, Prompter, Session, ShakmatyRules};
use phototopgn::vision::{CropRect, ImageSource, Preprocessor};

/// Prompter for runs that never need to ask anything
struct Silent;

impl Prompter for Silent {
    fn confirm(&mut self, _question: &str) -> Result<bool> {
        Ok(false)
    }

    fn promotion_piece(&mut self) -> Result<PieceKind> {
        Ok(PieceKind::Queen)
    }

    fn crop_rect(&mut self) -> Result<CropRect> {
        Ok(CropRect { x_min: 0, x_max: 0, y_min: 0, y_max: 0 })
    }
}

/// Fresh scratch directory under the system temp dir
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("phototopgn-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("Failed to create scratch directory");
    dir
}

/// 100x100 photograph with the board in the 80x80 square at (10, 10);
/// listed squares are white, everything else black
fn photograph(lit: &[&str]) -> RgbImage {
    let mut image = RgbImage::new(100, 100);
    for name in lit {
        let bytes = name.as_bytes();
        let col = (bytes[0] - b'a') as u32;
        let row = (b'8' - bytes[1]) as u32;
        for y in 0..10 {
            for x in 0..10 {
                image.put_pixel(10 + col * 10 + x, 10 + row * 10 + y, Rgb([255, 255, 255]));
            }
        }
    }
    image
}

fn controller() -> GameController {
    GameController::new(Box::new(ShakmatyRules::new()), Box::new(Silent))
}

#[test]
fn test_image_source_sorts_and_skips_hidden_files() {
    let dir = scratch_dir("source");
    fs::write(dir.join("img_0002.jpg"), b"x").unwrap();
    fs::write(dir.join("img_0001.jpg"), b"x").unwrap();
    fs::write(dir.join(".DS_Store"), b"x").unwrap();
    fs::create_dir(dir.join("thumbs")).unwrap();

    let source = ImageSource::scan(&dir).expect("directory is readable");
    let names: Vec<_> = source
        .files()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["img_0001.jpg", "img_0002.jpg"]);
    assert_eq!(source.dir(), dir.as_path());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_image_source_errors() {
    let dir = scratch_dir("empty");
    fs::write(dir.join(".hidden"), b"x").unwrap();
    assert!(matches!(ImageSource::scan(&dir), Err(Error::NoFrames { .. })));
    assert!(matches!(ImageSource::scan(dir.join("missing")), Err(Error::Io(_))));
    fs::remove_dir_all(&dir).unwrap();
}

/// Names that are not valid UTF-8 must come back byte for byte
#[cfg(unix)]
#[test]
fn test_image_source_keeps_non_utf8_names() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = scratch_dir("non-utf8");
    let raw = OsStr::from_bytes(b"img_\xff01.png");
    fs::write(dir.join(raw), b"x").unwrap();
    fs::write(dir.join(OsStr::from_bytes(b".\xffhidden")), b"x").unwrap();

    let source = ImageSource::scan(&dir).expect("directory is readable");
    assert_eq!(source.files(), &[dir.join(raw)]);
    assert!(source.files()[0].exists(), "listed path must exist on disk");

    fs::remove_dir_all(&dir).unwrap();
}

/// Symlinked photographs count as photographs; dangling links do not
#[cfg(unix)]
#[test]
fn test_image_source_follows_symlinks() {
    use std::os::unix::fs::symlink;

    let dir = scratch_dir("symlinks");
    let originals = scratch_dir("symlink-targets");
    fs::write(originals.join("real.png"), b"x").unwrap();
    symlink(originals.join("real.png"), dir.join("shot_01.png")).unwrap();
    symlink(originals.join("gone.png"), dir.join("shot_02.png")).unwrap();
    fs::write(dir.join("shot_03.png"), b"x").unwrap();

    let source = ImageSource::scan(&dir).expect("directory is readable");
    assert_eq!(source.files(), &[dir.join("shot_01.png"), dir.join("shot_03.png")]);

    fs::remove_dir_all(&dir).unwrap();
    fs::remove_dir_all(&originals).unwrap();
}

#[test]
fn test_session_reconstructs_game_from_photographs() {
    let dir = scratch_dir("session");
    // Each photograph toggles the two squares of the next move
    let shots: [&[&str]; 4] = [
        &[],
        &["e2", "e4"],
        &["e2", "e4", "e7", "e5"],
        &["e2", "e4", "e7", "e5", "g1", "f3"],
    ];
    for (i, lit) in shots.iter().enumerate() {
        photograph(lit)
            .save(dir.join(format!("shot_{:02}.png", i)))
            .expect("Failed to write test photograph");
    }

    let source = ImageSource::scan(&dir).unwrap();
    let preprocessor = Preprocessor::new(CropRect { x_min: 10, x_max: 90, y_min: 10, y_max: 90 });

    let mut seen = Vec::new();
    let game = Session::new(source, preprocessor, controller())
        .run(|_, record| seen.push(record.san.clone()))
        .expect("session runs to completion");

    // N photographs give N - 1 moves
    assert_eq!(seen, vec!["e4", "e5", "Nf3"]);
    assert_eq!(game.records().len(), 3);
    assert_eq!(game.state().move_number, 4);
    assert_eq!(game.state().positions.len(), 3);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_session_needs_two_photographs() {
    let dir = scratch_dir("single");
    photograph(&[]).save(dir.join("only.png")).unwrap();

    let source = ImageSource::scan(&dir).unwrap();
    let preprocessor = Preprocessor::new(CropRect { x_min: 10, x_max: 90, y_min: 10, y_max: 90 });
    let result = Session::new(source, preprocessor, controller()).run(|_, _| {});
    assert!(matches!(result, Err(Error::NotEnoughFrames { found: 1 })));

    fs::remove_dir_all(&dir).unwrap();
}
