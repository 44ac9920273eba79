use image::{GrayImage, Luma, Rgb, RgbImage};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Paths of the generated test fixtures
#[allow(dead_code)]
pub struct TestImages {
    /// Grey PNG with diagonal texture
    pub textured: PathBuf,
    /// Bit-identical copy of `textured`
    pub textured_copy: PathBuf,
    /// `textured` with every pixel inverted
    pub inverted: PathBuf,
    /// Colour JPEG with concentric rings
    pub rings: PathBuf,
    /// A `.png` file whose contents are not an image
    pub not_an_image: PathBuf,
    /// A zero-byte `.jpg` file
    pub empty: PathBuf,
    /// A path that does not exist
    pub missing: PathBuf,
}

fn textured(width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        Luma([((x * 7 + y * 13 + (x * y) / 5) % 256) as u8])
    })
}

fn rings(side: u32) -> RgbImage {
    let c = side as f32 / 2.0;
    RgbImage::from_fn(side, side, |x, y| {
        let d = ((x as f32 - c).powi(2) + (y as f32 - c).powi(2)).sqrt();
        let v = ((d / 6.0).sin() * 120.0 + 128.0) as u8;
        Rgb([v, 255 - v, (x % 256) as u8])
    })
}

/// Create a file with dummy data that no decoder accepts
pub fn create_dummy_file(dir: &Path, name: &str) -> PathBuf {
    let file_path = dir.join(name);
    let mut file = File::create(&file_path).unwrap();
    file.write_all(b"DUMMY IMAGE DATA").unwrap();
    file_path
}

/// Write every fixture into `base_dir`
pub fn create_test_images(base_dir: &Path) -> TestImages {
    fs::create_dir_all(base_dir).unwrap();

    let textured_path = base_dir.join("textured.png");
    let img = textured(160, 120);
    img.save(&textured_path).unwrap();

    let textured_copy = base_dir.join("textured_copy.png");
    fs::copy(&textured_path, &textured_copy).unwrap();

    let inverted = base_dir.join("inverted.png");
    let mut inverted_img = img;
    image::imageops::invert(&mut inverted_img);
    inverted_img.save(&inverted).unwrap();

    let rings_path = base_dir.join("rings.jpg");
    rings(200).save(&rings_path).unwrap();

    let empty = base_dir.join("empty.jpg");
    File::create(&empty).unwrap();

    TestImages {
        textured: textured_path,
        textured_copy,
        inverted,
        rings: rings_path,
        not_an_image: create_dummy_file(base_dir, "not_an_image.png"),
        empty,
        missing: base_dir.join("fake/path/here.png"),
    }
}
