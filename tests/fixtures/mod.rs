// テスト用の画像生成ヘルパー
#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// 左半分が黒、右半分が白の画像
pub fn left_right_split(size: u32) -> RgbImage {
    RgbImage::from_fn(size, size, |x, _| {
        if x < size / 2 {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    })
}

/// 上半分が黒、下半分が白の画像
pub fn top_bottom_split(size: u32) -> RgbImage {
    RgbImage::from_fn(size, size, |_, y| {
        if y < size / 2 {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    })
}

/// 対角方向のグラデーション
pub fn diagonal_gradient(size: u32) -> RgbImage {
    RgbImage::from_fn(size, size, |x, y| {
        let value = ((x + y) * 255 / (2 * (size - 1)).max(1)) as u8;
        Rgb([value, value, value])
    })
}

pub fn png_bytes(image: &RgbImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image.clone())
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("PNG encoding failed");
    bytes
}

pub fn write_png(dir: &Path, name: &str, image: &RgbImage) -> PathBuf {
    let path = dir.join(name);
    image.save(&path).expect("failed to save test image");
    path
}

/// 拡張子は画像だが中身が壊れたファイル
pub fn write_corrupt(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"NOT_A_PNG").expect("failed to write corrupt file");
    path
}

pub fn id_of(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
