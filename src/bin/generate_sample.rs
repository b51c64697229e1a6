//! Writes a small synthetic MNIST-style dataset:
//!
//! * `mnist_images.png`   – 784 px wide, one 28x28 digit per pixel row
//! * `mnist_labels_uint8` – 10 one-hot bytes per digit
//!
//! Usage: `generate_sample [out_dir] [count]`, then open `out_dir` from the
//! gallery with `MNIST_COUNT=<count>`.

use std::path::PathBuf;

use image::{ImageFormat, Rgb, RgbImage};

const SIDE: u32 = 28;

/// Seven-segment layout: (x0, y0, x1, y1) in a 28x28 cell.
const SEGMENTS: [(i32, i32, i32, i32); 7] = [
    (8, 4, 20, 6),   // a: top
    (18, 4, 20, 14), // b: upper right
    (18, 14, 20, 24), // c: lower right
    (8, 22, 20, 24), // d: bottom
    (8, 14, 10, 24), // e: lower left
    (8, 4, 10, 14),  // f: upper left
    (8, 13, 20, 15), // g: middle
];

/// Lit segments per digit, bit i = SEGMENTS[i].
const DIGIT_SEGMENTS: [u8; 10] = [
    0b0111111, 0b0000110, 0b1011011, 0b1001111, 0b1100110,
    0b1101101, 0b1111101, 0b0000111, 0b1111111, 0b1101111,
];

/// splitmix64 – deterministic and good enough for jitter.
struct SplitMix(u64);

impl SplitMix {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn unit(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }
}

/// Intensities of one digit, row-major.
fn draw_digit(digit: u8, rng: &mut SplitMix) -> Vec<u8> {
    let dx = rng.below(7) as i32 - 3;
    let dy = rng.below(5) as i32 - 2;
    let ink = 0.7 + 0.3 * rng.unit();
    let lit = DIGIT_SEGMENTS[digit as usize];

    let mut pixels = vec![0u8; (SIDE * SIDE) as usize];
    for (row, col) in (0..SIDE as i32).flat_map(|r| (0..SIDE as i32).map(move |c| (r, c))) {
        let on = SEGMENTS.iter().enumerate().any(|(i, &(x0, y0, x1, y1))| {
            lit & (1 << i) != 0
                && (x0 + dx..x1 + dx).contains(&col)
                && (y0 + dy..y1 + dy).contains(&row)
        });
        let noise = 0.08 * rng.unit();
        let value = if on { ink - noise } else { noise * 0.5 };
        pixels[(row as u32 * SIDE + col as u32) as usize] = (value.clamp(0.0, 1.0) * 255.0) as u8;
    }
    pixels
}

fn main() {
    let mut args = std::env::args().skip(1);
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "sample_mnist".to_string()));
    let count: u32 = args
        .next()
        .map(|s| s.parse().expect("count must be a positive integer"))
        .unwrap_or(1_000);

    let mut rng = SplitMix(42);
    let mut sheet = RgbImage::new(SIDE * SIDE, count);
    let mut labels = Vec::with_capacity(count as usize * 10);

    for row in 0..count {
        let digit = rng.below(10) as u8;
        for (x, &v) in draw_digit(digit, &mut rng).iter().enumerate() {
            sheet.put_pixel(x as u32, row, Rgb([v, v, v]));
        }
        labels.extend((0..10u8).map(|c| u8::from(c == digit)));
    }

    std::fs::create_dir_all(&out_dir).expect("Failed to create output directory");
    sheet
        .save_with_format(out_dir.join("mnist_images.png"), ImageFormat::Png)
        .expect("Failed to write sprite sheet");
    std::fs::write(out_dir.join("mnist_labels_uint8"), &labels).expect("Failed to write labels");

    println!(
        "Wrote {count} digits to {}  (open with MNIST_COUNT={count})",
        out_dir.display()
    );
}
