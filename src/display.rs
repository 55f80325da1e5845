use std::fmt;

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

/// The 64x32 monochrome framebuffer. Each row is packed into a `u64` with
/// x=0 in the most significant bit.
#[derive(Clone, PartialEq, Eq)]
pub struct Display {
    rows: [u64; HEIGHT],
}

impl Display {
    pub fn new() -> Display {
        Display { rows: [0; HEIGHT] }
    }

    pub fn clear(&mut self) {
        self.rows = [0; HEIGHT];
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> bool {
        (self.rows[y % HEIGHT] >> (WIDTH - 1 - x % WIDTH)) & 1 == 1
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, on: bool) {
        let mask = 1u64 << (WIDTH - 1 - x % WIDTH);
        if on {
            self.rows[y % HEIGHT] |= mask;
        } else {
            self.rows[y % HEIGHT] &= !mask;
        }
    }

    pub fn rows(&self) -> &[u64; HEIGHT] {
        &self.rows
    }

    pub fn is_blank(&self) -> bool {
        self.rows.iter().all(|&row| row == 0)
    }

    // XORs an 8-pixel-wide sprite onto the buffer. The origin wraps onto the
    // screen; columns past the right edge wrap around, rows past the bottom
    // edge are dropped. Returns true if any lit pixel was turned off.
    pub fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let x = x as u32 % WIDTH as u32;
        let y = y as usize % HEIGHT;
        let mut collision = false;

        for (offset, &byte) in sprite.iter().enumerate() {
            let row = y + offset;
            if row >= HEIGHT {
                break;
            }

            let bits = ((byte as u64) << (WIDTH - 8)).rotate_right(x);
            collision |= self.rows[row] & bits != 0;
            self.rows[row] ^= bits;
        }

        collision
    }
}

impl Default for Display {
    fn default() -> Self {
        Display::new()
    }
}

// '#' for lit pixels, '.' for dark ones, one line per row
impl fmt::Display for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                f.write_str(if self.get_pixel(x, y) { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Display {{")?;
        fmt::Display::fmt(self, f)?;
        write!(f, "}}")
    }
}
