use std::fmt::{Display, Formatter, Result as FmtResult};

// Module
//------------------------------------------------------------------------------

/// State of one cell of a QR symbol. Cells start out [`Empty`](Module::Empty)
/// and are claimed exactly once during matrix construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Module {
    Empty,
    Light,
    Dark,
}

impl Module {
    pub fn is_dark(self) -> bool {
        matches!(self, Module::Dark)
    }
}

impl From<bool> for Module {
    fn from(bit: bool) -> Self {
        if bit {
            Module::Dark
        } else {
            Module::Light
        }
    }
}

// Symbol grid
//------------------------------------------------------------------------------

/// Tri-state cell matrix packed at 2 bits per cell: a flag bit marking the
/// cell as claimed, and a value bit holding light/dark. A zeroed backing
/// buffer therefore reads back as all Empty, so a fresh grid needs no
/// initialization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolGrid {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl SymbolGrid {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width >= 1 && height >= 1, "Both dimensions must be greater than 0");
        let octets = ((width * height - 1) >> 2) + 1;
        Self { width, height, data: vec![0; octets] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn bounds_check(&self, x: usize, y: usize) {
        assert!(x < self.width, "X index {x} out of bounds for width {}", self.width);
        assert!(y < self.height, "Y index {y} out of bounds for height {}", self.height);
    }

    pub fn get(&self, x: usize, y: usize) -> Module {
        self.bounds_check(x, y);
        let index = y * self.width + x;
        let octet = self.data[index >> 2];
        let offset = (index << 1) & 7;
        if octet & (1 << offset) == 0 {
            Module::Empty
        } else {
            ((octet >> (offset | 1)) & 1 == 1).into()
        }
    }

    pub fn set(&mut self, x: usize, y: usize, value: Module) {
        self.bounds_check(x, y);
        let index = y * self.width + x;
        let octet = &mut self.data[index >> 2];
        let offset = (index << 1) & 7;
        match value {
            Module::Empty => *octet &= !(1 << offset),
            Module::Light => {
                *octet |= 1 << offset;
                *octet &= !(1 << (offset | 1));
            }
            Module::Dark => *octet |= 0b11 << offset,
        }
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    pub fn count_dark(&self) -> usize {
        let mut count = 0;
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y).is_dark() {
                    count += 1;
                }
            }
        }
        count
    }
}

impl Display for SymbolGrid {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let mut out = String::with_capacity((2 * self.width + 1) * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(' ');
                out.push(match self.get(x, y) {
                    Module::Light => '0',
                    Module::Dark => '1',
                    Module::Empty => ' ',
                });
            }
            out.push('\n');
        }
        f.write_str(&out)
    }
}
