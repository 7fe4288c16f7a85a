use std::ops::Deref;

use crate::common::error::{QRError, QRResult};
use crate::common::grid::{Module, SymbolGrid};

// Mask pattern
//------------------------------------------------------------------------------

/// One of the 8 data mask patterns. Construction validates the id, so a held
/// value is always applicable.
#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord)]
pub struct MaskPattern(u8);

pub const NUM_MASK_PATTERNS: u8 = 8;

impl MaskPattern {
    pub fn new(pattern: u8) -> QRResult<Self> {
        if pattern >= NUM_MASK_PATTERNS {
            return Err(QRError::InvalidMaskingPattern);
        }
        Ok(Self(pattern))
    }

    pub fn mask_function(self) -> fn(usize, usize) -> bool {
        match self.0 {
            0b000 => mask_functions::checkerboard,
            0b001 => mask_functions::horizontal_lines,
            0b010 => mask_functions::vertical_lines,
            0b011 => mask_functions::diagonal_lines,
            0b100 => mask_functions::large_checkerboard,
            0b101 => mask_functions::fields,
            0b110 => mask_functions::diamonds,
            0b111 => mask_functions::meadow,
            _ => unreachable!(),
        }
    }
}

impl Deref for MaskPattern {
    type Target = u8;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

mod mask_functions {
    pub fn checkerboard(x: usize, y: usize) -> bool {
        (x + y) & 1 == 0
    }

    pub fn horizontal_lines(_: usize, y: usize) -> bool {
        y & 1 == 0
    }

    pub fn vertical_lines(x: usize, _: usize) -> bool {
        x % 3 == 0
    }

    pub fn diagonal_lines(x: usize, y: usize) -> bool {
        (x + y) % 3 == 0
    }

    pub fn large_checkerboard(x: usize, y: usize) -> bool {
        ((y >> 1) + (x / 3)) & 1 == 0
    }

    pub fn fields(x: usize, y: usize) -> bool {
        ((x * y) & 1) + ((x * y) % 3) == 0
    }

    pub fn diamonds(x: usize, y: usize) -> bool {
        (((x * y) & 1) + ((x * y) % 3)) & 1 == 0
    }

    pub fn meadow(x: usize, y: usize) -> bool {
        (((x * y) % 3) + ((x + y) & 1)) & 1 == 0
    }
}

// Penalty scoring
//------------------------------------------------------------------------------

static N1: u32 = 3;
static N2: u32 = 3;
static N3: u32 = 40;
static N4: u32 = 10;

/// Total readability penalty of a fully drawn symbol, the sum of the four
/// scoring rules.
pub fn penalty_score(grid: &SymbolGrid) -> u32 {
    adjacent_run_penalty(grid) + block_penalty(grid) + finder_like_penalty(grid)
        + balance_penalty(grid)
}

/// Builds a candidate symbol per pattern and keeps the one with the lowest
/// penalty; ties go to the lowest pattern id.
pub fn choose_best_pattern<F>(mut build: F) -> MaskPattern
where
    F: FnMut(MaskPattern) -> SymbolGrid,
{
    let mut best = MaskPattern(0);
    let mut min_penalty = u32::MAX;
    for id in 0..NUM_MASK_PATTERNS {
        let pattern = MaskPattern(id);
        let penalty = penalty_score(&build(pattern));
        if penalty < min_penalty {
            min_penalty = penalty;
            best = pattern;
        }
    }
    best
}

// Rule 1: rows or columns of 5+ equal cells score 3 + (run length - 5)
fn adjacent_run_penalty(grid: &SymbolGrid) -> u32 {
    run_penalty(grid, true) + run_penalty(grid, false)
}

fn run_penalty(grid: &SymbolGrid, horizontal: bool) -> u32 {
    let (i_limit, j_limit) =
        if horizontal { (grid.height(), grid.width()) } else { (grid.width(), grid.height()) };
    let mut penalty = 0;
    for i in 0..i_limit {
        let mut run_length = 0;
        let mut prev: Option<Module> = None;
        for j in 0..j_limit {
            let cell = if horizontal { grid.get(j, i) } else { grid.get(i, j) };
            if Some(cell) == prev {
                run_length += 1;
            } else {
                if run_length >= 5 {
                    penalty += N1 + (run_length - 5);
                }
                run_length = 1;
                prev = Some(cell);
            }
        }
        if run_length >= 5 {
            penalty += N1 + (run_length - 5);
        }
    }
    penalty
}

// Rule 2: every 2x2 block of equal cells scores 3
fn block_penalty(grid: &SymbolGrid) -> u32 {
    let mut blocks = 0;
    for y in 0..grid.height() - 1 {
        for x in 0..grid.width() - 1 {
            let value = grid.get(x, y);
            if value == grid.get(x + 1, y)
                && value == grid.get(x, y + 1)
                && value == grid.get(x + 1, y + 1)
            {
                blocks += 1;
            }
        }
    }
    N2 * blocks
}

// Rule 3: the finder-like run 1011101 flanked by 4 light cells scores 40 per
// occurrence, on both axes
fn finder_like_penalty(grid: &SymbolGrid) -> u32 {
    const PATTERN: [bool; 7] = [true, false, true, true, true, false, true];
    let width = grid.width();
    let height = grid.height();
    let dark = |x: usize, y: usize| grid.get(x, y) == Module::Dark;
    let light = |x: usize, y: usize| grid.get(x, y) == Module::Light;

    let white_horizontal = |from: isize, to: isize, y: usize| {
        if from < 0 || width < to as usize {
            return false;
        }
        (from..to).all(|x| !dark(x as usize, y))
    };
    let white_vertical = |x: usize, from: isize, to: isize| {
        if from < 0 || height < to as usize {
            return false;
        }
        (from..to).all(|y| !dark(x, y as usize))
    };

    let mut occurrences = 0;
    for y in 0..height {
        for x in 0..width {
            if x + 6 < width
                && PATTERN
                    .iter()
                    .enumerate()
                    .all(|(i, &d)| if d { dark(x + i, y) } else { light(x + i, y) })
                && (white_horizontal(x as isize - 4, x as isize, y)
                    || white_horizontal((x + 7) as isize, (x + 11) as isize, y))
            {
                occurrences += 1;
            }
            if y + 6 < height
                && PATTERN
                    .iter()
                    .enumerate()
                    .all(|(i, &d)| if d { dark(x, y + i) } else { light(x, y + i) })
                && (white_vertical(x, y as isize - 4, y as isize)
                    || white_vertical(x, (y + 7) as isize, (y + 11) as isize))
            {
                occurrences += 1;
            }
        }
    }
    occurrences * N3
}

// Rule 4: 10 points per 5% deviation from a 50% dark ratio
fn balance_penalty(grid: &SymbolGrid) -> u32 {
    let total = (grid.width() * grid.height()) as i64;
    let dark = grid.count_dark() as i64;
    let variances = ((dark * 2 - total) * 10).abs() / total;
    variances as u32 * N4
}

#[cfg(test)]
mod mask_tests {
    use test_case::test_case;

    use super::*;
    use crate::common::error::QRError;
    use crate::common::grid::{Module, SymbolGrid};

    fn grid_from(rows: &[&[u8]]) -> SymbolGrid {
        let mut grid = SymbolGrid::new(rows[0].len(), rows.len());
        for (y, row) in rows.iter().enumerate() {
            for (x, &cell) in row.iter().enumerate() {
                grid.set(x, y, if cell == 1 { Module::Dark } else { Module::Light });
            }
        }
        grid
    }

    #[test]
    fn test_mask_pattern_bounds() {
        assert!(MaskPattern::new(0).is_ok());
        assert!(MaskPattern::new(7).is_ok());
        assert_eq!(MaskPattern::new(8), Err(QRError::InvalidMaskingPattern));
    }

    #[test_case(0, &[(0, 0, true), (1, 0, false), (1, 1, true), (2, 1, false)])]
    #[test_case(1, &[(0, 0, true), (5, 0, true), (0, 1, false), (3, 2, true)])]
    #[test_case(2, &[(0, 0, true), (1, 0, false), (3, 4, true), (2, 4, false)])]
    #[test_case(3, &[(0, 0, true), (1, 0, false), (2, 1, true), (1, 2, true)])]
    #[test_case(4, &[(0, 0, true), (2, 0, true), (3, 0, false), (0, 2, false)])]
    #[test_case(5, &[(0, 0, true), (1, 0, true), (1, 1, false), (3, 2, true)])]
    #[test_case(6, &[(0, 0, true), (1, 1, true), (2, 1, true), (3, 1, false)])]
    #[test_case(7, &[(0, 0, true), (1, 0, false), (3, 1, true), (2, 1, false)])]
    fn test_mask_functions(pattern: u8, expectations: &[(usize, usize, bool)]) {
        let f = MaskPattern::new(pattern).unwrap().mask_function();
        for &(x, y, expected) in expectations {
            assert_eq!(f(x, y), expected, "pattern {pattern} at ({x}, {y})");
        }
    }

    #[test]
    fn test_adjacent_run_penalty() {
        // A row of 5 equal cells scores 3, one of 6 scores 4
        let grid = grid_from(&[&[1, 1, 1, 1, 1, 0]]);
        assert_eq!(adjacent_run_penalty(&grid), 3);
        let grid = grid_from(&[&[1, 1, 1, 1, 1, 1]]);
        assert_eq!(adjacent_run_penalty(&grid), 4);
        let grid = grid_from(&[&[1, 0, 1, 0, 1, 0]]);
        assert_eq!(adjacent_run_penalty(&grid), 0);
    }

    #[test]
    fn test_adjacent_run_penalty_vertical() {
        let grid = grid_from(&[&[1, 0], &[1, 1], &[1, 0], &[1, 1], &[1, 0]]);
        assert_eq!(adjacent_run_penalty(&grid), 3);
    }

    #[test]
    fn test_block_penalty() {
        let grid = grid_from(&[&[1, 1], &[1, 1]]);
        assert_eq!(block_penalty(&grid), 3);
        // 3x3 of one value has four overlapping 2x2 blocks
        let grid = grid_from(&[&[0, 0, 0], &[0, 0, 0], &[0, 0, 0]]);
        assert_eq!(block_penalty(&grid), 12);
        let grid = grid_from(&[&[1, 0], &[0, 1]]);
        assert_eq!(block_penalty(&grid), 0);
    }

    #[test]
    fn test_finder_like_penalty() {
        // 1011101 followed by four light cells
        let grid = grid_from(&[&[1, 0, 1, 1, 1, 0, 1, 0, 0, 0, 0]]);
        assert_eq!(finder_like_penalty(&grid), 40);
        // No light flank on either side
        let grid = grid_from(&[&[1, 0, 1, 1, 1, 0, 1]]);
        assert_eq!(finder_like_penalty(&grid), 0);
        // Vertical occurrence with a leading light flank
        let grid = grid_from(&[
            &[0], &[0], &[0], &[0], &[1], &[0], &[1], &[1], &[1], &[0], &[1],
        ]);
        assert_eq!(finder_like_penalty(&grid), 40);
    }

    #[test]
    fn test_balance_penalty() {
        let grid = grid_from(&[&[1, 1], &[1, 1]]);
        assert_eq!(balance_penalty(&grid), 100);
        let grid = grid_from(&[&[1, 1], &[0, 0]]);
        assert_eq!(balance_penalty(&grid), 0);
        // 5 dark of 6: |10 - 6| * 10 / 6 = 6 -> 60
        let grid = grid_from(&[&[1, 1, 1], &[1, 1, 0]]);
        assert_eq!(balance_penalty(&grid), 60);
    }

    #[test]
    fn test_choose_best_pattern_ties_to_lowest() {
        // Identical candidates for every pattern leave pattern 0 in place
        let best = choose_best_pattern(|_| grid_from(&[&[1, 0], &[0, 1]]));
        assert_eq!(*best, 0);
    }
}
