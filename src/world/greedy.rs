//! Greedy rectangle merging over a cell grid
//!
//! Shared by background wall meshing and collider generation: scan row-major,
//! grow each unmerged cell as wide as possible, then as tall as the full width
//! allows, and emit one rectangle per grown region.

/// A merged region in cell coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergedRect<K> {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    pub key: K,
}

/// Merge cells with equal keys into non-overlapping rectangles.
///
/// `key_at(x, y)` returns `None` for cells that take no part in merging. Cells only
/// merge with cells of the same key.
pub fn greedy_merge<K, F>(width: usize, height: usize, key_at: F) -> Vec<MergedRect<K>>
where
    K: Copy + PartialEq,
    F: Fn(usize, usize) -> Option<K>,
{
    let mut merged = vec![false; width * height];
    let mut rects = Vec::new();

    let open = |merged: &[bool], x: usize, y: usize, key: K| -> bool {
        !merged[y * width + x] && key_at(x, y) == Some(key)
    };

    for y in 0..height {
        for x in 0..width {
            if merged[y * width + x] {
                continue;
            }
            let Some(key) = key_at(x, y) else {
                continue;
            };

            let mut w = 1;
            while x + w < width && open(&merged, x + w, y, key) {
                w += 1;
            }

            let mut h = 1;
            while y + h < height && (x..x + w).all(|cx| open(&merged, cx, y + h, key)) {
                h += 1;
            }

            for cy in y..y + h {
                for cx in x..x + w {
                    merged[cy * width + cx] = true;
                }
            }

            rects.push(MergedRect {
                x,
                y,
                width: w,
                height: h,
                key,
            });
        }
    }

    rects
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_from(rows: &[&str]) -> (usize, usize, Vec<Option<char>>) {
        let height = rows.len();
        let width = rows[0].len();
        let mut cells = vec![None; width * height];
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                if c != '.' {
                    cells[y * width + x] = Some(c);
                }
            }
        }
        (width, height, cells)
    }

    fn assert_exact_cover(width: usize, height: usize, cells: &[Option<char>], rects: &[MergedRect<char>]) {
        let mut coverage = vec![0u32; width * height];
        for r in rects {
            for y in r.y..r.y + r.height {
                for x in r.x..r.x + r.width {
                    assert_eq!(cells[y * width + x], Some(r.key));
                    coverage[y * width + x] += 1;
                }
            }
        }
        for (i, cell) in cells.iter().enumerate() {
            let expected = if cell.is_some() { 1 } else { 0 };
            assert_eq!(coverage[i], expected, "cell {} covered {} times", i, coverage[i]);
        }
    }

    #[test]
    fn test_solid_square_is_one_rect() {
        let (w, h, cells) = grid_from(&[".....", ".###.", ".###.", ".###.", "....."]);
        let rects = greedy_merge(w, h, |x, y| cells[y * w + x]);
        assert_eq!(
            rects,
            vec![MergedRect {
                x: 1,
                y: 1,
                width: 3,
                height: 3,
                key: '#'
            }]
        );
    }

    #[test]
    fn test_keys_never_mix() {
        let (w, h, cells) = grid_from(&["##==", "##==", "=##="]);
        let rects = greedy_merge(w, h, |x, y| cells[y * w + x]);
        assert_exact_cover(w, h, &cells, &rects);
        assert!(rects.iter().any(|r| r.key == '=' && r.width == 2 && r.height == 2));
    }

    #[test]
    fn test_irregular_shape_exact_cover() {
        let (w, h, cells) = grid_from(&[
            "#..##.#", "##.####", "#######", "..#..#.", "####...",
        ]);
        let rects = greedy_merge(w, h, |x, y| cells[y * w + x]);
        assert_exact_cover(w, h, &cells, &rects);
    }

    #[test]
    fn test_empty_grid() {
        let rects = greedy_merge::<u8, _>(4, 4, |_, _| None);
        assert!(rects.is_empty());
        let rects = greedy_merge::<u8, _>(0, 0, |_, _| Some(1));
        assert!(rects.is_empty());
    }

    #[test]
    fn test_width_grows_before_height() {
        // An L shape: the top row is claimed whole, the stem below stays separate
        let (w, h, cells) = grid_from(&["###", "#..", "#.."]);
        let rects = greedy_merge(w, h, |x, y| cells[y * w + x]);
        assert_eq!(rects.len(), 2);
        assert_eq!((rects[0].width, rects[0].height), (3, 1));
        assert_eq!((rects[1].x, rects[1].y, rects[1].height), (0, 1, 2));
    }
}
