// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{fmt, marker::PhantomData};

use colored::{Color, Colorize};
use unicode_width::UnicodeWidthStr;

pub struct Table<'a, T, C: Column<T>> {
    pub columns: &'a [C],
    pub separator: &'a str,
    pub padding: bool,
    pub data: &'a [T],
}

impl<'a, T, C: Column<T>> Table<'a, T, C> {
    pub fn new(columns: &'a [C], data: &'a [T]) -> Self {
        Self {
            columns,
            separator: " ",
            padding: true,
            data,
        }
    }

    fn compute_columns(&self, table: &[Vec<String>]) -> Vec<ColumnStylizer<'a, T, C>> {
        let max_lengths = self.padding.then(|| get_column_max_width(table));

        let mut columns = Vec::with_capacity(self.columns.len());
        for (i, col) in self.columns.iter().enumerate() {
            let padding_direction = col.padding_direction();

            // last column does not need padding if it's left-aligned
            let is_last_left =
                i == self.columns.len() - 1 && padding_direction == PaddingDirection::Left;
            let padding = match &max_lengths {
                Some(m) if !is_last_left => Some((m[i], padding_direction)),
                _ => None,
            };

            columns.push(ColumnStylizer {
                config: col,
                padding,
                _marker: PhantomData,
            });
        }
        columns
    }
}

impl<T, C: Column<T>> fmt::Display for Table<'_, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table: Vec<Vec<String>> = self
            .data
            .iter()
            .map(|item| self.columns.iter().map(|col| col.format(item)).collect())
            .collect();

        let columns = self.compute_columns(&table);
        for (i, (cells, item)) in table.into_iter().zip(self.data).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, (col, cell)) in columns.iter().zip(cells).enumerate() {
                if j > 0 {
                    write!(f, "{}", self.separator)?;
                }
                write!(f, "{}", col.stylize_cell(item, cell))?;
            }
        }
        Ok(())
    }
}

pub trait Column<T> {
    fn format(&self, data: &T) -> String;

    fn padding_direction(&self) -> PaddingDirection {
        PaddingDirection::Left
    }

    fn get_color(&self, _data: &T) -> Option<Color> {
        None
    }
}

struct ColumnStylizer<'a, T, C: Column<T>> {
    config: &'a C,
    /// padding width and direction
    padding: Option<(usize, PaddingDirection)>,
    _marker: PhantomData<T>,
}

impl<T, C: Column<T>> ColumnStylizer<'_, T, C> {
    fn stylize_cell(&self, data: &T, cell: String) -> String {
        let cell = match self.padding {
            Some((width, direction)) => pad(cell, width, direction),
            None => cell,
        };

        match self.config.get_color(data) {
            Some(color) => cell.color(color).to_string(),
            None => cell,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingDirection {
    Left,
    Right,
}

// `format!` pads by chars, which misaligns wide characters such as CJK names
fn pad(cell: String, width: usize, direction: PaddingDirection) -> String {
    let fill = " ".repeat(width.saturating_sub(cell.width()));
    match direction {
        PaddingDirection::Left => cell + &fill,
        PaddingDirection::Right => fill + &cell,
    }
}

fn get_column_max_width(table: &[Vec<String>]) -> Vec<usize> {
    let mut max_width = vec![0; table.first().map_or(0, Vec::len)];
    for row in table {
        for (i, cell) in row.iter().enumerate() {
            max_width[i] = max_width[i].max(cell.width());
        }
    }
    max_width
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nth(usize, PaddingDirection);

    impl Column<Vec<&str>> for Nth {
        fn format(&self, data: &Vec<&str>) -> String {
            data[self.0].to_string()
        }

        fn padding_direction(&self) -> PaddingDirection {
            self.1
        }
    }

    #[test]
    fn test_table_pads_columns() {
        let columns = [
            Nth(0, PaddingDirection::Left),
            Nth(1, PaddingDirection::Right),
            Nth(2, PaddingDirection::Left),
        ];
        let data = vec![vec!["a", "1", "x"], vec!["bbb", "22", "yy"]];
        let table = Table::new(&columns, &data);
        assert_eq!(table.to_string(), "a    1 x\nbbb 22 yy");
    }

    #[test]
    fn test_table_pads_wide_characters() {
        let columns = [Nth(0, PaddingDirection::Left), Nth(1, PaddingDirection::Left)];
        let data = vec![vec!["太郎", "a"], vec!["Bob", "b"]];
        let table = Table::new(&columns, &data);
        assert_eq!(table.to_string(), "太郎 a\nBob  b");
    }

    #[test]
    fn test_table_empty() {
        let columns = [Nth(0, PaddingDirection::Left)];
        let data: Vec<Vec<&str>> = vec![];
        assert_eq!(Table::new(&columns, &data).to_string(), "");
    }
}
