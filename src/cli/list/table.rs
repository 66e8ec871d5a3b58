use std::fmt::{self, Write};

/// A minimal column-aligned text table: fixed header, two-space gutters,
/// rows padded to the widest cell in each column.
pub(crate) struct Table {
    header: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub(crate) fn new(header: Vec<&'static str>) -> Table {
        Table {
            header,
            rows: Vec::new(),
        }
    }

    pub(crate) fn add_row(&mut self, row: Vec<String>) {
        assert_eq!(
            row.len(),
            self.header.len(),
            "row width does not match the table header"
        );

        self.rows.push(row);
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.header.iter().map(|h| h.len()).collect();

        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.len());
            }
        }

        widths
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, widths: &[usize], cells: &[&str]) -> fmt::Result {
    for (i, cell) in cells.iter().enumerate() {
        if i != 0 {
            f.write_str("  ")?;
        }

        write!(f, "{:<width$}", cell, width = widths[i])?;
    }

    f.write_char('\n')
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.column_widths();

        write_row(f, &widths, &self.header)?;

        for row in &self.rows {
            let cells: Vec<&str> = row.iter().map(|s| s.as_str()).collect();

            write_row(f, &widths, &cells)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_columns_to_the_widest_cell() {
        let mut table = Table::new(vec!["MODEL", "SIZE"]);

        table.add_row(vec!["gemma:2b".to_string(), "1.7".to_string()]);
        table.add_row(vec!["x".to_string(), "42".to_string()]);

        let rendered = table.to_string();

        assert_eq!(rendered, "MODEL     SIZE\ngemma:2b  1.7 \nx         42  \n");
    }
}
