//! Inclusive ranges of (year, month) pairs.
use crate::error::Error;

/// Inclusive range of months, iterated in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    start: (i32, u32),
    end: (i32, u32),
}

impl MonthRange {
    /// Errors if a month is not in `1..=12` or if the range is empty.
    pub fn new(start_year: i32, start_month: u32, end_year: i32, end_month: u32) -> Result<Self, Error> {
        for month in [start_month, end_month] {
            if !(1..=12).contains(&month) {
                return Err(Error::Custom(format!("invalid month: {month}")));
            }
        }
        if (start_year, start_month) > (end_year, end_month) {
            return Err(Error::Custom(format!(
                "empty month range: {start_year}-{start_month:02} is after {end_year}-{end_month:02}"
            )));
        }
        Ok(Self {
            start: (start_year, start_month),
            end: (end_year, end_month),
        })
    }

    /// A range of a single month.
    pub fn single(year: i32, month: u32) -> Result<Self, Error> {
        Self::new(year, month, year, month)
    }

    pub fn start(&self) -> (i32, u32) {
        self.start
    }

    pub fn end(&self) -> (i32, u32) {
        self.end
    }

    pub fn iter(&self) -> Months {
        Months {
            next: Some(self.start),
            end: self.end,
        }
    }
}

impl IntoIterator for MonthRange {
    type Item = (i32, u32);
    type IntoIter = Months;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [MonthRange].
#[derive(Debug, Clone)]
pub struct Months {
    next: Option<(i32, u32)>,
    end: (i32, u32),
}

impl Iterator for Months {
    type Item = (i32, u32);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = if current >= self.end {
            None
        } else if current.1 == 12 {
            Some((current.0 + 1, 1))
        } else {
            Some((current.0, current.1 + 1))
        };
        Some(current)
    }
}
