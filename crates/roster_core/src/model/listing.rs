//! Sort and paging primitives shared by store listings.

use std::fmt::{Display, Formatter};

/// Fixed number of students per page.
pub const STUDENT_PAGE_SIZE: u32 = 10;

/// Name ordering applied by sorted listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Returns the opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Stable text form, also used when persisting into session state.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    /// Parses the stable text form. Anything else is unrecognized.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Ascending),
            "desc" => Some(Self::Descending),
            _ => None,
        }
    }

    pub(crate) fn sql_keyword(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

impl Display for SortDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Zero-based page of a student listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageRequest {
    index: u32,
}

impl PageRequest {
    /// First page.
    pub fn first() -> Self {
        Self::default()
    }

    /// Normalizes an external 1-based page number.
    ///
    /// Absent, zero and negative values map to the first page.
    pub fn from_one_based(page: Option<i64>) -> Self {
        let index = match page {
            Some(value) if value > 1 => u32::try_from(value - 1).unwrap_or(u32::MAX),
            _ => 0,
        };
        Self { index }
    }

    /// Zero-based page index.
    pub fn index(self) -> u32 {
        self.index
    }

    pub fn limit(self) -> u32 {
        STUDENT_PAGE_SIZE
    }

    /// Row offset of the first item on this page.
    pub fn offset(self) -> u64 {
        u64::from(self.index) * u64::from(STUDENT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::{PageRequest, SortDirection};

    #[test]
    fn page_normalization_maps_non_positive_and_absent_to_first_page() {
        assert_eq!(PageRequest::from_one_based(None), PageRequest::first());
        assert_eq!(PageRequest::from_one_based(Some(0)), PageRequest::first());
        assert_eq!(PageRequest::from_one_based(Some(-3)), PageRequest::first());
        assert_eq!(PageRequest::from_one_based(Some(1)), PageRequest::first());
    }

    #[test]
    fn page_offset_uses_fixed_page_size() {
        let second = PageRequest::from_one_based(Some(2));
        assert_eq!(second.index(), 1);
        assert_eq!(second.offset(), 10);
        assert_eq!(second.limit(), 10);
    }

    #[test]
    fn sort_direction_text_form_roundtrips_and_rejects_unknown() {
        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            assert_eq!(SortDirection::parse(direction.as_str()), Some(direction));
        }
        assert_eq!(SortDirection::parse("ASC"), None);
        assert_eq!(SortDirection::Ascending.toggled(), SortDirection::Descending);
    }
}
