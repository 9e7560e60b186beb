use crate::error::{RosterError, RosterResult};
use serde::Deserialize;
use std::{fmt, str::FromStr};

/// The columns a student list may be ordered by. Anything else is refused, so raw
/// query parameters never reach the SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Id,
    Score,
    FirstName,
    LastName,
}

impl SortField {
    pub const ALL: [Self; 4] = [Self::Id, Self::Score, Self::FirstName, Self::LastName];

    pub const fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Score => "score",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
        }
    }
}

impl FromStr for SortField {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.column() == s)
            .ok_or_else(|| RosterError::InvalidSortField {
                field: s.to_string(),
            })
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Anything other than `desc` sorts ascending.
    pub fn parse_lenient(s: &str) -> Self {
        if s.eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StudentSort {
    pub field: SortField,
    pub order: SortOrder,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortQuery {
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

impl TryFrom<SortQuery> for StudentSort {
    type Error = RosterError;

    fn try_from(SortQuery { sort_by, order }: SortQuery) -> RosterResult<Self> {
        let field = match sort_by.as_deref() {
            None => SortField::default(),
            Some(s) => s.parse()?,
        };
        let order = order
            .as_deref()
            .map(SortOrder::parse_lenient)
            .unwrap_or_default();

        Ok(Self { field, order })
    }
}

impl StudentSort {
    /// The sort a column header should request when clicked: toggle the order on the
    /// active column, otherwise start ascending on the new one.
    #[must_use]
    pub fn clicked(self, field: SortField) -> Self {
        if self.field == field {
            Self {
                field,
                order: self.order.flipped(),
            }
        } else {
            Self {
                field,
                order: SortOrder::Asc,
            }
        }
    }

    pub fn query_string(self) -> String {
        format!("sortBy={}&order={}", self.field, self.order.as_param())
    }
}
