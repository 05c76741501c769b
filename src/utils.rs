use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const DEFAULT_LIMIT: u32 = 100;

/// Paging parameters shared by every list endpoint, e.g. `?limit=10&offset=20`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u64,
}

impl Page {
    pub fn is_empty(&self) -> bool {
        self.limit == 0
    }

    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .cloned()
            .collect()
    }
}

impl Default for Page {
    fn default() -> Page {
        Page {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

/// Trims surrounding whitespace, rejecting values left empty.
pub fn require_non_blank(field: &'static str, value: String) -> Result<String, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidField {
            field,
            reason: "must not be empty",
        });
    }

    Ok(trimmed.to_string())
}
