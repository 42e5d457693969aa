//! Supported online judges.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An online judge the archiver can pull accepted submissions from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Platform {
    LeetCode,
    Codeforces,
    AtCoder,
}

impl Platform {
    /// All supported platforms, in pipeline processing order.
    pub const ALL: [Platform; 3] = [Platform::LeetCode, Platform::Codeforces, Platform::AtCoder];

    /// Lowercase slug used as the destination folder for rendered records.
    pub fn slug(&self) -> &'static str {
        match self {
            Platform::LeetCode => "leetcode",
            Platform::Codeforces => "codeforces",
            Platform::AtCoder => "atcoder",
        }
    }

    /// Display name used as the archive index section heading.
    pub fn section_name(&self) -> &'static str {
        match self {
            Platform::LeetCode => "LeetCode",
            Platform::Codeforces => "Codeforces",
            Platform::AtCoder => "AtCoder",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_and_section() {
        assert_eq!(Platform::LeetCode.slug(), "leetcode");
        assert_eq!(Platform::Codeforces.section_name(), "Codeforces");
        assert_eq!(Platform::AtCoder.to_string(), "AtCoder");
    }
}
