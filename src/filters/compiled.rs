use camino::Utf8Path;
use regex::{Regex, RegexBuilder};
use thiserror::Error;

use crate::models::{FileFilterType, TextFilter};

/// Longest dot-separated segment still treated as an extension.
const MAX_EXTENSION_LEN: usize = 8;

/// Errors raised while compiling a single text filter.
///
/// Derivation never propagates these: the offending filter is compiled to a
/// rejecting matcher instead.
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("unsupported regex flag {0:?}")]
    UnsupportedFlag(char),

    #[error("duplicate regex flag {0:?}")]
    DuplicateFlag(char),

    #[error("unknown filter type {0}")]
    UnknownType(u8),
}

/// JavaScript-style regex flags mapped onto the `regex` crate's builder options.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct RegexFlags {
    ignore_case: bool,
    multi_line: bool,
    dot_all: bool,
    sticky: bool,
}

impl RegexFlags {
    /// Parse a flag string such as `"gi"`.
    ///
    /// `g`, `u`, `v` and `d` change nothing for a single boolean test and are
    /// accepted without effect.
    fn parse(flags: &str) -> Result<Self, FilterError> {
        let mut parsed = Self::default();
        let mut seen = String::new();
        for flag in flags.chars().filter(|c| !c.is_whitespace()) {
            if seen.contains(flag) {
                return Err(FilterError::DuplicateFlag(flag));
            }
            seen.push(flag);
            match flag {
                'i' => parsed.ignore_case = true,
                'm' => parsed.multi_line = true,
                's' => parsed.dot_all = true,
                'y' => parsed.sticky = true,
                'g' | 'u' | 'v' | 'd' => {}
                other => return Err(FilterError::UnsupportedFlag(other)),
            }
        }
        Ok(parsed)
    }
}

#[derive(Debug, Clone)]
enum Matcher {
    Includes { needle: String, ignore_case: bool },
    Excludes { needle: String, ignore_case: bool },
    Pattern { regex: Regex, expect_match: bool },
    DoubleExtsBlocker,
    /// Fail-closed stand-in for a filter that could not be compiled.
    Reject,
}

/// A text filter parsed once and applied to many paths.
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    matcher: Matcher,
    reversed: bool,
}

impl CompiledFilter {
    /// Compile `filter`, parsing its pattern and flags.
    pub fn compile(filter: &TextFilter) -> Result<Self, FilterError> {
        let flags = RegexFlags::parse(&filter.flags)?;
        let matcher = match filter.filter_type {
            FileFilterType::Includes => Matcher::Includes {
                needle: fold_case(&filter.content, flags.ignore_case),
                ignore_case: flags.ignore_case,
            },
            FileFilterType::Excludes => Matcher::Excludes {
                needle: fold_case(&filter.content, flags.ignore_case),
                ignore_case: flags.ignore_case,
            },
            FileFilterType::RegexMatch => Matcher::Pattern {
                regex: build_regex(&filter.content, flags)?,
                expect_match: true,
            },
            FileFilterType::RegexNonMatch => Matcher::Pattern {
                regex: build_regex(&filter.content, flags)?,
                expect_match: false,
            },
            FileFilterType::DoubleExtsBlocker => Matcher::DoubleExtsBlocker,
            FileFilterType::Unknown(code) => return Err(FilterError::UnknownType(code)),
        };

        Ok(Self {
            matcher,
            reversed: filter.is_reversed,
        })
    }

    /// Compile `filter`, falling back to a filter that matches nothing.
    pub fn compile_or_reject(filter: &TextFilter) -> Self {
        Self::compile(filter).unwrap_or_else(|e| {
            tracing::warn!(
                "Source filter {:?} ({:?}) is invalid and will reject every file: {}",
                filter.content,
                filter.filter_type,
                e
            );
            Self::reject()
        })
    }

    /// The built-in double extension blocker.
    pub fn double_exts_blocker() -> Self {
        Self {
            matcher: Matcher::DoubleExtsBlocker,
            reversed: false,
        }
    }

    fn reject() -> Self {
        Self {
            matcher: Matcher::Reject,
            reversed: false,
        }
    }

    /// Whether the filter rejects everything because it failed to compile.
    pub fn is_rejecting(&self) -> bool {
        matches!(self.matcher, Matcher::Reject)
    }

    /// Test a vault path against this filter.
    ///
    /// `is_reversed` inverts the outcome of the type-specific test. A rejecting
    /// filter returns `false` whether or not it is reversed.
    pub fn matches(&self, path: &Utf8Path) -> bool {
        let outcome = match &self.matcher {
            Matcher::Includes {
                needle,
                ignore_case,
            } => fold_case(path.as_str(), *ignore_case).contains(needle.as_str()),
            Matcher::Excludes {
                needle,
                ignore_case,
            } => !fold_case(path.as_str(), *ignore_case).contains(needle.as_str()),
            Matcher::Pattern {
                regex,
                expect_match,
            } => regex.is_match(path.as_str()) == *expect_match,
            Matcher::DoubleExtsBlocker => {
                !has_double_extension(path.file_name().unwrap_or_default())
            }
            Matcher::Reject => return false,
        };
        outcome != self.reversed
    }
}

fn fold_case(text: &str, ignore_case: bool) -> String {
    if ignore_case {
        text.to_lowercase()
    } else {
        text.to_string()
    }
}

fn build_regex(pattern: &str, flags: RegexFlags) -> Result<Regex, FilterError> {
    // Sticky matching from index 0 is a match anchored at the start of input.
    let source = if flags.sticky {
        format!(r"\A(?:{pattern})")
    } else {
        pattern.to_string()
    };

    RegexBuilder::new(&source)
        .case_insensitive(flags.ignore_case)
        .multi_line(flags.multi_line)
        .dot_matches_new_line(flags.dot_all)
        .build()
        .map_err(|source| FilterError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

fn is_extension_like(segment: &str) -> bool {
    (1..=MAX_EXTENSION_LEN).contains(&segment.len())
        && segment.chars().all(|c| c.is_ascii_alphanumeric())
        && segment.chars().any(|c| c.is_ascii_alphabetic())
}

/// True when a file name carries more than one extension-like suffix,
/// e.g. `photo.png.export.png`.
pub fn has_double_extension(file_name: &str) -> bool {
    let name = file_name.trim_start_matches('.');
    name.split('.')
        .skip(1)
        .filter(|segment| is_extension_like(segment))
        .count()
        > 1
}
