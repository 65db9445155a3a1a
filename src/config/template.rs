use std::fmt;

use crate::foundation::error::{ReelError, ReelResult};

const DEFAULT_PAD_WIDTH: usize = 5;

/// Frame path template with exactly one frame-number placeholder.
///
/// `{i}` renders the 1-based frame number zero-padded to 5 digits; `{i:N}` pads to `N`
/// digits instead. Frame indices are 0-based everywhere else in the crate, so
/// `render(0)` of `"hero/{i}.webp"` is `"hero/00001.webp"`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathTemplate {
    raw: String,
    prefix: String,
    suffix: String,
    width: usize,
}

impl PathTemplate {
    pub fn parse(raw: &str) -> ReelResult<Self> {
        let Some(open) = raw.find("{i") else {
            return Err(ReelError::config(format!(
                "frame path template '{raw}' has no {{i}} placeholder"
            )));
        };
        let rest = &raw[open..];
        let close = rest.find('}').ok_or_else(|| {
            ReelError::config(format!("frame path template '{raw}' has an unclosed placeholder"))
        })?;
        let fmt = &rest[2..close];
        let width = if fmt.is_empty() {
            DEFAULT_PAD_WIDTH
        } else {
            let digits = fmt.strip_prefix(':').ok_or_else(|| {
                ReelError::config(format!("malformed placeholder in '{raw}'"))
            })?;
            digits.parse::<usize>().map_err(|_| {
                ReelError::config(format!("placeholder width in '{raw}' must be an integer"))
            })?
        };
        if width == 0 || width > 12 {
            return Err(ReelError::config(format!(
                "placeholder width in '{raw}' must be within 1..=12"
            )));
        }

        let prefix = raw[..open].to_string();
        let suffix = rest[close + 1..].to_string();
        if suffix.contains("{i") || prefix.contains('{') || suffix.contains('{') {
            return Err(ReelError::config(format!(
                "frame path template '{raw}' must contain exactly one placeholder"
            )));
        }

        Ok(Self {
            raw: raw.to_string(),
            prefix,
            suffix,
            width,
        })
    }

    /// Path for 0-based frame `index`.
    pub fn render(&self, index: u32) -> String {
        let n = u64::from(index) + 1;
        format!("{}{:0width$}{}", self.prefix, n, self.suffix, width = self.width)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for PathTemplate {
    type Error = ReelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PathTemplate> for String {
    fn from(t: PathTemplate) -> Self {
        t.raw
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/template.rs"]
mod tests;
