//! Supported-format filtering by filename suffix.

/// Set of accepted filename extensions.
///
/// Matching is a literal `.<ext>` suffix check. With `case_sensitive` off,
/// both sides are compared ASCII-lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    suffixes: Vec<String>,
    case_sensitive: bool,
}

impl ExtensionFilter {
    /// Build a filter from extensions given with or without a leading dot.
    pub fn new<I, S>(extensions: I, case_sensitive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let suffixes = extensions
            .into_iter()
            .map(|e| e.as_ref().trim().trim_start_matches('.').to_string())
            .filter(|e| !e.is_empty())
            .map(|e| {
                let suffix = format!(".{e}");
                if case_sensitive {
                    suffix
                } else {
                    suffix.to_ascii_lowercase()
                }
            })
            .collect();

        Self {
            suffixes,
            case_sensitive,
        }
    }

    pub fn matches(&self, filename: &str) -> bool {
        if self.case_sensitive {
            self.suffixes.iter().any(|s| filename.ends_with(s.as_str()))
        } else {
            let lower = filename.to_ascii_lowercase();
            self.suffixes.iter().any(|s| lower.ends_with(s.as_str()))
        }
    }
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self::new(["mp3"], true)
    }
}
