use std::fmt;
use std::str::FromStr;

/// Severity vocabulary accepted by the formatter.
///
/// These are the eight standard syslog-style levels. The numeric values
/// follow the host logging framework and are only used as a presence
/// signal on [`RawEvent`](crate::record::RawEvent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

impl Level {
    pub const ALL: [Level; 8] = [
        Level::Debug,
        Level::Info,
        Level::Notice,
        Level::Warning,
        Level::Error,
        Level::Critical,
        Level::Alert,
        Level::Emergency,
    ];

    /// Lowercase name written into the `l` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Notice => "notice",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::Critical => "critical",
            Level::Alert => "alert",
            Level::Emergency => "emergency",
        }
    }

    pub fn number(self) -> u16 {
        match self {
            Level::Debug => 100,
            Level::Info => 200,
            Level::Notice => 250,
            Level::Warning => 300,
            Level::Error => 400,
            Level::Critical => 500,
            Level::Alert => 550,
            Level::Emergency => 600,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a severity name is not part of the vocabulary.
///
/// Carries the name exactly as supplied, case preserved.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("undefined level name: {0:?}")]
pub struct UnknownLevel(pub String);

impl FromStr for Level {
    type Err = UnknownLevel;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownLevel(name.to_string()))
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        if level == tracing::Level::ERROR {
            Level::Error
        } else if level == tracing::Level::WARN {
            Level::Warning
        } else if level == tracing::Level::INFO {
            Level::Info
        } else {
            Level::Debug
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_in_any_case() {
        assert_eq!("INFO".parse::<Level>(), Ok(Level::Info));
        assert_eq!("Warning".parse::<Level>(), Ok(Level::Warning));
        assert_eq!("emergency".parse::<Level>(), Ok(Level::Emergency));
    }

    #[test]
    fn unknown_name_keeps_original_case() {
        let err = "ASDasd".parse::<Level>().unwrap_err();
        assert_eq!(err, UnknownLevel("ASDasd".to_string()));
    }

    #[test]
    fn short_aliases_are_not_levels() {
        assert!("warn".parse::<Level>().is_err());
        assert!("".parse::<Level>().is_err());
    }

    #[test]
    fn numbers_follow_severity() {
        let numbers: Vec<u16> = Level::ALL.into_iter().map(Level::number).collect();
        assert_eq!(numbers, vec![100, 200, 250, 300, 400, 500, 550, 600]);
    }

    #[test]
    fn tracing_levels_map_down() {
        assert_eq!(Level::from(tracing::Level::TRACE), Level::Debug);
        assert_eq!(Level::from(tracing::Level::WARN), Level::Warning);
        assert_eq!(Level::from(tracing::Level::ERROR), Level::Error);
    }
}
