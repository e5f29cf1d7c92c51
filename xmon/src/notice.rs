use std::collections::VecDeque;
use std::fmt;

/// How many notices are kept around for display
pub const MAX_NOTICES_LOGGED: usize = 50;

/// A message for the user. The monitor doesn't print anything itself;
/// the frontend decides how (and whether) notices are shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A command line as it was entered (or replayed from the startup script)
    Echo(String),
    Info(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Echo(text) | Notice::Info(text) | Notice::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Echo(line) => write!(f, "> {}", line),
            Notice::Info(text) => f.write_str(text),
            Notice::Error(text) => write!(f, "ERR: {}", text),
        }
    }
}

/// Ring buffer of the most recent notices
pub struct NoticeLog(VecDeque<Notice>);

impl NoticeLog {
    pub fn new() -> Self {
        Self(VecDeque::with_capacity(MAX_NOTICES_LOGGED))
    }

    pub fn push(&mut self, notice: Notice) {
        if self.0.len() == MAX_NOTICES_LOGGED {
            self.0.pop_front();
        }
        self.0.push_back(notice)
    }

    pub fn info<S: Into<String>>(&mut self, text: S) {
        self.push(Notice::Info(text.into()));
    }

    pub fn error<S: Into<String>>(&mut self, text: S) {
        self.push(Notice::Error(text.into()));
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Notice> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Removes and returns everything logged so far, oldest first
    pub fn drain(&mut self) -> impl Iterator<Item = Notice> + '_ {
        self.0.drain(..)
    }
}

impl Default for NoticeLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_notices_are_dropped() {
        let mut log = NoticeLog::new();
        for i in 0..MAX_NOTICES_LOGGED + 5 {
            log.info(format!("{}", i));
        }

        assert_eq!(log.len(), MAX_NOTICES_LOGGED);
        assert_eq!(log.iter().next().map(Notice::text), Some("5"));
    }

    #[test]
    fn drain_empties_the_log() {
        let mut log = NoticeLog::new();
        log.error("unknown command");
        log.push(Notice::Echo("bp 810d".to_owned()));

        let drained: Vec<_> = log.drain().collect();
        assert_eq!(drained.len(), 2);
        assert!(drained[0].is_error());
        assert_eq!(drained[0].to_string(), "ERR: unknown command");
        assert_eq!(drained[1].to_string(), "> bp 810d");
        assert!(log.is_empty());
    }
}
