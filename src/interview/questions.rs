use serde::Serialize;

/// Where the user stands in an interview.
///
/// `position` counts questions already resolved, whether answered or
/// skipped. It starts from the backend's answered count so a resumed
/// interview picks up the right label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub position: u32,
    pub total: Option<u32>,
}

impl Progress {
    pub fn new(answered: u32, total: Option<u32>) -> Self {
        Self {
            position: answered,
            total,
        }
    }

    pub fn advance(&mut self) {
        self.position += 1;
    }

    /// True once every question has been answered or skipped. Unknown totals
    /// leave the decision to the backend.
    pub fn is_exhausted(&self) -> bool {
        matches!(self.total, Some(total) if self.position >= total)
    }

    pub fn label(&self) -> String {
        match self.total {
            Some(total) => format!("Question {} of {}", self.position + 1, total),
            None => format!("Question {}", self.position + 1),
        }
    }

    /// Completed fraction in `0.0..=1.0`.
    pub fn ratio(&self) -> f64 {
        match self.total {
            Some(total) if total > 0 => (f64::from(self.position) / f64::from(total)).min(1.0),
            _ => 0.0,
        }
    }
}
