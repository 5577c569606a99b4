use serde::{Deserialize, Serialize};

/// How a single image or trivia fetch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    Found,
    /// The source answered with its placeholder
    Placeholder,
    /// The source had nothing
    Empty,
    Failed,
    TimedOut,
}

impl FetchStatus {
    pub fn is_failure(self) -> bool {
        matches!(self, FetchStatus::Failed | FetchStatus::TimedOut)
    }
}

/// Outcome for one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
    pub image: Option<String>,
    pub image_status: FetchStatus,
    pub trivia: Option<String>,
    pub trivia_status: FetchStatus,
}

impl Enrichment {
    pub fn empty() -> Self {
        Self {
            image: None,
            image_status: FetchStatus::Empty,
            trivia: None,
            trivia_status: FetchStatus::Empty,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichSummary {
    pub nodes: usize,
    pub images_found: usize,
    pub placeholders: usize,
    pub image_failures: usize,
    pub trivia_found: usize,
    pub trivia_failures: usize,
    /// Tasks that panicked; their nodes are left as they were
    pub panicked: usize,
}

impl EnrichSummary {
    pub fn record(&mut self, enrichment: &Enrichment) {
        match enrichment.image_status {
            FetchStatus::Found => self.images_found += 1,
            FetchStatus::Placeholder => self.placeholders += 1,
            FetchStatus::Empty => {}
            FetchStatus::Failed | FetchStatus::TimedOut => {
                self.image_failures += 1;
                if enrichment.image.is_some() {
                    self.placeholders += 1;
                }
            }
        }
        match enrichment.trivia_status {
            FetchStatus::Found => self.trivia_found += 1,
            status if status.is_failure() => self.trivia_failures += 1,
            _ => {}
        }
    }
}
