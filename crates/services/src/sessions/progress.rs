/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub answered: usize,
    pub total: usize,
    pub correct: u32,
    pub incorrect: u32,
    pub is_complete: bool,
}
