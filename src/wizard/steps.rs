//! Wizard steps and views.

use std::fmt;

/// One input-collection stage of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardStep {
    Description,
    Requirements,
    Inspiration,
    Integrations,
}

impl WizardStep {
    /// All steps in wizard order.
    pub const ALL: [Self; 4] =
        [Self::Description, Self::Requirements, Self::Inspiration, Self::Integrations];

    pub fn index(self) -> usize {
        match self {
            Self::Description => 0,
            Self::Requirements => 1,
            Self::Inspiration => 2,
            Self::Integrations => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The following step, `None` on the last one.
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// Short label for navigation pills.
    pub fn title(self) -> &'static str {
        match self {
            Self::Description => "Describe",
            Self::Requirements => "Requirements",
            Self::Inspiration => "Inspiration",
            Self::Integrations => "Integrations",
        }
    }

    /// Whether files can be uploaded on this step.
    pub fn accepts_uploads(self) -> bool {
        matches!(self, Self::Requirements | Self::Inspiration)
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// What the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// One of the input steps
    Step(WizardStep),
    /// The generated plan
    TaskBoard,
}

impl View {
    pub fn step(self) -> Option<WizardStep> {
        match self {
            Self::Step(step) => Some(step),
            Self::TaskBoard => None,
        }
    }
}

impl Default for View {
    fn default() -> Self {
        Self::Step(WizardStep::Description)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Step(step) => write!(f, "{step}"),
            Self::TaskBoard => f.write_str("Task board"),
        }
    }
}

/// Progress of the upload on a file step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadState {
    #[default]
    Idle,
    Uploading,
    Success,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_order() {
        assert_eq!(WizardStep::Description.next(), Some(WizardStep::Requirements));
        assert_eq!(WizardStep::Integrations.next(), None);
        assert_eq!(WizardStep::Description.previous(), None);
        assert_eq!(WizardStep::from_index(2), Some(WizardStep::Inspiration));
        assert_eq!(WizardStep::from_index(4), None);
    }

    #[test]
    fn test_upload_steps() {
        let uploads: Vec<_> =
            WizardStep::ALL.iter().filter(|s| s.accepts_uploads()).map(|s| s.index()).collect();
        assert_eq!(uploads, vec![1, 2]);
    }
}
