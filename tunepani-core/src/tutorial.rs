//! # First-Run Tutorial
//!
//! A short walkthrough shown the first time the application starts. Finishing
//! it leaves a marker file next to the saved configurations so it is not
//! shown again.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Marker file name, placed in the directory of the configuration store.
const MARKER_FILE: &str = "tunepani_tutorial_shown";

pub const TUTORIAL_STEPS: [&str; 9] = [
    "Welcome to Tunepani! This app helps you tune your timpani drums.",
    "Drum Management: Click the '+' button to add drum pads. Drag them anywhere to reposition, or drag them onto the trash zone to delete.",
    "Reference Pitch: Click a drum pad to toggle a synthesized reference pitch for that drum.",
    "Changing the Pitch: Right-click a drum pad to pick a note from C5 to C1 for that drum.",
    "Pitch Detection: The app listens via your microphone and shows a gauge indicating whether your note is flat or sharp.",
    "Volume Control: Use the volume slider to adjust the output level of the reference pitch.",
    "Saving & Loading: In the sidebar, save your drum configuration, load saved pieces, rename them, or save over them.",
    "Dark Mode: Toggle Dark Mode in the settings at the bottom of the sidebar to switch themes.",
    "You're all set! Enjoy using Tunepani!",
];

/// Position in the walkthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tutorial {
    step: usize,
}

impl Tutorial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn text(&self) -> &'static str {
        TUTORIAL_STEPS[self.step]
    }

    pub fn is_first(&self) -> bool {
        self.step == 0
    }

    pub fn is_last(&self) -> bool {
        self.step == TUTORIAL_STEPS.len() - 1
    }

    /// Advances one step. Returns `true` when the last step was already
    /// showing, i.e. the walkthrough is finished.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return true;
        }
        self.step += 1;
        false
    }

    /// Goes back one step; stays on the first step.
    pub fn back(&mut self) {
        self.step = self.step.saturating_sub(1);
    }
}

/// Records whether the tutorial has been completed.
#[derive(Debug, Clone)]
pub struct TutorialMarker {
    path: PathBuf,
}

impl TutorialMarker {
    /// The marker living next to the configuration store at `storage_path`.
    pub fn beside(storage_path: &Path) -> Self {
        Self { path: storage_path.with_file_name(MARKER_FILE) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_set(&self) -> bool {
        self.path.exists()
    }

    pub fn set(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, "true")?;
        log::debug!("[TUTORIAL] Marked as shown at {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_transitions() {
        let mut tutorial = Tutorial::new();
        assert!(tutorial.is_first());
        tutorial.back();
        assert_eq!(tutorial.step(), 0);

        for expected in 1..TUTORIAL_STEPS.len() {
            assert!(!tutorial.next());
            assert_eq!(tutorial.step(), expected);
        }
        assert!(tutorial.is_last());
        assert_eq!(tutorial.text(), "You're all set! Enjoy using Tunepani!");

        tutorial.back();
        assert_eq!(tutorial.step(), TUTORIAL_STEPS.len() - 2);
        assert!(!tutorial.next());
        assert!(tutorial.next());
        assert_eq!(tutorial.step(), TUTORIAL_STEPS.len() - 1);
    }

    #[test]
    fn test_marker_sits_beside_store() {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().join("pieces").join("configs.json");
        let marker = TutorialMarker::beside(&storage);
        assert_eq!(marker.path(), dir.path().join("pieces").join(MARKER_FILE));

        assert!(!marker.is_set());
        marker.set().unwrap();
        assert!(marker.is_set());
        assert!(TutorialMarker::beside(&storage).is_set());
    }
}
