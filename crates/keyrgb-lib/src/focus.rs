//! Focus state machine: testable app-classification logic decoupled from I/O.
//!
//! [`classify`] maps a process name to an [`AppCategory`], and
//! [`FocusTracker`] debounces successive probe readings so a theme is only
//! re-applied when the focused application actually changes.

use std::fmt;

use serde::Serialize;

use crate::lighting::LightingTheme;

/// Application family that decides the accent theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppCategory {
    Ide,
    Edge,
    Office,
    Other,
}

impl AppCategory {
    pub fn theme(self) -> LightingTheme {
        match self {
            AppCategory::Ide => LightingTheme::Orange,
            AppCategory::Edge => LightingTheme::DarkBlue,
            AppCategory::Office => LightingTheme::Green,
            AppCategory::Other => LightingTheme::Purple,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AppCategory::Ide => "Developer IDE",
            AppCategory::Edge => "Microsoft Edge",
            AppCategory::Office => "Microsoft Office",
            AppCategory::Other => "Other",
        }
    }
}

impl fmt::Display for AppCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Substring rules, checked in order. The first rule with a matching
/// pattern decides the category.
const RULES: &[(AppCategory, &[&str])] = &[
    (
        AppCategory::Ide,
        &[
            "code", "phpstorm", "rider", "webstorm", "intellij", "pycharm", "clion", "datagrip",
            "goland", "rubymine",
        ],
    ),
    (AppCategory::Edge, &["msedge", "edge"]),
    (
        AppCategory::Office,
        &["winword", "word", "excel", "powerpoint", "outlook"],
    ),
];

/// Classify a process name (case-insensitive substring match).
///
/// Empty or unknown names are [`AppCategory::Other`].
pub fn classify(process_name: &str) -> AppCategory {
    let name = process_name.to_lowercase();
    if name.is_empty() {
        return AppCategory::Other;
    }
    RULES
        .iter()
        .find(|(_, patterns)| patterns.iter().any(|p| name.contains(p)))
        .map_or(AppCategory::Other, |&(category, _)| category)
}

/// A confirmed change of the focused application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FocusChange {
    pub process: String,
    pub category: AppCategory,
    pub theme: LightingTheme,
}

/// Result of feeding one probe reading to a [`FocusTracker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusAction {
    /// The probe returned nothing; the remembered process is kept.
    Unreadable,
    /// Same application as last time (compared case-insensitively).
    NoChange,
    Changed(FocusChange),
}

/// Remembers the last focused process and reports transitions.
#[derive(Debug, Default)]
pub struct FocusTracker {
    last_process: Option<String>,
}

impl FocusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, process_name: &str) -> FocusAction {
        let name = process_name.trim();
        if name.is_empty() {
            return FocusAction::Unreadable;
        }
        if self
            .last_process
            .as_deref()
            .is_some_and(|last| last.to_lowercase() == name.to_lowercase())
        {
            return FocusAction::NoChange;
        }

        self.last_process = Some(name.to_string());
        let category = classify(name);
        FocusAction::Changed(FocusChange {
            process: name.to_string(),
            category,
            theme: category.theme(),
        })
    }

    pub fn last_process(&self) -> Option<&str> {
        self.last_process.as_deref()
    }

    /// Forget the remembered process so the next reading counts as a change.
    pub fn reset(&mut self) {
        self.last_process = None;
    }
}
