//! Drag session tracking.
//!
//! Raw ids coming from the UI are parsed exactly once: drag handles into a
//! [`DragSubject`] at drag start, drop zones into a [`DropTarget`] when they
//! are evaluated. The rest of the crate only sees the typed forms.

use crate::library::ExerciseLibrary;
use crate::placement::Highlight;
use crate::{locator, Microcycle, Phase};
use uuid::Uuid;

const LIBRARY_PREFIX: &str = "library-";
const TRAINING_DAY_PREFIX: &str = "training-day-";
const DAY_PREFIX: &str = "day-";

/// What is being dragged
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragSubject {
    /// An exercise from the library panel, not yet on the board
    LibraryExercise(String),
    /// An item already placed on a day
    ScheduledItem(Uuid),
    /// A whole training day
    Day(Uuid),
}

/// What the pointer is over
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropTarget {
    /// A phase list of a day
    Zone { day_id: Uuid, phase: Phase },
    /// A day header or column
    Day(Uuid),
    /// Another scheduled item
    Item(Uuid),
}

impl DropTarget {
    /// Parse a raw drop target id. Returns None for anything unrecognised.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();

        // Must precede the plain day prefix
        if let Some(rest) = raw.strip_prefix(TRAINING_DAY_PREFIX) {
            return Uuid::parse_str(rest).ok().map(DropTarget::Day);
        }
        if let Some(rest) = raw.strip_prefix(DAY_PREFIX) {
            return Uuid::parse_str(rest).ok().map(DropTarget::Day);
        }
        for phase in Phase::ALL {
            if let Some(rest) = raw
                .strip_prefix(phase.as_str())
                .and_then(|r| r.strip_prefix('-'))
            {
                return Uuid::parse_str(rest)
                    .ok()
                    .map(|day_id| DropTarget::Zone { day_id, phase });
            }
        }

        Uuid::parse_str(raw).ok().map(DropTarget::Item)
    }
}

/// Classify a raw drag handle against the current board.
///
/// The referenced exercise, item or day must exist; stale ids yield None.
pub fn classify_subject(
    raw: &str,
    mc: &Microcycle,
    library: &ExerciseLibrary,
) -> Option<DragSubject> {
    let raw = raw.trim();

    if let Some(rest) = raw.strip_prefix(TRAINING_DAY_PREFIX) {
        let day_id = Uuid::parse_str(rest).ok()?;
        return locator::find_day(mc, day_id)
            .ok()
            .map(|_| DragSubject::Day(day_id));
    }

    if let Some(exercise_id) = raw.strip_prefix(LIBRARY_PREFIX) {
        return library
            .get(exercise_id)
            .map(|ex| DragSubject::LibraryExercise(ex.id.clone()));
    }

    let item_id = Uuid::parse_str(raw).ok()?;
    locator::find_item(mc, item_id)
        .ok()
        .map(|_| DragSubject::ScheduledItem(item_id))
}

/// Drag handle for a library exercise
pub fn library_handle(exercise_id: &str) -> String {
    format!("{}{}", LIBRARY_PREFIX, exercise_id)
}

/// Drag handle for a whole day
pub fn day_handle(day_id: Uuid) -> String {
    format!("{}{}", TRAINING_DAY_PREFIX, day_id)
}

/// Drop marker for a day column
pub fn day_marker(day_id: Uuid) -> String {
    format!("{}{}", DAY_PREFIX, day_id)
}

/// Drop marker for one phase list of a day
pub fn zone_marker(day_id: Uuid, phase: Phase) -> String {
    format!("{}-{}", phase.as_str(), day_id)
}

/// Drag handle and drop target of a scheduled item
pub fn item_handle(item_id: Uuid) -> String {
    item_id.to_string()
}

// ============================================================================
// Session state machine
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSubject),
}

/// Tracks the gesture between drag start and drag end
#[derive(Clone, Debug, Default)]
pub struct DragSession {
    state: DragState,
    highlight: Option<Highlight>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn subject(&self) -> Option<&DragSubject> {
        match &self.state {
            DragState::Idle => None,
            DragState::Dragging(subject) => Some(subject),
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Enter `Dragging`, or stay Idle when classification failed
    pub fn begin(&mut self, subject: Option<DragSubject>) -> Option<&DragSubject> {
        if let DragState::Dragging(previous) = &self.state {
            tracing::debug!("Drag started without ending {:?}, replacing it", previous);
        }
        self.highlight = None;
        self.state = match subject {
            Some(subject) => DragState::Dragging(subject),
            None => DragState::Idle,
        };
        self.subject()
    }

    /// Last drag-over result, for the UI to render
    pub fn highlight(&self) -> Option<Highlight> {
        self.highlight
    }

    pub(crate) fn set_highlight(&mut self, highlight: Option<Highlight>) {
        self.highlight = highlight;
    }

    /// Leave `Dragging`, returning the subject that was held
    pub fn finish(&mut self) -> Option<DragSubject> {
        self.highlight = None;
        match std::mem::take(&mut self.state) {
            DragState::Idle => None,
            DragState::Dragging(subject) => Some(subject),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::build_default_library;
    use crate::test_support::*;

    #[test]
    fn test_parse_zone_markers() {
        let day = Uuid::new_v4();
        assert_eq!(
            DropTarget::parse(&zone_marker(day, Phase::Warmup)),
            Some(DropTarget::Zone {
                day_id: day,
                phase: Phase::Warmup
            })
        );
        assert_eq!(
            DropTarget::parse(&format!("cooldown-{}", day)),
            Some(DropTarget::Zone {
                day_id: day,
                phase: Phase::Cooldown
            })
        );
    }

    #[test]
    fn test_parse_day_markers() {
        let day = Uuid::new_v4();
        assert_eq!(DropTarget::parse(&day_marker(day)), Some(DropTarget::Day(day)));
        assert_eq!(DropTarget::parse(&day_handle(day)), Some(DropTarget::Day(day)));
    }

    #[test]
    fn test_parse_item_and_garbage() {
        let item = Uuid::new_v4();
        assert_eq!(
            DropTarget::parse(&item_handle(item)),
            Some(DropTarget::Item(item))
        );
        assert_eq!(DropTarget::parse("main-not-a-uuid"), None);
        assert_eq!(DropTarget::parse("sidebar"), None);
        assert_eq!(DropTarget::parse(""), None);
    }

    #[test]
    fn test_classify_subjects() {
        let (mc, ids) = sample_week();
        let library = build_default_library();

        assert_eq!(
            classify_subject(&library_handle("back_squat"), &mc, &library),
            Some(DragSubject::LibraryExercise("back_squat".into()))
        );
        assert_eq!(
            classify_subject(&day_handle(ids.day2), &mc, &library),
            Some(DragSubject::Day(ids.day2))
        );
        assert_eq!(
            classify_subject(&item_handle(ids.b), &mc, &library),
            Some(DragSubject::ScheduledItem(ids.b))
        );
    }

    #[test]
    fn test_classify_rejects_stale_ids() {
        let (mc, _) = sample_week();
        let library = build_default_library();

        assert_eq!(classify_subject("library-unicycle", &mc, &library), None);
        assert_eq!(
            classify_subject(&day_handle(Uuid::new_v4()), &mc, &library),
            None
        );
        assert_eq!(
            classify_subject(&item_handle(Uuid::new_v4()), &mc, &library),
            None
        );
    }

    #[test]
    fn test_session_transitions() {
        let mut session = DragSession::new();
        assert_eq!(session.state(), &DragState::Idle);

        session.begin(None);
        assert!(!session.is_dragging());

        let item = Uuid::new_v4();
        session.begin(Some(DragSubject::ScheduledItem(item)));
        assert_eq!(session.subject(), Some(&DragSubject::ScheduledItem(item)));

        assert_eq!(session.finish(), Some(DragSubject::ScheduledItem(item)));
        assert_eq!(session.state(), &DragState::Idle);
        assert_eq!(session.finish(), None);
    }

    #[test]
    fn test_begin_replaces_active_drag() {
        let mut session = DragSession::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        session.begin(Some(DragSubject::Day(first)));
        session.begin(Some(DragSubject::Day(second)));
        assert_eq!(session.subject(), Some(&DragSubject::Day(second)));
    }
}
