use statig::prelude::*;

use crate::types::SelectedFile;

/// Advisory filter offered to the platform file picker
pub const ACCEPT_HINT: &str = "image/*,application/pdf";

/// Pointer and picker interactions on the upload area
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    DragEnter,
    DragOver,
    DragLeave,
    Drop { files: Vec<SelectedFile> },
    PickerChange { files: Vec<SelectedFile> },
}

/// Upload area: hands the first file of each selection to a callback
///
/// Files are never rejected here. The drag-active flag only drives
/// highlighting.
pub struct UploadSurface {
    on_file_select: Box<dyn FnMut(SelectedFile) + Send>,
    drag_active: bool,
}

impl UploadSurface {
    pub fn new(on_file_select: impl FnMut(SelectedFile) + Send + 'static) -> Self {
        Self {
            on_file_select: Box::new(on_file_select),
            drag_active: false,
        }
    }

    pub fn accept_hint(&self) -> &'static str {
        ACCEPT_HINT
    }

    pub fn is_drag_active(&self) -> bool {
        self.drag_active
    }

    fn select_first(&mut self, files: &[SelectedFile]) {
        if let Some(file) = files.first() {
            tracing::debug!(file = %file.name, offered = files.len(), "File selected");
            (self.on_file_select)(file.clone());
        }
    }
}

#[state_machine(initial = "State::inactive()")]
impl UploadSurface {
    #[state]
    fn inactive(&mut self, event: &UploadEvent) -> Outcome<State> {
        match event {
            UploadEvent::DragEnter | UploadEvent::DragOver => {
                self.drag_active = true;
                Transition(State::active())
            }
            UploadEvent::Drop { files } | UploadEvent::PickerChange { files } => {
                self.select_first(files);
                Handled
            }
            UploadEvent::DragLeave => Handled,
        }
    }

    #[state]
    fn active(&mut self, event: &UploadEvent) -> Outcome<State> {
        match event {
            UploadEvent::DragEnter | UploadEvent::DragOver => Handled,
            UploadEvent::DragLeave => {
                self.drag_active = false;
                Transition(State::inactive())
            }
            UploadEvent::Drop { files } => {
                self.drag_active = false;
                self.select_first(files);
                Transition(State::inactive())
            }
            UploadEvent::PickerChange { files } => {
                self.select_first(files);
                Handled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording_surface() -> (UploadSurface, Arc<Mutex<Vec<String>>>) {
        let selected = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&selected);
        let surface = UploadSurface::new(move |file: SelectedFile| {
            sink.lock().unwrap().push(file.name);
        });
        (surface, selected)
    }

    fn file(name: &str) -> SelectedFile {
        SelectedFile::new(name, None, vec![1])
    }

    #[test]
    fn test_drop_selects_only_first_file() {
        let (surface, selected) = recording_surface();
        let mut sm = surface.state_machine();

        sm.handle(&UploadEvent::DragEnter);
        assert!(sm.inner().is_drag_active());

        sm.handle(&UploadEvent::Drop {
            files: vec![file("a.pdf"), file("b.pdf")],
        });
        assert!(!sm.inner().is_drag_active());
        assert_eq!(*selected.lock().unwrap(), vec!["a.pdf".to_string()]);
    }

    #[test]
    fn test_empty_payload_selects_nothing() {
        let (surface, selected) = recording_surface();
        let mut sm = surface.state_machine();

        sm.handle(&UploadEvent::Drop { files: vec![] });
        sm.handle(&UploadEvent::PickerChange { files: vec![] });
        assert!(selected.lock().unwrap().is_empty());
    }

    #[test]
    fn test_drag_leave_clears_highlight() {
        let (surface, selected) = recording_surface();
        let mut sm = surface.state_machine();

        sm.handle(&UploadEvent::DragOver);
        sm.handle(&UploadEvent::DragOver);
        assert!(sm.inner().is_drag_active());
        sm.handle(&UploadEvent::DragLeave);
        assert!(!sm.inner().is_drag_active());
        assert!(selected.lock().unwrap().is_empty());
    }

    #[test]
    fn test_picker_accepts_any_type_once_per_event() {
        let (surface, selected) = recording_surface();
        let mut sm = surface.state_machine();
        assert_eq!(sm.inner().accept_hint(), "image/*,application/pdf");

        sm.handle(&UploadEvent::PickerChange {
            files: vec![file("notes.txt")],
        });
        sm.handle(&UploadEvent::PickerChange {
            files: vec![file("deed.jpg")],
        });
        assert_eq!(
            *selected.lock().unwrap(),
            vec!["notes.txt".to_string(), "deed.jpg".to_string()]
        );
    }
}
