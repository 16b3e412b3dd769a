use serde::Serialize;

/// The uploaded photo as the session remembers it.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedPhoto {
    pub file_name: String,
    pub mime_type: String,
    pub byte_len: usize,
}

/// Edited image held in memory until the next upload or edit replaces it.
#[derive(Debug, Clone)]
pub struct EditedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub model: String,
}

/// Outcome state of the edit flow. The enum guarantees that at most one of
/// {result, error, in-flight} is active at a time.
#[derive(Debug, Clone)]
pub enum EditStatus {
    Idle,
    Busy,
    Done(EditedImage),
    Failed(String),
}

/// Transient per-service state, the equivalent of one editor tab. Nothing
/// here survives a restart.
#[derive(Debug)]
pub struct EditSession {
    pub original: Option<UploadedPhoto>,
    status: EditStatus,
}

impl Default for EditSession {
    fn default() -> Self {
        EditSession {
            original: None,
            status: EditStatus::Idle,
        }
    }
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &EditStatus {
        &self.status
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.status, EditStatus::Busy)
    }

    /// Records a fresh upload. Any previous result or error is discarded.
    pub fn set_original(&mut self, photo: UploadedPhoto) {
        self.original = Some(photo);
        self.status = EditStatus::Idle;
    }

    /// Marks the session busy. Returns false when an edit is already in
    /// flight, in which case nothing changes.
    pub fn begin(&mut self) -> bool {
        if self.is_busy() {
            return false;
        }
        self.status = EditStatus::Busy;
        true
    }

    pub fn complete(&mut self, image: EditedImage) {
        self.status = EditStatus::Done(image);
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = EditStatus::Failed(message.into());
    }

    pub fn result(&self) -> Option<&EditedImage> {
        match &self.status {
            EditStatus::Done(image) => Some(image),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            EditStatus::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            original: self.original.clone(),
            busy: self.is_busy(),
            has_result: self.result().is_some(),
            error: self.error().map(String::from),
        }
    }
}

/// What the page polls to render its state.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub original: Option<UploadedPhoto>,
    pub busy: bool,
    pub has_result: bool,
    pub error: Option<String>,
}
