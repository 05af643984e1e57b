/// Load state of an image that falls back to a placeholder on error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImageLoadState {
    #[default]
    Displaying,
    Failed,
}

/// State behind a fallback-capable image.
///
/// Once the image failed to load it stays failed; only a new source
/// brings it back to [`ImageLoadState::Displaying`]. Failed loads are never
/// retried.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FallbackImage {
    src: String,
    state: ImageLoadState,
}

impl FallbackImage {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            state: ImageLoadState::Displaying,
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn state(&self) -> ImageLoadState {
        self.state
    }

    pub fn is_failed(&self) -> bool {
        self.state == ImageLoadState::Failed
    }

    /// The image reported a load error.
    pub fn on_error(&mut self) {
        self.state = ImageLoadState::Failed;
    }

    /// New props. Resets the state only when the source actually changed.
    pub fn set_src(&mut self, src: impl Into<String>) {
        let src = src.into();
        if src != self.src {
            self.src = src;
            self.state = ImageLoadState::Displaying;
        }
    }
}
