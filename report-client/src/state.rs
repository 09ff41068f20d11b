//! Uploader view state.
//!
//! [`UploaderState`] is a plain snapshot; every transition returns a new one.
//! [`Uploader`] owns the current snapshot and performs the I/O between
//! transitions.

use crate::error::ClientError;
use crate::relay::{AnalysisRequest, RelayClient};
use crate::render::{render_analysis, RenderedAnalysis};
use crate::upload::{strip_data_url_prefix, ImageFile, UploadPolicy, EMPTY_FILE_MESSAGE};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploaderState {
    pub selected: Option<ImageFile>,
    /// Data URL of the selected file, once read.
    pub preview: Option<String>,
    pub analysis: Option<RenderedAnalysis>,
    pub loading: bool,
    pub error: Option<String>,
    pub success: bool,
}

impl UploaderState {
    /// Accept a new file. Leaves `self` untouched when the file is rejected.
    pub fn select(&self, file: ImageFile, policy: &UploadPolicy) -> Result<Self, ClientError> {
        policy.validate(&file)?;
        Ok(Self {
            selected: Some(file),
            preview: None,
            analysis: None,
            loading: false,
            error: None,
            success: false,
        })
    }

    pub fn with_preview(&self, data_url: String) -> Self {
        Self {
            preview: Some(data_url),
            ..self.clone()
        }
    }

    pub fn with_error(&self, error: &ClientError) -> Self {
        Self {
            error: Some(error.to_string()),
            ..self.clone()
        }
    }

    /// Enter the busy state. Fails without a file or while already busy.
    pub fn begin_analysis(&self) -> Result<(Self, ImageFile), ClientError> {
        if self.loading {
            return Err(ClientError::Busy);
        }
        let file = self.selected.clone().ok_or(ClientError::NoFileSelected)?;

        Ok((
            Self {
                loading: true,
                error: None,
                success: false,
                analysis: None,
                ..self.clone()
            },
            file,
        ))
    }

    pub fn complete_analysis(&self, analysis: RenderedAnalysis) -> Self {
        Self {
            analysis: Some(analysis),
            loading: false,
            success: true,
            error: None,
            ..self.clone()
        }
    }

    pub fn fail_analysis(&self, error: &ClientError) -> Self {
        Self {
            loading: false,
            success: false,
            error: Some(error.to_string()),
            ..self.clone()
        }
    }

    pub fn dismiss_error(&self) -> Self {
        Self {
            error: None,
            ..self.clone()
        }
    }

    pub fn cleared() -> Self {
        Self::default()
    }
}

/// The uploader component: current state plus its collaborators.
pub struct Uploader {
    state: UploaderState,
    policy: UploadPolicy,
    relay: RelayClient,
}

impl Uploader {
    pub fn new(relay: RelayClient, policy: UploadPolicy) -> Self {
        Self {
            state: UploaderState::default(),
            policy,
            relay,
        }
    }

    pub fn state(&self) -> &UploaderState {
        &self.state
    }

    /// Validate and store a file, then load its preview.
    ///
    /// A rejected file only sets the error banner; the previous file,
    /// preview and analysis stay in place.
    pub async fn select_file(&mut self, file: ImageFile) -> Result<(), ClientError> {
        let next = match self.state.select(file, &self.policy) {
            Ok(next) => next,
            Err(e) => {
                self.state = self.state.with_error(&e);
                return Err(e);
            }
        };

        let file = next.selected.clone();
        self.state = next;

        if let Some(file) = file {
            match file.read_as_data_url().await {
                Ok(preview) => self.state = self.state.with_preview(preview),
                Err(e) => {
                    self.state = self.state.with_error(&e);
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    /// Send the selected file to the relay and render the answer.
    pub async fn analyze(&mut self) -> Result<(), ClientError> {
        let (busy, file) = match self.state.begin_analysis() {
            Ok(started) => started,
            // Busy is gated silently; the request in flight owns the banner.
            Err(ClientError::Busy) => return Err(ClientError::Busy),
            Err(e) => {
                self.state = self.state.with_error(&e);
                return Err(e);
            }
        };
        self.state = busy;

        match self.run_analysis(&file).await {
            Ok(analysis) => {
                self.state = self.state.complete_analysis(analysis);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(file = %file.name, error = %e, "Analysis failed");
                self.state = self.state.fail_analysis(&e);
                Err(e)
            }
        }
    }

    async fn run_analysis(&self, file: &ImageFile) -> Result<RenderedAnalysis, ClientError> {
        let data_url = file.read_as_data_url().await?;
        let image_base64 = strip_data_url_prefix(&data_url)
            .filter(|payload| !payload.is_empty())
            // The file can be truncated on disk after it was selected.
            .ok_or_else(|| ClientError::Validation(EMPTY_FILE_MESSAGE.to_string()))?
            .to_string();

        let request = AnalysisRequest {
            image_base64,
            mime_type: Some(file.mime_type.clone()),
        };

        let caption = self.relay.submit(&request).await?;
        Ok(render_analysis(caption.as_deref()))
    }

    /// Reset to the initial state.
    pub fn clear(&mut self) {
        self.state = UploaderState::cleared();
    }

    pub fn dismiss_error(&mut self) {
        self.state = self.state.dismiss_error();
    }
}
