//! Cloud drive uploads through the identity provider's session.

use crate::applets::{Applet, AppletContext, unknown_command};
use crate::error::{HandsetError, Result};
use crate::platform::{DriveFile, Session, UploadRequest};
use crate::registry::AppId;
use crate::shell::{FetchJob, FetchResult};

const PROVIDER: &str = "google";

/// MIME type for a file name, by extension.
fn mime_type(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "txt" => "text/plain",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

pub struct DriveApplet {
    session: Option<Session>,
    files: Vec<DriveFile>,
    loading: bool,
    list_error: Option<String>,
    /// Id of the most recent upload.
    last_upload: Option<String>,
}

impl DriveApplet {
    pub fn new() -> Self {
        Self {
            session: None,
            files: Vec::new(),
            loading: false,
            list_error: None,
            last_upload: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn files(&self) -> &[DriveFile] {
        &self.files
    }

    pub fn last_upload(&self) -> Option<&str> {
        self.last_upload.as_deref()
    }

    fn access_token(&self) -> Result<String> {
        self.session
            .as_ref()
            .map(|s| s.access_token.clone())
            .ok_or_else(|| HandsetError::Validation("sign in to use Drive".into()))
    }

    pub fn sign_in(&mut self, cx: &mut AppletContext<'_>) -> Result<()> {
        let session = cx.services.identity.sign_in(PROVIDER)?;
        log::info!("Drive signed in as {}", session.user);
        self.session = Some(session);
        Ok(())
    }

    pub fn sign_out(&mut self, cx: &mut AppletContext<'_>) {
        cx.services.identity.sign_out();
        self.session = None;
        self.files.clear();
        self.list_error = None;
    }

    pub fn upload(&mut self, file_name: &str, bytes: Vec<u8>, cx: &mut AppletContext<'_>) -> Result<()> {
        let access_token = self.access_token()?;
        if file_name.is_empty() {
            return Err(HandsetError::Validation("select a file".into()));
        }
        let id = cx.services.drive.upload(UploadRequest {
            access_token,
            file_name: file_name.to_string(),
            mime_type: mime_type(file_name).to_string(),
            bytes,
        })?;
        log::debug!("Uploaded {file_name} as {id}");
        self.last_upload = Some(id);
        Ok(())
    }

    pub fn list(&mut self, cx: &mut AppletContext<'_>) -> Result<()> {
        let access_token = self.access_token()?;
        self.loading = true;
        self.list_error = None;
        cx.request(FetchJob::DriveFiles { access_token });
        Ok(())
    }
}

impl Default for DriveApplet {
    fn default() -> Self {
        Self::new()
    }
}

impl Applet for DriveApplet {
    fn id(&self) -> AppId {
        AppId::Drive
    }

    fn on_mount(&mut self, cx: &mut AppletContext<'_>) -> Result<()> {
        self.session = cx.services.identity.current_session();
        Ok(())
    }

    fn handle(&mut self, command: &str, args: &[&str], cx: &mut AppletContext<'_>) -> Result<()> {
        match command {
            "signin" => self.sign_in(cx),
            "signout" => {
                self.sign_out(cx);
                Ok(())
            },
            "upload" => {
                let (name, body) = args.split_first().unwrap_or((&"", &[]));
                self.upload(name, body.join(" ").into_bytes(), cx)
            },
            "list" => self.list(cx),
            other => Err(unknown_command(self.id(), other)),
        }
    }

    fn on_fetched(&mut self, result: FetchResult, _cx: &mut AppletContext<'_>) -> Result<()> {
        if let FetchResult::DriveFiles(files) = result {
            self.loading = false;
            match files {
                Ok(files) => self.files = files,
                Err(e) => self.list_error = Some(e.to_string()),
            }
        }
        Ok(())
    }

    fn view(&self) -> Vec<String> {
        let mut lines = vec!["Google Drive Upload".to_string()];
        let Some(session) = &self.session else {
            lines.push("Sign in with Google".into());
            return lines;
        };
        lines.push(format!("Signed in as {}", session.user));
        if let Some(id) = &self.last_upload {
            lines.push(format!("Uploaded, file ID: {id}"));
        }
        if self.loading {
            lines.push("Loading files...".into());
        }
        if let Some(err) = &self.list_error {
            lines.push(err.clone());
        }
        lines.extend(self.files.iter().map(|f| format!("{}  ({})", f.name, f.mime_type)));
        lines.push("Sign out".into());
        lines
    }
}
