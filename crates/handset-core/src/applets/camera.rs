//! Camera with a gallery backed by the `photos` storage bucket.

use crate::applets::{Applet, AppletContext, unknown_command};
use crate::error::{HandsetError, Result};
use crate::platform::StoredObject;
use crate::registry::AppId;
use crate::shell::{FetchJob, FetchResult};

pub const PHOTO_BUCKET: &str = "photos";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub name: String,
    pub url: String,
    pub updated_at: u64,
}

impl From<StoredObject> for Photo {
    fn from(o: StoredObject) -> Self {
        Self {
            name: o.name,
            url: o.url,
            updated_at: o.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    User,
    Environment,
}

pub struct CameraApplet {
    streaming: bool,
    permission_denied: bool,
    facing: Facing,
    gallery: bool,
    /// Newest first.
    photos: Vec<Photo>,
}

impl CameraApplet {
    pub fn new() -> Self {
        Self {
            streaming: false,
            permission_denied: false,
            facing: Facing::User,
            gallery: false,
            photos: Vec::new(),
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn permission_denied(&self) -> bool {
        self.permission_denied
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    fn start(&mut self, cx: &mut AppletContext<'_>) -> Result<()> {
        self.permission_denied = false;
        match cx.platform.request_camera() {
            Ok(()) => {
                self.streaming = true;
                Ok(())
            },
            Err(e) => {
                self.streaming = false;
                if matches!(e, HandsetError::PermissionDenied(_)) {
                    self.permission_denied = true;
                }
                Err(e)
            },
        }
    }

    fn stop(&mut self) {
        self.streaming = false;
    }

    /// Take a photo and upload it, newest first in the gallery.
    pub fn capture(&mut self, cx: &mut AppletContext<'_>) -> Result<()> {
        if self.permission_denied {
            return Err(HandsetError::PermissionDenied(
                "enable camera access to take photos".into(),
            ));
        }
        if !self.streaming {
            return Err(HandsetError::Validation("camera is not running".into()));
        }
        let frame = cx.platform.capture_frame()?;
        let now = cx.unix_secs();
        let mut name = format!("photo-{now}.jpg");
        let mut n = 1;
        while self.photos.iter().any(|p| p.name == name) {
            n += 1;
            name = format!("photo-{now}-{n}.jpg");
        }
        let url = cx.services.objects.upload(PHOTO_BUCKET, &name, &frame)?;
        log::debug!("Uploaded {name} ({} bytes)", frame.len());
        self.photos.insert(
            0,
            Photo {
                name,
                url,
                updated_at: now,
            },
        );
        Ok(())
    }
}

impl Default for CameraApplet {
    fn default() -> Self {
        Self::new()
    }
}

impl Applet for CameraApplet {
    fn id(&self) -> AppId {
        AppId::Camera
    }

    fn on_mount(&mut self, cx: &mut AppletContext<'_>) -> Result<()> {
        cx.request(FetchJob::Objects(PHOTO_BUCKET.into()));
        self.start(cx)
    }

    fn on_unmount(&mut self, _cx: &mut AppletContext<'_>) {
        self.stop();
    }

    fn handle(&mut self, command: &str, _args: &[&str], cx: &mut AppletContext<'_>) -> Result<()> {
        match command {
            "allow" | "retry" => self.start(cx),
            "capture" | "shoot" => self.capture(cx),
            "switch" => {
                self.facing = match self.facing {
                    Facing::User => Facing::Environment,
                    Facing::Environment => Facing::User,
                };
                self.start(cx)
            },
            "gallery" => {
                self.stop();
                self.gallery = true;
                cx.request(FetchJob::Objects(PHOTO_BUCKET.into()));
                Ok(())
            },
            "camera" => {
                self.gallery = false;
                self.start(cx)
            },
            other => Err(unknown_command(self.id(), other)),
        }
    }

    fn on_fetched(&mut self, result: FetchResult, _cx: &mut AppletContext<'_>) -> Result<()> {
        match result {
            FetchResult::Objects { bucket, objects } if bucket == PHOTO_BUCKET => {
                let mut photos: Vec<Photo> = objects?.into_iter().map(Photo::from).collect();
                photos.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
                self.photos = photos;
            },
            _ => {},
        }
        Ok(())
    }

    fn view(&self) -> Vec<String> {
        if self.gallery {
            let mut lines = vec![format!("Photos ({})", self.photos.len())];
            if self.photos.is_empty() {
                lines.push("No photos yet".into());
            }
            lines.extend(self.photos.iter().map(|p| format!("{}  {}", p.name, p.url)));
            return lines;
        }
        let status = if self.permission_denied {
            "Camera access denied. Enable camera permissions and retry."
        } else if self.streaming {
            "[ live preview ]"
        } else {
            "Allow camera access to take photos"
        };
        vec![
            status.to_string(),
            format!("Facing: {:?}", self.facing),
            format!("Gallery ({})   (o) capture   switch", self.photos.len()),
        ]
    }
}
