/// Transient success/error banner
///
/// Each shown banner gets an id. The auto-clear timer carries that id back,
/// so a timer started for an older banner never clears a newer one.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
    pub id: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BannerSlot {
    current: Option<Banner>,
    next_id: u64,
}

impl BannerSlot {
    pub fn current(&self) -> Option<&Banner> {
        self.current.as_ref()
    }

    /// Show a banner, returning its id for the auto-clear timer
    #[must_use]
    pub fn show(mut self, kind: BannerKind, text: impl Into<String>) -> (Self, u64) {
        self.next_id += 1;
        let id = self.next_id;
        self.current = Some(Banner {
            kind,
            text: text.into(),
            id,
        });
        (self, id)
    }

    #[must_use]
    pub fn clear(mut self) -> Self {
        self.current = None;
        self
    }

    /// Timer fired for banner `id`
    #[must_use]
    pub fn expire(self, id: u64) -> Self {
        match &self.current {
            Some(banner) if banner.id == id => self.clear(),
            _ => self,
        }
    }
}

/// Resolve with `id` once `delay` has elapsed
pub async fn expire_after(delay: Duration, id: u64) -> u64 {
    tokio::time::sleep(delay).await;
    id
}
