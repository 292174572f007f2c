/// Surface identity
///
/// Every opened surface gets a fresh id that is never reused, even when the
/// same tab is opened again. Async results carry the id of the surface that
/// started them and are applied only while that surface is still open.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(u64);

/// Hands out surface ids for the lifetime of the application
#[derive(Debug, Default)]
pub struct SurfaceIds {
    next: u64,
}

impl SurfaceIds {
    pub fn issue(&mut self) -> SurfaceId {
        self.next += 1;
        SurfaceId(self.next)
    }
}
