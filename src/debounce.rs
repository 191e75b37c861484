/// Coalesces a burst of canvas resize requests into the last one.
///
/// Time is passed in explicitly (milliseconds) so the host decides the clock.
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    idle_millis: f64,
    pending: Option<PendingResize>,
}

#[derive(Debug, Clone, Copy)]
struct PendingResize {
    size: (u32, u32),
    requested_at: f64,
}

impl ResizeDebouncer {
    pub fn new(idle_millis: f64) -> Self {
        Self {
            idle_millis,
            pending: None,
        }
    }

    /// Records a requested size, restarting the idle window. Repeating the
    /// pending size does not restart it.
    pub fn request(&mut self, width: u32, height: u32, now_millis: f64) {
        if self.pending.is_some_and(|pending| pending.size == (width, height)) {
            return;
        }
        self.pending = Some(PendingResize {
            size: (width, height),
            requested_at: now_millis,
        });
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns the last requested size once no request has arrived for the idle window.
    pub fn poll(&mut self, now_millis: f64) -> Option<(u32, u32)> {
        let pending = self.pending?;
        if now_millis - pending.requested_at >= self.idle_millis {
            self.pending = None;
            Some(pending.size)
        } else {
            None
        }
    }
}
