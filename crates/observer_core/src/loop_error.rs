use dom_host::{EventKind, HostEvent, HostPlatform};

/// Message carried by the undelivered-notifications diagnostic event.
pub const RESIZE_LOOP_ERROR_MESSAGE: &str =
    "ResizeObserver loop completed with undelivered notifications.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorEventStyle {
    /// The host constructs error-shaped events directly.
    Standard,
    /// Blank event plus init call, message attached as a plain field.
    LegacyInit,
}

/// Best-effort reporter for processing loops that finished with work left
/// undelivered. The construction strategy is probed once at startup; delivery
/// is fire-and-forget and never escalates.
#[derive(Debug, Clone, Copy)]
pub struct LoopErrorReporter {
    style: ErrorEventStyle,
}

impl LoopErrorReporter {
    /// Probe the host's event-construction capability.
    #[must_use]
    pub fn detect<H: HostPlatform + ?Sized>(host: &H) -> Self {
        let style = if host.supports_error_event() {
            ErrorEventStyle::Standard
        } else {
            ErrorEventStyle::LegacyInit
        };
        Self { style }
    }

    /// Dispatch the diagnostic event on the global scope.
    pub fn deliver<H: HostPlatform + ?Sized>(&self, host: &H) {
        let event = match self.style {
            ErrorEventStyle::Standard => HostEvent::error(RESIZE_LOOP_ERROR_MESSAGE),
            ErrorEventStyle::LegacyInit => {
                let mut event = HostEvent::new(EventKind::Error);
                event.init(false, false);
                event.message = Some(RESIZE_LOOP_ERROR_MESSAGE.to_string());
                event
            }
        };
        host.dispatch(event);
    }
}

/// Probe and deliver in one step, for hosts that did not cache a reporter.
pub fn deliver_resize_loop_error<H: HostPlatform + ?Sized>(host: &H) {
    LoopErrorReporter::detect(host).deliver(host);
}
