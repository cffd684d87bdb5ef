use biometrics::{Collector, Counter};

pub(crate) static LOGINS: Counter = Counter::new("ragchat.auth.logins");
pub(crate) static LOGIN_FAILURES: Counter = Counter::new("ragchat.auth.login_failures");

pub(crate) static UPLOADS: Counter = Counter::new("ragchat.knowledge.uploads");
pub(crate) static UPLOAD_FAILURES: Counter = Counter::new("ragchat.knowledge.upload_failures");

pub(crate) static STREAM_CONNECTS: Counter = Counter::new("ragchat.stream.connects");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("ragchat.stream.errors");
pub(crate) static FRAMES_RECEIVED: Counter = Counter::new("ragchat.stream.frames_received");
pub(crate) static FRAMES_REJECTED: Counter = Counter::new("ragchat.stream.frames_rejected");
pub(crate) static FRAMES_SENT: Counter = Counter::new("ragchat.stream.frames_sent");
pub(crate) static SENDS_DROPPED: Counter = Counter::new("ragchat.stream.sends_dropped");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&LOGINS);
    collector.register_counter(&LOGIN_FAILURES);

    collector.register_counter(&UPLOADS);
    collector.register_counter(&UPLOAD_FAILURES);

    collector.register_counter(&STREAM_CONNECTS);
    collector.register_counter(&STREAM_ERRORS);
    collector.register_counter(&FRAMES_RECEIVED);
    collector.register_counter(&FRAMES_REJECTED);
    collector.register_counter(&FRAMES_SENT);
    collector.register_counter(&SENDS_DROPPED);
}
