//! SDK Command Queue
//!
//! Typed replacement for the SDK's ambient `push([command, ...args])`
//! pattern. Commands are buffered until a sink is attached (the SDK script
//! has loaded), drained in order on attach, and passed straight through
//! afterwards. The consent-management queue follows the same
//! defer-until-ready shape for callbacks.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// SDK product areas that consent is granted per
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConsentPurpose {
    /// Identity/authentication
    Id,
    /// Experience composer
    Composer,
    /// Analytics product
    Pa,
    /// Commerce product
    Vx,
}

impl ConsentPurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Composer => "COMPOSER",
            Self::Pa => "PA",
            Self::Vx => "VX",
        }
    }
}

/// Processing level granted for a product area
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConsentMode {
    /// Full processing permitted
    OptIn,
    /// Minimal processing only
    Essential,
    /// No processing
    OptOut,
}

/// A command destined for the external SDK
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum SdkCommand {
    /// Override the composer host URL
    SetComposerHost { url: String },

    /// Override the identity service URL
    SetPianoIdUrl { url: String },

    /// Override the commerce API endpoint
    SetEndpoint { url: String },

    /// Attach a custom variable to the SDK context
    SetCustomVariable { name: String, value: String },

    /// Tag the page for composer experience targeting
    SetTags { tags: Vec<String> },

    /// Use the SDK's own identity service as the user provider
    SetUsePianoIdUserProvider { enabled: bool },

    /// Require consent before SDK processing starts
    SetRequireConsent { required: bool },

    /// Toggle verbose SDK logging
    SetDebug { enabled: bool },

    /// Record a consent grant for a product area
    SetConsent {
        purpose: ConsentPurpose,
        mode: ConsentMode,
    },

    /// Start composer experience evaluation
    ExperienceInit,
}

/// Receives commands once the SDK is ready
pub trait CommandSink: Send + Sync {
    fn submit(&self, command: SdkCommand);
}

enum QueueState {
    /// SDK not loaded yet; commands accumulate in order
    Buffering(Vec<SdkCommand>),
    /// SDK ready; commands pass straight through
    Attached(Box<dyn CommandSink>),
}

/// Deferred-dispatch command queue
///
/// The flush trigger is [`CommandQueue::attach`]: the buffer drains to the
/// sink in push order, and later pushes bypass the buffer entirely.
pub struct CommandQueue {
    state: Mutex<QueueState>,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState::Buffering(Vec::new())),
        }
    }

    /// Queue a command, or deliver it immediately if a sink is attached
    pub fn push(&self, command: SdkCommand) {
        let mut state = self.state.lock().unwrap();
        match &mut *state {
            QueueState::Buffering(pending) => pending.push(command),
            QueueState::Attached(sink) => sink.submit(command),
        }
    }

    /// Attach the real sink, draining everything buffered so far in order
    pub fn attach(&self, sink: Box<dyn CommandSink>) {
        let mut state = self.state.lock().unwrap();
        if let QueueState::Buffering(pending) = &mut *state {
            tracing::debug!(buffered = pending.len(), "Draining command queue to SDK");
            for command in pending.drain(..) {
                sink.submit(command);
            }
        }
        *state = QueueState::Attached(sink);
    }

    /// Number of commands still buffered (0 once attached)
    pub fn pending(&self) -> usize {
        match &*self.state.lock().unwrap() {
            QueueState::Buffering(pending) => pending.len(),
            QueueState::Attached(_) => 0,
        }
    }
}

type ConsentCallback = Box<dyn FnOnce() + Send>;

enum ConsentState {
    Waiting(Vec<ConsentCallback>),
    Ready,
}

/// Deferred callback queue for the external consent-management library
///
/// Callbacks queue until [`ConsentQueue::mark_ready`], which runs them in
/// order; once ready, deferred callbacks run immediately.
pub struct ConsentQueue {
    state: Mutex<ConsentState>,
}

impl Default for ConsentQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsentQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ConsentState::Waiting(Vec::new())),
        }
    }

    /// Run `callback` once the consent library is ready
    pub fn defer(&self, callback: impl FnOnce() + Send + 'static) {
        let run_now = {
            let mut state = self.state.lock().unwrap();
            match &mut *state {
                ConsentState::Waiting(pending) => {
                    pending.push(Box::new(callback));
                    None
                }
                ConsentState::Ready => Some(callback),
            }
        };
        // Run outside the lock so callbacks may defer again
        if let Some(callback) = run_now {
            callback();
        }
    }

    /// Signal that the consent library is online, running queued callbacks
    pub fn mark_ready(&self) {
        let pending = {
            let mut state = self.state.lock().unwrap();
            match std::mem::replace(&mut *state, ConsentState::Ready) {
                ConsentState::Waiting(pending) => pending,
                ConsentState::Ready => Vec::new(),
            }
        };
        tracing::debug!(callbacks = pending.len(), "Consent library ready");
        for callback in pending {
            callback();
        }
    }
}

/// In-memory sink recording submitted commands (for development/testing)
pub struct MemoryCommandSink {
    commands: std::sync::RwLock<Vec<SdkCommand>>,
}

impl Default for MemoryCommandSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCommandSink {
    pub fn new() -> Self {
        Self {
            commands: std::sync::RwLock::new(Vec::new()),
        }
    }

    pub fn commands(&self) -> Vec<SdkCommand> {
        self.commands.read().unwrap().clone()
    }
}

impl CommandSink for MemoryCommandSink {
    fn submit(&self, command: SdkCommand) {
        self.commands.write().unwrap().push(command);
    }
}

impl CommandSink for std::sync::Arc<MemoryCommandSink> {
    fn submit(&self, command: SdkCommand) {
        self.as_ref().submit(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_commands_buffer_until_attach() {
        let queue = CommandQueue::new();
        queue.push(SdkCommand::SetDebug { enabled: true });
        queue.push(SdkCommand::SetTags {
            tags: vec!["paywall-exempt".into()],
        });
        assert_eq!(queue.pending(), 2);

        let sink = Arc::new(MemoryCommandSink::new());
        queue.attach(Box::new(sink.clone()));

        assert_eq!(queue.pending(), 0);
        let drained = sink.commands();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0], SdkCommand::SetDebug { enabled: true });
    }

    #[test]
    fn test_commands_pass_through_after_attach() {
        let queue = CommandQueue::new();
        let sink = Arc::new(MemoryCommandSink::new());
        queue.attach(Box::new(sink.clone()));

        queue.push(SdkCommand::ExperienceInit);
        assert_eq!(sink.commands(), vec![SdkCommand::ExperienceInit]);
    }

    #[test]
    fn test_consent_queue_defers_until_ready() {
        let queue = ConsentQueue::new();
        let ran = Arc::new(AtomicUsize::new(0));

        let counter = ran.clone();
        queue.defer(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(ran.load(Ordering::SeqCst), 0);

        queue.mark_ready();
        assert_eq!(ran.load(Ordering::SeqCst), 1);

        // Deferred after readiness runs immediately
        let counter = ran.clone();
        queue.defer(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(ran.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_consent_mode_serializes_kebab_case() {
        let json = serde_json::to_value(ConsentMode::OptIn).unwrap();
        assert_eq!(json, "opt-in");
    }
}
