//! Scripted collaborators for panel tests
//!
//! Mirrors what the real collaborators do, with every response under test
//! control: the stub client serves canned fragments and can hold a URL's
//! requests until released; the scripted host hands out sessions whose
//! events the test feeds by hand.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use replipanel_core::{Error, Result};

use crate::bus::SiteChangeBus;
use crate::client::FragmentClient;
use crate::config::PanelConfig;
use crate::context::PanelContext;
use crate::dialog::{DialogEvent, DialogHost, DialogRequest, DialogSession};
use crate::profile::MemoryProfile;

// ─────────────────────────────────────────────────────────────────
// Stub fragment client
// ─────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Gate {
    permits: usize,
    waiters: VecDeque<oneshot::Sender<()>>,
}

/// Fragment client serving canned responses.
///
/// Responses are resolved in call order; gating a URL parks requests
/// after resolution, so tests control exactly when each request returns
/// and with which body.
#[derive(Default)]
pub struct StubClient {
    fragments: Mutex<HashMap<String, String>>,
    queued: Mutex<HashMap<String, VecDeque<String>>>,
    failures: Mutex<HashSet<String>>,
    gates: Mutex<HashMap<String, Gate>>,
    calls: Mutex<Vec<String>>,
    posts: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl StubClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Serve `markup` for every GET of `url`.
    pub fn fragment(&self, url: impl Into<String>, markup: impl Into<String>) {
        self.fragments.lock().unwrap().insert(url.into(), markup.into());
    }

    /// Serve `markup` for one GET of `url`, ahead of the standing fragment.
    pub fn fragment_once(&self, url: impl Into<String>, markup: impl Into<String>) {
        self.queued
            .lock()
            .unwrap()
            .entry(url.into())
            .or_default()
            .push_back(markup.into());
    }

    /// Make every GET of `url` fail.
    pub fn fail(&self, url: impl Into<String>) {
        self.failures.lock().unwrap().insert(url.into());
    }

    /// Hold GETs of `url` until released.
    pub fn gate(&self, url: impl Into<String>) {
        self.gates.lock().unwrap().entry(url.into()).or_default();
    }

    /// Let one held GET of `url` proceed (in arrival order).
    pub fn release(&self, url: &str) {
        let mut gates = self.gates.lock().unwrap();
        let gate = gates.entry(url.to_string()).or_default();
        if let Some(waiter) = gate.waiters.pop_front() {
            let _ = waiter.send(());
        } else {
            gate.permits += 1;
        }
    }

    /// Let every held and future GET of `url` proceed.
    pub fn release_all(&self, url: &str) {
        let mut gates = self.gates.lock().unwrap();
        if let Some(gate) = gates.remove(url) {
            for waiter in gate.waiters {
                let _ = waiter.send(());
            }
        }
    }

    /// All GET URLs seen, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, url: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.as_str() == url)
            .count()
    }

    /// All form POSTs seen, in call order.
    pub fn posts(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.posts.lock().unwrap().clone()
    }

    async fn pass_gate(&self, url: &str) {
        let waiter = {
            let mut gates = self.gates.lock().unwrap();
            match gates.get_mut(url) {
                None => None,
                Some(gate) => {
                    if gate.permits > 0 {
                        gate.permits -= 1;
                        None
                    } else {
                        let (tx, rx) = oneshot::channel();
                        gate.waiters.push_back(tx);
                        Some(rx)
                    }
                }
            }
        };
        if let Some(rx) = waiter {
            let _ = rx.await;
        }
    }

    fn resolve(&self, url: &str) -> Result<String> {
        if self.failures.lock().unwrap().contains(url) {
            return Err(Error::fetch(url, "scripted failure"));
        }
        if let Some(queue) = self.queued.lock().unwrap().get_mut(url) {
            if let Some(markup) = queue.pop_front() {
                return Ok(markup);
            }
        }
        if let Some(markup) = self.fragments.lock().unwrap().get(url) {
            return Ok(markup.clone());
        }
        Ok(format!("<div data-served=\"{url}\"></div>"))
    }
}

#[async_trait]
impl FragmentClient for StubClient {
    async fn get_fragment(&self, url: &str) -> Result<String> {
        self.calls.lock().unwrap().push(url.to_string());
        // resolve before gating so responses follow call order
        let response = self.resolve(url);
        self.pass_gate(url).await;
        response
    }

    async fn post_form(&self, url: &str, fields: &[(String, String)]) -> Result<String> {
        self.posts
            .lock()
            .unwrap()
            .push((url.to_string(), fields.to_vec()));
        Ok(String::new())
    }
}

// ─────────────────────────────────────────────────────────────────
// Scripted dialog host and sessions
// ─────────────────────────────────────────────────────────────────

/// Test handle to an open [`ScriptedSession`]: feed events, observe swaps.
///
/// Dropping the probe ends the event stream, which the session reports as
/// a dismissal.
pub struct SessionProbe {
    events: mpsc::UnboundedSender<DialogEvent>,
    replaced: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

impl SessionProbe {
    pub fn send(&self, event: DialogEvent) {
        let _ = self.events.send(event);
    }

    /// Content swaps the controller performed, in order.
    pub fn replaced(&self) -> Vec<String> {
        self.replaced.lock().unwrap().clone()
    }

    pub fn replaced_count(&self) -> usize {
        self.replaced.lock().unwrap().len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

struct ScriptedSession {
    fields: HashMap<String, String>,
    events: mpsc::UnboundedReceiver<DialogEvent>,
    replaced: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl DialogSession for ScriptedSession {
    fn field_value(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    async fn replace_content(&mut self, markup: &str) -> Result<()> {
        self.replaced.lock().unwrap().push(markup.to_string());
        Ok(())
    }

    async fn next_event(&mut self) -> Option<DialogEvent> {
        self.events.recv().await
    }

    async fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// A session whose events the test sends through the returned probe.
pub fn scripted_session(fields: &[(&str, &str)]) -> (Box<dyn DialogSession>, SessionProbe) {
    let (tx, rx) = mpsc::unbounded_channel();
    let replaced = Arc::new(Mutex::new(Vec::new()));
    let closed = Arc::new(AtomicBool::new(false));
    let session = ScriptedSession {
        fields: fields
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        events: rx,
        replaced: Arc::clone(&replaced),
        closed: Arc::clone(&closed),
    };
    (
        Box::new(session),
        SessionProbe {
            events: tx,
            replaced,
            closed,
        },
    )
}

/// A session whose whole interaction is queued up front.
pub fn immediate_session(
    fields: &[(&str, &str)],
    events: Vec<DialogEvent>,
) -> (Box<dyn DialogSession>, SessionProbe) {
    let (session, probe) = scripted_session(fields);
    for event in events {
        probe.send(event);
    }
    (session, probe)
}

/// Dialog host handing out pre-pushed sessions in order.
#[derive(Default)]
pub struct ScriptedHost {
    sessions: Mutex<VecDeque<Box<dyn DialogSession>>>,
    opened: Mutex<Vec<String>>,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_session(&self, session: Box<dyn DialogSession>) {
        self.sessions.lock().unwrap().push_back(session);
    }

    /// Dialog URLs opened so far, in order.
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl DialogHost for ScriptedHost {
    async fn open(&self, request: DialogRequest) -> Result<Box<dyn DialogSession>> {
        self.opened.lock().unwrap().push(request.url.clone());
        self.sessions
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::dialog(format!("no scripted session for {}", request.url)))
    }
}

// ─────────────────────────────────────────────────────────────────
// Markup builders and wiring helpers
// ─────────────────────────────────────────────────────────────────

/// Markup of one editable entry element.
pub fn entry_markup(path: &str, entry_type: &str, title: &str) -> String {
    format!(
        r#"<div class="replication-node" data-path="{path}" data-type="{entry_type}" data-editable="true"><span data-role="title" title="{entry_type} at {path}">{title}</span></div>"#
    )
}

/// Markup of an entry element rendered read-only.
pub fn readonly_entry_markup(path: &str, entry_type: &str, title: &str) -> String {
    format!(
        r#"<div class="replication-node" data-path="{path}" data-type="{entry_type}" data-editable="false"><span data-role="title">{title}</span></div>"#
    )
}

/// Markup of a setup fragment wrapping the given entry elements.
pub fn setup_markup(subtree_path: &str, entries: &[String]) -> String {
    let list = entries.concat();
    format!(
        r#"<section class="replication-setup" data-path="{subtree_path}"><div class="tabs"></div>{list}<button class="add">Add</button></section>"#
    )
}

/// Context wired with a fresh host, profile, and bus; config tree flavor.
pub fn test_context(client: Arc<StubClient>) -> Arc<PanelContext> {
    PanelContext::new(
        client,
        Arc::new(ScriptedHost::new()),
        Arc::new(MemoryProfile::new()),
        SiteChangeBus::new(),
        PanelConfig::config_tree(),
    )
}

/// Context with explicit host, bus, and flavor; fresh in-memory profile.
pub fn panel_context(
    client: Arc<StubClient>,
    dialogs: Arc<ScriptedHost>,
    bus: SiteChangeBus,
    config: PanelConfig,
) -> Arc<PanelContext> {
    PanelContext::new(
        client,
        dialogs,
        Arc::new(MemoryProfile::new()),
        bus,
        config,
    )
}

/// Poll `condition` until it holds or two seconds pass.
pub async fn wait_until(condition: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    condition()
}
