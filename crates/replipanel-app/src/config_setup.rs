//! Panel root: the reloadable setup view
//!
//! [`ConfigSetup`] owns the subtree markup, builds a [`SetupForm`] from
//! it, and rebuilds the whole child tree whenever the subtree fragment is
//! re-fetched. When the flavor participates in cross-panel notification it
//! also listens on the bus and reloads whenever any panel announces a
//! site change.

use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use replipanel_core::fragment;
use replipanel_core::prelude::*;

use crate::context::PanelContext;
use crate::guard::{FetchGuard, FetchTicket};
use crate::setup_form::SetupForm;
use crate::view::View;

pub struct ConfigSetup {
    ctx: Arc<PanelContext>,
    path: String,
    markup: RwLock<String>,
    form: RwLock<Option<Arc<SetupForm>>>,
    guard: FetchGuard,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl ConfigSetup {
    /// Bind a panel to a mounted setup fragment.
    ///
    /// The fragment's root element must carry the subtree path as
    /// `data-path`. Must be called inside a tokio runtime when the flavor
    /// listens for cross-panel notifications.
    pub fn mount(ctx: Arc<PanelContext>, markup: impl Into<String>) -> Result<Arc<Self>> {
        let markup = markup.into();
        let path = fragment::data_path(&markup)
            .ok_or_else(|| Error::fragment("setup fragment carries no data-path"))?;
        let setup = Arc::new(Self {
            ctx,
            path,
            markup: RwLock::new(markup),
            form: RwLock::new(None),
            guard: FetchGuard::new(),
            listener: Mutex::new(None),
        });
        setup.init_content();
        if setup.ctx.config.cross_panel_notify {
            setup.spawn_site_listener();
        }
        info!("mounted replication setup for {}", setup.path);
        Ok(setup)
    }

    /// The configuration subtree this panel manages.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The markup currently displayed for the subtree.
    pub fn markup(&self) -> String {
        self.markup
            .read()
            .ok()
            .map(|slot| slot.clone())
            .unwrap_or_default()
    }

    /// The form built from the current markup.
    pub fn form(&self) -> Option<Arc<SetupForm>> {
        self.form.read().ok().and_then(|slot| slot.clone())
    }

    /// Re-fetch the subtree fragment and rebuild the child tree from it.
    ///
    /// Safe to call at any time: concurrent reloads resolve to the last
    /// requested fragment, and a completion arriving after dispose is
    /// dropped. On fetch failure the previous markup and views stay.
    pub async fn reload(self: &Arc<Self>) -> Result<()> {
        let ticket = self.guard.begin();
        let url = self.ctx.endpoints.setup_reload(&self.path);
        debug!("reloading setup for {} via {url}", self.path);
        let markup = self.ctx.client.get_fragment(&url).await?;
        if !self.commit(ticket, markup) {
            debug!("discarding stale setup fragment for {}", self.path);
            return Ok(());
        }
        self.init_content();
        Ok(())
    }

    /// Swap in the fetched markup and retire the old child tree.
    ///
    /// The swap and the detach happen together, before any new views are
    /// built, so nothing bound to the replaced markup stays admitted.
    fn commit(&self, ticket: FetchTicket, markup: String) -> bool {
        {
            let Ok(mut slot) = self.markup.write() else {
                warn!("markup lock poisoned for {}", self.path);
                return false;
            };
            if !self.guard.admits(ticket) {
                return false;
            }
            *slot = markup;
        }
        let prior = self.form.write().ok().and_then(|mut slot| slot.take());
        if let Some(old) = prior {
            old.dispose();
        }
        true
    }

    /// Build a fresh form (and its node views) from the current markup.
    fn init_content(self: &Arc<Self>) {
        let form = {
            let Ok(markup) = self.markup.read() else {
                warn!("markup lock poisoned for {}", self.path);
                return;
            };
            SetupForm::bind(
                Arc::clone(&self.ctx),
                Arc::downgrade(self),
                &self.path,
                &markup,
            )
        };
        let prior = match self.form.write() {
            Ok(mut slot) => slot.replace(form),
            Err(_) => {
                warn!("form slot poisoned for {}", self.path);
                None
            }
        };
        if let Some(old) = prior {
            old.dispose();
        }
    }

    /// Listen for site changes announced by any panel and reload.
    fn spawn_site_listener(self: &Arc<Self>) {
        let mut events = self.ctx.bus.subscribe();
        let weak = Arc::downgrade(self);
        let path = self.path.clone();
        let handle = tokio::spawn(async move {
            loop {
                let change = match events.recv().await {
                    Ok(change) => Some(change),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("site change listener for {path} lagged by {skipped}; reloading anyway");
                        None
                    }
                    Err(RecvError::Closed) => break,
                };
                let Some(setup) = weak.upgrade() else { break };
                if !setup.guard.is_attached() {
                    break;
                }
                if let Some(change) = &change {
                    debug!("site {} changed; reloading panel at {path}", change.site_path);
                }
                if let Err(err) = setup.reload().await {
                    warn!("cross-panel reload of {path} failed: {err}");
                }
            }
        });
        if let Ok(mut slot) = self.listener.lock() {
            *slot = Some(handle);
        }
    }
}

impl View for ConfigSetup {
    fn is_attached(&self) -> bool {
        self.guard.is_attached()
    }

    fn dispose(&self) {
        self.guard.detach();
        if let Ok(mut slot) = self.listener.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
        if let Some(form) = self.form() {
            form.dispose();
        }
    }
}

impl Drop for ConfigSetup {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for ConfigSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigSetup")
            .field("path", &self.path)
            .field("attached", &self.guard.is_attached())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{entry_markup, setup_markup, test_context, StubClient};

    #[tokio::test]
    async fn test_mount_requires_data_path() {
        let ctx = test_context(StubClient::new());
        let result = ConfigSetup::mount(ctx, "<div class=\"setup\">no path</div>");
        assert!(matches!(result, Err(Error::Fragment { .. })));
    }

    #[tokio::test]
    async fn test_mount_builds_form_from_markup() {
        let ctx = test_context(StubClient::new());
        let markup = setup_markup(
            "/conf/s/replication",
            &[entry_markup("/conf/s/replication/a", "remote", "a")],
        );
        let setup = ConfigSetup::mount(ctx, markup).unwrap();

        assert_eq!(setup.path(), "/conf/s/replication");
        let form = setup.form().unwrap();
        assert_eq!(form.path(), "/conf/s/replication");
        assert_eq!(form.nodes().len(), 1);
    }

    #[tokio::test]
    async fn test_reload_rebuilds_children_and_detaches_old() {
        let client = StubClient::new();
        client.fragment(
            "/libs/platform/replication/config/setup.reload.html/conf/s/replication",
            setup_markup(
                "/conf/s/replication",
                &[
                    entry_markup("/conf/s/replication/a", "remote", "a"),
                    entry_markup("/conf/s/replication/b", "inplace", "b"),
                ],
            ),
        );
        let ctx = test_context(Arc::clone(&client));
        let setup = ConfigSetup::mount(
            ctx,
            setup_markup(
                "/conf/s/replication",
                &[entry_markup("/conf/s/replication/a", "remote", "a")],
            ),
        )
        .unwrap();
        let old_form = setup.form().unwrap();

        setup.reload().await.unwrap();

        assert!(!old_form.is_attached());
        let new_form = setup.form().unwrap();
        assert_eq!(new_form.nodes().len(), 2);
        assert!(setup.markup().contains("/conf/s/replication/b"));
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_current_tree() {
        let client = StubClient::new();
        client.fail("/libs/platform/replication/config/setup.reload.html/conf/s/replication");
        let ctx = test_context(Arc::clone(&client));
        let setup = ConfigSetup::mount(
            ctx,
            setup_markup(
                "/conf/s/replication",
                &[entry_markup("/conf/s/replication/a", "remote", "a")],
            ),
        )
        .unwrap();
        let form_before = setup.form().unwrap();

        let result = setup.reload().await;

        assert!(result.is_err());
        assert!(form_before.is_attached());
        assert!(setup.markup().contains("/conf/s/replication/a"));
    }
}
