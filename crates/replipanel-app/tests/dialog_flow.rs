//! Integration tests for the edit, delete, and create dialog flows

use std::sync::Arc;

use replipanel_app::test_utils::{
    entry_markup, immediate_session, panel_context, scripted_session, setup_markup, wait_until,
    ScriptedHost, StubClient,
};
use replipanel_app::{ConfigSetup, DialogEvent, DialogOutcome, PanelConfig, SiteChangeBus, View};

const SUBTREE: &str = "/conf/site1/replication";
const NODE_A: &str = "/conf/site1/replication/publish-a";
const NODE_B: &str = "/conf/site1/replication/publish-b";

const NODE_A_DIALOG: &str = "/libs/remote.dialog.html/conf/site1/replication/publish-a";
const NODE_A_RELOAD: &str = "/libs/remote.reload.html/conf/site1/replication/publish-a";
const NODE_A_DELETE: &str =
    "/libs/platform/replication/config/node.delete.html/conf/site1/replication/publish-a";
const NODE_CREATE: &str =
    "/libs/platform/replication/config/node.create.html/conf/site1/replication";
const SETUP_RELOAD: &str =
    "/libs/platform/replication/config/setup.reload.html/conf/site1/replication";
const REMOTE_EMPTY: &str =
    "/libs/platform/replication/config/remote.empty.html/conf/site1/replication";
const LOCAL_EMPTY: &str =
    "/libs/platform/replication/config/local.empty.html/conf/site1/replication";

/// Mount a two-entry panel against the given scripted host.
fn mounted_panel(client: &Arc<StubClient>, host: Arc<ScriptedHost>) -> Arc<ConfigSetup> {
    let ctx = panel_context(
        Arc::clone(client),
        host,
        SiteChangeBus::new(),
        PanelConfig::config_tree(),
    );
    let markup = setup_markup(
        SUBTREE,
        &[
            entry_markup(NODE_A, "remote", "Publish A"),
            entry_markup(NODE_B, "local", "Publish B"),
        ],
    );
    ConfigSetup::mount(ctx, markup).unwrap()
}

// ═══════════════════════════════════════════════════════════════
// Edit dialog
// ═══════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_save_reloads_only_that_node() {
    let client = StubClient::new();
    let host = Arc::new(ScriptedHost::new());
    let (session, _probe) = immediate_session(&[], vec![DialogEvent::Submitted]);
    host.push_session(session);

    let setup = mounted_panel(&client, Arc::clone(&host));
    let form = setup.form().unwrap();
    let node = form.node(NODE_A).unwrap();

    client.fragment(NODE_A_RELOAD, entry_markup(NODE_A, "remote", "Publish A*"));
    let outcome = node.open_dialog().await.unwrap();

    assert_eq!(outcome, DialogOutcome::Submitted);
    assert_eq!(host.opened(), vec![NODE_A_DIALOG.to_string()]);
    assert_eq!(node.title().unwrap().text, "Publish A*");

    // only that entry refreshed; the panel itself stayed in place
    assert_eq!(client.calls(), vec![NODE_A_RELOAD.to_string()]);
    assert!(form.is_attached());
}

#[tokio::test]
async fn test_cancel_leaves_node_untouched() {
    let client = StubClient::new();
    let host = Arc::new(ScriptedHost::new());
    let (session, _probe) = immediate_session(&[], vec![DialogEvent::Cancelled]);
    host.push_session(session);

    let setup = mounted_panel(&client, Arc::clone(&host));
    let node = Arc::clone(setup.form().unwrap().node(NODE_A).unwrap());

    let outcome = node.open_dialog().await.unwrap();

    assert_eq!(outcome, DialogOutcome::Cancelled);
    assert!(client.calls().is_empty());
    assert_eq!(node.title().unwrap().text, "Publish A");
}

#[tokio::test]
async fn test_dismissed_dialog_reports_cancelled() {
    let client = StubClient::new();
    let host = Arc::new(ScriptedHost::new());
    // the host closes the dialog without any event, e.g. on Escape
    let (session, probe) = scripted_session(&[]);
    drop(probe);
    host.push_session(session);

    let setup = mounted_panel(&client, Arc::clone(&host));
    let node = Arc::clone(setup.form().unwrap().node(NODE_A).unwrap());

    let outcome = node.open_dialog().await.unwrap();
    assert_eq!(outcome, DialogOutcome::Cancelled);
}

#[tokio::test]
async fn test_detached_node_skips_dialog() {
    let client = StubClient::new();
    let host = Arc::new(ScriptedHost::new());

    let setup = mounted_panel(&client, Arc::clone(&host));
    let node = Arc::clone(setup.form().unwrap().node(NODE_A).unwrap());

    client.fragment(SETUP_RELOAD, setup_markup(SUBTREE, &[]));
    setup.reload().await.unwrap();
    assert!(!node.is_attached());

    // no session was pushed; reaching the host would fail the test
    let outcome = node.open_dialog().await.unwrap();
    assert_eq!(outcome, DialogOutcome::Cancelled);
    assert!(host.opened().is_empty());
}

// ═══════════════════════════════════════════════════════════════
// Delete from inside the edit dialog
// ═══════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_delete_reloads_subtree_instead_of_node() {
    let client = StubClient::new();
    let host = Arc::new(ScriptedHost::new());

    let (edit, edit_probe) = immediate_session(&[], vec![DialogEvent::DeleteRequested]);
    let (confirm, confirm_probe) = immediate_session(&[], vec![DialogEvent::Submitted]);
    host.push_session(edit);
    host.push_session(confirm);

    let setup = mounted_panel(&client, Arc::clone(&host));
    let form = setup.form().unwrap();
    let node = Arc::clone(form.node(NODE_A).unwrap());

    // after the delete the server renders the subtree without the entry
    client.fragment(
        SETUP_RELOAD,
        setup_markup(SUBTREE, &[entry_markup(NODE_B, "local", "Publish B")]),
    );

    let outcome = node.open_dialog().await.unwrap();

    assert_eq!(outcome, DialogOutcome::Deleted);
    assert_eq!(
        host.opened(),
        vec![NODE_A_DIALOG.to_string(), NODE_A_DELETE.to_string()]
    );

    // one subtree reload, no per-entry reload of the dead node
    assert_eq!(client.calls_for(SETUP_RELOAD), 1);
    assert_eq!(client.calls_for(NODE_A_RELOAD), 0);

    // the edit dialog was dismissed and the old tree replaced
    assert!(edit_probe.is_closed());
    assert!(!confirm_probe.is_closed());
    assert!(!form.is_attached());
    assert!(!node.is_attached());
    let rebuilt = setup.form().unwrap();
    assert_eq!(rebuilt.nodes().len(), 1);
    assert!(rebuilt.node(NODE_A).is_none());
}

#[tokio::test]
async fn test_declined_confirmation_keeps_editing() {
    let client = StubClient::new();
    let host = Arc::new(ScriptedHost::new());

    let (edit, edit_probe) = immediate_session(
        &[],
        vec![DialogEvent::DeleteRequested, DialogEvent::Submitted],
    );
    let (confirm, _confirm_probe) = immediate_session(&[], vec![DialogEvent::Cancelled]);
    host.push_session(edit);
    host.push_session(confirm);

    let setup = mounted_panel(&client, Arc::clone(&host));
    let node = Arc::clone(setup.form().unwrap().node(NODE_A).unwrap());

    client.fragment(NODE_A_RELOAD, entry_markup(NODE_A, "remote", "Publish A*"));
    let outcome = node.open_dialog().await.unwrap();

    // the dialog stayed open after the declined confirmation and the
    // user went on to save
    assert_eq!(outcome, DialogOutcome::Submitted);
    assert_eq!(client.calls_for(SETUP_RELOAD), 0);
    assert_eq!(client.calls_for(NODE_A_RELOAD), 1);
    assert!(!edit_probe.is_closed());
    assert!(setup.form().unwrap().is_attached());
}

// ═══════════════════════════════════════════════════════════════
// Create dialog
// ═══════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_create_type_switch_swaps_form_body() {
    let client = StubClient::new();
    let host = Arc::new(ScriptedHost::new());
    let (session, probe) = scripted_session(&[("type", "remote")]);
    host.push_session(session);

    let setup = mounted_panel(&client, Arc::clone(&host));
    let form = setup.form().unwrap();

    client.fragment(REMOTE_EMPTY, r#"<form data-kind="remote"></form>"#);
    client.fragment(LOCAL_EMPTY, r#"<form data-kind="local"></form>"#);
    client.fragment(
        SETUP_RELOAD,
        setup_markup(
            SUBTREE,
            &[
                entry_markup(NODE_A, "remote", "Publish A"),
                entry_markup(NODE_B, "local", "Publish B"),
                entry_markup("/conf/site1/replication/publish-c", "local", "Publish C"),
            ],
        ),
    );

    let running = tokio::spawn({
        let form = Arc::clone(&form);
        async move { form.add_config().await }
    });

    // the initial selection's form body arrives first
    assert!(wait_until(|| probe.replaced_count() == 1).await);
    probe.send(DialogEvent::TypeSelected("local".to_string()));
    assert!(wait_until(|| probe.replaced_count() == 2).await);
    assert_eq!(
        probe.replaced(),
        vec![
            r#"<form data-kind="remote"></form>"#.to_string(),
            r#"<form data-kind="local"></form>"#.to_string(),
        ]
    );

    probe.send(DialogEvent::Submitted);
    let outcome = running.await.unwrap().unwrap();
    assert_eq!(outcome, DialogOutcome::Submitted);

    // a successful create reloads the whole subtree
    assert_eq!(host.opened(), vec![NODE_CREATE.to_string()]);
    assert_eq!(client.calls_for(SETUP_RELOAD), 1);
    assert_eq!(setup.form().unwrap().nodes().len(), 3);
}

#[tokio::test]
async fn test_stale_type_form_is_discarded() {
    let client = StubClient::new();
    let host = Arc::new(ScriptedHost::new());
    let (session, probe) = scripted_session(&[("type", "remote")]);
    host.push_session(session);

    let setup = mounted_panel(&client, Arc::clone(&host));
    let form = setup.form().unwrap();

    client.gate(REMOTE_EMPTY);
    client.gate(LOCAL_EMPTY);
    client.fragment(REMOTE_EMPTY, r#"<form data-kind="remote"></form>"#);
    client.fragment(LOCAL_EMPTY, r#"<form data-kind="local"></form>"#);

    let running = tokio::spawn({
        let form = Arc::clone(&form);
        async move { form.add_config().await }
    });
    assert!(wait_until(|| client.calls_for(REMOTE_EMPTY) == 1).await);

    // the selection moves on while the first body is still loading
    probe.send(DialogEvent::TypeSelected("local".to_string()));
    assert!(wait_until(|| client.calls_for(LOCAL_EMPTY) == 1).await);

    // the current selection's body lands first, the stale one after
    client.release(LOCAL_EMPTY);
    assert!(wait_until(|| probe.replaced_count() == 1).await);
    client.release(REMOTE_EMPTY);
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    assert_eq!(
        probe.replaced(),
        vec![r#"<form data-kind="local"></form>"#.to_string()]
    );

    probe.send(DialogEvent::Submitted);
    let outcome = running.await.unwrap().unwrap();
    assert_eq!(outcome, DialogOutcome::Submitted);
}

#[tokio::test]
async fn test_closing_create_dialog_drops_pending_fetch() {
    let client = StubClient::new();
    let host = Arc::new(ScriptedHost::new());
    let (session, probe) = scripted_session(&[("type", "remote")]);
    host.push_session(session);

    let setup = mounted_panel(&client, Arc::clone(&host));
    let form = setup.form().unwrap();

    client.gate(REMOTE_EMPTY);
    let running = tokio::spawn({
        let form = Arc::clone(&form);
        async move { form.add_config().await }
    });
    assert!(wait_until(|| client.calls_for(REMOTE_EMPTY) == 1).await);

    probe.send(DialogEvent::Cancelled);
    let outcome = running.await.unwrap().unwrap();
    assert_eq!(outcome, DialogOutcome::Cancelled);

    // the parked fetch died with the dialog; releasing it changes nothing
    client.release(REMOTE_EMPTY);
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    assert_eq!(probe.replaced_count(), 0);
    assert_eq!(client.calls_for(SETUP_RELOAD), 0);
}
