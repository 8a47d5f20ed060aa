//! End-to-end flow against the loopback broker.
//!
//! Drives the reconciler with real broker deliveries — presence on
//! subscribe, message fan-out with publisher echo, history fetches on
//! channel switch — the way the terminal driver does, minus the terminal.

use parlor_app::{GroupInfo, Presence, Reconciler, ReconcilerAction, ReconcilerEvent, Session};
use parlor_core::{ChannelName, ChatPayload, Namespace, Pattern, StaticDirectory, UserId};
use parlor_pubsub::{Loopback, LoopbackClient, LoopbackConfig, ServiceEvent};

fn reconciler(me: &str) -> Reconciler {
    let directory = StaticDirectory::new();
    let session = Session::open(UserId::new(me), &directory);
    let groups = vec![
        GroupInfo {
            channel: ChannelName::public("global"),
            name: "Online Users".to_owned(),
            info: None,
        },
        GroupInfo { channel: ChannelName::public("other"), name: "Other".to_owned(), info: None },
    ];
    Reconciler::new(session, Box::new(directory), groups, &[])
}

fn patterns() -> Vec<Pattern> {
    vec![Pattern::Namespace(Namespace::Public), Pattern::Namespace(Namespace::Direct)]
}

/// Feed every queued broker delivery into the reconciler, like the driver's
/// poll loop would, and return the actions produced.
fn pump(client: &mut LoopbackClient, r: &mut Reconciler) -> Vec<ReconcilerAction> {
    let mut actions = Vec::new();
    while let Some(event) = client.try_recv() {
        let event = match event {
            ServiceEvent::Message(envelope) => ReconcilerEvent::Message(envelope),
            ServiceEvent::Signal(envelope) => ReconcilerEvent::Signal(envelope),
            ServiceEvent::Presence(envelope) => ReconcilerEvent::Presence(envelope),
        };
        actions.extend(r.handle(event));
    }
    actions
}

/// Execute the fetch actions a select produced, delivering tagged history
/// batches back into the reconciler.
fn complete_fetches(
    client: &LoopbackClient,
    r: &mut Reconciler,
    actions: &[ReconcilerAction],
) {
    for action in actions {
        if let ReconcilerAction::FetchHistory { channel, limit } = action {
            let items = client.history(channel, *limit);
            let _ = r.handle(ReconcilerEvent::HistoryLoaded { channel: channel.clone(), items });
        }
    }
}

#[test]
fn unread_counts_then_history_on_switch() {
    let broker = Loopback::new(LoopbackConfig::default());
    let mut mine = broker.attach(UserId::new("5"));
    mine.subscribe(&patterns(), true);
    let remote = broker.attach(UserId::new("9"));
    remote.subscribe(&patterns(), true);

    let mut r = reconciler("5");
    let global = ChannelName::public("global");
    let other = ChannelName::public("other");

    let actions = r.handle(ReconcilerEvent::SelectChannel(other.clone()));
    complete_fetches(&mine, &mut r, &actions);

    for i in 0..5 {
        remote.publish(&global, ChatPayload::new(format!("msg {i}")).to_value());
    }
    let _ = pump(&mut mine, &mut r);

    // Remote came online via its subscribe announcement.
    assert_eq!(r.presence(&UserId::new("9")), Some(Presence::Online));
    assert_eq!(r.unread(&global), 5);
    assert_eq!(r.unread(&other), 0);
    assert!(r.transcript().is_empty());

    // Switching resets the counter and loads the missed messages.
    let actions = r.handle(ReconcilerEvent::SelectChannel(global.clone()));
    complete_fetches(&mine, &mut r, &actions);

    assert_eq!(r.unread(&global), 0);
    assert_eq!(r.transcript().len(), 5);
    assert_eq!(r.transcript()[0].text, "msg 0");
    assert_eq!(r.transcript()[4].text, "msg 4");
}

#[test]
fn own_publish_echoes_into_active_transcript() {
    let broker = Loopback::new(LoopbackConfig::default());
    let mut mine = broker.attach(UserId::new("5"));
    mine.subscribe(&patterns(), true);

    let mut r = reconciler("5");
    let global = ChannelName::public("global");
    let actions = r.handle(ReconcilerEvent::SelectChannel(global.clone()));
    complete_fetches(&mine, &mut r, &actions);

    // The driver executes the publish action against the service; the
    // service echoes it back like any other message.
    let actions = r.handle(ReconcilerEvent::SubmitMessage("hello".to_owned()));
    for action in &actions {
        if let ReconcilerAction::Publish { channel, payload } = action {
            mine.publish(channel, payload.to_value());
        }
    }
    let _ = pump(&mut mine, &mut r);

    assert_eq!(r.transcript().len(), 1);
    assert!(r.transcript()[0].own);
    assert_eq!(r.transcript()[0].text, "hello");
    assert_eq!(r.unread(&global), 0);
}

#[test]
fn fetch_resolving_after_switch_is_discarded() {
    let broker = Loopback::new(LoopbackConfig::default());
    let mut mine = broker.attach(UserId::new("5"));
    mine.subscribe(&patterns(), true);
    let remote = broker.attach(UserId::new("9"));
    remote.subscribe(&patterns(), true);

    let global = ChannelName::public("global");
    let other = ChannelName::public("other");
    remote.publish(&global, ChatPayload::new("old news").to_value());

    let mut r = reconciler("5");
    let _ = pump(&mut mine, &mut r);

    // Select A and capture its fetch, but do not complete it yet.
    let a_actions = r.handle(ReconcilerEvent::SelectChannel(global));
    // User switches to B before A's fetch resolves.
    let b_actions = r.handle(ReconcilerEvent::SelectChannel(other.clone()));
    complete_fetches(&mine, &mut r, &b_actions);

    // A's batch finally arrives: tag mismatch, dropped wholesale.
    complete_fetches(&mine, &mut r, &a_actions);

    assert_eq!(r.active_channel(), Some(&other));
    assert!(r.transcript().is_empty());
}
