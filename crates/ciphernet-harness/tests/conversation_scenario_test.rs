//! Two- and three-party conversations through the full runtime.
//!
//! Every render is checked against the standard invariants by the
//! [`SimDriver`](ciphernet_harness::SimDriver) inside each peer.

use ciphernet_app::{Direction, EntryBody};
use ciphernet_core::{
    DECRYPTION_FAILED_MARKER, Decryption, FALLBACK_TIP, Identity, ImportReport, MessageCipher,
    SharedSecret,
};
use ciphernet_harness::{SimEnv, SimPeer, deliver};
use ciphernet_store::{KeyValueStore, LOG_KEY, MemoryStore};

const ALICE: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaa1111";
const BOB: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbb2222";
const CAROL: &str = "cccccccccccccccccccccccccccc3333";
const SECRET: &str = "correct horse";

async fn signed_in(label: &str, id: &str, seed: u64) -> SimPeer {
    let mut peer = SimPeer::launch(label, seed).await.unwrap();
    peer.runtime().restore(label, Some(id)).await.unwrap();
    peer
}

async fn open_conversation(peer: &mut SimPeer, name: &str, id: &str, secret: &str) {
    peer.runtime().add_contact(name, id).await.unwrap();
    peer.runtime().select_contact(&Identity::new(id)).await.unwrap();
    peer.runtime().set_passphrase(SharedSecret::new(secret)).await.unwrap();
}

fn bodies(peer: &SimPeer) -> Vec<EntryBody> {
    peer.app().conversation().into_iter().map(|entry| entry.body).collect()
}

#[tokio::test]
async fn alice_and_bob_exchange_messages() {
    let mut alice = signed_in("alice", ALICE, 1).await;
    let mut bob = signed_in("bob", BOB, 2).await;
    open_conversation(&mut alice, "Bob", BOB, SECRET).await;
    open_conversation(&mut bob, "Alice", ALICE, SECRET).await;

    alice.runtime().send("hello").await.unwrap();
    let report = deliver(&alice, &mut bob).await.unwrap();

    assert_eq!(report, Some(ImportReport { added: 1, duplicates: 0, unrelated: 0 }));
    let entries = bob.app().conversation();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].direction, Direction::Incoming);
    assert_eq!(entries[0].body, EntryBody::Plaintext("hello".to_string()));

    bob.runtime().send("hi alice").await.unwrap();
    let report = deliver(&bob, &mut alice).await.unwrap();

    assert_eq!(report, Some(ImportReport { added: 1, duplicates: 1, unrelated: 0 }));
    assert_eq!(bodies(&alice), vec![
        EntryBody::Plaintext("hello".to_string()),
        EntryBody::Plaintext("hi alice".to_string()),
    ]);
    let directions: Vec<_> = alice.app().conversation().iter().map(|e| e.direction).collect();
    assert_eq!(directions, vec![Direction::Outgoing, Direction::Incoming]);
}

#[tokio::test]
async fn wrong_secret_shows_failure_marker() {
    let mut alice = signed_in("alice", ALICE, 1).await;
    let mut bob = signed_in("bob", BOB, 2).await;
    open_conversation(&mut alice, "Bob", BOB, SECRET).await;
    open_conversation(&mut bob, "Alice", ALICE, "wrong secret").await;

    alice.runtime().send("hello").await.unwrap();
    deliver(&alice, &mut bob).await.unwrap();

    assert_eq!(bodies(&bob), vec![EntryBody::Failed]);
    assert_eq!(bob.app().conversation()[0].body.text(), DECRYPTION_FAILED_MARKER);

    bob.runtime().set_passphrase(SharedSecret::new(SECRET)).await.unwrap();
    assert_eq!(bodies(&bob), vec![EntryBody::Plaintext("hello".to_string())]);
}

#[tokio::test]
async fn third_party_cannot_read() {
    let mut alice = signed_in("alice", ALICE, 1).await;
    let mut carol = signed_in("carol", CAROL, 3).await;
    open_conversation(&mut alice, "Bob", BOB, SECRET).await;
    open_conversation(&mut carol, "Alice", ALICE, SECRET).await;

    alice.runtime().send("hello").await.unwrap();
    let envelope = alice.app().export_conversation(&Identity::new(BOB)).remove(0);

    // Not a participant: the import skips it.
    carol.runtime().receive(vec![envelope.clone()]).await.unwrap();
    assert_eq!(
        carol.app().last_import(),
        Some(ImportReport { added: 0, duplicates: 0, unrelated: 1 })
    );
    assert!(carol.app().log().is_empty());

    // Even with the right passphrase, the key is bound to the alice/bob pair.
    let cipher = MessageCipher::new(SimEnv::with_seed(9));
    let secret = SharedSecret::new(SECRET);
    let opened = cipher.open(&envelope, &secret, &Identity::new(ALICE), &Identity::new(CAROL));
    assert_eq!(opened, Decryption::Failed);
    let opened = cipher.open(&envelope, &secret, &Identity::new(BOB), &Identity::new(ALICE));
    assert_eq!(opened, Decryption::Plaintext("hello".to_string()));
}

#[tokio::test]
async fn redelivery_is_idempotent() {
    let mut alice = signed_in("alice", ALICE, 1).await;
    let mut bob = signed_in("bob", BOB, 2).await;
    open_conversation(&mut alice, "Bob", BOB, SECRET).await;
    open_conversation(&mut bob, "Alice", ALICE, SECRET).await;
    alice.runtime().send("one").await.unwrap();
    alice.runtime().send("two").await.unwrap();

    deliver(&alice, &mut bob).await.unwrap();
    let renders = bob.driver().render_count();
    let report = deliver(&alice, &mut bob).await.unwrap();

    assert_eq!(report, Some(ImportReport { added: 0, duplicates: 2, unrelated: 0 }));
    assert_eq!(bob.app().log().len(), 2);
    assert_eq!(bob.driver().render_count(), renders + 1);
}

#[tokio::test]
async fn history_survives_relaunch_but_passphrase_does_not() {
    let mut alice = signed_in("alice", ALICE, 1).await;
    open_conversation(&mut alice, "Bob", BOB, SECRET).await;
    alice.runtime().send("hello").await.unwrap();

    let mut alice = alice.relaunch().await.unwrap();

    assert_eq!(alice.id(), Some(&Identity::new(ALICE)));
    assert_eq!(alice.app().log().len(), 1);
    assert_eq!(alice.app().contacts().len(), 1);
    assert!(alice.app().active_peer().is_none());
    assert!(!alice.app().has_passphrase());

    alice.runtime().select_contact(&Identity::new(BOB)).await.unwrap();
    assert!(matches!(bodies(&alice).as_slice(), [EntryBody::Locked { .. }]));

    alice.runtime().set_passphrase(SharedSecret::new(SECRET)).await.unwrap();
    assert_eq!(bodies(&alice), vec![EntryBody::Plaintext("hello".to_string())]);
}

#[tokio::test]
async fn logout_then_restore_from_cache() {
    let mut alice = signed_in("alice", ALICE, 1).await;
    alice.runtime().logout(false).await.unwrap();
    assert!(alice.id().is_none());

    alice.runtime().restore("alice", None).await.unwrap();

    assert_eq!(alice.id(), Some(&Identity::new(ALICE)));
}

#[tokio::test]
async fn wipe_forgets_everything() {
    let mut alice = signed_in("alice", ALICE, 1).await;
    open_conversation(&mut alice, "Bob", BOB, SECRET).await;
    alice.runtime().send("hello").await.unwrap();

    alice.runtime().logout(true).await.unwrap();
    assert!(alice.store().is_empty().unwrap());

    let mut alice = alice.relaunch().await.unwrap();
    assert!(alice.id().is_none());
    assert!(alice.app().log().is_empty());
    assert!(alice.app().contacts().is_empty());

    alice.runtime().restore("alice", None).await.unwrap();
    assert!(alice.id().is_none());
    assert!(alice.driver().last_notice().is_some_and(|n| n.is_error()));
}

#[tokio::test]
async fn tip_falls_back_to_advisor_answer() {
    let mut alice = SimPeer::launch("alice", 1).await.unwrap();

    alice.runtime().refresh_tip().await.unwrap();

    assert_eq!(alice.app().tip(), FALLBACK_TIP);
}

#[tokio::test]
async fn same_seed_reproduces_conversation() {
    let mut first = signed_in("alice", ALICE, 42).await;
    let mut second = signed_in("alice", ALICE, 42).await;
    open_conversation(&mut first, "Bob", BOB, SECRET).await;
    open_conversation(&mut second, "Bob", BOB, SECRET).await;

    first.runtime().send("hello").await.unwrap();
    second.runtime().send("hello").await.unwrap();

    let export = first.app().export_conversation(&Identity::new(BOB));
    assert_eq!(export, second.app().export_conversation(&Identity::new(BOB)));

    insta::assert_json_snapshot!(export, {
        "[].id" => "[id]",
        "[].ciphertext" => "[ciphertext]",
        "[].nonce" => "[nonce]",
    }, @r###"
    [
      {
        "id": "[id]",
        "senderId": "aaaaaaaaaaaaaaaaaaaaaaaaaaaa1111",
        "receiverId": "bbbbbbbbbbbbbbbbbbbbbbbbbbbb2222",
        "ciphertext": "[ciphertext]",
        "nonce": "[nonce]",
        "timestamp": 1700000000000
      }
    ]
    "###);
}

#[tokio::test]
async fn stored_log_with_repeated_id_loads_once() {
    let store = MemoryStore::new();
    let stored = format!(
        r#"[{{"id":"m1","senderId":"{ALICE}","receiverId":"{BOB}","ciphertext":"","nonce":"","timestamp":1}},
            {{"id":"m1","senderId":"{BOB}","receiverId":"{ALICE}","ciphertext":"","nonce":"","timestamp":2}}]"#
    );
    store.put(LOG_KEY, &stored).unwrap();

    let alice = SimPeer::launch_with("alice", store, SimEnv::with_seed(1)).await.unwrap();

    assert_eq!(alice.app().log().len(), 1);
    assert_eq!(
        alice.app().log().get("m1").map(|envelope| envelope.sender_id.as_str()),
        Some(ALICE)
    );
}

