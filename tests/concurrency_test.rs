//! Concurrency tests for Snail Mail.
//!
//! These tests hammer drop-off and pick-up from many blocking tasks at once
//! and verify that capacity limits hold and that the opposing lock order
//! never deadlocks.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use snailmail::{Context, Coordinate, InMemory, Mail, MailGuid, Mailbox, User, UserGuid};

const MAILBOX_CAPACITY: u32 = 4;
const CARRY_CAPACITY: u32 = 3;

/// Setup a store with couriers, a recipient and a few mailboxes.
fn setup_world(couriers: usize) -> (Arc<InMemory>, Vec<UserGuid>, UserGuid, Vec<String>) {
    let store = Arc::new(InMemory::new());
    let ctx = Context::new();

    let recipient = User::new("recipient", CARRY_CAPACITY);
    let recipient_guid = recipient.user_guid;
    store.create_user(&ctx, recipient, "password").unwrap();

    let mut courier_guids = Vec::new();
    for i in 0..couriers {
        let courier = User::new(format!("courier{i}"), CARRY_CAPACITY);
        courier_guids.push(courier.user_guid);
        store.create_user(&ctx, courier, "password").unwrap();
        for _ in 0..CARRY_CAPACITY {
            store
                .create_mail(&ctx, Mail::new(courier_guids[i], recipient_guid))
                .unwrap();
        }
    }

    let mut addresses = Vec::new();
    for i in 0..3 {
        let address = format!("exchange-{i}");
        store
            .create_mailbox(
                &ctx,
                Mailbox::new(&address, MAILBOX_CAPACITY, Coordinate::default()),
            )
            .unwrap();
        addresses.push(address);
    }
    let home = "home".to_string();
    store
        .create_mailbox(
            &ctx,
            Mailbox::new(&home, MAILBOX_CAPACITY, Coordinate::default()).with_owner(recipient_guid),
        )
        .unwrap();
    addresses.push(home);

    (store, courier_guids, recipient_guid, addresses)
}

/// Test concurrent drop-off and pick-up.
///
/// Every worker alternates between dropping off and picking up at rotating
/// mailboxes. Afterwards every mail item must be in exactly one place and
/// no capacity may be exceeded.
#[tokio::test]
async fn test_concurrent_exchanges_respect_capacity() {
    const NUM_COURIERS: usize = 8;
    const ROUNDS: usize = 50;

    let (store, couriers, recipient, addresses) = setup_world(NUM_COURIERS);
    let addresses = Arc::new(addresses);

    let mut handles = Vec::new();
    for (i, courier) in couriers.iter().copied().enumerate() {
        let store = Arc::clone(&store);
        let addresses = Arc::clone(&addresses);
        handles.push(tokio::task::spawn_blocking(move || {
            let ctx = Context::new();
            for round in 0..ROUNDS {
                let address = &addresses[(i + round) % addresses.len()];
                if (i + round) % 2 == 0 {
                    store.drop_off_mail(&ctx, courier, address).unwrap();
                } else {
                    store.pick_up_mail(&ctx, courier, address).unwrap();
                }
            }
        }));
    }

    // The recipient collects from home while couriers are busy.
    let collector = {
        let store = Arc::clone(&store);
        tokio::task::spawn_blocking(move || {
            let ctx = Context::new();
            for _ in 0..ROUNDS {
                store.pick_up_mail(&ctx, recipient, "home").unwrap();
            }
        })
    };

    let all = async {
        for handle in handles {
            handle.await.unwrap();
        }
        collector.await.unwrap();
    };
    tokio::time::timeout(Duration::from_secs(30), all)
        .await
        .expect("exchanges deadlocked");

    let ctx = Context::new();
    let mut seen: HashSet<MailGuid> = HashSet::new();

    for courier in &couriers {
        let carried = store.get_carried_mail(&ctx, *courier).unwrap();
        assert!(carried.len() <= CARRY_CAPACITY as usize);
        for mail in carried {
            assert_eq!(mail.carrier, Some(*courier));
            assert!(seen.insert(mail.mail_guid));
        }
    }
    for address in addresses.iter() {
        let resident = store.get_mailbox_mail(&ctx, address).unwrap();
        assert!(resident.len() <= MAILBOX_CAPACITY as usize);
        for mail in resident {
            assert!(mail.carrier.is_none());
            assert!(seen.insert(mail.mail_guid));
        }
    }
    for mail in store.get_user_mail(&ctx, recipient).unwrap() {
        assert!(mail.is_delivered());
        assert!(seen.insert(mail.mail_guid));
    }

    assert_eq!(seen.len(), NUM_COURIERS * CARRY_CAPACITY as usize);
}

/// Test concurrent user registration with clashing usernames.
///
/// Exactly one registration per username may succeed.
#[tokio::test]
async fn test_concurrent_username_registration() {
    const NUM_ATTEMPTS: usize = 16;

    let store = Arc::new(InMemory::new());

    let mut handles = Vec::new();
    for i in 0..NUM_ATTEMPTS {
        let store = Arc::clone(&store);
        handles.push(tokio::task::spawn_blocking(move || {
            let ctx = Context::new();
            let username = format!("user{}", i % 4);
            store.create_user(&ctx, User::new(username, 1), "password")
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, 4);
    assert_eq!(store.stats(&Context::new()).unwrap().users, 4);
}
