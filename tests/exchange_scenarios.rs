//! End-to-end delivery scenarios against the in-memory datastore.

mod common;

use std::collections::HashSet;

use chrono::Utc;
use snailmail::{Coordinate, Datastore, ErrorKind, InMemory, Mail, Mailbox, User};

use common::{World, PASSWORD};

#[test]
fn test_delivery_to_home_mailbox_then_owner_collects() {
    let world = World::new();
    let u1 = world.user("u1", 3);
    let u2 = world.user("u2", 3);
    world.home_mailbox("A", 1, u1);
    let m1 = world.write_mail(u2, u1);

    let dropped = world.store.drop_off_mail(&world.ctx, u2, "A").unwrap();
    assert_eq!(dropped, vec![m1]);

    let delivered = world.store.get_mail(&world.ctx, m1).unwrap();
    assert!(delivered.carrier.is_none());
    assert!(delivered.is_delivered());
    assert_eq!(world.resident("A"), vec![m1]);

    // A is full; the next letter stays with the courier.
    let m2 = world.write_mail(u2, u1);
    let dropped = world.store.drop_off_mail(&world.ctx, u2, "A").unwrap();
    assert!(dropped.is_empty());
    assert_eq!(world.carried(u2), vec![m2]);
    assert_eq!(world.resident("A"), vec![m1]);

    // The owner takes M1 home, not onto a manifest.
    let picked = world.store.pick_up_mail(&world.ctx, u1, "A").unwrap();
    assert_eq!(picked, vec![m1]);
    assert_eq!(world.at_rest(u1), vec![m1]);
    assert!(world.carried(u1).is_empty());
    assert!(world.resident("A").is_empty());
}

#[test]
fn test_relay_through_public_exchange() {
    let world = World::new();
    let sender = world.user("sender", 5);
    let courier = world.user("courier", 5);
    let recipient = world.user("recipient", 5);
    world.public_mailbox("exchange", 10);
    world.home_mailbox("home", 10, recipient);
    let letter = world.write_mail(sender, recipient);

    world.store.drop_off_mail(&world.ctx, sender, "exchange").unwrap();
    assert!(!world.store.get_mail(&world.ctx, letter).unwrap().is_delivered());

    world.store.pick_up_mail(&world.ctx, courier, "exchange").unwrap();
    assert_eq!(
        world.store.get_mail(&world.ctx, letter).unwrap().carrier,
        Some(courier)
    );

    world.store.drop_off_mail(&world.ctx, courier, "home").unwrap();
    world.store.pick_up_mail(&world.ctx, recipient, "home").unwrap();

    let opened_at = Utc::now();
    world.store.open_mail(&world.ctx, letter, opened_at).unwrap();

    let mail = world.store.get_mail(&world.ctx, letter).unwrap();
    assert!(mail.is_delivered());
    assert_eq!(mail.opened_on, Some(opened_at));
    assert_eq!(world.at_rest(recipient), vec![letter]);
}

#[test]
fn test_delivered_on_survives_repeated_cycles() {
    let world = World::new();
    let owner = world.user("owner", 5);
    let sender = world.user("sender", 5);
    let courier = world.user("courier", 5);
    world.home_mailbox("home", 5, owner);
    let letter = world.write_mail(sender, owner);

    world.store.drop_off_mail(&world.ctx, sender, "home").unwrap();
    let first = world.store.get_mail(&world.ctx, letter).unwrap().delivered_on;
    assert!(first.is_some());

    for _ in 0..3 {
        world.store.pick_up_mail(&world.ctx, courier, "home").unwrap();
        world.store.drop_off_mail(&world.ctx, courier, "home").unwrap();
    }

    assert_eq!(
        world.store.get_mail(&world.ctx, letter).unwrap().delivered_on,
        first
    );
}

#[test]
fn test_duplicate_creations_leave_original_unchanged() {
    let world = World::new();
    let alice = User::new("alice", 2);
    world
        .store
        .create_user(&world.ctx, alice.clone(), PASSWORD)
        .unwrap();

    let same_guid = User {
        username: "someone-else".to_string(),
        ..alice.clone()
    };
    assert!(world
        .store
        .create_user(&world.ctx, same_guid, PASSWORD)
        .unwrap_err()
        .is(ErrorKind::UserGuidExists));
    assert!(world
        .store
        .create_user(&world.ctx, User::new("alice", 9), PASSWORD)
        .unwrap_err()
        .is(ErrorKind::UsernameExists));
    assert_eq!(
        world.store.get_user(&world.ctx, alice.user_guid).unwrap(),
        alice
    );

    let mail = Mail::new(alice.user_guid, alice.user_guid);
    world.store.create_mail(&world.ctx, mail.clone()).unwrap();
    let clash = Mail::new(alice.user_guid, alice.user_guid).with_guid(mail.mail_guid);
    assert!(world
        .store
        .create_mail(&world.ctx, clash)
        .unwrap_err()
        .is(ErrorKind::MailGuidExists));
    assert_eq!(
        world.store.get_mail(&world.ctx, mail.mail_guid).unwrap(),
        Mail {
            carrier: Some(alice.user_guid),
            ..mail
        }
    );

    let home = Mailbox::new("home", 3, Coordinate::new(1.0, 2.0)).with_owner(alice.user_guid);
    world.store.create_mailbox(&world.ctx, home.clone()).unwrap();
    assert!(world
        .store
        .create_mailbox(&world.ctx, Mailbox::new("home", 1, Coordinate::default()))
        .unwrap_err()
        .is(ErrorKind::MailboxAddressExists));
    assert!(world
        .store
        .create_mailbox(
            &world.ctx,
            Mailbox::new("cabin", 1, Coordinate::default()).with_owner(alice.user_guid)
        )
        .unwrap_err()
        .is(ErrorKind::UserMailboxExists));
    assert_eq!(world.store.get_mailbox(&world.ctx, "home").unwrap(), home);
}

#[test]
fn test_deleting_user_does_not_cascade() {
    let world = World::new();
    let sender = world.user("sender", 5);
    let recipient = world.user("recipient", 5);
    world.home_mailbox("home", 5, recipient);
    let letter = world.write_mail(sender, recipient);

    world.store.delete_user(&world.ctx, sender).unwrap();
    world.store.delete_user(&world.ctx, recipient).unwrap();

    let mail = world.store.get_mail(&world.ctx, letter).unwrap();
    assert_eq!(mail.from, sender);
    assert_eq!(mail.to, recipient);
    assert!(world.store.get_mailbox(&world.ctx, "home").is_ok());
    assert!(world
        .store
        .get_user_mail(&world.ctx, recipient)
        .unwrap_err()
        .is(ErrorKind::UserNotFound));
}

#[test]
fn test_deletes_are_idempotent() {
    let world = World::new();
    let user = snailmail::UserGuid::new();
    let mail = snailmail::MailGuid::new();

    for _ in 0..2 {
        assert!(world.store.delete_user(&world.ctx, user).is_ok());
        assert!(world.store.delete_mail(&world.ctx, mail).is_ok());
        assert!(world.store.delete_mailbox(&world.ctx, "nowhere").is_ok());
    }
}

#[test]
fn test_mail_is_never_both_carried_and_resident() {
    let world = World::new();
    let couriers: Vec<_> = (0..3)
        .map(|i| world.user(&format!("courier{i}"), 2))
        .collect();
    let owner = world.user("owner", 1);
    world.public_mailbox("exchange", 3);
    world.home_mailbox("home", 2, owner);
    for &courier in &couriers {
        world.write_mail(courier, owner);
        world.write_mail(courier, couriers[0]);
    }

    let addresses = ["exchange", "home"];
    for round in 0..6 {
        for (i, &courier) in couriers.iter().enumerate() {
            let address = addresses[(round + i) % addresses.len()];
            if round % 2 == 0 {
                world.store.drop_off_mail(&world.ctx, courier, address).unwrap();
            } else {
                world.store.pick_up_mail(&world.ctx, courier, address).unwrap();
            }

            let mut carried = HashSet::new();
            for &c in couriers.iter().chain([owner].iter()) {
                let manifest = world.carried(c);
                let user = world.store.get_user(&world.ctx, c).unwrap();
                if c != owner {
                    assert!(manifest.len() <= user.mail_carry_capacity as usize);
                }
                for guid in manifest {
                    assert!(carried.insert(guid), "{guid} carried twice");
                }
            }
            for address in addresses {
                let mailbox = world.store.get_mailbox(&world.ctx, address).unwrap();
                let resident = world.resident(address);
                assert!(resident.len() <= mailbox.capacity as usize);
                for guid in resident {
                    assert!(!carried.contains(&guid), "{guid} carried and resident");
                }
            }
        }
    }
}

#[test]
fn test_nearby_search_through_trait_object() {
    let store: Box<dyn Datastore> = Box::new(InMemory::new());
    let ctx = snailmail::Context::new();
    let origin = Coordinate::new(48.8566, 2.3522);
    store
        .create_mailbox(&ctx, Mailbox::new("notre-dame", 1, Coordinate::new(48.853, 2.3499)))
        .unwrap();
    store
        .create_mailbox(&ctx, Mailbox::new("versailles", 1, Coordinate::new(48.8049, 2.1204)))
        .unwrap();

    let nearby = store.get_nearby_mailboxes(&ctx, &origin, 1_000.0).unwrap();
    assert_eq!(nearby.len(), 1);
    assert_eq!(nearby[0].address, "notre-dame");

    let wider = store.get_nearby_mailboxes(&ctx, &origin, 25_000.0).unwrap();
    let addresses: Vec<_> = wider.iter().map(|m| m.address.as_str()).collect();
    assert_eq!(addresses, vec!["notre-dame", "versailles"]);
}

#[test]
fn test_auth_after_rename() {
    let world = World::new();
    let guid = world.user("alice", 1);
    let mut user = world.store.get_user(&world.ctx, guid).unwrap();
    user.username = "alicia".to_string();
    world.store.update_user(&world.ctx, user.clone()).unwrap();

    assert_eq!(
        world.store.auth_user(&world.ctx, "alicia", PASSWORD).unwrap(),
        user
    );
    assert!(world
        .store
        .auth_user(&world.ctx, "alice", PASSWORD)
        .unwrap_err()
        .is_not_found());
}

#[test]
fn test_recreated_guid_is_dropped_off_once() {
    let world = World::new();
    let sender = world.user("sender", 5);
    let recipient = world.user("recipient", 5);
    world.public_mailbox("exchange", 5);
    let mail = Mail::new(sender, recipient);
    world.store.create_mail(&world.ctx, mail.clone()).unwrap();

    world.store.delete_mail(&world.ctx, mail.mail_guid).unwrap();
    world.store.create_mail(&world.ctx, mail.clone()).unwrap();
    assert_eq!(world.carried(sender), vec![mail.mail_guid]);

    let dropped = world.store.drop_off_mail(&world.ctx, sender, "exchange").unwrap();
    assert_eq!(dropped, vec![mail.mail_guid]);
    assert_eq!(world.resident("exchange"), vec![mail.mail_guid]);
}

#[test]
fn test_recreated_guid_is_not_left_resident() {
    let world = World::new();
    let sender = world.user("sender", 5);
    let recipient = world.user("recipient", 5);
    world.public_mailbox("exchange", 5);
    let mail = Mail::new(sender, recipient);
    world.store.create_mail(&world.ctx, mail.clone()).unwrap();
    world.store.drop_off_mail(&world.ctx, sender, "exchange").unwrap();

    world.store.delete_mail(&world.ctx, mail.mail_guid).unwrap();
    world.store.create_mail(&world.ctx, mail.clone()).unwrap();

    assert_eq!(world.carried(sender), vec![mail.mail_guid]);
    assert!(world.resident("exchange").is_empty());

    // The stale slot is gone, so a courier picks up nothing.
    let courier = world.user("courier", 5);
    let picked = world.store.pick_up_mail(&world.ctx, courier, "exchange").unwrap();
    assert!(picked.is_empty());
}
