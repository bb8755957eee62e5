//! Lending and returning books

use crate::support::Fixture;
use chrono::{Days, NaiveDate};
use libris_domain::entities::{
    CirculationPatch, CirculationReturn, Gender, Member, NewBook, NewCirculation, NewMember,
};
use libris_domain::ports::providers::CacheProvider;
use libris_domain::value_objects::PageRequest;
use libris_domain::{Book, Error};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
}

async fn member(fx: &Fixture, name: &str) -> Member {
    fx.ctx
        .members()
        .create(NewMember {
            name: name.to_string(),
            gender: Gender::Female,
            class: "X IPS 2".to_string(),
            phone: format!("0813-{name}"),
            photo: None,
        })
        .await
        .unwrap()
}

async fn book(fx: &Fixture, title: &str) -> Book {
    fx.ctx
        .books()
        .create(NewBook {
            title: title.to_string(),
            ..Default::default()
        })
        .await
        .unwrap()
}

fn loan(member: &Member, book: &Book) -> NewCirculation {
    NewCirculation {
        member_id: member.id.clone(),
        book_id: book.id.clone(),
        borrowed_on: day(1),
        due_on: day(1) + Days::new(7),
        fine: 0,
    }
}

#[tokio::test]
async fn test_loan_codes_are_sequential() {
    let fx = Fixture::new();
    let dewi = member(&fx, "Dewi").await;
    let circulation = fx.ctx.circulations();

    let mut codes = Vec::new();
    for n in 0..3 {
        let book = book(&fx, &format!("Bumi Manusia {n}")).await;
        codes.push(circulation.borrow(loan(&dewi, &book)).await.unwrap().code);
    }
    assert_eq!(codes, ["SKL001", "SKL002", "SKL003"]);

    let page = circulation.list(PageRequest::new(1)).await.unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items[0].code, "SKL001");
}

#[tokio::test]
async fn test_borrow_needs_existing_member_and_book() {
    let fx = Fixture::new();
    let dewi = member(&fx, "Dewi").await;
    let novel = book(&fx, "Gadis Pantai").await;
    let circulation = fx.ctx.circulations();

    let mut ghost_member = loan(&dewi, &novel);
    ghost_member.member_id = "no-such-member".to_string();
    assert!(circulation.borrow(ghost_member).await.unwrap_err().is_not_found());

    let mut ghost_book = loan(&dewi, &novel);
    ghost_book.book_id = "no-such-book".to_string();
    assert!(circulation.borrow(ghost_book).await.unwrap_err().is_not_found());

    let mut backwards = loan(&dewi, &novel);
    backwards.due_on = day(1) - Days::new(1);
    assert!(matches!(
        circulation.borrow(backwards).await.unwrap_err(),
        Error::InvalidArgument { .. }
    ));

    assert_eq!(circulation.list(PageRequest::new(1)).await.unwrap().total, 0);
}

#[tokio::test]
async fn test_book_on_open_loan_cannot_be_lent_again() {
    let fx = Fixture::new();
    let dewi = member(&fx, "Dewi").await;
    let sari = member(&fx, "Sari").await;
    let novel = book(&fx, "Arus Balik").await;
    let circulation = fx.ctx.circulations();

    let first = circulation.borrow(loan(&dewi, &novel)).await.unwrap();
    assert!(circulation.borrow(loan(&sari, &novel)).await.unwrap_err().is_conflict());

    let returned = CirculationReturn {
        returned_on: day(6),
        fine: 0,
    };
    circulation.return_book(&first.id, returned).await.unwrap();

    let second = circulation.borrow(loan(&sari, &novel)).await.unwrap();
    assert_eq!(second.code, "SKL002");
}

#[tokio::test]
async fn test_return_invalidates_cached_loan() {
    let fx = Fixture::new();
    let dewi = member(&fx, "Dewi").await;
    let novel = book(&fx, "Jejak Langkah").await;
    let circulation = fx.ctx.circulations();
    let lent = circulation.borrow(loan(&dewi, &novel)).await.unwrap();

    // Warm the cache with the open loan
    assert!(circulation.get(&lent.id).await.unwrap().is_open());
    let key = format!("circulation:{}", lent.id);
    assert!(fx.entity_cache.exists(&key).await.unwrap());

    let returned = CirculationReturn {
        returned_on: day(12),
        fine: 2_000,
    };
    circulation.return_book(&lent.id, returned).await.unwrap();
    assert!(!fx.entity_cache.exists(&key).await.unwrap());

    let reloaded = circulation.get(&lent.id).await.unwrap();
    assert_eq!(reloaded.returned_on, Some(day(12)));
    assert_eq!(reloaded.fine, 2_000);

    let twice = circulation.return_book(&lent.id, returned).await.unwrap_err();
    assert!(matches!(twice, Error::InvalidArgument { .. }));
}

#[tokio::test]
async fn test_update_and_delete_refresh_cached_loan() {
    let fx = Fixture::new();
    let dewi = member(&fx, "Dewi").await;
    let novel = book(&fx, "Rumah Kaca").await;
    let circulation = fx.ctx.circulations();
    let lent = circulation.borrow(loan(&dewi, &novel)).await.unwrap();
    circulation.get(&lent.id).await.unwrap();

    let extended = CirculationPatch {
        due_on: Some(day(20)),
        ..Default::default()
    };
    circulation.update(&lent.id, extended).await.unwrap();
    assert_eq!(circulation.get(&lent.id).await.unwrap().due_on, day(20));

    let shortened = CirculationPatch {
        due_on: Some(day(1) - Days::new(3)),
        ..Default::default()
    };
    assert!(circulation.update(&lent.id, shortened).await.is_err());

    circulation.delete(&lent.id).await.unwrap();
    assert!(circulation.get(&lent.id).await.unwrap_err().is_not_found());
}
