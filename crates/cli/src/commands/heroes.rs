//! `list` / `get` / `add` / `update` / `delete` command implementations.
//!
//! The gateway never fails, so these only print what came back; failures are
//! reported through the message log and the failure channel.

use contracts::{HeroId, HeroRecord, HeroTransport, NewHero};
use gateway::HeroGateway;

pub async fn list<T: HeroTransport + Sync>(gateway: &HeroGateway<T>) {
    let heroes = gateway.get_heroes().await;
    print_heroes(&heroes);
}

pub async fn get<T: HeroTransport + Sync>(gateway: &HeroGateway<T>, id: HeroId) {
    match gateway.get_hero(id).await {
        Some(hero) => println!("{hero}"),
        None => println!("No hero with id {id}"),
    }
}

pub async fn add<T: HeroTransport + Sync>(gateway: &HeroGateway<T>, name: &str) {
    let name = name.trim();
    if name.is_empty() {
        println!("Hero name cannot be blank");
        return;
    }
    if let Some(created) = gateway.add_hero(&NewHero::new(name)).await {
        println!("Added {created}");
    }
}

pub async fn update<T: HeroTransport + Sync>(gateway: &HeroGateway<T>, id: HeroId, name: &str) {
    let hero = HeroRecord::new(id, name.trim());
    if gateway.update_hero(&hero).await.is_some() {
        println!("Updated {hero}");
    }
}

pub async fn delete<T: HeroTransport + Sync>(gateway: &HeroGateway<T>, id: HeroId) {
    if gateway.delete_hero(id).await.is_some() {
        println!("Deleted hero {id}");
    }
}

fn print_heroes(heroes: &[HeroRecord]) {
    if heroes.is_empty() {
        println!("No heroes");
        return;
    }
    println!("Heroes ({})", heroes.len());
    for (i, hero) in heroes.iter().enumerate() {
        let prefix = if i == heroes.len() - 1 { "└─" } else { "├─" };
        println!("   {prefix} {hero}");
    }
}
