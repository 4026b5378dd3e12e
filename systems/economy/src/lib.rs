#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure shop system translating player intents into tank commands.
//!
//! Adapters collect purchase and sell intents from their UI layer; this
//! system prices them against the core tables and forwards affordable
//! requests as commands. The tank re-validates everything, so an adapter
//! bypassing this system cannot corrupt the balance.

use aquarium_core::{Command, DecorKind, EggKind, FishId};

/// Player intent gathered by an adapter's shop surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShopIntent {
    /// Request to buy an egg of the provided kind.
    BuyEgg(EggKind),
    /// Request to buy a decoration of the provided kind.
    BuyDecor(DecorKind),
    /// Request to sell the fish with the provided identifier.
    SellFish(FishId),
}

/// Single entry in the shop catalog surfaced to adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Human-readable item name.
    pub name: &'static str,
    /// Purchase cost in coins.
    pub cost: u32,
}

/// Shop system that prices intents and emits commands.
#[derive(Debug, Default)]
pub struct Economy;

impl Economy {
    /// Creates a new economy system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Converts intents into commands, dropping unaffordable purchases.
    ///
    /// Sell intents always pass through; the tank decides whether the fish
    /// is grown enough and reports rejection through events.
    pub fn handle(&self, intents: &[ShopIntent], coins: u32, out: &mut Vec<Command>) {
        let mut remaining = coins;
        for intent in intents {
            match *intent {
                ShopIntent::BuyEgg(kind) => {
                    if kind.cost() <= remaining {
                        remaining -= kind.cost();
                        out.push(Command::PurchaseEgg { kind });
                    }
                }
                ShopIntent::BuyDecor(kind) => {
                    if kind.cost() <= remaining {
                        remaining -= kind.cost();
                        out.push(Command::PurchaseDecor { kind });
                    }
                }
                ShopIntent::SellFish(fish) => {
                    out.push(Command::SellFish { fish });
                }
            }
        }
    }

    /// Egg catalog in shop order.
    #[must_use]
    pub fn egg_catalog(&self) -> Vec<CatalogEntry> {
        EggKind::ALL
            .iter()
            .map(|kind| CatalogEntry {
                name: kind.display_name(),
                cost: kind.cost(),
            })
            .collect()
    }

    /// Decoration catalog in shop order.
    #[must_use]
    pub fn decor_catalog(&self) -> Vec<CatalogEntry> {
        DecorKind::ALL
            .iter()
            .map(|kind| CatalogEntry {
                name: decor_name(*kind),
                cost: kind.cost(),
            })
            .collect()
    }
}

/// Human-readable decoration name shown in the shop.
#[must_use]
pub fn decor_name(kind: DecorKind) -> &'static str {
    match kind {
        DecorKind::Kelp => "Kelp Strand",
        DecorKind::Rock => "River Rock",
        DecorKind::Coral => "Branch Coral",
        DecorKind::Driftwood => "Driftwood",
        DecorKind::Shell => "Spiral Shell",
        DecorKind::Castle => "Castle Ruin",
    }
}
