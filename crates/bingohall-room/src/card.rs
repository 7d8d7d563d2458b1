//! Card generation.

use bingohall_protocol::{CARD_SIZE, Card, Cell, FREE_CELL, Letter, NUMBERS_PER_LETTER};
use rand::Rng;
use rand::seq::index;

/// Deals a fresh card.
///
/// Each column gets five distinct numbers drawn without replacement from
/// its letter's band, then the middle of column N is overwritten with the
/// free cell. Cards are dealt once per player and never change.
pub fn generate_card<R: Rng + ?Sized>(rng: &mut R) -> Card {
    let mut columns = [[Cell::Free; CARD_SIZE]; CARD_SIZE];

    for letter in Letter::ALL {
        let low = *letter.range().start();
        let picks = index::sample(rng, usize::from(NUMBERS_PER_LETTER), CARD_SIZE);
        for (slot, offset) in columns[letter.index()].iter_mut().zip(picks.into_iter()) {
            // offset < NUMBERS_PER_LETTER, so it fits in a u8.
            *slot = Cell::Number(low + offset as u8);
        }
    }
    columns[FREE_CELL.0][FREE_CELL.1] = Cell::Free;

    // Distinct picks inside disjoint bands cannot break a card rule.
    Card::from_columns(columns).expect("generated card layout is always valid")
}
