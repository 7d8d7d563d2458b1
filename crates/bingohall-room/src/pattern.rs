//! Win checking.
//!
//! A card wins when every cell along one of twelve fixed lines is
//! satisfied: five rows, five columns, and the two diagonals. A cell is
//! satisfied if it is the free cell or its number has been called.

use bingohall_protocol::{CARD_SIZE, Card, Cell, Letter, MAX_NUMBER};

/// One candidate line as `(letter index, position)` pairs.
pub type Line = [(usize, usize); CARD_SIZE];

/// Number of candidate lines on a card.
pub const LINE_COUNT: usize = 2 * CARD_SIZE + 2;

/// Every candidate line, in check order: rows, then columns, then the
/// main diagonal and the anti-diagonal.
pub const LINES: [Line; LINE_COUNT] = build_lines();

const fn build_lines() -> [Line; LINE_COUNT] {
    let mut lines = [[(0, 0); CARD_SIZE]; LINE_COUNT];
    let mut i = 0;
    while i < CARD_SIZE {
        let mut j = 0;
        while j < CARD_SIZE {
            // Row i spans every letter at position i.
            lines[i][j] = (j, i);
            // Column i is letter i top to bottom.
            lines[CARD_SIZE + i][j] = (i, j);
            j += 1;
        }
        lines[2 * CARD_SIZE][i] = (i, i);
        lines[2 * CARD_SIZE + 1][i] = (i, CARD_SIZE - 1 - i);
        i += 1;
    }
    lines
}

/// Returns the first fully satisfied line, if any.
///
/// `called` is the room's current call sequence. It is read fresh on
/// every claim; nothing about a card's progress is cached.
pub fn winning_line(card: &Card, called: &[u8]) -> Option<&'static Line> {
    let mut is_called = [false; MAX_NUMBER as usize + 1];
    for &n in called {
        if let Some(slot) = is_called.get_mut(usize::from(n)) {
            *slot = true;
        }
    }

    let satisfied = |&(letter, position): &(usize, usize)| {
        match card.column(Letter::ALL[letter])[position] {
            Cell::Free => true,
            Cell::Number(n) => is_called[usize::from(n)],
        }
    };

    LINES.iter().find(|line| line.iter().all(&satisfied))
}

/// Returns `true` if `card` has a complete line given the called numbers.
pub fn has_winning_pattern(card: &Card, called: &[u8]) -> bool {
    winning_line(card, called).is_some()
}

#[cfg(test)]
mod tests {
    use bingohall_protocol::FREE_CELL;

    use super::*;

    /// Column-major card: letter L at position p holds `low(L) + p`,
    /// with the usual free cell.
    fn card() -> Card {
        let mut columns = [[Cell::Free; CARD_SIZE]; CARD_SIZE];
        for letter in Letter::ALL {
            let low = *letter.range().start();
            for p in 0..CARD_SIZE {
                columns[letter.index()][p] = Cell::Number(low + p as u8);
            }
        }
        columns[FREE_CELL.0][FREE_CELL.1] = Cell::Free;
        Card::from_columns(columns).unwrap()
    }

    fn numbers_at(card: &Card, cells: &[(usize, usize)]) -> Vec<u8> {
        cells
            .iter()
            .filter_map(|&(l, p)| card.column(Letter::ALL[l])[p].number())
            .collect()
    }

    #[test]
    fn test_lines_cover_rows_columns_and_diagonals() {
        assert_eq!(LINES.len(), 12);
        assert_eq!(LINES[0], [(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);
        assert_eq!(LINES[5], [(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)]);
        assert_eq!(LINES[10], [(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)]);
        assert_eq!(LINES[11], [(0, 4), (1, 3), (2, 2), (3, 1), (4, 0)]);
    }

    #[test]
    fn test_full_row_wins() {
        let card = card();
        let called = numbers_at(&card, &LINES[3]);
        assert!(has_winning_pattern(&card, &called));
        assert_eq!(winning_line(&card, &called), Some(&LINES[3]));
    }

    #[test]
    fn test_middle_row_needs_only_four_numbers() {
        let card = card();
        let called = numbers_at(&card, &LINES[2]);
        assert_eq!(called.len(), 4);
        assert!(has_winning_pattern(&card, &called));
    }

    #[test]
    fn test_full_column_wins() {
        let card = card();
        let called = numbers_at(&card, &LINES[CARD_SIZE + 4]);
        assert!(has_winning_pattern(&card, &called));
    }

    #[test]
    fn test_both_diagonals_win() {
        let card = card();
        for line in &LINES[10..] {
            let called = numbers_at(&card, line);
            assert!(has_winning_pattern(&card, &called));
        }
    }

    #[test]
    fn test_free_cell_alone_is_not_a_win() {
        assert!(!has_winning_pattern(&card(), &[]));
    }

    #[test]
    fn test_one_gap_in_every_line_is_not_a_win() {
        let card = card();
        // One cell per row and per column, touching both diagonals and
        // avoiding the free cell.
        let gaps = [(0, 0), (1, 2), (2, 4), (3, 1), (4, 3)];
        let gap_numbers = numbers_at(&card, &gaps);
        let called: Vec<u8> = card
            .numbers()
            .filter(|n| !gap_numbers.contains(n))
            .collect();
        assert_eq!(called.len(), 19);
        assert!(!has_winning_pattern(&card, &called));

        // Filling (0, 0) completes row 0.
        let mut called = called;
        called.push(gap_numbers[0]);
        assert!(has_winning_pattern(&card, &called));
    }

    #[test]
    fn test_numbers_not_on_card_do_not_help() {
        let card = card();
        let off_card: Vec<u8> =
            (1..=MAX_NUMBER).filter(|n| !card.numbers().any(|c| c == *n)).collect();
        assert!(!has_winning_pattern(&card, &off_card));
    }
}
